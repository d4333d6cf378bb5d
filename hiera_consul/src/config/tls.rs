//! TLS settings derived from [`ConsulConfig`].

use camino::Utf8PathBuf;

use super::ConsulConfig;

/// Whether the agent's certificate is verified.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PeerVerification {
    /// Verify the certificate chain and host name.
    Peer,
    /// Accept any certificate.
    Disabled,
}

/// Client certificate material presented to the agent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientIdentity {
    /// PEM client certificate.
    pub cert: Utf8PathBuf,
    /// PEM private key for `cert`.
    pub key: Utf8PathBuf,
    /// PEM CA bundle trusted for the agent.
    pub ca_bundle: Utf8PathBuf,
}

/// TLS options for the HTTP client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TlsSettings {
    /// Certificate verification mode.
    pub verify: PeerVerification,
    /// Client identity, when mutual TLS is configured.
    pub identity: Option<ClientIdentity>,
}

impl TlsSettings {
    pub(super) fn from_config(config: &ConsulConfig) -> Self {
        let verify = if config.ssl_verify {
            PeerVerification::Peer
        } else {
            PeerVerification::Disabled
        };
        let identity = match (&config.ssl_cert, &config.ssl_key, &config.ssl_ca_cert) {
            (Some(cert), Some(key), Some(ca_bundle)) => Some(ClientIdentity {
                cert: cert.clone(),
                key: key.clone(),
                ca_bundle: ca_bundle.clone(),
            }),
            _ => None,
        };
        Self { verify, identity }
    }
}
