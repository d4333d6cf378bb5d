//! Static connection and lookup configuration for the Consul backend.
//!
//! Values are extracted once, when the backend is built, from whatever
//! [`Figment`] the embedding framework assembled. Every field has a default,
//! applied field by field, so an empty figment yields a backend talking to a
//! local agent over plain HTTP.

mod tls;

use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use figment::{Figment, providers::Serialized};
use serde::{Deserialize, Serialize};

use crate::merge::MergeBehavior;
use crate::source::DataSource;
use crate::{LookupError, LookupResult, LookupResultExt};

pub use tls::{ClientIdentity, PeerVerification, TlsSettings};

/// Configuration for talking to a Consul agent.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsulConfig {
    /// Agent host name or address.
    pub host: String,
    /// Agent HTTP port.
    pub port: u16,
    /// HTTP API version; requests are prefixed with `/v{protocol}`.
    pub protocol: u32,
    /// Data sources consulted when the caller supplies no ordering of its own.
    pub paths: Vec<String>,
    /// Seconds to wait for a connection.
    pub http_connect_timeout: u64,
    /// Seconds to wait for a response.
    pub http_read_timeout: u64,
    /// Talk to the agent over TLS.
    pub use_ssl: bool,
    /// Verify the agent's certificate when using TLS.
    pub ssl_verify: bool,
    /// Client certificate presented to the agent.
    pub ssl_cert: Option<Utf8PathBuf>,
    /// Private key for [`Self::ssl_cert`].
    pub ssl_key: Option<Utf8PathBuf>,
    /// CA bundle used to verify the agent.
    pub ssl_ca_cert: Option<Utf8PathBuf>,
    /// How hash answers from successive sources are combined.
    pub merge_behavior: MergeBehavior,
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8500,
            protocol: 1,
            paths: vec!["kv/common".to_owned()],
            http_connect_timeout: 10,
            http_read_timeout: 10,
            use_ssl: false,
            ssl_verify: true,
            ssl_cert: None,
            ssl_key: None,
            ssl_ca_cert: None,
            merge_behavior: MergeBehavior::default(),
        }
    }
}

impl ConsulConfig {
    /// Extract configuration from `figment`, layered over the defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use figment::{Figment, providers::Serialized};
    /// use hiera_consul::ConsulConfig;
    ///
    /// let figment = Figment::new().merge(Serialized::default("port", 8501));
    /// let config = ConsulConfig::from_figment(&figment)?;
    /// assert_eq!(config.port, 8501);
    /// assert_eq!(config.host, "127.0.0.1");
    /// # Ok::<_, std::sync::Arc<hiera_consul::LookupError>>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Configuration`] when extraction fails and
    /// [`LookupError::Validation`] when a client certificate is configured
    /// without its key or CA bundle.
    pub fn from_figment(figment: &Figment) -> LookupResult<Self> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(figment.clone())
            .extract()
            .into_lookup()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> LookupResult<()> {
        if self.ssl_cert.is_none() {
            return Ok(());
        }
        for (key, value) in [("ssl_key", &self.ssl_key), ("ssl_ca_cert", &self.ssl_ca_cert)] {
            if value.is_none() {
                return Err(Arc::new(LookupError::Validation {
                    key: key.to_owned(),
                    message: "required when ssl_cert is set".to_owned(),
                }));
            }
        }
        Ok(())
    }

    /// Path prefix for every request, e.g. `/v1`.
    #[must_use]
    pub fn path_prefix(&self) -> String {
        format!("/v{}", self.protocol)
    }

    /// Scheme, host and port of the agent.
    ///
    /// # Examples
    ///
    /// ```
    /// use hiera_consul::ConsulConfig;
    ///
    /// let config = ConsulConfig { use_ssl: true, ..ConsulConfig::default() };
    /// assert_eq!(config.base_url(), "https://127.0.0.1:8500");
    /// ```
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }

    /// Connection timeout as a [`Duration`].
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.http_connect_timeout)
    }

    /// Read timeout as a [`Duration`].
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.http_read_timeout)
    }

    /// TLS settings for the HTTP client, or `None` for plain HTTP.
    #[must_use]
    pub fn tls(&self) -> Option<TlsSettings> {
        self.use_ssl.then(|| TlsSettings::from_config(self))
    }

    /// The configured paths as data sources, in priority order.
    #[must_use]
    pub fn sources(&self) -> Vec<DataSource> {
        self.paths.iter().map(|path| DataSource::new(path.as_str())).collect()
    }
}
