//! Integration tests for hash resolution.
//!
//! Validates tree reconstruction from individual KV entries, cross-source
//! precedence, endpoint filtering and the all-or-nothing handling of entry
//! fetch failures.
use anyhow::{Result, anyhow, ensure};
use hiera_consul::{
    Answer, ConsulBackend, ConsulConfig, DataSource, LookupError, MergeBehavior, ResolutionType,
};
use rstest::rstest;
use serde_json::{Value, json};
use test_helpers::consul::FakeConsul;

fn hash_lookup_with(
    agent: &FakeConsul,
    config: ConsulConfig,
    key: &str,
    paths: &[&str],
) -> Result<Option<Value>> {
    let sources: Vec<DataSource> = paths.iter().copied().map(DataSource::new).collect();
    ConsulBackend::new(config, agent)
        .lookup(key, &sources, ResolutionType::Hash)
        .map(|answer| answer.map(Answer::into_value))
        .map_err(|err| anyhow!(err.to_string()))
}

fn hash_lookup(agent: &FakeConsul, key: &str, paths: &[&str]) -> Result<Option<Value>> {
    hash_lookup_with(agent, ConsulConfig::default(), key, paths)
}

#[test]
fn merges_disjoint_entries_across_sources() -> Result<()> {
    let agent = FakeConsul::new()
        .with_kv("common/app/db/host", "x")
        .with_kv("hosts/app/db/port", "\"5432\"");
    let answer = hash_lookup(&agent, "app::db", &["kv/common", "kv/hosts"])?;
    ensure!(
        answer == Some(json!({"host": "x", "port": "5432"})),
        "unexpected answer {answer:?}"
    );
    ensure!(
        agent.requests()
            == [
                "/v1/kv/common/app/db?recurse=1&keys=1",
                "/v1/kv/common/app/db/host?raw=1",
                "/v1/kv/hosts/app/db?recurse=1&keys=1",
                "/v1/kv/hosts/app/db/port?raw=1",
            ],
        "unexpected requests {:?}",
        agent.requests()
    );
    Ok(())
}

#[test]
fn rebuilds_nested_trees() -> Result<()> {
    let agent = FakeConsul::new()
        .with_kv("common/app/db/primary/host", "db01")
        .with_kv("common/app/db/primary/port", "5432")
        .with_kv("common/app/db/replicas", r#"["db02","db03"]"#)
        .with_kv("common/app/dbx/ignored", "nope");
    let answer = hash_lookup(&agent, "app::db", &["kv/common"])?;
    ensure!(
        answer
            == Some(json!({
                "primary": {"host": "db01", "port": 5432},
                "replicas": ["db02", "db03"],
            })),
        "unexpected answer {answer:?}"
    );
    Ok(())
}

#[test]
fn higher_priority_source_wins_conflicts() -> Result<()> {
    let agent = FakeConsul::new()
        .with_kv("hosts/web01/app/db/host", "local")
        .with_kv("common/app/db/host", "shared")
        .with_kv("common/app/db/pool/size", "10")
        .with_kv("hosts/web01/app/db/pool/timeout", "5");
    let answer = hash_lookup(&agent, "app::db", &["kv/hosts/web01", "kv/common"])?;
    ensure!(
        answer == Some(json!({"host": "local", "pool": {"size": 10, "timeout": 5}})),
        "unexpected answer {answer:?}"
    );
    Ok(())
}

#[test]
fn native_behavior_keeps_whole_subtrees() -> Result<()> {
    let agent = FakeConsul::new()
        .with_kv("hosts/web01/app/db/pool/timeout", "5")
        .with_kv("common/app/db/pool/size", "10")
        .with_kv("common/app/db/host", "shared");
    let config = ConsulConfig {
        merge_behavior: MergeBehavior::Native,
        ..ConsulConfig::default()
    };
    let answer = hash_lookup_with(&agent, config, "app::db", &["kv/hosts/web01", "kv/common"])?;
    ensure!(
        answer == Some(json!({"host": "shared", "pool": {"timeout": 5}})),
        "unexpected answer {answer:?}"
    );
    Ok(())
}

#[rstest]
#[case::server_error(Some(500))]
#[case::forbidden(Some(403))]
#[case::timeout(None)]
fn entry_failure_aborts_without_partial_answer(#[case] status: Option<u16>) {
    let failing = "/v1/kv/hosts/app/db/port?raw=1";
    let agent = FakeConsul::new()
        .with_kv("common/app/db/host", "x")
        .with_kv("hosts/app/db/port", "5432")
        .with_kv("hosts/app/db/user", "app");
    let rigged = match status {
        Some(code) => agent.with_status(failing, code),
        None => agent.with_timeout(failing),
    };
    let sources = [DataSource::new("kv/common"), DataSource::new("kv/hosts")];
    let err = ConsulBackend::new(ConsulConfig::default(), &rigged)
        .lookup("app::db", &sources, ResolutionType::Hash)
        .expect_err("entry failure must be fatal");
    assert!(
        matches!(&*err, LookupError::InconsistentHash { path, status: reported }
            if path == "/v1/kv/hosts/app/db/port" && *reported == status),
        "unexpected {err:?}"
    );
}

#[test]
fn missing_entries_are_skipped() -> Result<()> {
    let agent = FakeConsul::new()
        .with_kv("common/app/db/host", "x")
        .with_kv("common/app/db/port", "5432")
        .with_status("/v1/kv/common/app/db/port?raw=1", 404);
    let answer = hash_lookup(&agent, "app::db", &["kv/common"])?;
    ensure!(answer == Some(json!({"host": "x"})), "unexpected answer {answer:?}");
    Ok(())
}

#[rstest]
#[case::missing(404)]
#[case::server_error(500)]
fn failed_listing_skips_the_source(#[case] status: u16) -> Result<()> {
    let agent = FakeConsul::new()
        .with_kv("hosts/app/db/host", "y")
        .with_kv("common/app/db/host", "x")
        .with_status("/v1/kv/hosts/app/db?recurse=1&keys=1", status);
    let answer = hash_lookup(&agent, "app::db", &["kv/hosts", "kv/common"])?;
    ensure!(answer == Some(json!({"host": "x"})), "unexpected answer {answer:?}");
    ensure!(!agent.was_requested("/v1/kv/hosts/app/db/host"), "skipped source was read");
    Ok(())
}

#[test]
fn non_kv_sources_are_never_fetched() -> Result<()> {
    let agent = FakeConsul::new()
        .with_catalog("catalog/service/app/db", json!([{"Node": "db01"}]))
        .with_kv("common/app/db/host", "x");
    let answer = hash_lookup(&agent, "app::db", &["catalog/service", "kv/common"])?;
    ensure!(answer == Some(json!({"host": "x"})), "unexpected answer {answer:?}");
    ensure!(!agent.was_requested("/v1/catalog"), "catalog endpoint was fetched");
    Ok(())
}

#[test]
fn scalar_under_key_skips_the_source() -> Result<()> {
    let agent = FakeConsul::new()
        .with_kv("hosts/app/db", "just-a-string")
        .with_kv("common/app/db/host", "x");
    let answer = hash_lookup(&agent, "app::db", &["kv/hosts", "kv/common"])?;
    ensure!(answer == Some(json!({"host": "x"})), "unexpected answer {answer:?}");

    let scalar_only = hash_lookup(&agent, "app::db", &["kv/hosts"])?;
    ensure!(scalar_only.is_none(), "expected absent, got {scalar_only:?}");
    Ok(())
}

#[test]
fn folder_markers_are_ignored() -> Result<()> {
    let agent = FakeConsul::new()
        .with_kv("common/app/db/", "")
        .with_kv("common/app/db/host", "x");
    let answer = hash_lookup(&agent, "app::db", &["kv/common"])?;
    ensure!(answer == Some(json!({"host": "x"})), "unexpected answer {answer:?}");
    ensure!(!agent.was_requested("/v1/kv/common/app/db/?raw=1"), "folder marker was fetched");
    Ok(())
}

#[test]
fn non_json_values_are_kept_verbatim() -> Result<()> {
    let agent = FakeConsul::new()
        .with_kv("common/app/motd", "welcome {user}")
        .with_kv("common/app/limits", r#"{"cpu": 2}"#);
    let answer = hash_lookup(&agent, "app", &["kv/common"])?;
    ensure!(
        answer == Some(json!({"motd": "welcome {user}", "limits": {"cpu": 2}})),
        "unexpected answer {answer:?}"
    );
    Ok(())
}

#[test]
fn sibling_prefix_matches_are_not_the_key() -> Result<()> {
    let agent = FakeConsul::new().with_kv("common/app/dbx/host", "x");
    let answer = hash_lookup(&agent, "app::db", &["kv/common"])?;
    ensure!(answer.is_none(), "expected absent, got {answer:?}");
    ensure!(
        agent.was_requested("/v1/kv/common/app/dbx/host?raw=1"),
        "listed sibling entry was not read"
    );
    Ok(())
}

#[test]
fn non_utf8_entries_abort_the_lookup() {
    let agent = FakeConsul::new()
        .with_kv("common/app/db/host", "x")
        .with_kv("common/app/db/cert", vec![0xff, 0xfe, 0x41]);
    let err = ConsulBackend::new(ConsulConfig::default(), &agent)
        .lookup("app::db", &[DataSource::new("kv/common")], ResolutionType::Hash)
        .expect_err("non UTF-8 entry must be fatal");
    assert!(
        matches!(&*err, LookupError::InvalidUtf8 { path, source }
            if path == "/v1/kv/common/app/db/cert" && source.as_bytes() == [0xff, 0xfe, 0x41]),
        "unexpected {err:?}"
    );
}
