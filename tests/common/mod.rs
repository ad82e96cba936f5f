use std::io::Write;
use std::sync::Arc;

use replset_orchestrator::testkit::SimulatedReplicaSet;
use replset_orchestrator::OrchestratorBuilder;
use replset_orchestrator::ReplicaSetOrchestrator;
use replset_orchestrator::Result;
use tempfile::NamedTempFile;

pub const NODE_PORTS: [u16; 3] = [31000, 31001, 31002];

pub fn node_name(port: u16) -> String {
    format!("localhost:{}", port)
}

/// Writes `contents` to a temporary TOML file that lives as long as the
/// returned handle.
pub fn config_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

/// Orchestrator loaded from `toml` and wired to a fresh simulated cluster
pub fn orchestrator_with(toml: &str) -> Result<(SimulatedReplicaSet, ReplicaSetOrchestrator)> {
    let file = config_file(toml);
    let path = file.path().to_str().expect("utf-8 temp path").to_string();

    let cluster = SimulatedReplicaSet::new();
    let orchestrator = OrchestratorBuilder::new(Some(&path))?
        .node_factory(Arc::new(cluster.clone()))
        .client_factory(Arc::new(cluster.clone()))
        .build()?;
    Ok((cluster, orchestrator))
}

/// One primary and two secondaries on ports 31000-31002
pub fn three_node_set() -> Result<(SimulatedReplicaSet, ReplicaSetOrchestrator)> {
    orchestrator_with(
        r#"
[replset]
name = "rs"
start_port = 31000
secondaries = 2
arbiters = 0

[convergence]
poll_interval_ms = 100
"#,
    )
}
