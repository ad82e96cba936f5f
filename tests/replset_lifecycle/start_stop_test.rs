use replset_orchestrator::Error;
use replset_orchestrator::NodeRole;
use replset_orchestrator::NodeStartOptions;
use replset_orchestrator::OrchestratorState;
use replset_orchestrator::StartOptions;

use crate::common::node_name;
use crate::common::orchestrator_with;
use crate::common::three_node_set;

#[tokio::test]
async fn test_config_file_shapes_the_set() -> Result<(), Error> {
    let (cluster, mut orchestrator) = orchestrator_with(
        r#"
[replset]
name = "shard0"
start_port = 32000
secondaries = 1
arbiters = 1
purge_on_start = false
"#,
    )?;

    orchestrator.start(StartOptions::default()).await?;

    assert_eq!(
        cluster.node_names(),
        vec![node_name(32000), node_name(32001), node_name(32002)]
    );
    assert_eq!(cluster.starts(&node_name(32000)), vec![NodeStartOptions::purge(false)]);
    assert_eq!(cluster.role_of(&node_name(32002)), NodeRole::Arbiter);

    let config = cluster.initiated_config().expect("initiated");
    assert_eq!(config["_id"], "shard0");
    assert_eq!(config["members"][2]["arbiterOnly"], true);
    Ok(())
}

#[tokio::test]
async fn test_stop_then_restart_whole_set() -> Result<(), Error> {
    let (cluster, mut orchestrator) = three_node_set()?;
    orchestrator.start(StartOptions::default()).await?;

    orchestrator.stop().await?;
    assert_eq!(orchestrator.state(), OrchestratorState::Stopped);
    assert!(cluster.node_names().iter().all(|n| !cluster.is_connected(n)));

    orchestrator.restart(NodeStartOptions::default()).await?;
    assert_eq!(orchestrator.state(), OrchestratorState::Ready);
    assert!(cluster.node_names().iter().all(|n| cluster.is_connected(n)));
    Ok(())
}

#[tokio::test]
async fn test_invalid_topology_is_rejected_at_build() {
    let result = orchestrator_with(
        r#"
[replset]
start_port = 65534
secondaries = 2
"#,
    );

    assert!(matches!(result, Err(Error::Configuration(_))));
}
