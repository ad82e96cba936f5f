use replset_orchestrator::Error;
use replset_orchestrator::NodeRole;
use replset_orchestrator::NodeStartOptions;
use replset_orchestrator::OrchestratorState;
use replset_orchestrator::ShutdownOptions;
use replset_orchestrator::StartOptions;
use replset_orchestrator::StepDownOptions;
use serde_json::json;
use tracing::info;
use tracing_test::traced_test;

use crate::common::node_name;
use crate::common::three_node_set;
use crate::common::NODE_PORTS;

/// Healthy set -> no downed secondary -> shut one down -> bring it back
#[tokio::test]
#[traced_test]
async fn test_secondary_shutdown_and_restart() -> Result<(), Error> {
    let (cluster, mut orchestrator) = three_node_set()?;

    orchestrator.start(StartOptions::default()).await?;
    assert_eq!(orchestrator.state(), OrchestratorState::Ready);
    let ports: Vec<u16> = orchestrator.nodes().iter().map(|h| h.spec().address.port).collect();
    assert_eq!(ports, NODE_PORTS.to_vec());

    info!("Cluster ready. Nothing is down yet");
    match orchestrator
        .restart_server(NodeRole::Secondary, NodeStartOptions::default())
        .await
    {
        Err(Error::NoEligibleNode { role, connected }) => {
            assert_eq!(role, NodeRole::Secondary);
            assert_eq!(connected, 3);
        }
        other => panic!("expected NoEligibleNode, got {:?}", other),
    }

    info!("Shutting down a secondary");
    let victim = orchestrator
        .shutdown(NodeRole::Secondary, ShutdownOptions::signal(-15))
        .await?;
    assert_ne!(victim.name(), node_name(31000), "primary must not be chosen");
    assert!(!orchestrator.node(victim.ordinal).unwrap().is_connected());
    assert!(!cluster.is_connected(&victim.name()));
    assert_eq!(cluster.signals(&victim.name()), vec![-15]);
    assert_eq!(orchestrator.state(), OrchestratorState::Degraded);

    info!("Restarting the downed secondary");
    let revived = orchestrator
        .restart_server(NodeRole::Secondary, NodeStartOptions::default())
        .await?;
    assert_eq!(revived, victim);
    assert!(orchestrator.node(revived.ordinal).unwrap().is_connected());
    assert_eq!(cluster.role_of(&revived.name()), NodeRole::Secondary);
    assert_eq!(orchestrator.state(), OrchestratorState::Ready);

    orchestrator.stop().await?;
    assert!(logs_contain("replica set stopped"));
    Ok(())
}

#[tokio::test]
async fn test_shutdown_never_picks_the_primary() -> Result<(), Error> {
    let (cluster, mut orchestrator) = three_node_set()?;
    orchestrator.start(StartOptions::default()).await?;
    let primary = cluster.primary().expect("primary elected");

    for _ in 0..2 {
        let victim = orchestrator
            .shutdown(NodeRole::Secondary, ShutdownOptions::default())
            .await?;
        assert_ne!(victim.name(), primary);
    }

    assert!(matches!(
        orchestrator
            .shutdown(NodeRole::Secondary, ShutdownOptions::default())
            .await,
        Err(Error::NoEligibleNode { connected: 1, .. })
    ));
    assert!(cluster.is_connected(&primary));
    Ok(())
}

#[tokio::test]
async fn test_step_down_moves_the_primary() -> Result<(), Error> {
    let (cluster, mut orchestrator) = three_node_set()?;
    orchestrator.start(StartOptions::default()).await?;
    let before = cluster.primary().expect("primary elected");

    let reply = orchestrator.step_down(StepDownOptions::default()).await?;

    assert_eq!(reply["ok"], 1);
    let after = cluster.primary().expect("new primary elected");
    assert_ne!(before, after);
    Ok(())
}

#[tokio::test]
async fn test_step_down_rejection_is_surfaced_unchanged() -> Result<(), Error> {
    let (cluster, mut orchestrator) = three_node_set()?;
    orchestrator.start(StartOptions::default()).await?;

    let rejection = json!({
        "ok": 0,
        "errmsg": "No electable secondaries caught up as of 2024-01-01T00:00:00.000+0000",
        "code": 262,
        "codeName": "ExceededTimeLimit",
    });
    cluster.reject_step_down(rejection.clone());

    let result = orchestrator
        .step_down(StepDownOptions {
            avoid_election_for: Some(90),
            force: Some(false),
        })
        .await;

    match result {
        Err(Error::AdminCommand { reply, message, .. }) => {
            assert_eq!(reply, rejection);
            assert!(message.starts_with("No electable secondaries"));
        }
        other => panic!("expected AdminCommand, got {:?}", other),
    }
    assert_eq!(cluster.commands_named("replSetStepDown").len(), 1);
    assert_eq!(cluster.primary().as_deref(), Some("localhost:31000"));
    Ok(())
}
