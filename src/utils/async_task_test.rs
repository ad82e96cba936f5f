use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::async_task::join_all_best_effort;
use super::async_task::join_all_or_first_error;
use crate::Error;
use crate::Result;

fn failing(node: &str) -> Error {
    Error::ProcessStart {
        node: node.to_string(),
        reason: "boom".to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn first_error_waits_for_every_task() {
    let finished = Arc::new(AtomicU32::new(0));

    let tasks = (0..3u64).map(|i| {
        let finished = finished.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(10 * (3 - i))).await;
            finished.fetch_add(1, Ordering::SeqCst);
            if i == 0 {
                Err(failing("localhost:31000"))
            } else {
                Ok(())
            }
        }
    });

    let result = join_all_or_first_error(tasks).await;

    assert!(matches!(result, Err(Error::ProcessStart { ref node, .. }) if node == "localhost:31000"));
    assert_eq!(finished.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn first_error_reports_input_order() {
    let tasks = ["localhost:31000", "localhost:31001", "localhost:31002"]
        .into_iter()
        .map(|node| async move {
            if node == "localhost:31000" {
                Ok(())
            } else {
                Err(failing(node))
            }
        });

    match join_all_or_first_error(tasks).await {
        Err(Error::ProcessStart { node, .. }) => assert_eq!(node, "localhost:31001"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn best_effort_collects_every_failure() {
    let tasks = (0..4).map(|i| async move {
        if i % 2 == 0 {
            Err(failing(&format!("localhost:{}", 31000 + i)))
        } else {
            Ok(())
        }
    });

    match join_all_best_effort("stop", tasks).await {
        Err(Error::PartialFailure { operation, failures }) => {
            assert_eq!(operation, "stop");
            assert_eq!(failures.len(), 2);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn empty_batches_succeed() {
    let none: Vec<std::future::Ready<Result<()>>> = Vec::new();
    assert!(join_all_or_first_error(none).await.is_ok());

    let none: Vec<std::future::Ready<Result<()>>> = Vec::new();
    assert!(join_all_best_effort("restart", none).await.is_ok());
}
