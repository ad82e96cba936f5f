use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing_test::traced_test;

use super::*;
use crate::Document;
use crate::Error;
use crate::MockClusterClient;
use crate::TransportError;

const ACCEPTED: [i32; 3] = [1, 2, 7];

fn status(states: &[i32]) -> Document {
    let members: Vec<Document> = states
        .iter()
        .enumerate()
        .map(|(i, s)| json!({ "_id": i, "name": format!("localhost:{}", 31000 + i), "state": s }))
        .collect();
    json!({ "ok": 1, "set": "rs", "members": members })
}

fn transient_error() -> Error {
    TransportError::CommandFailed {
        command: "replSetGetStatus".into(),
        address: "localhost:31000".into(),
        reason: "connection reset".into(),
    }
    .into()
}

fn poller(interval: Duration) -> ConvergencePoller {
    ConvergencePoller::new(Arc::new(FixedBackoff::new(interval)), ACCEPTED.to_vec())
}

/// Counts calls and remembers every delay it handed out
#[derive(Default)]
struct CountingBackoff {
    calls: AtomicU64,
}

impl Backoff for CountingBackoff {
    fn delay(
        &self,
        _attempt: u64,
    ) -> Duration {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Duration::from_millis(10)
    }
}

#[tokio::test(start_paused = true)]
#[traced_test]
async fn converges_after_transient_failures_and_stops_querying() {
    let mut client = MockClusterClient::new();
    let mut calls = 0;
    client.expect_command().times(4).returning(move |_, _, _| {
        calls += 1;
        match calls {
            1 => Err(transient_error()),
            2 => Ok(json!({ "ok": 0, "errmsg": "no replset config has been received" })),
            3 => Ok(status(&[1, 5, 0])),
            _ => Ok(status(&[1, 2, 2])),
        }
    });
    client.expect_close().times(1).returning(|| ());

    let started = Instant::now();
    let report = poller(Duration::from_secs(1)).wait(&mut client).await.expect("should converge");

    assert_eq!(report.attempts, 4);
    assert_eq!(report.snapshot.members.len(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert!(logs_contain("waiting for replica set to converge"));
    assert!(logs_contain("replica set is up"));
}

#[tokio::test(start_paused = true)]
async fn persistent_transport_error_retries_until_cancelled_externally() {
    let queries = Arc::new(AtomicU64::new(0));
    let counter = queries.clone();

    let mut client = MockClusterClient::new();
    client.expect_command().returning(move |_, _, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(transient_error())
    });
    client.expect_close().times(0);

    let poller = poller(Duration::from_secs(1));
    let outcome = tokio::time::timeout(Duration::from_millis(10_500), poller.wait(&mut client)).await;

    assert!(outcome.is_err(), "poller must never give up on its own");
    // one query at t=0 and one after each full second
    assert_eq!(queries.load(Ordering::SeqCst), 11);
}

#[tokio::test(start_paused = true)]
async fn closed_connection_fails_without_retry() {
    let mut client = MockClusterClient::new();
    client.expect_command().times(1).returning(|_, _, _| {
        Err(TransportError::Closed {
            address: "localhost:31000".into(),
        }
        .into())
    });
    client.expect_close().times(0);

    let result = poller(Duration::from_secs(1)).wait(&mut client).await;

    assert!(matches!(result, Err(Error::Transport(TransportError::Closed { .. }))));
}

#[tokio::test(start_paused = true)]
async fn malformed_status_is_treated_as_not_ready() {
    let mut client = MockClusterClient::new();
    let mut calls = 0;
    client.expect_command().times(2).returning(move |_, _, _| {
        calls += 1;
        if calls == 1 {
            Ok(json!({ "ok": 1, "members": "not-a-list" }))
        } else {
            Ok(status(&[1, 7]))
        }
    });
    client.expect_close().times(1).returning(|| ());

    let report = poller(Duration::from_secs(1)).wait(&mut client).await.unwrap();
    assert_eq!(report.attempts, 2);
}

#[tokio::test(start_paused = true)]
async fn cancellation_token_ends_the_wait() {
    let mut client = MockClusterClient::new();
    client.expect_command().returning(|_, _, _| Ok(status(&[1, 0, 0])));
    client.expect_close().times(0);

    let token = CancellationToken::new();
    let poller = poller(Duration::from_secs(1)).with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        token.cancel();
    });

    let result = poller.wait(&mut client).await;
    canceller.await.unwrap();

    match result {
        Err(Error::Cancelled { attempts }) => assert_eq!(attempts, 3),
        other => panic!("expected Cancelled, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn injected_backoff_is_consulted_once_per_failed_attempt() {
    let backoff = Arc::new(CountingBackoff::default());
    let mut client = MockClusterClient::new();
    let mut calls = 0;
    client.expect_command().times(3).returning(move |_, _, _| {
        calls += 1;
        if calls < 3 {
            Ok(status(&[1, 3]))
        } else {
            Ok(status(&[1, 2]))
        }
    });
    client.expect_close().times(1).returning(|| ());

    let poller = ConvergencePoller::new(backoff.clone(), ACCEPTED.to_vec());
    poller.wait(&mut client).await.unwrap();

    assert_eq!(backoff.calls.load(Ordering::SeqCst), 2);
}
