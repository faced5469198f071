use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use super::fixtures::{MockBeacon, MockFrames, MockOracle, operator};
use crate::oracle::RequestInterface;

type TestOperator = crate::operator::Operator<MockBeacon, MockFrames, MockOracle>;

type Spawned = (
    Arc<TestOperator>,
    CancellationToken,
    tokio::task::JoinHandle<()>,
);

fn spawn(oracle: MockOracle) -> Spawned {
    spawn_with(MockFrames::new(1000, 1300), oracle)
}

fn spawn_with(frames: MockFrames, oracle: MockOracle) -> Spawned {
    let beacon = MockBeacon::new(1050).with_canonical(900..=1400);
    let operator = Arc::new(operator(beacon, frames, oracle));
    let token = CancellationToken::new();

    let handle = tokio::spawn({
        let operator = operator.clone();
        let token = token.clone();
        async move { operator.run(token).await }
    });
    (operator, token, handle)
}

#[tokio::test(start_paused = true)]
async fn test_loop_sleeps_until_next_frame() {
    let (operator, token, handle) = spawn(MockOracle::new(RequestInterface::BlockRoot));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(operator.oracle().attempts().len(), 1);
    assert_eq!(operator.oracle().status_reads(), 1);

    // (1320 - 1050) slots * 12s = 3240s until the next cycle.
    tokio::time::sleep(Duration::from_secs(3000)).await;
    assert_eq!(operator.oracle().status_reads(), 1);

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(operator.oracle().status_reads(), 2);
    assert_eq!(operator.oracle().attempts().len(), 1);

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_loop_retries_failed_submission() {
    let oracle = MockOracle::new(RequestInterface::BlockRoot).with_failing_submissions(1);
    let (operator, token, handle) = spawn(oracle);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(operator.oracle().attempts().len(), 1);
    assert!(!operator.oracle().status(1000).requested);

    tokio::time::sleep(Duration::from_secs(3300)).await;
    assert_eq!(operator.oracle().attempts().len(), 2);
    assert!(operator.oracle().status(1000).requested);

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_frame_waits_max_interval() {
    let frames = MockFrames::new(1000, 1300);
    frames.set_failing(true);
    let (operator, token, handle) =
        spawn_with(frames, MockOracle::new(RequestInterface::BlockRoot));

    // One read for the cycle, one for scheduling.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(operator.frames().reads(), 2);
    assert_eq!(operator.oracle().status_reads(), 0);

    operator.frames().set_failing(false);
    tokio::time::sleep(Duration::from_secs(3598)).await;
    assert_eq!(operator.frames().reads(), 2);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(operator.frames().reads(), 4);
    assert_eq!(operator.oracle().attempts().len(), 1);

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_cancel_interrupts_sleep() {
    let (operator, token, handle) = spawn(MockOracle::new(RequestInterface::BlockRoot));

    tokio::time::sleep(Duration::from_secs(1)).await;
    token.cancel();

    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("loop did not stop")
        .unwrap();
    assert_eq!(operator.oracle().status_reads(), 1);
}

#[tokio::test]
async fn test_cancelled_before_start_runs_nothing() {
    let frames = MockFrames::new(1000, 1300);
    let operator = operator(
        MockBeacon::new(1050),
        frames,
        MockOracle::new(RequestInterface::BlockRoot),
    );
    let token = CancellationToken::new();
    token.cancel();

    operator.run(token).await;

    assert_eq!(operator.frames().reads(), 0);
    assert_eq!(operator.oracle().status_reads(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_loop_survives_non_retryable_errors() {
    let (operator, token, handle) =
        spawn(MockOracle::new(RequestInterface::BlockRoot).with_wrong_chain());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(operator.oracle().attempts().len(), 1);
    assert!(!handle.is_finished());

    tokio::time::sleep(Duration::from_secs(3300)).await;
    assert_eq!(operator.oracle().attempts().len(), 2);

    token.cancel();
    handle.await.unwrap();
}
