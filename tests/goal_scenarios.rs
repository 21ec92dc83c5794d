// tests/goal_scenarios.rs

mod common;
use crate::common::builders::ServerConfigBuilder;
use crate::common::{init_tracing, with_timeout, RecordingFeedbackSink};

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use goalslot::engine::{GoalRequest, GoalServer};
use goalslot::exec::{ActionExecutor, GoalPolicy, SingleGoalPolicy};
use goalslot::goal::{FeedbackSink, GoalHandle};
use goalslot::types::{Feedback, GoalId, GoalStatus};

type TestResult = Result<(), Box<dyn Error>>;

/// Sink that requests cancellation of its goal when the `n`-th update is
/// published, before the executor reaches its next suspension point.
struct CancelAfter {
    n: usize,
    seen: AtomicUsize,
    target: OnceLock<GoalHandle>,
    log: Mutex<Vec<Vec<u64>>>,
}

impl CancelAfter {
    fn new(n: usize) -> Self {
        Self {
            n,
            seen: AtomicUsize::new(0),
            target: OnceLock::new(),
            log: Mutex::new(Vec::new()),
        }
    }
}

impl FeedbackSink for CancelAfter {
    fn send(&self, feedback: Feedback) {
        self.log.lock().unwrap().push(feedback.sequence);
        if self.seen.fetch_add(1, Ordering::SeqCst) + 1 == self.n {
            if let Some(handle) = self.target.get() {
                handle.request_cancel();
            }
        }
    }
}

fn server_with(sink: RecordingFeedbackSink, step: Duration) -> GoalServer {
    let config = ServerConfigBuilder::new().step_interval(step).build();
    GoalServer::from_config(&config, Arc::new(sink))
}

#[tokio::test]
async fn order_six_succeeds_with_known_sequence() -> TestResult {
    init_tracing();

    let sink = RecordingFeedbackSink::new();
    let server = server_with(sink.clone(), Duration::ZERO);

    let goal = server.submit(GoalRequest { order: 6 })?;
    let id = goal.handle.id();
    let outcome = with_timeout(goal.completion.wait()).await?;

    assert_eq!(outcome.status, GoalStatus::Succeeded);
    assert_eq!(outcome.sequence, vec![0, 1, 1, 2, 3, 5]);
    assert_eq!(
        sink.for_goal(id),
        vec![
            vec![0, 1, 1],
            vec![0, 1, 1, 2],
            vec![0, 1, 1, 2, 3],
            vec![0, 1, 1, 2, 3, 5],
        ]
    );
    assert!(server.active_goals().is_empty());
    Ok(())
}

#[tokio::test]
async fn order_five_stops_at_five_elements() -> TestResult {
    init_tracing();

    let server = server_with(RecordingFeedbackSink::new(), Duration::ZERO);

    let goal = server.submit(GoalRequest { order: 5 })?;
    let outcome = with_timeout(goal.completion.wait()).await?;

    assert_eq!(outcome.status, GoalStatus::Succeeded);
    assert_eq!(outcome.sequence, vec![0, 1, 1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn cancel_after_three_steps_keeps_partial_prefix() -> TestResult {
    init_tracing();

    let sink = Arc::new(CancelAfter::new(3));
    let policy = SingleGoalPolicy::new(ActionExecutor::new(Duration::from_millis(5)));
    let (handle, completion) = GoalHandle::new(GoalId::new(1), 10, sink.clone());
    sink.target
        .set(handle.clone())
        .map_err(|_| "target already set")?;

    policy.admit(&handle);
    let outcome = with_timeout(policy.execute(handle)).await;

    assert_eq!(outcome.status, GoalStatus::Cancelled);
    assert!(outcome.sequence.len() <= 5);
    assert_eq!(outcome.sequence, vec![0, 1, 1, 2, 3]);

    // No growth after the cancellation was observed.
    let log = sink.log.lock().unwrap().clone();
    assert_eq!(log.len(), 3);
    assert_eq!(log.last(), Some(&outcome.sequence));

    assert_eq!(with_timeout(completion.wait()).await?, outcome);
    assert!(policy.active_goals().is_empty());
    Ok(())
}

#[tokio::test]
async fn new_goal_preempts_running_goal() -> TestResult {
    init_tracing();

    let sink = RecordingFeedbackSink::new();
    let server = server_with(sink.clone(), Duration::from_millis(20));

    let a = server.submit(GoalRequest { order: 10 })?;
    let a_id = a.handle.id();
    with_timeout(sink.wait_for_count(a_id, 1)).await;

    let b = server.submit(GoalRequest { order: 3 })?;
    assert_eq!(server.active_goals(), vec![b.handle.id()]);
    assert!(a.handle.is_cancel_requested());

    let a_outcome = with_timeout(a.completion.wait()).await?;
    let b_outcome = with_timeout(b.completion.wait()).await?;

    assert_eq!(a_outcome.status, GoalStatus::Cancelled);
    assert!(a_outcome.sequence.len() < 10);
    assert_eq!(b_outcome.status, GoalStatus::Succeeded);
    assert_eq!(b_outcome.sequence, vec![0, 1, 1]);

    assert!(server.active_goals().is_empty());
    Ok(())
}

#[tokio::test]
async fn preempted_goal_never_reports_success() -> TestResult {
    init_tracing();

    for _ in 0..20 {
        let server = server_with(RecordingFeedbackSink::new(), Duration::from_millis(1));

        let a = server.submit(GoalRequest { order: 4 })?;
        tokio::task::yield_now().await;
        let b = server.submit(GoalRequest { order: 2 })?;

        let a_outcome = with_timeout(a.completion.wait()).await?;
        // A is only allowed to have succeeded if it had already released the
        // slot when B was admitted, in which case B found an empty slot and
        // A's flag stayed clear.
        if a_outcome.status == GoalStatus::Succeeded {
            assert!(!a.handle.is_cancel_requested());
        } else {
            assert_eq!(a_outcome.status, GoalStatus::Cancelled);
        }
        assert_eq!(
            with_timeout(b.completion.wait()).await?.status,
            GoalStatus::Succeeded
        );
    }
    Ok(())
}

#[tokio::test]
async fn overflowing_goal_fails_without_affecting_the_server() -> TestResult {
    init_tracing();

    let server = server_with(RecordingFeedbackSink::new(), Duration::ZERO);

    let doomed = server.submit(GoalRequest { order: 120 })?;
    let outcome = with_timeout(doomed.completion.wait()).await?;
    assert_eq!(outcome.status, GoalStatus::Failed);
    assert_eq!(outcome.sequence.len(), 94);
    assert!(outcome.error.is_some());
    assert!(server.active_goals().is_empty());

    let next = server.submit(GoalRequest { order: 4 })?;
    let outcome = with_timeout(next.completion.wait()).await?;
    assert_eq!(outcome.status, GoalStatus::Succeeded);
    Ok(())
}

#[tokio::test]
async fn cancel_twice_behaves_like_once() -> TestResult {
    init_tracing();

    let server = server_with(RecordingFeedbackSink::new(), Duration::from_secs(60));
    let goal = server.submit(GoalRequest { order: 30 })?;

    server.cancel(&goal.handle);
    server.cancel(&goal.handle);

    let outcome = with_timeout(goal.completion.wait()).await?;
    assert_eq!(outcome.status, GoalStatus::Cancelled);
    assert_eq!(goal.handle.result(), Some(outcome));
    Ok(())
}
