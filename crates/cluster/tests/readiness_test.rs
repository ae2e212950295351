//! Readiness polling against a scripted tool.

mod common;

use std::time::Duration;

use ccm_cluster::{Error, ExhaustionPolicy, Readiness, ReadinessPolicy, UpPoller};
use common::{ScriptedRunner, failure, pending_log, ready_log};

const SHOWLOG: &str = "node1 showlog";

fn assert_spaced(runner: &ScriptedRunner, at_least: Duration) {
    let times = runner.call_times(SHOWLOG);
    for pair in times.windows(2) {
        assert!(
            pair[1] - pair[0] >= at_least,
            "polls only {:?} apart",
            pair[1] - pair[0]
        );
    }
}

#[tokio::test]
async fn test_ready_on_first_attempt() {
    let runner = ScriptedRunner::new().reply(SHOWLOG, ready_log());
    let poller = UpPoller::new(&ReadinessPolicy::default()).unwrap();

    let readiness = poller.poll(&runner).await.unwrap();

    assert_eq!(readiness, Readiness::Satisfied { attempts: 1 });
    assert_eq!(runner.count(SHOWLOG), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stops_polling_once_satisfied() {
    // Replies after the marker would be ignored if polling went on.
    let runner = ScriptedRunner::new()
        .reply_times(SHOWLOG, 3, pending_log)
        .reply_times(SHOWLOG, 5, ready_log);
    let poller = UpPoller::new(&ReadinessPolicy::default()).unwrap();

    let readiness = poller.poll(&runner).await.unwrap();

    assert_eq!(readiness, Readiness::Satisfied { attempts: 4 });
    assert_eq!(runner.count(SHOWLOG), 4);
    assert_spaced(&runner, Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_reports_ready_by_default() {
    // The marker never shows up, yet the default policy reports the cluster
    // as up. Callers that need a hard failure opt into ExhaustionPolicy::Fail.
    let runner = ScriptedRunner::new().reply_times(SHOWLOG, 20, pending_log);
    let poller = UpPoller::new(&ReadinessPolicy::default()).unwrap();

    let readiness = poller.poll(&runner).await.unwrap();

    assert_eq!(readiness, Readiness::Exhausted { attempts: 10 });
    assert!(!readiness.is_satisfied());
    assert_eq!(runner.count(SHOWLOG), 10);
    assert_spaced(&runner, Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_fails_when_configured() {
    let runner = ScriptedRunner::new();
    let policy = ReadinessPolicy {
        on_exhaustion: ExhaustionPolicy::Fail,
        ..ReadinessPolicy::default()
    };
    let poller = UpPoller::new(&policy).unwrap();

    let err = poller.poll(&runner).await.unwrap_err();

    assert!(matches!(err, Error::ReadinessExhausted { attempts: 10 }));
    assert_eq!(runner.count(SHOWLOG), 10);
}

#[tokio::test(start_paused = true)]
async fn test_poll_session_takes_nine_intervals() {
    let runner = ScriptedRunner::new();
    let poller = UpPoller::new(&ReadinessPolicy::default()).unwrap();
    let started = tokio::time::Instant::now();

    let _ = poller.poll(&runner).await.unwrap();

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(9) && elapsed < Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_tool_failure_is_not_retried() {
    let runner = ScriptedRunner::new()
        .reply(SHOWLOG, pending_log())
        .reply(SHOWLOG, failure(1, "Cannot find node node1"))
        .reply(SHOWLOG, ready_log());
    let poller = UpPoller::new(&ReadinessPolicy::default()).unwrap();

    let err = poller.poll(&runner).await.unwrap_err();

    assert!(err.to_string().contains("Cannot find node node1"));
    assert_eq!(runner.count(SHOWLOG), 2);
}

#[tokio::test(start_paused = true)]
async fn test_custom_budget_and_interval() {
    let runner = ScriptedRunner::new();
    let policy = ReadinessPolicy {
        max_attempts: 3,
        interval: Duration::from_millis(250),
        ..ReadinessPolicy::default()
    };
    let poller = UpPoller::new(&policy).unwrap();

    let readiness = poller.poll(&runner).await.unwrap();

    assert_eq!(readiness.attempts(), 3);
    assert_spaced(&runner, Duration::from_millis(250));
}

#[tokio::test]
async fn test_zero_budget_polls_once() {
    let runner = ScriptedRunner::new();
    let policy = ReadinessPolicy {
        max_attempts: 0,
        ..ReadinessPolicy::default()
    };
    let poller = UpPoller::new(&policy).unwrap();

    let readiness = poller.poll(&runner).await.unwrap();

    assert_eq!(readiness, Readiness::Exhausted { attempts: 1 });
    assert_eq!(runner.count(SHOWLOG), 1);
}
