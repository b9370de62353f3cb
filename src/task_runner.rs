/// Interval Task Runner with Failure-Streak Tracking
///
/// Drives a recurring task on a fixed cadence. Runs are strictly serialized:
/// the next tick is not awaited until the current run returns, and an
/// overrunning run delays the schedule instead of overlapping it.
///
/// Failures are expected to be transient (the storage backend coming and
/// going); the runner never gives up, it tracks the failure streak and
/// escalates log severity once the streak passes the configured threshold.

use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, warn};

/// Runner policy for a recurring task
#[derive(Debug, Clone)]
pub struct TaskPolicy {
    /// Consecutive failures after which failures log at error level
    pub escalate_after: u32,
}

impl Default for TaskPolicy {
    fn default() -> Self {
        Self { escalate_after: 3 }
    }
}

/// Consecutive-failure tracker
#[derive(Debug, Default)]
pub struct FailureStreak {
    consecutive_failures: u32,
}

impl FailureStreak {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed run, returning the current streak length.
    pub fn record_failure(&mut self) -> u32 {
        self.consecutive_failures += 1;
        self.consecutive_failures
    }

    /// Record a successful run, returning the streak it ended.
    pub fn reset(&mut self) -> u32 {
        std::mem::take(&mut self.consecutive_failures)
    }

    pub fn current(&self) -> u32 {
        self.consecutive_failures
    }
}

/// Run a recurring task on a fixed interval.
///
/// The first run happens immediately. A failed run is logged and the task
/// retries naturally on its next tick; this function only returns if the
/// surrounding task is aborted.
///
/// # Arguments
/// * `task_name` - Name of the task for logging purposes
/// * `period` - Interval between run starts (serialized, never overlapped)
/// * `policy` - Failure-streak policy
/// * `task_fn` - Async function that executes one run of the task
pub async fn run_at_interval<F, Fut>(
    task_name: &str,
    period: Duration,
    policy: TaskPolicy,
    mut task_fn: F,
) where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<(), String>>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut streak = FailureStreak::new();

    loop {
        ticker.tick().await;

        match task_fn().await {
            Ok(()) => {
                let ended = streak.reset();
                if ended > 0 {
                    warn!("Task '{}' recovered after {} failures", task_name, ended);
                }
            }
            Err(e) => {
                let failures = streak.record_failure();
                if failures >= policy.escalate_after {
                    error!(
                        "Task '{}' failing repeatedly ({} in a row): {}",
                        task_name, failures, e
                    );
                } else {
                    warn!("Task '{}' failed ({} in a row): {}", task_name, failures, e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_failure_streak_counts_and_resets() {
        let mut streak = FailureStreak::new();
        assert_eq!(streak.record_failure(), 1);
        assert_eq!(streak.record_failure(), 2);
        assert_eq!(streak.current(), 2);
        assert_eq!(streak.reset(), 2);
        assert_eq!(streak.current(), 0);
        assert_eq!(streak.reset(), 0);
    }

    #[tokio::test]
    async fn test_runner_keeps_running_through_failures() {
        let attempt_count = Arc::new(AtomicUsize::new(0));
        let attempt_count_clone = attempt_count.clone();

        let handle = tokio::spawn(async move {
            run_at_interval(
                "test_task",
                Duration::from_millis(10),
                TaskPolicy::default(),
                move || {
                    let count = attempt_count_clone.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if count % 2 == 0 {
                            Err("Simulated failure".to_string())
                        } else {
                            Ok(())
                        }
                    }
                },
            )
            .await;
        });

        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.abort();

        // Failures must not stop the schedule
        assert!(attempt_count.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test]
    async fn test_runner_first_run_is_immediate() {
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = ran.clone();

        let handle = tokio::spawn(async move {
            run_at_interval(
                "eager_task",
                Duration::from_secs(3600),
                TaskPolicy::default(),
                move || {
                    ran_clone.fetch_add(1, Ordering::SeqCst);
                    async { Ok(()) }
                },
            )
            .await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
