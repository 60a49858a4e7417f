//! Wait-for-ready loop used after creating a resource
//!
//! This is a deadline check between polls, not a cancellation mechanism: a
//! slow `instances` call is never interrupted.

use crate::remote::{InstanceStatus, RemoteCollection};
use std::thread;
use std::time::{Duration, Instant};

/// Default interval between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default maximum time to wait
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// How long and how often to poll for ready instances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Number of ready instances to wait for
    pub target: usize,
    pub interval: Duration,
    pub timeout: Duration,
}

impl WaitPolicy {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// How a wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready { ready: usize },
    TimedOut { ready: usize, target: usize },
}

/// Progress callback for the wait loop
///
/// Implement this trait to show a spinner or log polls.
pub trait ProgressCallback {
    /// Called after each poll with the current ready count
    fn on_poll(&mut self, ready: usize, target: usize, elapsed: Duration);

    /// Called once when the loop ends
    fn on_finish(&mut self, outcome: &WaitOutcome);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_poll(&mut self, _ready: usize, _target: usize, _elapsed: Duration) {}
    fn on_finish(&mut self, _outcome: &WaitOutcome) {}
}

/// Count instances that are ready
pub fn count_ready(instances: &[InstanceStatus]) -> usize {
    instances.iter().filter(|i| i.is_ready()).count()
}

/// Poll `collection.instances(id)` until `policy.target` are ready or the
/// deadline passes
pub fn wait_until_ready<C, P>(
    collection: &C,
    id: &str,
    policy: &WaitPolicy,
    progress: &mut P,
) -> Result<WaitOutcome, C::Error>
where
    C: RemoteCollection + ?Sized,
    P: ProgressCallback + ?Sized,
{
    let started = Instant::now();

    let outcome = loop {
        let instances = collection.instances(id)?;
        let ready = count_ready(&instances);
        let elapsed = started.elapsed();
        progress.on_poll(ready, policy.target, elapsed);
        log::debug!(
            "{} {id}: {ready}/{} instances ready after {}s",
            collection.kind(),
            policy.target,
            elapsed.as_secs()
        );

        if ready >= policy.target {
            break WaitOutcome::Ready { ready };
        }
        if elapsed + policy.interval > policy.timeout {
            break WaitOutcome::TimedOut {
                ready,
                target: policy.target,
            };
        }
        thread::sleep(policy.interval);
    };

    progress.on_finish(&outcome);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockCollection;

    fn ready_instance(n: usize) -> InstanceStatus {
        InstanceStatus {
            instance_id: Some(format!("i-{n}")),
            private_ip: Some(format!("10.0.0.{n}")),
            status: Some("fulfilled".into()),
        }
    }

    struct Recorder {
        polls: usize,
        finished: Option<WaitOutcome>,
    }

    impl ProgressCallback for Recorder {
        fn on_poll(&mut self, _ready: usize, _target: usize, _elapsed: Duration) {
            self.polls += 1;
        }
        fn on_finish(&mut self, outcome: &WaitOutcome) {
            self.finished = Some(*outcome);
        }
    }

    #[test]
    fn test_ready_on_first_poll() {
        let mock = MockCollection::new("elastigroup");
        mock.set_instances("sig-1", vec![ready_instance(1), ready_instance(2)]);

        let policy = WaitPolicy::new(2).with_interval(Duration::from_millis(1));
        let mut recorder = Recorder {
            polls: 0,
            finished: None,
        };
        let outcome = wait_until_ready(&mock, "sig-1", &policy, &mut recorder).unwrap();

        assert_eq!(outcome, WaitOutcome::Ready { ready: 2 });
        assert_eq!(recorder.polls, 1);
        assert_eq!(recorder.finished, Some(outcome));
    }

    #[test]
    fn test_times_out_when_never_ready() {
        let mock = MockCollection::new("elastigroup");
        mock.set_instances(
            "sig-1",
            vec![InstanceStatus {
                instance_id: Some("i-1".into()),
                private_ip: None,
                status: Some("pending-evaluation".into()),
            }],
        );

        let policy = WaitPolicy::new(1)
            .with_interval(Duration::from_millis(5))
            .with_timeout(Duration::from_millis(20));
        let outcome = wait_until_ready(&mock, "sig-1", &policy, &mut NoProgress).unwrap();

        assert_eq!(outcome, WaitOutcome::TimedOut { ready: 0, target: 1 });
    }

    #[test]
    fn test_zero_target_is_immediately_ready() {
        let mock = MockCollection::new("elastigroup");
        let policy = WaitPolicy::new(0);
        let outcome = wait_until_ready(&mock, "sig-1", &policy, &mut NoProgress).unwrap();
        assert_eq!(outcome, WaitOutcome::Ready { ready: 0 });
    }
}
