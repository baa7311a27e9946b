//! The state waiter: poll a refresh source until a target state is reached.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{Error, Result};

/// Declared state sets and timing for one convergence wait.
///
/// Constructed fresh for each asynchronous operation and consumed by the
/// waiter; nothing is shared between waits.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// States that mean "keep waiting".
    pub pending: Vec<String>,
    /// States that mean the operation completed.
    pub target: Vec<String>,
    /// States that mean the remote rejected the operation.
    pub error_states: Vec<String>,
    /// Delay between refresh calls.
    pub interval: Duration,
    /// Total deadline for the wait.
    pub timeout: Duration,
}

impl WaitConfig {
    /// Create a config from pending and target state sets.
    pub fn new<P, T>(pending: P, target: T) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            pending: pending.into_iter().map(Into::into).collect(),
            target: target.into_iter().map(Into::into).collect(),
            error_states: Vec::new(),
            interval: default_interval(),
            timeout: default_timeout(),
        }
    }

    /// Declare the error subset of terminal states.
    #[must_use]
    pub fn with_error_states<E>(mut self, states: E) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
    {
        self.error_states = states.into_iter().map(Into::into).collect();
        self
    }

    /// Set the delay between refresh calls.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the total deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

const fn default_interval() -> Duration {
    Duration::from_secs(10)
}

const fn default_timeout() -> Duration {
    Duration::from_secs(15 * 60)
}

/// What one refresh call observed: the raw item (if any) and its status.
#[derive(Debug, Clone)]
pub struct Observation<T> {
    /// The refreshed object, absent when the resource is gone.
    pub item: Option<T>,
    /// Status string classified against the declared state sets.
    pub state: String,
}

impl<T> Observation<T> {
    /// Create a new observation.
    pub fn new(item: Option<T>, state: impl Into<String>) -> Self {
        Self {
            item,
            state: state.into(),
        }
    }
}

/// A source of refreshed state for one remote resource.
///
/// Implementations translate domain-level "gone" conditions into synthetic
/// terminal states where that is the expected outcome (a deletion refresh
/// maps a 404 to `"DELETED"`) rather than letting the error propagate.
#[async_trait]
pub trait StateSource: Send {
    /// The refreshed object type.
    type Item: Send;

    /// Fetch the current remote state.
    async fn observe(&mut self) -> Result<Observation<Self::Item>>;
}

/// Handle that aborts an in-flight wait.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    /// Signal the waiter to stop. Idempotent.
    pub fn stop(&self) {
        let _ = self.tx.send(true);
    }
}

/// Drives one convergence wait to success, failure, or timeout.
///
/// The algorithm refreshes immediately, then sleeps `interval` between
/// refreshes while the state stays in the pending set. The sleep is raced
/// against the stop signal so a host-level shutdown aborts the wait
/// promptly instead of blocking until the next refresh.
#[derive(Debug)]
pub struct StateWaiter {
    config: WaitConfig,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
}

impl StateWaiter {
    /// Create a waiter with its own stop channel.
    pub fn new(config: WaitConfig) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            config,
            stop_tx,
            stop_rx,
        }
    }

    /// Replace the stop signal with an externally owned one.
    ///
    /// Handles from [`stop_handle`](Self::stop_handle) taken before this
    /// call no longer reach the waiter.
    #[must_use]
    pub fn with_stop_signal(mut self, stop_rx: watch::Receiver<bool>) -> Self {
        self.stop_rx = stop_rx;
        self
    }

    /// Get a handle that can abort this wait.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: self.stop_tx.clone(),
        }
    }

    /// Poll the source until it reaches a target state.
    ///
    /// Returns the last observation on success. Fails with
    /// [`Error::ErrorState`] when the error set is reached,
    /// [`Error::UnexpectedState`] for a state outside every declared set,
    /// [`Error::Timeout`] when the deadline passes while still pending, and
    /// [`Error::Stopped`] when aborted.
    pub async fn wait<S: StateSource>(mut self, source: &mut S) -> Result<Observation<S::Item>> {
        let started = Instant::now();
        let mut stop_armed = true;

        loop {
            if stop_armed && *self.stop_rx.borrow() {
                return Err(Error::Stopped);
            }

            let observation = source.observe().await?;
            let state = observation.state.clone();

            if self.config.error_states.iter().any(|s| *s == state) {
                return Err(Error::error_state(state));
            }

            if self.config.target.iter().any(|s| *s == state) {
                debug!(%state, "target state reached");
                return Ok(observation);
            }

            if !self.config.pending.iter().any(|s| *s == state) {
                return Err(Error::unexpected_state(state));
            }

            let waited = started.elapsed();
            if waited >= self.config.timeout {
                return Err(Error::timeout(state, waited));
            }

            // Never sleep past the deadline.
            let nap = self.config.interval.min(self.config.timeout.saturating_sub(waited));
            debug!(%state, nap_ms = nap.as_millis() as u64, "still pending");

            tokio::select! {
                () = tokio::time::sleep(nap) => {}
                changed = self.stop_rx.changed(), if stop_armed => {
                    match changed {
                        Ok(()) if *self.stop_rx.borrow() => return Err(Error::Stopped),
                        Ok(()) => {}
                        // Sender gone: the signal can never fire again.
                        Err(_) => stop_armed = false,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source that plays back a scripted sequence of states.
    struct Script {
        states: Vec<&'static str>,
        calls: usize,
    }

    impl Script {
        fn new(states: &[&'static str]) -> Self {
            Self {
                states: states.to_vec(),
                calls: 0,
            }
        }
    }

    #[async_trait]
    impl StateSource for Script {
        type Item = serde_json::Value;

        async fn observe(&mut self) -> Result<Observation<Self::Item>> {
            let state = self
                .states
                .get(self.calls)
                .or_else(|| self.states.last())
                .copied()
                .ok_or_else(|| Error::refresh("script is empty"))?;
            self.calls += 1;
            let item = (state != "DELETED").then(|| serde_json::json!({"status": state}));
            Ok(Observation::new(item, state))
        }
    }

    fn fast_config(pending: &[&str], target: &[&str]) -> WaitConfig {
        WaitConfig::new(pending.iter().copied(), target.iter().copied())
            .with_error_states(["ERROR"])
            .with_interval(Duration::from_millis(5))
            .with_timeout(Duration::from_millis(500))
    }

    #[tokio::test]
    async fn test_reaches_target_after_pending() -> std::result::Result<(), Error> {
        let mut source = Script::new(&["BUILD", "BUILD", "ACTIVE"]);
        let waiter = StateWaiter::new(fast_config(&["BUILD"], &["ACTIVE", "DOWN"]));

        let observation = waiter.wait(&mut source).await?;
        assert_eq!(observation.state, "ACTIVE");
        assert_eq!(source.calls, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_target_on_first_refresh_skips_sleep() -> std::result::Result<(), Error> {
        let mut source = Script::new(&["ACTIVE"]);
        let waiter = StateWaiter::new(fast_config(&["BUILD"], &["ACTIVE"]));

        let observation = waiter.wait(&mut source).await?;
        assert_eq!(observation.state, "ACTIVE");
        assert_eq!(source.calls, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_stuck_pending_times_out_with_last_state() {
        let mut source = Script::new(&["BUILD"]);
        let config = fast_config(&["BUILD"], &["ACTIVE"]).with_timeout(Duration::from_millis(30));
        let waiter = StateWaiter::new(config);

        let result = waiter.wait(&mut source).await;
        assert!(matches!(result, Err(Error::Timeout { last_state, .. }) if last_state == "BUILD"));
    }

    #[tokio::test]
    async fn test_error_state_is_not_success() {
        let mut source = Script::new(&["BUILD", "ERROR"]);
        let waiter = StateWaiter::new(fast_config(&["BUILD"], &["ACTIVE"]));

        let err = waiter.wait(&mut source).await.err();
        assert!(err.as_ref().is_some_and(Error::is_error_state));
        assert!(!err.as_ref().is_some_and(Error::is_timeout));
    }

    #[tokio::test]
    async fn test_unexpected_state_fails_fast() {
        let mut source = Script::new(&["REORGANIZING"]);
        let waiter = StateWaiter::new(fast_config(&["BUILD"], &["ACTIVE"]));

        let result = waiter.wait(&mut source).await;
        assert!(matches!(result, Err(Error::UnexpectedState { state }) if state == "REORGANIZING"));
    }

    #[tokio::test]
    async fn test_synthetic_deleted_state_reaches_target() -> std::result::Result<(), Error> {
        let mut source = Script::new(&["DELETING", "DELETED"]);
        let waiter = StateWaiter::new(fast_config(&["DELETING"], &["DELETED"]));

        let observation = waiter.wait(&mut source).await?;
        assert_eq!(observation.state, "DELETED");
        assert!(observation.item.is_none());
        assert_eq!(source.calls, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_stop_handle_aborts_promptly() {
        let mut source = Script::new(&["BUILD"]);
        let config = WaitConfig::new(["BUILD"], ["ACTIVE"])
            .with_interval(Duration::from_secs(30))
            .with_timeout(Duration::from_secs(300));
        let waiter = StateWaiter::new(config);
        let handle = waiter.stop_handle();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.stop();
        });

        let started = std::time::Instant::now();
        let result = waiter.wait(&mut source).await;
        assert!(matches!(result, Err(Error::Stopped)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_external_stop_signal() {
        let mut source = Script::new(&["BUILD"]);
        let (tx, rx) = watch::channel(false);
        let config = WaitConfig::new(["BUILD"], ["ACTIVE"])
            .with_interval(Duration::from_secs(30))
            .with_timeout(Duration::from_secs(300));
        let waiter = StateWaiter::new(config).with_stop_signal(rx);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let _ = tx.send(true);
        });

        let result = waiter.wait(&mut source).await;
        assert!(matches!(result, Err(Error::Stopped)));
    }
}
