//! # Conference Central Runtime
//!
//! Executes the effects returned by reducers once the surrounding store
//! transaction has committed, plus the retry and metrics plumbing the
//! service layer shares.
//!
//! Effects run fire-and-forget on the Tokio runtime. The executor counts
//! in-flight effects so graceful shutdown can wait for them to drain.
//!
//! # Example
//!
//! ```ignore
//! use conference_runtime::EffectExecutor;
//!
//! let executor = EffectExecutor::<RegistrationAction>::new();
//! let (outcome, effects) = RegistrationReducer.transition(&mut state, action, &env);
//! // ... commit state ...
//! executor.execute_all(effects);
//! ```

use conference_core::effect::Effect;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, mpsc};

pub mod metrics;
pub mod retry;

pub use retry::{RetryPolicy, RetryPolicyBuilder, retry_transaction};

/// Decrements the pending counter when an effect task finishes, even if it
/// panicked.
struct PendingGuard {
    pending: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Spawns reducer effects and tracks how many are still running.
///
/// Actions produced by `Effect::Future` are forwarded to the feedback channel
/// when one is attached, and dropped otherwise.
pub struct EffectExecutor<A> {
    pending: Arc<AtomicUsize>,
    idle: Arc<Notify>,
    feedback: Option<mpsc::UnboundedSender<A>>,
}

impl<A> Clone for EffectExecutor<A> {
    fn clone(&self) -> Self {
        Self {
            pending: Arc::clone(&self.pending),
            idle: Arc::clone(&self.idle),
            feedback: self.feedback.clone(),
        }
    }
}

impl<A> Default for EffectExecutor<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for EffectExecutor<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectExecutor")
            .field("pending", &self.pending())
            .field("feedback", &self.feedback.is_some())
            .finish()
    }
}

impl<A> EffectExecutor<A> {
    /// Executor without a feedback channel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Arc::new(AtomicUsize::new(0)),
            idle: Arc::new(Notify::new()),
            feedback: None,
        }
    }

    /// Executor that forwards produced actions to `feedback`.
    #[must_use]
    pub fn with_feedback(feedback: mpsc::UnboundedSender<A>) -> Self {
        Self {
            feedback: Some(feedback),
            ..Self::new()
        }
    }

    /// Number of effect tasks still running.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Wait until no effects are running, or `timeout` elapses.
    ///
    /// Returns `true` if the executor drained in time.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            loop {
                let notified = self.idle.notified();
                if self.pending() == 0 {
                    return;
                }
                notified.await;
            }
        })
        .await
        .is_ok()
    }
}

impl<A: Send + 'static> EffectExecutor<A> {
    /// Spawn every effect in `effects`.
    pub fn execute_all<I>(&self, effects: I)
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        for effect in effects {
            self.execute(effect);
        }
    }

    /// Spawn a single effect. `Effect::None` is skipped without spawning.
    pub fn execute(&self, effect: Effect<A>) {
        if effect.is_none() {
            tracing::trace!("Skipping Effect::None");
            return;
        }

        self.pending.fetch_add(1, Ordering::SeqCst);
        let guard = PendingGuard {
            pending: Arc::clone(&self.pending),
            idle: Arc::clone(&self.idle),
        };
        let feedback = self.feedback.clone();

        tokio::spawn(async move {
            let _guard = guard;
            run_effect(effect, feedback).await;
        });
    }
}

async fn run_effect<A: Send + 'static>(effect: Effect<A>, feedback: Option<mpsc::UnboundedSender<A>>) {
    let Effect::Future(fut) = effect else {
        return;
    };
    if let Some(action) = fut.await {
        match &feedback {
            Some(tx) => {
                if tx.send(action).is_err() {
                    tracing::debug!("Feedback channel closed, dropping action");
                }
            },
            None => tracing::debug!("Effect produced an action with no feedback channel"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn push(log: &Arc<Mutex<Vec<u32>>>, value: u32, delay_ms: u64) -> Effect<u32> {
        let log = Arc::clone(log);
        Effect::Future(Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            log.lock().unwrap().push(value);
            None
        }))
    }

    #[tokio::test]
    async fn every_effect_completes_before_idle() {
        let executor = EffectExecutor::<u32>::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        executor.execute_all([push(&log, 1, 10), push(&log, 2, 0), Effect::None]);

        assert!(executor.wait_idle(Duration::from_secs(2)).await);
        let mut seen = log.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2]);
        assert_eq!(executor.pending(), 0);
    }

    #[tokio::test]
    async fn produced_actions_reach_the_feedback_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let executor = EffectExecutor::with_feedback(tx);

        executor.execute(Effect::Future(Box::pin(async { Some(7_u32) })));

        assert_eq!(rx.recv().await, Some(7));
    }

    #[tokio::test]
    async fn none_is_not_spawned() {
        let executor = EffectExecutor::<u32>::new();
        executor.execute(Effect::None);
        assert_eq!(executor.pending(), 0);
        assert!(executor.wait_idle(Duration::from_millis(10)).await);
    }
}
