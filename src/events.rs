//! Structured diagnostics emitted by the retry loop.
//!
//! Attach a [`RetryObserver`] with [`GraphQlClient::with_observer`] to follow a
//! call through its states. Any `Fn(&RetryEvent<'_>) + Send + Sync` closure is
//! an observer.
//!
//! [`GraphQlClient::with_observer`]: crate::GraphQlClient::with_observer

use std::time::Duration;

use crate::AttemptError;

/// A state transition of one logical call. Attempt indices are 0-based.
#[derive(Debug)]
pub enum RetryEvent<'a> {
    /// Attempt `attempt` was issued with the given deadline.
    AttemptStarted { attempt: usize, timeout: Duration },
    /// Attempt `attempt` failed. `next_delay` is the backoff before the next
    /// attempt, or `None` when no attempt remains.
    AttemptFailed {
        attempt: usize,
        error: &'a AttemptError,
        next_delay: Option<Duration>,
    },
    /// Attempt `attempt` returned a payload; the call is complete.
    Succeeded { attempt: usize },
    /// The call failed terminally after `attempts` attempts.
    Exhausted { attempts: usize },
    /// The cancellation token fired during or before attempt `attempt`.
    Cancelled { attempt: usize },
}

impl RetryEvent<'_> {
    /// Attempt index the event refers to. For `Exhausted`, the last attempt.
    pub fn attempt(&self) -> usize {
        match self {
            Self::AttemptStarted { attempt, .. }
            | Self::AttemptFailed { attempt, .. }
            | Self::Succeeded { attempt }
            | Self::Cancelled { attempt } => *attempt,
            Self::Exhausted { attempts } => attempts.saturating_sub(1),
        }
    }
}

/// Receives [`RetryEvent`]s synchronously from the retry loop.
pub trait RetryObserver: Send + Sync {
    fn on_event(&self, event: &RetryEvent<'_>);
}

impl<F> RetryObserver for F
where
    F: Fn(&RetryEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &RetryEvent<'_>) {
        self(event)
    }
}
