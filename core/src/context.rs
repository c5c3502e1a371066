//! Per-call cancellation and deadline context.
//!
//! A `Context` travels with every `Request`. The dispatcher refuses to send
//! once the context is canceled or past its deadline, and the transport uses
//! the remaining time as the per-request timeout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::TransportError;

/// Cancellation and deadline state for a single call.
///
/// Cloning a context shares its cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    canceled: Option<Arc<AtomicBool>>,
}

/// Cancels the `Context` it was created with, and every clone of it.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl Context {
    /// A context that is never canceled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that expires `timeout` from now. An earlier existing
    /// deadline is kept.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };
        Self {
            deadline: Some(deadline),
            canceled: self.canceled.clone(),
        }
    }

    /// Derive a cancelable context. Canceling the returned handle does not
    /// affect the parent.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let flag = Arc::new(AtomicBool::new(self.is_canceled()));
        let ctx = Self {
            deadline: self.deadline,
            canceled: Some(flag.clone()),
        };
        (ctx, CancelHandle { flag })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether some `CancelHandle` can cancel this context.
    pub(crate) fn is_cancelable(&self) -> bool {
        self.canceled.is_some()
    }

    fn is_canceled(&self) -> bool {
        self.canceled
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Returns the reason this context is done, if it is.
    pub fn check(&self) -> Result<(), TransportError> {
        if self.is_canceled() {
            return Err(TransportError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(TransportError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}
