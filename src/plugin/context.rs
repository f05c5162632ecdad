// Copyright (c) 2025 - Cowboy AI, Inc.
//! Execution context: cooperative cancellation and deadlines
//!
//! One context is threaded through hook execution, targeted plugin calls and
//! publish steps. Clones share the same cancellation flag, so cancelling any
//! clone cancels all of them. Checks are non-blocking; nothing here preempts
//! a call that is already running.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cancellation flag plus optional deadline
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl ExecutionContext {
    /// Context that is never cancelled unless [`cancel`](Self::cancel) is called
    pub fn new() -> Self {
        Self::default()
    }

    /// Derived context sharing this one's flag, expiring after `timeout`
    ///
    /// Keeps the earlier of the parent's deadline and the new one.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        };
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some(deadline),
        }
    }

    /// Derived context sharing this one's flag and deadline
    pub fn child(&self) -> Self {
        self.clone()
    }

    /// Cancel this context and every clone of it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once cancelled or past the deadline
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, if one is set
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Reason string used for responses short-circuited by cancellation
    pub fn cancellation_reason(&self) -> &'static str {
        if self.cancelled.load(Ordering::SeqCst) {
            "context canceled"
        } else {
            "context deadline exceeded"
        }
    }
}
