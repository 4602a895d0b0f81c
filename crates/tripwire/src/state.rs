// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Display;
use std::time::Instant;

/// The state of a circuit breaker.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CircuitState {
    /// Calls pass through to the protected operation and failures are counted.
    Closed,

    /// Calls are short-circuited without invoking the protected operation.
    Open,

    /// A single trial call is in flight; every other call is short-circuited.
    HalfOpen,
}

impl CircuitState {
    /// Returns the `snake_case` name of the state as used in log events.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

impl Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point-in-time view of a circuit breaker.
///
/// Obtained from [`Breaker::snapshot`][crate::Breaker::snapshot]. The values may be stale by the
/// time they are inspected if the breaker is shared across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSnapshot {
    pub(crate) state: CircuitState,
    pub(crate) failure_count: u32,
    pub(crate) opened_at: Option<Instant>,
}

impl BreakerSnapshot {
    /// The current state of the circuit.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.state
    }

    /// Consecutive failures observed by the breaker.
    ///
    /// This is always zero right after the circuit closes. While the circuit is open or
    /// half-open it holds the failure count that tripped the circuit, incremented by every
    /// failed trial call.
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    /// The instant the circuit last entered the open state, or `None` if it never opened.
    #[must_use]
    pub fn opened_at(&self) -> Option<Instant> {
        self.opened_at
    }
}
