// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;
use std::time::{Duration, Instant};

use crate::{BreakerOptions, BreakerSnapshot};

/// Outcome of a single execution of the protected operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ExecutionResult {
    Success,
    Failure,

    /// The operation panicked or its future was dropped before completing.
    Abandoned,
}

impl ExecutionResult {
    #[cfg_attr(not(any(feature = "logs", test)), expect(dead_code, reason = "only read by log events"))]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Abandoned => "abandoned",
        }
    }
}

/// Determines the mode of execution for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecutionMode {
    /// Regular operation admitted by a closed circuit.
    ///
    /// `generation` identifies the closed period the call was admitted in. Results reported
    /// for an earlier period are late and ignored.
    Normal { generation: u64 },

    /// The single trial operation admitted by a circuit whose cooldown elapsed.
    Probe,
}

/// Result of attempting to enter the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnterCircuitResult {
    Accepted { mode: ExecutionMode },

    /// The circuit is open or a trial is already in flight.
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExitCircuitResult {
    Unchanged,

    /// Circuit transitioned from closed to open.
    Opened { failure_count: u32 },

    /// The trial call did not succeed and the circuit is open again.
    Reopened { failure_count: u32 },

    /// The trial call succeeded and the circuit is closed.
    Closed(Stats),
}

/// Configuration of the circuit breaker engine, resolved from [`BreakerOptions`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct EngineOptions {
    pub max_attempts: u32,
    pub open_timeout: Duration,
    pub reset_timeout: Duration,
}

impl From<&BreakerOptions> for EngineOptions {
    fn from(options: &BreakerOptions) -> Self {
        Self {
            max_attempts: options.get_max_attempts(),
            open_timeout: options.get_open_timeout(),
            reset_timeout: options.get_reset_timeout(),
        }
    }
}

/// Trait defining the behavior of a circuit breaker engine.
///
/// Implementations serialize all state transitions. The protected operation runs between
/// `enter` and `exit` without any lock being held.
pub(crate) trait CircuitEngine: Debug + Send + Sync + 'static {
    fn enter(&self) -> EnterCircuitResult;

    fn exit(&self, result: ExecutionResult, mode: ExecutionMode) -> ExitCircuitResult;

    fn snapshot(&self) -> BreakerSnapshot;
}

/// Statistics collected while the circuit is open or half-open.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(not(any(feature = "logs", test)), expect(dead_code, reason = "only read by log events"))]
pub(crate) struct Stats {
    pub opened_at: Instant,
    pub re_opened: usize,
    pub probes_total: usize,
    pub probes_failures: usize,
    pub rejected: usize,
    pub late_results: usize,
}

impl Stats {
    pub fn new(opened_at: Instant) -> Self {
        Self {
            opened_at,
            re_opened: 0,
            probes_total: 0,
            probes_failures: 0,
            rejected: 0,
            late_results: 0,
        }
    }

    #[cfg_attr(not(any(feature = "logs", test)), expect(dead_code, reason = "only read by log events"))]
    pub fn opened_duration(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.opened_at)
    }
}

// Type alias for the default engine with telemetry.
pub(crate) type Engine = EngineTelemetry<EngineCore>;

mod engine_core;
pub(crate) use engine_core::*;

#[cfg(test)]
mod engine_fake;
#[cfg(test)]
pub(crate) use engine_fake::*;

mod engine_telemetry;
pub(crate) use engine_telemetry::*;
