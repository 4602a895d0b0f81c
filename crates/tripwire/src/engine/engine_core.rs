// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Mutex;
use std::time::Instant;

use tick::Clock;

use super::{EngineOptions, EnterCircuitResult, ExitCircuitResult, Stats};
use crate::constants::ERR_POISONED_LOCK;
use crate::engine::{CircuitEngine, ExecutionMode, ExecutionResult};
use crate::{BreakerSnapshot, CircuitState};

/// Engine that manages the state of the circuit breaker.
#[derive(Debug)]
pub(crate) struct EngineCore {
    state: Mutex<State>,
    options: EngineOptions,
    clock: Clock,
}

impl EngineCore {
    pub fn new(options: EngineOptions, clock: Clock) -> Self {
        Self {
            state: Mutex::new(State::new()),
            options,
            clock,
        }
    }
}

impl CircuitEngine for EngineCore {
    fn enter(&self) -> EnterCircuitResult {
        let now = self.clock.instant();

        // NOTE: Remember to execute all expensive operations (like time checks) outside the lock.
        self.state.lock().expect(ERR_POISONED_LOCK).enter(now, &self.options)
    }

    fn exit(&self, result: ExecutionResult, mode: ExecutionMode) -> ExitCircuitResult {
        let now = self.clock.instant();

        self.state.lock().expect(ERR_POISONED_LOCK).exit(result, mode, now, &self.options)
    }

    fn snapshot(&self) -> BreakerSnapshot {
        self.state.lock().expect(ERR_POISONED_LOCK).snapshot()
    }
}

#[derive(Debug)]
enum State {
    Closed {
        failures: u32,
        streak_started_at: Option<Instant>,
        last_opened_at: Option<Instant>,
        generation: u64,
    },
    // `generation` is the closed period that ended when the circuit opened.
    Open {
        opened_at: Instant,
        failure_count: u32,
        generation: u64,
        stats: Stats,
    },
    // The trial call is in flight for as long as the circuit stays in this state.
    HalfOpen {
        opened_at: Instant,
        failure_count: u32,
        generation: u64,
        stats: Stats,
    },
}

impl State {
    fn new() -> Self {
        Self::Closed {
            failures: 0,
            streak_started_at: None,
            last_opened_at: None,
            generation: 0,
        }
    }

    fn enter(&mut self, now: Instant, options: &EngineOptions) -> EnterCircuitResult {
        match self {
            Self::Closed { generation, .. } => EnterCircuitResult::Accepted {
                mode: ExecutionMode::Normal { generation: *generation },
            },
            Self::Open {
                opened_at,
                failure_count,
                generation,
                stats,
            } => {
                if now.saturating_duration_since(*opened_at) >= options.reset_timeout {
                    stats.probes_total = stats.probes_total.saturating_add(1);

                    *self = Self::HalfOpen {
                        opened_at: *opened_at,
                        failure_count: *failure_count,
                        generation: *generation,
                        stats: stats.clone(),
                    };

                    EnterCircuitResult::Accepted {
                        mode: ExecutionMode::Probe,
                    }
                } else {
                    stats.rejected = stats.rejected.saturating_add(1);
                    EnterCircuitResult::Rejected
                }
            }
            Self::HalfOpen { stats, .. } => {
                stats.rejected = stats.rejected.saturating_add(1);
                EnterCircuitResult::Rejected
            }
        }
    }

    fn exit(&mut self, result: ExecutionResult, mode: ExecutionMode, now: Instant, options: &EngineOptions) -> ExitCircuitResult {
        match self {
            Self::Closed {
                failures,
                streak_started_at,
                generation,
                ..
            } => {
                let ExecutionMode::Normal { generation: admitted_in } = mode else {
                    return ExitCircuitResult::Unchanged;
                };

                // admitted before the circuit last opened
                if admitted_in != *generation {
                    return ExitCircuitResult::Unchanged;
                }

                match result {
                    ExecutionResult::Success => {
                        *failures = 0;
                        *streak_started_at = None;
                        ExitCircuitResult::Unchanged
                    }
                    ExecutionResult::Abandoned => ExitCircuitResult::Unchanged,
                    ExecutionResult::Failure => {
                        let streak_start = match *streak_started_at {
                            Some(start) if *failures > 0 && now.saturating_duration_since(start) <= options.open_timeout => start,
                            // first failure, or the previous streak fell out of the window
                            _ => {
                                *failures = 0;
                                now
                            }
                        };

                        *failures = failures.saturating_add(1);
                        *streak_started_at = Some(streak_start);

                        if *failures < options.max_attempts {
                            return ExitCircuitResult::Unchanged;
                        }

                        let failure_count = *failures;
                        let generation = *generation;

                        *self = Self::Open {
                            opened_at: now,
                            failure_count,
                            generation,
                            stats: Stats::new(now),
                        };

                        ExitCircuitResult::Opened { failure_count }
                    }
                }
            }
            Self::Open { stats, .. } => {
                // A call admitted while the circuit was closed finished after it opened. This
                // happens when threads interleave between enter and exit. Ignore the result.
                stats.late_results = stats.late_results.saturating_add(1);
                ExitCircuitResult::Unchanged
            }
            Self::HalfOpen {
                opened_at,
                failure_count,
                generation,
                stats,
            } => {
                if mode != ExecutionMode::Probe {
                    stats.late_results = stats.late_results.saturating_add(1);
                    return ExitCircuitResult::Unchanged;
                }

                if result == ExecutionResult::Success {
                    let stats = stats.clone();

                    *self = Self::Closed {
                        failures: 0,
                        streak_started_at: None,
                        last_opened_at: Some(*opened_at),
                        generation: generation.wrapping_add(1),
                    };

                    return ExitCircuitResult::Closed(stats);
                }

                stats.probes_failures = stats.probes_failures.saturating_add(1);
                stats.re_opened = stats.re_opened.saturating_add(1);
                let failure_count = failure_count.saturating_add(1);

                *self = Self::Open {
                    opened_at: now,
                    failure_count,
                    generation: *generation,
                    stats: stats.clone(),
                };

                ExitCircuitResult::Reopened { failure_count }
            }
        }
    }

    fn snapshot(&self) -> BreakerSnapshot {
        match self {
            Self::Closed {
                failures, last_opened_at, ..
            } => BreakerSnapshot {
                state: CircuitState::Closed,
                failure_count: *failures,
                opened_at: *last_opened_at,
            },
            Self::Open {
                opened_at, failure_count, ..
            } => BreakerSnapshot {
                state: CircuitState::Open,
                failure_count: *failure_count,
                opened_at: Some(*opened_at),
            },
            Self::HalfOpen {
                opened_at, failure_count, ..
            } => BreakerSnapshot {
                state: CircuitState::HalfOpen,
                failure_count: *failure_count,
                opened_at: Some(*opened_at),
            },
        }
    }
}
