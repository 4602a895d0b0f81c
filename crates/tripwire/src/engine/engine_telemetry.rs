// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;

use tick::Clock;

#[cfg(any(feature = "logs", test))]
use crate::CircuitState;
use crate::BreakerSnapshot;
use crate::engine::{CircuitEngine, EnterCircuitResult, ExecutionMode, ExecutionResult, ExitCircuitResult};

/// Wrapper around a circuit engine that emits log events for rejections, probes and
/// state transitions.
#[derive(Debug)]
pub(crate) struct EngineTelemetry<T> {
    inner: T,
    #[cfg(any(feature = "logs", test))]
    pub(super) breaker_id: Cow<'static, str>,
    #[cfg(any(feature = "logs", test))]
    pub(super) clock: Clock,
}

impl<T> EngineTelemetry<T> {
    #[cfg(any(feature = "logs", test))]
    pub fn new(inner: T, breaker_id: Cow<'static, str>, clock: Clock) -> Self {
        Self { inner, breaker_id, clock }
    }

    #[cfg(not(any(feature = "logs", test)))]
    pub fn new(inner: T, _breaker_id: Cow<'static, str>, _clock: Clock) -> Self {
        Self { inner }
    }
}

impl<T: CircuitEngine> CircuitEngine for EngineTelemetry<T> {
    fn enter(&self) -> EnterCircuitResult {
        let enter_result = self.inner.enter();

        #[cfg(any(feature = "logs", test))]
        if enter_result == EnterCircuitResult::Rejected {
            tracing::event!(
                name: "tripwire.breaker.rejected",
                tracing::Level::WARN,
                breaker.id = %self.breaker_id,
            );
        }

        enter_result
    }

    fn exit(&self, result: ExecutionResult, mode: ExecutionMode) -> ExitCircuitResult {
        #[cfg(any(feature = "logs", test))]
        if mode == ExecutionMode::Probe {
            tracing::event!(
                name: "tripwire.breaker.probe",
                tracing::Level::INFO,
                breaker.id = %self.breaker_id,
                breaker.state = %CircuitState::HalfOpen,
                breaker.probe.result = result.as_str(),
            );
        }

        let exit_result = self.inner.exit(result, mode);

        match &exit_result {
            ExitCircuitResult::Opened { failure_count } => {
                #[cfg(any(feature = "logs", test))]
                tracing::event!(
                    name: "tripwire.breaker.opened",
                    tracing::Level::WARN,
                    breaker.id = %self.breaker_id,
                    breaker.state = %CircuitState::Open,
                    breaker.failure_count = failure_count,
                );

                _ = failure_count;
            }
            ExitCircuitResult::Closed(stats) => {
                #[cfg(any(feature = "logs", test))]
                tracing::event!(
                    name: "tripwire.breaker.closed",
                    tracing::Level::INFO,
                    breaker.id = %self.breaker_id,
                    breaker.state = %CircuitState::Closed,
                    breaker.open.duration = stats.opened_duration(self.clock.instant()).as_millis(),
                    breaker.probes.total = stats.probes_total,
                    breaker.probes.failed = stats.probes_failures,
                    breaker.rejections = stats.rejected,
                    breaker.late_results = stats.late_results,
                    breaker.re_opened = stats.re_opened,
                );

                _ = stats;
            }
            ExitCircuitResult::Reopened { failure_count } => {
                // Reopening is already reported by the probe event carrying the failed result.
                _ = failure_count;
            }
            ExitCircuitResult::Unchanged => {}
        }

        exit_result
    }

    fn snapshot(&self) -> BreakerSnapshot {
        self.inner.snapshot()
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::time::Instant;

    use tracing_test::traced_test;

    use super::*;
    use crate::engine::{EngineFake, Stats};

    fn create_engine(engine: EngineFake) -> EngineTelemetry<EngineFake> {
        EngineTelemetry::new(engine, "test_id".into(), Clock::new_frozen())
    }

    #[traced_test]
    #[test]
    fn enter_rejected_ensure_logs() {
        let engine = create_engine(EngineFake::new(EnterCircuitResult::Rejected, ExitCircuitResult::Unchanged));

        assert_eq!(engine.enter(), EnterCircuitResult::Rejected);

        assert!(logs_contain("breaker.id=test_id"));
    }

    #[traced_test]
    #[test]
    fn enter_accepted_no_logs() {
        let engine = create_engine(EngineFake::new(
            EnterCircuitResult::Accepted {
                mode: ExecutionMode::Normal { generation: 0 },
            },
            ExitCircuitResult::Unchanged,
        ));

        _ = engine.enter();

        assert!(!logs_contain("breaker.id=test_id"));
    }

    #[traced_test]
    #[test]
    fn exit_probe_ensure_logs() {
        let engine = create_engine(EngineFake::new(EnterCircuitResult::Rejected, ExitCircuitResult::Unchanged));

        _ = engine.exit(ExecutionResult::Failure, ExecutionMode::Probe);

        assert!(logs_contain("breaker.state=half_open"));
        assert!(logs_contain("breaker.probe.result=\"failure\""));
    }

    #[traced_test]
    #[test]
    fn circuit_opened_ensure_logs() {
        let engine = create_engine(EngineFake::new(
            EnterCircuitResult::Rejected,
            ExitCircuitResult::Opened { failure_count: 3 },
        ));

        let result = engine.exit(ExecutionResult::Failure, ExecutionMode::Normal { generation: 0 });

        assert_eq!(result, ExitCircuitResult::Opened { failure_count: 3 });
        assert!(logs_contain("breaker.state=open"));
        assert!(logs_contain("breaker.failure_count=3"));
    }

    #[traced_test]
    #[test]
    fn circuit_closed_ensure_logs() {
        let engine = create_engine(EngineFake::new(
            EnterCircuitResult::Rejected,
            ExitCircuitResult::Closed(Stats::new(Instant::now())),
        ));

        _ = engine.exit(ExecutionResult::Success, ExecutionMode::Probe);

        assert!(logs_contain("breaker.state=closed"));
        assert!(logs_contain("breaker.probes.total=0"));
    }

    #[test]
    fn exit_forwards_to_inner_engine() {
        let engine = create_engine(EngineFake::new(EnterCircuitResult::Rejected, ExitCircuitResult::Unchanged));

        _ = engine.exit(ExecutionResult::Abandoned, ExecutionMode::Normal { generation: 0 });

        assert_eq!(engine.inner.exits(), vec![(ExecutionResult::Abandoned, ExecutionMode::Normal { generation: 0 })]);
    }
}
