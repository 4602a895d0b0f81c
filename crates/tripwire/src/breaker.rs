// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use tick::Clock;

use crate::engine::{CircuitEngine, Engine, EngineCore, EngineOptions, EngineTelemetry, EnterCircuitResult, ExecutionMode, ExecutionResult};
use crate::{BreakerError, BreakerId, BreakerOptions, BreakerSnapshot, CircuitState};

/// Guards a fallible call site and stops invoking it after repeated failures.
///
/// The breaker counts consecutive failures of the protected operation. Once
/// [`max_attempts`][BreakerOptions::max_attempts] failures occur within
/// [`open_timeout`][BreakerOptions::open_timeout], the circuit opens and every call is
/// short-circuited to the fallback. After [`reset_timeout`][BreakerOptions::reset_timeout]
/// a single trial call is let through: success closes the circuit, failure opens it again.
///
/// Cloning a breaker is inexpensive and every clone shares the same circuit state. The
/// breaker is `Send` and `Sync` and can be invoked from many threads at once.
///
/// # Examples
///
/// ```rust
/// use tick::Clock;
/// use tripwire::{Breaker, BreakerOptions, CircuitState};
///
/// # fn example(clock: &Clock) {
/// let breaker = Breaker::new("external_service", BreakerOptions::default(), clock);
///
/// let response = breaker.call(
///     || Err::<String, _>("connection refused"),
///     || "fallback response".to_string(),
/// );
///
/// assert_eq!(response, "fallback response");
/// assert_eq!(breaker.failure_count(), 1);
/// assert_eq!(breaker.state(), CircuitState::Closed);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Breaker {
    shared: Arc<BreakerShared>,
}

#[derive(Debug)]
struct BreakerShared {
    id: BreakerId,
    options: BreakerOptions,
    engine: Engine,
}

impl Breaker {
    /// Creates a closed circuit breaker.
    ///
    /// The clock drives every time-based transition. Use a clock backed by `tick::ClockControl`
    /// in tests to control the passage of time.
    pub fn new(id: impl Into<BreakerId>, options: BreakerOptions, clock: impl AsRef<Clock>) -> Self {
        let id = id.into();
        let clock = clock.as_ref();

        let engine = EngineTelemetry::new(
            EngineCore::new(EngineOptions::from(&options), clock.clone()),
            id.clone().into(),
            clock.clone(),
        );

        Self {
            shared: Arc::new(BreakerShared { id, options, engine }),
        }
    }

    /// The identifier of this breaker.
    #[must_use]
    pub fn id(&self) -> &BreakerId {
        &self.shared.id
    }

    /// The options this breaker was created with.
    #[must_use]
    pub fn options(&self) -> &BreakerOptions {
        &self.shared.options
    }

    /// Returns a consistent view of the current state, failure count and last opening time.
    #[must_use]
    pub fn snapshot(&self) -> BreakerSnapshot {
        self.shared.engine.snapshot()
    }

    /// The current state of the circuit.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.snapshot().state()
    }

    /// The current consecutive failure count. See [`BreakerSnapshot::failure_count`].
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.snapshot().failure_count()
    }

    /// Invokes `operation` through the circuit breaker and substitutes `fallback` for any
    /// outcome that is not a successful result.
    ///
    /// `fallback` runs when the circuit is open, when a trial call is already in flight, or
    /// when `operation` returns an error. The error is recorded and never returned to the
    /// caller. Whatever `fallback` returns, including its own error values, is passed to the
    /// caller unchanged.
    ///
    /// Panics raised by `operation` propagate to the caller. A panicking trial call re-opens
    /// the circuit.
    pub fn call<T, E>(&self, operation: impl FnOnce() -> Result<T, E>, fallback: impl FnOnce() -> T) -> T {
        self.try_call(operation).unwrap_or_else(|_| fallback())
    }

    /// Invokes `operation` through the circuit breaker without a fallback.
    ///
    /// # Errors
    ///
    /// Returns [`BreakerError::Open`] when the call is short-circuited and
    /// [`BreakerError::Failed`] when `operation` was invoked and failed.
    pub fn try_call<T, E>(&self, operation: impl FnOnce() -> Result<T, E>) -> Result<T, BreakerError<E>> {
        let permit = Permit::acquire(&self.shared.engine).ok_or(BreakerError::Open)?;
        let result = operation();
        permit.complete(&result);
        result.map_err(BreakerError::Failed)
    }

    /// Asynchronous counterpart of [`call`][Self::call].
    ///
    /// The breaker never holds its lock across an `.await`. If the returned future is
    /// dropped while a trial call is pending, the circuit re-opens.
    pub async fn call_async<T, E, Op, OpFut, Fb, FbFut>(&self, operation: Op, fallback: Fb) -> T
    where
        Op: FnOnce() -> OpFut,
        OpFut: Future<Output = Result<T, E>>,
        Fb: FnOnce() -> FbFut,
        FbFut: Future<Output = T>,
    {
        match self.try_call_async(operation).await {
            Ok(value) => value,
            Err(_) => fallback().await,
        }
    }

    /// Asynchronous counterpart of [`try_call`][Self::try_call].
    ///
    /// # Errors
    ///
    /// Returns [`BreakerError::Open`] when the call is short-circuited and
    /// [`BreakerError::Failed`] when `operation` was invoked and failed.
    pub async fn try_call_async<T, E, Op, Fut>(&self, operation: Op) -> Result<T, BreakerError<E>>
    where
        Op: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let permit = Permit::acquire(&self.shared.engine).ok_or(BreakerError::Open)?;
        let result = operation().await;
        permit.complete(&result);
        result.map_err(BreakerError::Failed)
    }
}

/// Admission to execute the protected operation once.
///
/// Reports the outcome to the engine exactly once. A permit dropped without
/// completion reports [`ExecutionResult::Abandoned`].
#[derive(Debug)]
struct Permit<'a, C: CircuitEngine> {
    engine: &'a C,
    mode: Option<ExecutionMode>,
}

impl<'a, C: CircuitEngine> Permit<'a, C> {
    fn acquire(engine: &'a C) -> Option<Self> {
        match engine.enter() {
            EnterCircuitResult::Accepted { mode } => Some(Self { engine, mode: Some(mode) }),
            EnterCircuitResult::Rejected => None,
        }
    }

    fn complete<T, E>(mut self, result: &Result<T, E>) {
        let execution_result = if result.is_ok() {
            ExecutionResult::Success
        } else {
            ExecutionResult::Failure
        };

        self.report(execution_result);
    }

    fn report(&mut self, result: ExecutionResult) {
        if let Some(mode) = self.mode.take() {
            _ = self.engine.exit(result, mode);
        }
    }
}

impl<C: CircuitEngine> Drop for Permit<'_, C> {
    fn drop(&mut self) {
        self.report(ExecutionResult::Abandoned);
    }
}
