// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A consecutive-failure circuit breaker for fallible calls.
//!
//! A [`Breaker`] wraps a call site that talks to a dependency which may fail. It counts
//! consecutive failures, stops issuing calls once a threshold is crossed and automatically
//! lets a single trial call through after a cooldown to detect recovery. Callers supply a
//! fallback that is used whenever the protected operation cannot be safely attempted or
//! fails.
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::Duration;
//!
//! use tick::Clock;
//! use tripwire::{Breaker, BreakerOptions};
//!
//! # fn fetch_quote() -> Result<String, std::io::Error> { Ok("42".to_string()) }
//! # fn example(clock: &Clock) {
//! let breaker = Breaker::new(
//!     "quote_service",
//!     BreakerOptions::default()
//!         .max_attempts(3)
//!         .open_timeout(Duration::from_secs(5))
//!         .reset_timeout(Duration::from_secs(20)),
//!     clock,
//! );
//!
//! let quote = breaker.call(fetch_quote, || "quote unavailable".to_string());
//! # let _quote = quote;
//! # }
//! ```
//!
//! > **Note**: The breaker reads time from a [`Clock`][tick::Clock] of the [`tick`] crate.
//! > Use `Clock::new_tokio()` or [`tick::runtime::InactiveClock`] in production and
//! > `tick::ClockControl` in tests.
//!
//! # States and Transitions
//!
//! ```text
//! ┌────────┐  max_attempts failures within open_timeout  ┌──────────┐
//! │ Closed │ ───────────────────────────────────────────▶│   Open   │
//! └────────┘                                             └──────────┘
//!      ▲                                                   ▲     │
//!      │ trial succeeded                     trial failed  │     │ reset_timeout
//!      │            ┌────────────────┐                     │     │ elapsed
//!      └────────────│   Half-Open    │─────────────────────┘     │
//!                   └────────────────┘◀──────────────────────────┘
//! ```
//!
//! - **Closed**: calls pass through. A success resets the failure count, a failure increments
//!   it. When the count reaches [`max_attempts`][BreakerOptions::max_attempts] and all
//!   failures of the streak happened within [`open_timeout`][BreakerOptions::open_timeout]
//!   of its first failure, the circuit opens. A failure past the window starts a new streak.
//! - **Open**: calls are short-circuited to the fallback without invoking the protected
//!   operation. The first call at or after [`reset_timeout`][BreakerOptions::reset_timeout]
//!   becomes the trial call.
//! - **Half-Open**: exactly one trial call is in flight and every concurrent call is
//!   short-circuited. Success closes the circuit and resets the failure count. Failure
//!   re-opens it and restarts the cooldown.
//!
//! # Failure Handling
//!
//! The protected operation signals failure by returning `Err`. [`Breaker::call`] never
//! returns that error: the failure is recorded and the fallback result is returned instead.
//! Use [`Breaker::try_call`] to observe [`BreakerError`] directly. Errors and panics raised
//! by the fallback itself propagate unchanged.
//!
//! The breaker imposes no timeout on the protected operation.
//!
//! # Multiple Dependencies
//!
//! [`Breakers`] maps a [`BreakerId`] to a breaker so that each remote dependency trips
//! independently.
//!
//! # Features
//!
//! - `logs`: Emits structured [`tracing`](https://docs.rs/tracing) events when calls are
//!   rejected, trial calls complete and the circuit opens or closes.
//! - `serde`: Implements `Serialize` and `Deserialize` for [`BreakerOptions`].

mod breaker;
mod breaker_id;
mod breakers;
mod constants;
mod engine;
mod error;
mod options;
mod state;

pub use breaker::Breaker;
pub use breaker_id::BreakerId;
pub use breakers::Breakers;
pub use error::BreakerError;
pub use options::BreakerOptions;
pub use state::{BreakerSnapshot, CircuitState};
