// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Calls a flaky external service through a circuit breaker.
//!
//! The service fails about half of the time. After three consecutive failures within five
//! seconds the circuit opens and callers receive the fallback greeting without the service
//! being called. Once the reset timeout elapses a single trial call checks whether the
//! service has recovered.
//!
//! Run with `cargo run --example external_service --features logs` to see the breaker events.

use std::time::Duration;

use tick::Clock;
use tripwire::{Breaker, BreakerOptions};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set up tracing subscriber for logs to console
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let clock = Clock::new_tokio();

    // Decrease the reset timeout to see the circuit breaker recover faster
    let breaker = Breaker::new(
        "external_service",
        BreakerOptions::default()
            .max_attempts(3)
            .open_timeout(Duration::from_secs(5))
            .reset_timeout(Duration::from_secs(2)),
        &clock,
    );

    for attempt in 0..40 {
        clock.delay(Duration::from_millis(100)).await;

        let greeting = breaker.call_async(call_external_service, fallback).await;

        println!("{attempt} [{}]: {greeting}", breaker.state());
    }
}

async fn call_external_service() -> Result<String, String> {
    tracing::info!("Calling external service...");

    if fastrand::f64() > 0.5 {
        return Err("remote access failed".to_string());
    }

    tracing::info!("Success calling external service");
    Ok("Hello world".to_string())
}

async fn fallback() -> String {
    tracing::error!("Fallback for external service");
    "Succes on fallback".to_string()
}
