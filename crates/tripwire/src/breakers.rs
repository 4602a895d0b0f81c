// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::HashMap;
use std::sync::Mutex;

use tick::Clock;

use crate::constants::ERR_POISONED_LOCK;
use crate::{Breaker, BreakerId, BreakerOptions, BreakerSnapshot};

/// A set of circuit breakers, one per guarded dependency.
///
/// Owned by the code that performs the remote calls. Breakers are created lazily on first
/// use and live as long as the registry. Equal identifiers always resolve to breakers that
/// share the same circuit state.
///
/// # Examples
///
/// ```rust
/// use tick::Clock;
/// use tripwire::{BreakerOptions, Breakers};
///
/// # fn example(clock: &Clock) {
/// let breakers = Breakers::new(BreakerOptions::default(), clock);
///
/// let greeting = breakers
///     .get("greeting_service")
///     .call(|| Ok::<_, std::io::Error>("hello".to_string()), || "hi".to_string());
///
/// assert_eq!(greeting, "hello");
/// assert_eq!(breakers.len(), 1);
/// # }
/// ```
#[derive(Debug)]
pub struct Breakers {
    map: Mutex<HashMap<BreakerId, Breaker>>,
    options: BreakerOptions,
    clock: Clock,
}

impl Breakers {
    /// Creates an empty registry whose breakers use `options` unless configured otherwise.
    pub fn new(options: BreakerOptions, clock: impl AsRef<Clock>) -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
            options,
            clock: clock.as_ref().clone(),
        }
    }

    /// Returns the breaker for `id`, creating it with the registry options if needed.
    pub fn get(&self, id: impl Into<BreakerId>) -> Breaker {
        self.get_with_options(id, self.options)
    }

    /// Returns the breaker for `id`, creating it with `options` if needed.
    ///
    /// `options` are ignored when the breaker already exists.
    pub fn get_with_options(&self, id: impl Into<BreakerId>, options: BreakerOptions) -> Breaker {
        let id = id.into();
        let mut map = self.map.lock().expect(ERR_POISONED_LOCK);

        if let Some(breaker) = map.get(&id) {
            return breaker.clone();
        }

        let breaker = Breaker::new(id.clone(), options, &self.clock);
        map.insert(id, breaker.clone());
        breaker
    }

    /// Returns snapshots of all known breakers, ordered by identifier.
    #[must_use]
    pub fn snapshots(&self) -> Vec<(BreakerId, BreakerSnapshot)> {
        let breakers: Vec<Breaker> = self.map.lock().expect(ERR_POISONED_LOCK).values().cloned().collect();

        let mut snapshots: Vec<_> = breakers.into_iter().map(|b| (b.id().clone(), b.snapshot())).collect();
        snapshots.sort_by(|a, b| a.0.cmp(&b.0));
        snapshots
    }

    /// The number of breakers created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.lock().expect(ERR_POISONED_LOCK).len()
    }

    /// Returns `true` if no breaker has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
