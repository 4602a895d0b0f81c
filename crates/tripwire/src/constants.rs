// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// Default number of consecutive failures that trips the circuit.
pub(crate) const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default span within which the consecutive failures must occur to trip the circuit.
pub(crate) const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default duration that the circuit remains open before a trial call is allowed.
pub(crate) const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_millis(20000);

/// Smallest accepted failure threshold.
pub(crate) const MIN_MAX_ATTEMPTS: u32 = 1;

pub(crate) const ERR_POISONED_LOCK: &str =
    "poisoned lock - cannot continue execution because the circuit state can no longer be trusted";
