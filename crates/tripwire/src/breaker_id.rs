// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::fmt::Display;

/// Identifies a circuit breaker, typically by the name of the dependency it guards.
///
/// The identifier is included in every log event the breaker emits and keys the
/// [`Breakers`][crate::Breakers] registry. Identifiers should be **long-lived and
/// low-cardinality** (a downstream service, a host, an endpoint). Do not derive them from
/// per-request data. Do not put sensitive data in them either, since they end up in logs.
///
/// Prefer `&'static str` identifiers, which never allocate.
///
/// # Examples
///
/// ```rust
/// use tripwire::BreakerId;
///
/// let id = BreakerId::from("inventory_service");
/// assert_eq!(id.as_str(), "inventory_service");
///
/// let id = BreakerId::from(format!("{}://{}", "https", "api.example.com"));
/// assert_eq!(id.to_string(), "https://api.example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BreakerId(Cow<'static, str>);

impl BreakerId {
    /// Creates a breaker identifier.
    #[must_use]
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BreakerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BreakerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for BreakerId {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for BreakerId {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl From<u64> for BreakerId {
    fn from(value: u64) -> Self {
        Self(Cow::Owned(value.to_string()))
    }
}

impl From<BreakerId> for Cow<'static, str> {
    fn from(value: BreakerId) -> Self {
        value.0
    }
}
