// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Reason a guarded call did not produce a value from the protected operation.
///
/// Returned by [`Breaker::try_call`][crate::Breaker::try_call] and
/// [`Breaker::try_call_async`][crate::Breaker::try_call_async]. The fallback-based
/// [`Breaker::call`][crate::Breaker::call] never exposes this type; it substitutes the
/// fallback result in both cases.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BreakerError<E> {
    /// The circuit is open, or a trial call is already in flight, so the protected
    /// operation was not invoked.
    #[error("circuit is open")]
    Open,

    /// The protected operation was invoked and failed. The failure has been recorded.
    #[error("protected operation failed")]
    Failed(#[source] E),
}

impl<E> BreakerError<E> {
    /// Returns `true` if the call was short-circuited without invoking the protected operation.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns the protected operation's error, if it was invoked and failed.
    #[must_use]
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(error) => Some(error),
            Self::Open => None,
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::io;

    use super::*;

    static_assertions::assert_impl_all!(BreakerError<io::Error>: Send, Sync, std::error::Error);

    #[test]
    fn open_display() {
        let error = BreakerError::<io::Error>::Open;

        assert_eq!(error.to_string(), "circuit is open");
        assert!(error.is_open());
        assert!(error.source().is_none());
        assert!(error.into_failure().is_none());
    }

    #[test]
    fn failed_exposes_source() {
        let error = BreakerError::Failed(io::Error::other("connection reset"));

        assert_eq!(error.to_string(), "protected operation failed");
        assert!(!error.is_open());
        assert_eq!(error.source().map(ToString::to_string).as_deref(), Some("connection reset"));
        assert_eq!(error.into_failure().map(|e| e.kind()), Some(io::ErrorKind::Other));
    }
}
