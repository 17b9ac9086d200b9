// Copyright 2026 The Completable Rust Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::Duration;

use thiserror::Error;

use crate::OperationCancellation;

/// Why a wait on a result did not yield a value.
///
/// `Failed` and `Cancelled` describe the result itself and are observed
/// identically by every waiter. `Timeout` and `Interrupted` belong only to
/// the call that raised them; the result is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AwaitError<E> {
    /// The producer completed the result with an error.
    #[error("operation failed: {0}")]
    Failed(E),

    #[error(transparent)]
    Cancelled(#[from] OperationCancellation),

    #[error("timed out after {0:?} waiting for result")]
    Timeout(Duration),

    #[error("wait interrupted")]
    Interrupted,
}

impl<E> AwaitError<E> {
    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, AwaitError::Failed(_))
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AwaitError::Cancelled(_))
    }

    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, AwaitError::Timeout(_))
    }

    #[inline]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, AwaitError::Interrupted)
    }

    /// The producer's error, if this wait observed one.
    pub fn into_failure(self) -> Option<E> {
        match self {
            AwaitError::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn map_failure<F>(self, f: impl FnOnce(E) -> F) -> AwaitError<F> {
        match self {
            AwaitError::Failed(error) => AwaitError::Failed(f(error)),
            AwaitError::Cancelled(cancellation) => AwaitError::Cancelled(cancellation),
            AwaitError::Timeout(timeout) => AwaitError::Timeout(timeout),
            AwaitError::Interrupted => AwaitError::Interrupted,
        }
    }
}

/// Wrapped failure returned by the native future adapter.
///
/// Every way a wait can fail, cancellation included, is reported through this
/// one type so callers cannot mistake a real failure for a routine
/// cancellation. The original [`AwaitError`] is the error `source`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("execution failed: {cause}")]
pub struct ExecutionError<E> {
    #[source]
    cause: AwaitError<E>,
}

impl<E> ExecutionError<E> {
    #[inline]
    pub fn new(cause: AwaitError<E>) -> Self {
        ExecutionError { cause }
    }

    #[inline]
    pub fn cause(&self) -> &AwaitError<E> {
        &self.cause
    }

    #[inline]
    pub fn into_cause(self) -> AwaitError<E> {
        self.cause
    }
}

impl<E> From<AwaitError<E>> for ExecutionError<E> {
    fn from(cause: AwaitError<E>) -> Self {
        ExecutionError::new(cause)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn predicates_match_variants() {
        let failed: AwaitError<&str> = AwaitError::Failed("boom");
        assert!(failed.is_failed());
        assert!(!failed.is_cancelled());

        let timeout: AwaitError<&str> = AwaitError::Timeout(Duration::from_millis(5));
        assert!(timeout.is_timeout());

        let interrupted: AwaitError<&str> = AwaitError::Interrupted;
        assert!(interrupted.is_interrupted());
    }

    #[test]
    fn into_failure_only_yields_producer_error() {
        assert_eq!(AwaitError::Failed(7).into_failure(), Some(7));
        assert_eq!(AwaitError::<i32>::Interrupted.into_failure(), None);
    }

    #[test]
    fn map_failure_preserves_other_variants() {
        let mapped = AwaitError::<i32>::Cancelled(OperationCancellation).map_failure(|e| e.to_string());
        assert_eq!(mapped, AwaitError::Cancelled(OperationCancellation));

        let mapped = AwaitError::Failed(3).map_failure(|e| e * 2);
        assert_eq!(mapped, AwaitError::Failed(6));
    }

    #[test]
    fn execution_error_exposes_cause_as_source() {
        let err = ExecutionError::new(AwaitError::<String>::Cancelled(OperationCancellation));
        assert_eq!(err.to_string(), "execution failed: operation cancelled");
        let source = err.source().expect("cause is the source");
        assert_eq!(source.to_string(), "operation cancelled");
        assert!(err.cause().is_cancelled());
    }
}
