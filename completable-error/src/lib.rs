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

//! # Completable Error Handling
//!
//! Error taxonomy shared by every completable crate.
//!
//! - [`CompletionError`]: raised to a *producer* that tries to complete a result twice.
//! - [`AwaitError`]: raised to a *consumer* whose wait ended without a value.
//! - [`ExecutionError`]: the single wrapped-failure type used by the native future adapter.
//! - [`CompletableError`]: ambient errors (configuration, IO) of the supporting crates.
//!
//! ```rust
//! use completable_error::AwaitError;
//! use completable_error::OperationCancellation;
//!
//! let err: AwaitError<String> = AwaitError::from(OperationCancellation);
//! assert!(err.is_cancelled());
//! assert_eq!(err.to_string(), "operation cancelled");
//! ```

mod await_error;
mod completion_error;

use std::io;

pub use await_error::AwaitError;
pub use await_error::ExecutionError;
pub use completion_error::CompletionError;
pub use completion_error::CompletionResult;
pub use completion_error::OperationCancellation;
use thiserror::Error;

/// Result alias for the ambient operations of the completable crates.
pub type Result<T> = std::result::Result<T, CompletableError>;

/// Errors of the supporting layers: configuration loading, IO, and contract
/// violations surfaced through them.
#[derive(Debug, Error)]
pub enum CompletableError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("{0:?}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    IllegalArgument(String),

    #[error("Config parse error: {0}")]
    #[cfg(feature = "with_config")]
    ConfigError(#[from] config::ConfigError),
}

impl CompletableError {
    #[inline]
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        CompletableError::IllegalArgument(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_error_converts_transparently() {
        let err: CompletableError = CompletionError::IllegalState {
            operation: "set_result",
            state: "cancelled",
        }
        .into();
        assert!(matches!(err, CompletableError::Completion(_)));
        assert_eq!(
            err.to_string(),
            "illegal state: cannot set_result, result is already cancelled"
        );
    }

    #[test]
    fn illegal_argument_keeps_message() {
        let err = CompletableError::illegal_argument("bad level");
        assert_eq!(err.to_string(), "bad level");
    }

    #[test]
    fn io_error_converts() {
        let err: CompletableError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, CompletableError::Io(_)));
    }
}
