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

use thiserror::Error;

/// Result of a producer-side completion attempt.
pub type CompletionResult<T> = std::result::Result<T, CompletionError>;

/// Producer contract violations.
///
/// A result may be completed exactly once. A second `set_result` or
/// `set_exception` is a programming error and is always reported, in release
/// builds too.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CompletionError {
    #[error("illegal state: cannot {operation}, result is already {state}")]
    IllegalState {
        operation: &'static str,
        state: &'static str,
    },
}

impl CompletionError {
    #[inline]
    pub fn illegal_state(operation: &'static str, state: &'static str) -> Self {
        CompletionError::IllegalState { operation, state }
    }
}

/// Raised to waiters when the result resolved to the cancelled state.
#[derive(Debug, Error, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[error("operation cancelled")]
pub struct OperationCancellation;
