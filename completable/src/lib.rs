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

//! Cancellable, completion-once, multi-waiter result futures.
//!
//! A [`CompletableResult`] is completed exactly once by its producer and observed by any
//! number of threads. [`ResultFuture`] is the consumer contract over it, with cancellation
//! requests decided by a [`CancelPolicy`], and [`NativeFuture`] adapts it to
//! `std::future::Future`.

mod completable_result;
mod interrupt;
pub mod native_future;
mod result_future;

pub use completable_error::AwaitError;
pub use completable_error::CompletionError;
pub use completable_error::CompletionResult;
pub use completable_error::ExecutionError;
pub use completable_error::OperationCancellation;

pub use crate::completable_result::CompletableResult;
pub use crate::completable_result::ResultState;
pub use crate::interrupt::Interrupter;
pub use crate::native_future::NativeFuture;
pub use crate::result_future::CancelPolicy;
pub use crate::result_future::ResultFuture;
