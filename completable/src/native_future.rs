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

//! Bridge to Rust's native async convention.
//!
//! [`NativeFuture`] exposes a [`ResultFuture`] as a `std::future::Future` plus blocking
//! `get` calls, so it can be handed to any executor or async call site. All failures,
//! cancellation included, surface as [`ExecutionError`]; a cancelled computation is never
//! reported as something other than a failed wait.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;
use std::time::Duration;

use completable_error::ExecutionError;

use crate::ResultFuture;

/// Each adapter registers at most one waker on the result and releases it when dropped, so
/// abandoned awaits (a timed-out `select!` branch, say) do not pile up on a pending result.
pub struct NativeFuture<T, E> {
    future: ResultFuture<T, E>,
    waker_key: u64,
}

impl<T, E> NativeFuture<T, E> {
    pub fn new(future: ResultFuture<T, E>) -> Self {
        let waker_key = future.completable_result().allocate_waker_key();
        NativeFuture { future, waker_key }
    }

    /// Delegates to [`ResultFuture::try_cancel`]. Running work is never interrupted, so
    /// `may_interrupt_if_running` has no effect.
    pub fn cancel(&self, _may_interrupt_if_running: bool) -> bool {
        self.future.try_cancel()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.future.is_cancelled()
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.future.is_done()
    }

    pub fn result_future(&self) -> &ResultFuture<T, E> {
        &self.future
    }
}

impl<T, E> NativeFuture<T, E>
where
    T: Clone,
    E: Clone,
{
    /// Blocks until the result is terminal.
    pub fn get(&self) -> Result<T, ExecutionError<E>> {
        self.future.await_result().map_err(ExecutionError::new)
    }

    pub fn get_timeout(&self, timeout: Duration) -> Result<T, ExecutionError<E>> {
        self.future
            .await_result_timeout(timeout)
            .map_err(ExecutionError::new)
    }
}

impl<T, E> Future for NativeFuture<T, E>
where
    T: Clone,
    E: Clone,
{
    type Output = Result<T, ExecutionError<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future
            .completable_result()
            .poll_result_keyed(self.waker_key, cx)
            .map(|outcome| outcome.map_err(ExecutionError::new))
    }
}

impl<T, E> From<ResultFuture<T, E>> for NativeFuture<T, E> {
    fn from(future: ResultFuture<T, E>) -> Self {
        NativeFuture::new(future)
    }
}

impl<T, E> Clone for NativeFuture<T, E> {
    fn clone(&self) -> Self {
        NativeFuture::new(self.future.clone())
    }
}

impl<T, E> Drop for NativeFuture<T, E> {
    fn drop(&mut self) {
        self.future.completable_result().forget_waker(self.waker_key);
    }
}

impl<T, E> fmt::Debug for NativeFuture<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeFuture").field(&self.future).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use completable_error::AwaitError;
    use completable_error::OperationCancellation;

    use super::*;
    use crate::CancelPolicy;

    #[test]
    fn cancel_delegates_to_try_cancel() {
        let future = ResultFuture::<i32, String>::new(CancelPolicy::Immediate);
        let native = future.as_native_future();
        assert!(native.cancel(true));
        assert!(native.is_cancelled());
        assert!(native.is_done());
        assert!(future.is_cancel_requested());
    }

    #[test]
    fn completed_future_cannot_be_cancelled_natively() {
        let native = ResultFuture::<i32, String>::completed(42).as_native_future();
        assert!(!native.cancel(false));
        assert_eq!(native.get(), Ok(42));
    }

    #[test]
    fn get_wraps_cancellation_as_execution_error() {
        let future = ResultFuture::<i32, String>::new(CancelPolicy::Immediate);
        future.try_cancel();
        let err = future.as_native_future().get().unwrap_err();
        assert_eq!(err.cause(), &AwaitError::Cancelled(OperationCancellation));
    }

    #[test]
    fn get_wraps_failure_and_timeout() {
        let future = ResultFuture::<i32, String>::new(CancelPolicy::Never);
        let native = NativeFuture::from(future.clone());
        let timeout = Duration::from_millis(10);
        assert_eq!(
            native.get_timeout(timeout).unwrap_err().into_cause(),
            AwaitError::Timeout(timeout)
        );

        future
            .completable_result()
            .set_exception("compile error".to_string())
            .unwrap();
        assert_eq!(
            native.get().unwrap_err().into_cause(),
            AwaitError::Failed("compile error".to_string())
        );
    }

    #[test]
    fn dropped_native_future_releases_its_waker() {
        let future = ResultFuture::<i32, String>::new(CancelPolicy::Never);
        let mut cx = Context::from_waker(std::task::Waker::noop());
        for _ in 0..100 {
            let mut native = future.as_native_future();
            assert!(Pin::new(&mut native).poll(&mut cx).is_pending());
            assert!(Pin::new(&mut native).poll(&mut cx).is_pending());
            assert_eq!(future.completable_result().registered_wakers(), 1);
        }
        assert_eq!(future.completable_result().registered_wakers(), 0);

        let native = future.as_native_future();
        let mut cloned = native.clone();
        assert!(Pin::new(&mut cloned).poll(&mut cx).is_pending());
        drop(native);
        assert_eq!(future.completable_result().registered_wakers(), 1);
        drop(cloned);
        assert_eq!(future.completable_result().registered_wakers(), 0);
    }

    #[tokio::test]
    async fn timed_out_awaits_do_not_accumulate_wakers() {
        let future = ResultFuture::<i32, String>::new(CancelPolicy::Never);
        for _ in 0..10 {
            let attempt =
                tokio::time::timeout(Duration::from_millis(1), future.as_native_future()).await;
            assert!(attempt.is_err());
        }
        assert_eq!(future.completable_result().registered_wakers(), 0);
        future.completable_result().set_result(3).unwrap();
        assert_eq!(future.as_native_future().await, Ok(3));
    }

    #[tokio::test]
    async fn await_native_future_completed_from_thread() {
        let future = ResultFuture::<String, String>::new(CancelPolicy::Never);
        let producer = future.completable_result().clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.set_result("built".to_string()).unwrap();
        });
        assert_eq!(future.as_native_future().await, Ok("built".to_string()));
        handle.join().unwrap();
    }
}
