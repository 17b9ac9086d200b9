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

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use completable_common::CompletableConfig;
use completable_error::AwaitError;
use completable_error::CompletionResult;
use tracing::debug;

use crate::native_future::NativeFuture;
use crate::CompletableResult;
use crate::Interrupter;

type CancelFn<T, E> = dyn Fn(&CompletableResult<T, E>) -> bool + Send + Sync;

/// How a [`ResultFuture`] answers [`try_cancel`](ResultFuture::try_cancel).
///
/// Cancellation is advisory: a policy can only cancel a result that is still pending and never
/// stops work that is already running.
pub enum CancelPolicy<T, E> {
    /// Cancellation is never honored.
    Never,
    /// Cancels the result right away if it is still pending.
    Immediate,
    /// Only records the request. The producer checks
    /// [`is_cancel_requested`](ResultFuture::is_cancel_requested) and cancels its result when
    /// it reaches a point where that is safe.
    Deferred,
    /// The producer decides, and cancels the result itself when it agrees.
    Custom(Arc<CancelFn<T, E>>),
}

impl<T, E> CancelPolicy<T, E> {
    pub fn custom<F>(decide: F) -> Self
    where
        F: Fn(&CompletableResult<T, E>) -> bool + Send + Sync + 'static,
    {
        CancelPolicy::Custom(Arc::new(decide))
    }

    fn try_cancel(&self, result: &CompletableResult<T, E>) -> bool {
        match self {
            CancelPolicy::Never | CancelPolicy::Deferred => false,
            CancelPolicy::Immediate => result.cancel(),
            CancelPolicy::Custom(decide) => decide(result),
        }
    }

    /// Acts on a cancel request recorded before the computation started. Returns whether the
    /// result is cancelled afterwards.
    fn honor_request(&self, result: &CompletableResult<T, E>) -> bool {
        match self {
            CancelPolicy::Never => false,
            CancelPolicy::Immediate | CancelPolicy::Deferred => {
                result.cancel();
                result.is_cancelled()
            }
            CancelPolicy::Custom(decide) => {
                decide(result);
                result.is_cancelled()
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            CancelPolicy::Never => "never",
            CancelPolicy::Immediate => "immediate",
            CancelPolicy::Deferred => "deferred",
            CancelPolicy::Custom(_) => "custom",
        }
    }
}

impl<T, E> Clone for CancelPolicy<T, E> {
    fn clone(&self) -> Self {
        match self {
            CancelPolicy::Never => CancelPolicy::Never,
            CancelPolicy::Immediate => CancelPolicy::Immediate,
            CancelPolicy::Deferred => CancelPolicy::Deferred,
            CancelPolicy::Custom(decide) => CancelPolicy::Custom(Arc::clone(decide)),
        }
    }
}

impl<T, E> fmt::Debug for CancelPolicy<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Consumer-facing handle on a [`CompletableResult`].
///
/// Queries and waits delegate to the shared result; cancellation requests go through the
/// producer's [`CancelPolicy`]. Clones share both the result and the cancellation request.
pub struct ResultFuture<T, E> {
    result: CompletableResult<T, E>,
    cancel_policy: CancelPolicy<T, E>,
    cancel_requested: Arc<AtomicBool>,
}

impl<T, E> ResultFuture<T, E> {
    /// A future over a fresh pending result.
    pub fn new(cancel_policy: CancelPolicy<T, E>) -> Self {
        Self::with_result(CompletableResult::new(), cancel_policy)
    }

    /// A future over an existing result, typically a clone kept by the producer.
    pub fn with_result(result: CompletableResult<T, E>, cancel_policy: CancelPolicy<T, E>) -> Self {
        ResultFuture {
            result,
            cancel_policy,
            cancel_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A future that already holds `value`. Waits return immediately and
    /// [`try_cancel`](Self::try_cancel) is always `false`.
    pub fn completed(value: T) -> Self {
        let result = CompletableResult::new();
        let future = Self::with_result(result, CancelPolicy::Never);
        let completed = future.result.set_result(value);
        debug_assert!(completed.is_ok(), "a fresh result is pending");
        future
    }

    #[inline]
    pub fn completable_result(&self) -> &CompletableResult<T, E> {
        &self.result
    }

    #[inline]
    pub fn cancel_policy(&self) -> &CancelPolicy<T, E> {
        &self.cancel_policy
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.result.is_done()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.result.is_cancelled()
    }

    #[inline]
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::Acquire)
    }

    /// Requests cancellation and lets the policy decide whether to honor it now. Returns
    /// whether the result was cancelled by this call.
    pub fn try_cancel(&self) -> bool {
        self.cancel_requested.store(true, Ordering::Release);
        let cancelled = self.cancel_policy.try_cancel(&self.result);
        debug!(
            policy = self.cancel_policy.name(),
            cancelled, "cancellation requested"
        );
        cancelled
    }

    /// Runs the producer's computation on the calling thread and completes the result with
    /// its outcome.
    ///
    /// A computation whose cancellation was already requested is skipped when the policy
    /// honors the request: `Immediate` and `Deferred` cancel the result, `Custom` asks its
    /// closure again and skips only if the result ends up cancelled, `Never` always runs.
    /// When the result is cancelled while the computation runs, its outcome is discarded.
    pub fn run<F>(&self, computation: F) -> CompletionResult<()>
    where
        F: FnOnce(&Self) -> Result<T, E>,
    {
        if self.result.is_cancelled() {
            debug!("result cancelled before computation started");
            return Ok(());
        }
        if self.is_cancel_requested() && self.cancel_policy.honor_request(&self.result) {
            debug!("computation skipped, cancellation was requested");
            return Ok(());
        }
        let outcome = computation(self);
        self.result.complete_unless_cancelled(outcome).map(|_| ())
    }

    pub fn as_native_future(&self) -> NativeFuture<T, E> {
        NativeFuture::new(self.clone())
    }
}

impl<T, E> ResultFuture<T, E>
where
    T: Clone,
    E: Clone,
{
    pub fn await_result(&self) -> Result<T, AwaitError<E>> {
        self.result.await_result()
    }

    pub fn await_result_timeout(&self, timeout: Duration) -> Result<T, AwaitError<E>> {
        self.result.await_result_timeout(timeout)
    }

    pub fn try_result(&self) -> Option<Result<T, AwaitError<E>>> {
        self.result.try_result()
    }

    /// Waits with the configured default timeout, or indefinitely when none is configured.
    pub fn await_configured(&self, config: &CompletableConfig) -> Result<T, AwaitError<E>> {
        self.result.await_result_with(config.await_timeout())
    }
}

impl<T, E> ResultFuture<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub fn await_result_interruptibly(&self, interrupter: &Interrupter) -> Result<T, AwaitError<E>> {
        self.result.await_result_interruptibly(interrupter)
    }

    pub fn await_result_interruptibly_timeout(
        &self,
        interrupter: &Interrupter,
        timeout: Duration,
    ) -> Result<T, AwaitError<E>> {
        self.result
            .await_result_interruptibly_timeout(interrupter, timeout)
    }
}

impl<T, E> Clone for ResultFuture<T, E> {
    fn clone(&self) -> Self {
        ResultFuture {
            result: self.result.clone(),
            cancel_policy: self.cancel_policy.clone(),
            cancel_requested: Arc::clone(&self.cancel_requested),
        }
    }
}

impl<T, E> fmt::Debug for ResultFuture<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultFuture")
            .field("state", &self.result.state())
            .field("cancel_policy", &self.cancel_policy)
            .field("cancel_requested", &self.is_cancel_requested())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use completable_error::OperationCancellation;

    use super::*;
    use crate::ResultState;

    #[test]
    fn completed_future_returns_value_and_refuses_cancel() {
        let future = ResultFuture::<i32, String>::completed(42);
        assert!(future.is_done());
        assert_eq!(future.await_result(), Ok(42));
        assert!(!future.try_cancel());
        assert!(future.is_cancel_requested());
        assert!(!future.is_cancelled());
        assert_eq!(future.await_result(), Ok(42));
    }

    #[test]
    fn immediate_policy_cancels_pending_result() {
        let future = ResultFuture::<i32, String>::new(CancelPolicy::Immediate);
        assert!(future.try_cancel());
        assert!(future.is_cancelled());
        assert_eq!(
            future.await_result(),
            Err(AwaitError::Cancelled(OperationCancellation))
        );
        assert!(!future.try_cancel());
    }

    #[test]
    fn immediate_policy_loses_to_completed_result() {
        let future = ResultFuture::<i32, String>::new(CancelPolicy::Immediate);
        future.completable_result().set_result(9).unwrap();
        assert!(!future.try_cancel());
        assert_eq!(future.await_result(), Ok(9));
    }

    #[test]
    fn deferred_policy_only_records_request() {
        let future = ResultFuture::<i32, String>::new(CancelPolicy::Deferred);
        let consumer = future.clone();
        assert!(!consumer.try_cancel());
        assert!(future.is_cancel_requested());
        assert_eq!(future.completable_result().state(), ResultState::Pending);

        assert!(future.completable_result().cancel());
        assert!(consumer.is_cancelled());
    }

    #[test]
    fn custom_policy_decides() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let policy = CancelPolicy::custom(move |result: &CompletableResult<i32, String>| {
            seen.fetch_add(1, Ordering::SeqCst);
            result.cancel()
        });
        let future = ResultFuture::new(policy);
        assert!(future.try_cancel());
        assert!(!future.try_cancel());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn run_completes_with_computation_outcome() {
        let future = ResultFuture::<i32, String>::new(CancelPolicy::Deferred);
        future.run(|_| Ok(5)).unwrap();
        assert_eq!(future.await_result(), Ok(5));

        let failing = ResultFuture::<i32, String>::new(CancelPolicy::Deferred);
        failing.run(|_| Err("bad input".to_string())).unwrap();
        assert_eq!(
            failing.await_result(),
            Err(AwaitError::Failed("bad input".to_string()))
        );
    }

    #[test]
    fn run_skips_computation_after_cancel_request() {
        let future = ResultFuture::<i32, String>::new(CancelPolicy::Deferred);
        future.try_cancel();
        future
            .run(|_| panic!("computation must not run once cancellation was requested"))
            .unwrap();
        assert!(future.is_cancelled());
    }

    #[test]
    fn run_ignores_cancel_request_under_never_policy() {
        let future = ResultFuture::<i32, String>::new(CancelPolicy::Never);
        future.try_cancel();
        future.run(|_| Ok(1)).unwrap();
        assert_eq!(future.await_result(), Ok(1));
    }

    #[test]
    fn run_discards_outcome_when_cancelled_mid_computation() {
        let future = ResultFuture::<i32, String>::new(CancelPolicy::Immediate);
        future
            .run(|this| {
                assert!(this.try_cancel());
                Ok(3)
            })
            .unwrap();
        assert!(future.is_cancelled());
    }

    #[test]
    fn run_executes_when_custom_policy_refuses_cancel() {
        let future = ResultFuture::<i32, String>::new(CancelPolicy::custom(|_| false));
        assert!(!future.try_cancel());
        assert!(future.is_cancel_requested());
        future.run(|_| Ok(7)).unwrap();
        assert_eq!(future.await_result(), Ok(7));
    }

    #[test]
    fn run_skips_when_custom_policy_agrees_on_second_ask() {
        let asked = Arc::new(AtomicUsize::new(0));
        let counter = asked.clone();
        let policy = CancelPolicy::custom(move |result: &CompletableResult<i32, String>| {
            // Refuses while the request arrives, agrees once the producer checks again.
            counter.fetch_add(1, Ordering::SeqCst) > 0 && result.cancel()
        });
        let future = ResultFuture::new(policy);
        assert!(!future.try_cancel());
        future
            .run(|_| panic!("computation must not run once the policy agreed to cancel"))
            .unwrap();
        assert!(future.is_cancelled());
        assert_eq!(asked.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn run_racing_immediate_cancel_never_reports_illegal_state() {
        for _ in 0..2_000 {
            let future = ResultFuture::<i32, String>::new(CancelPolicy::Immediate);
            let barrier = Arc::new(std::sync::Barrier::new(2));
            let consumer = {
                let future = future.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    future.try_cancel()
                })
            };
            let ran = future.run(|_| {
                barrier.wait();
                Ok(1)
            });
            let cancelled = consumer.join().unwrap();

            assert_eq!(ran, Ok(()));
            match future.completable_result().state() {
                ResultState::Cancelled => assert!(cancelled),
                ResultState::CompletedWithResult => assert!(!cancelled),
                state => panic!("unexpected state {state}"),
            }
        }
    }

    #[test]
    fn run_on_completed_result_reports_illegal_state() {
        let future = ResultFuture::<i32, String>::completed(1);
        assert!(future.run(|_| Ok(2)).is_err());
        assert_eq!(future.await_result(), Ok(1));
    }

    #[test]
    fn await_configured_uses_configured_timeout() {
        let future = ResultFuture::<i32, String>::new(CancelPolicy::Never);
        let config = CompletableConfig {
            await_timeout_millis: 10,
            ..Default::default()
        };
        assert_eq!(
            future.await_configured(&config),
            Err(AwaitError::Timeout(Duration::from_millis(10)))
        );
        future.completable_result().set_result(4).unwrap();
        assert_eq!(future.await_configured(&CompletableConfig::default()), Ok(4));
    }

    #[test]
    fn debug_includes_policy() {
        let future = ResultFuture::<(), ()>::new(CancelPolicy::Deferred);
        let rendered = format!("{future:?}");
        assert!(rendered.contains("cancel_policy: deferred"));
        assert!(rendered.contains("state: Pending"));
    }
}
