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
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;
use std::task::Waker;
use std::time::Duration;
use std::time::Instant;

use completable_error::AwaitError;
use completable_error::CompletionError;
use completable_error::CompletionResult;
use completable_error::OperationCancellation;
use parking_lot::Condvar;
use parking_lot::Mutex;
use strum::Display;
use strum::IntoStaticStr;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::interrupt::Interrupter;
use crate::interrupt::WakeWaiters;

/// Lifecycle of a [`CompletableResult`]. Leaves `Pending` exactly once; every other state is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ResultState {
    Pending,
    CompletedWithResult,
    CompletedWithError,
    Cancelled,
}

impl ResultState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != ResultState::Pending
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

enum Outcome<T, E> {
    Pending,
    Value(T),
    Error(E),
    Cancelled,
}

impl<T, E> Outcome<T, E> {
    fn state(&self) -> ResultState {
        match self {
            Outcome::Pending => ResultState::Pending,
            Outcome::Value(_) => ResultState::CompletedWithResult,
            Outcome::Error(_) => ResultState::CompletedWithError,
            Outcome::Cancelled => ResultState::Cancelled,
        }
    }

    /// What a waiter sees, or `None` while pending.
    fn observe(&self) -> Option<Result<T, AwaitError<E>>>
    where
        T: Clone,
        E: Clone,
    {
        match self {
            Outcome::Pending => None,
            Outcome::Value(value) => Some(Ok(value.clone())),
            Outcome::Error(error) => Some(Err(AwaitError::Failed(error.clone()))),
            Outcome::Cancelled => Some(Err(AwaitError::Cancelled(OperationCancellation))),
        }
    }
}

struct Slot<T, E> {
    outcome: Outcome<T, E>,
    /// Tasks polling through the async adapter. Keyed entries belong to one
    /// `NativeFuture` and are dropped with it.
    wakers: Vec<(Option<u64>, Waker)>,
}

struct Shared<T, E> {
    slot: Mutex<Slot<T, E>>,
    completed: Condvar,
    next_waker_key: AtomicU64,
}

impl<T, E> WakeWaiters for Shared<T, E>
where
    T: Send,
    E: Send,
{
    fn wake_waiters(&self) {
        let _slot = self.slot.lock();
        self.completed.notify_all();
    }
}

/// A single-assignment completion slot.
///
/// One producer completes the result exactly once with [`set_result`](Self::set_result),
/// [`set_exception`](Self::set_exception) or [`cancel`](Self::cancel). Any number of
/// consumers, on any thread, may block on it, poll it or wait with a timeout; every one of
/// them observes the same terminal outcome.
///
/// Cloning is cheap and shares the slot.
///
/// ```rust
/// use std::thread;
///
/// use completable::CompletableResult;
///
/// let result: CompletableResult<u32, String> = CompletableResult::new();
/// let producer = result.clone();
/// thread::spawn(move || producer.set_result(42)).join().unwrap().unwrap();
/// assert_eq!(result.await_result(), Ok(42));
/// ```
pub struct CompletableResult<T, E> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> CompletableResult<T, E> {
    pub fn new() -> Self {
        CompletableResult {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    outcome: Outcome::Pending,
                    wakers: Vec::new(),
                }),
                completed: Condvar::new(),
                next_waker_key: AtomicU64::new(0),
            }),
        }
    }

    /// Completes the result with `value`.
    ///
    /// # Errors
    ///
    /// [`CompletionError::IllegalState`] if the result is already terminal. The slot is left
    /// untouched and `value` is dropped.
    pub fn set_result(&self, value: T) -> CompletionResult<()> {
        self.complete("set_result", Outcome::Value(value))
    }

    /// Completes the result with `error`. Same contract as [`set_result`](Self::set_result).
    pub fn set_exception(&self, error: E) -> CompletionResult<()> {
        self.complete("set_exception", Outcome::Error(error))
    }

    /// Cancels the result if it is still pending. Returns `false` when it already reached a
    /// terminal state, which is left as it was.
    pub fn cancel(&self) -> bool {
        match self.transition(Outcome::Cancelled) {
            Ok(_) => {
                debug!("result cancelled");
                true
            }
            Err(state) => {
                trace!(state = %state, "cancel ignored, result already terminal");
                false
            }
        }
    }

    /// Runs `computation` on the calling thread, outside the slot lock, and completes the
    /// result with its outcome.
    pub fn complete_with<F>(&self, computation: F) -> CompletionResult<()>
    where
        F: FnOnce() -> Result<T, E>,
    {
        match computation() {
            Ok(value) => self.set_result(value),
            Err(error) => self.set_exception(error),
        }
    }

    pub fn state(&self) -> ResultState {
        self.shared.slot.lock().outcome.state()
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.state().is_terminal()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.state() == ResultState::Cancelled
    }

    #[inline]
    pub fn is_completed_with_result(&self) -> bool {
        self.state() == ResultState::CompletedWithResult
    }

    #[inline]
    pub fn is_completed_with_error(&self) -> bool {
        self.state() == ResultState::CompletedWithError
    }

    /// Completes the result with the producer's `outcome` unless it was cancelled, checking and
    /// storing in one critical section. Returns whether the outcome was stored; a cancelled
    /// result silently discards it.
    ///
    /// # Errors
    ///
    /// [`CompletionError::IllegalState`] if the result already holds a value or an error.
    pub fn complete_unless_cancelled(&self, outcome: Result<T, E>) -> CompletionResult<bool> {
        let (operation, outcome) = match outcome {
            Ok(value) => ("set_result", Outcome::Value(value)),
            Err(error) => ("set_exception", Outcome::Error(error)),
        };
        match self.transition(outcome) {
            Ok(state) => {
                debug!(operation, state = %state, "result completed");
                Ok(true)
            }
            Err(ResultState::Cancelled) => {
                debug!(operation, "outcome discarded, result was cancelled");
                Ok(false)
            }
            Err(state) => Err(Self::reject(operation, state)),
        }
    }

    fn complete(&self, operation: &'static str, outcome: Outcome<T, E>) -> CompletionResult<()> {
        match self.transition(outcome) {
            Ok(state) => {
                debug!(operation, state = %state, "result completed");
                Ok(())
            }
            Err(state) => Err(Self::reject(operation, state)),
        }
    }

    fn reject(operation: &'static str, state: ResultState) -> CompletionError {
        warn!(
            operation,
            state = %state,
            "rejected second completion of an already completed result"
        );
        CompletionError::illegal_state(operation, state.as_str())
    }

    pub(crate) fn allocate_waker_key(&self) -> u64 {
        self.shared.next_waker_key.fetch_add(1, Ordering::Relaxed)
    }

    /// Drops the waker registered under `key`, if the result is still pending.
    pub(crate) fn forget_waker(&self, key: u64) {
        self.shared
            .slot
            .lock()
            .wakers
            .retain(|(owner, _)| *owner != Some(key));
    }

    #[cfg(test)]
    pub(crate) fn registered_wakers(&self) -> usize {
        self.shared.slot.lock().wakers.len()
    }

    /// Moves the slot out of `Pending` and wakes every waiter. Returns the new state, or the
    /// state that was already there when the slot was terminal.
    fn transition(&self, outcome: Outcome<T, E>) -> Result<ResultState, ResultState> {
        let next = outcome.state();
        let wakers = {
            let mut slot = self.shared.slot.lock();
            let current = slot.outcome.state();
            if current.is_terminal() {
                return Err(current);
            }
            slot.outcome = outcome;
            self.shared.completed.notify_all();
            std::mem::take(&mut slot.wakers)
        };
        wakers.into_iter().for_each(|(_, waker)| waker.wake());
        Ok(next)
    }
}

impl<T, E> CompletableResult<T, E>
where
    T: Clone,
    E: Clone,
{
    /// Blocks until the result is terminal.
    ///
    /// Returns the value, [`AwaitError::Failed`] with the producer's error, or
    /// [`AwaitError::Cancelled`]. May be called any number of times from any number of
    /// threads; every call sees the same outcome.
    pub fn await_result(&self) -> Result<T, AwaitError<E>> {
        self.wait_for_outcome(None, None)
    }

    /// Like [`await_result`](Self::await_result), but gives up with [`AwaitError::Timeout`]
    /// once `timeout` elapses. The result itself is not affected and may still complete.
    pub fn await_result_timeout(&self, timeout: Duration) -> Result<T, AwaitError<E>> {
        self.wait_for_outcome(Some(timeout), None)
    }

    /// Untimed wait for `None`, timed wait otherwise.
    pub fn await_result_with(&self, timeout: Option<Duration>) -> Result<T, AwaitError<E>> {
        self.wait_for_outcome(timeout, None)
    }

    /// Returns the outcome if the result is terminal, without blocking.
    pub fn try_result(&self) -> Option<Result<T, AwaitError<E>>> {
        self.shared.slot.lock().outcome.observe()
    }

    /// Async observation: ready once the result is terminal, otherwise registers the task's
    /// waker to be woken on completion. A waker that would wake the same task as one already
    /// registered is not added again; registrations are released on completion.
    pub fn poll_result(&self, cx: &mut Context<'_>) -> Poll<Result<T, AwaitError<E>>> {
        self.poll_with(None, cx)
    }

    /// Like [`poll_result`](Self::poll_result), but keeps at most one waker per `key` so the
    /// owner can release it with [`forget_waker`](Self::forget_waker).
    pub(crate) fn poll_result_keyed(
        &self,
        key: u64,
        cx: &mut Context<'_>,
    ) -> Poll<Result<T, AwaitError<E>>> {
        self.poll_with(Some(key), cx)
    }

    fn poll_with(
        &self,
        key: Option<u64>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<T, AwaitError<E>>> {
        let mut slot = self.shared.slot.lock();
        if let Some(outcome) = slot.outcome.observe() {
            return Poll::Ready(outcome);
        }
        let registered = match key {
            Some(_) => slot.wakers.iter().position(|(owner, _)| *owner == key),
            None => slot
                .wakers
                .iter()
                .position(|(owner, waker)| owner.is_none() && waker.will_wake(cx.waker())),
        };
        match registered {
            Some(index) => {
                let waker = &mut slot.wakers[index].1;
                if !waker.will_wake(cx.waker()) {
                    *waker = cx.waker().clone();
                }
            }
            None => slot.wakers.push((key, cx.waker().clone())),
        }
        Poll::Pending
    }

    fn wait_for_outcome(
        &self,
        timeout: Option<Duration>,
        interrupter: Option<&Interrupter>,
    ) -> Result<T, AwaitError<E>> {
        let deadline = timeout.and_then(|timeout| Instant::now().checked_add(timeout));
        let mut slot = self.shared.slot.lock();
        loop {
            if let Some(outcome) = slot.outcome.observe() {
                return outcome;
            }
            if interrupter.is_some_and(Interrupter::take_interrupt) {
                trace!("wait interrupted");
                return Err(AwaitError::Interrupted);
            }
            match (deadline, timeout) {
                (Some(deadline), Some(timeout)) => {
                    if self.shared.completed.wait_until(&mut slot, deadline).timed_out() {
                        if let Some(outcome) = slot.outcome.observe() {
                            return outcome;
                        }
                        trace!(?timeout, "wait timed out");
                        return Err(AwaitError::Timeout(timeout));
                    }
                }
                _ => self.shared.completed.wait(&mut slot),
            }
        }
    }
}

impl<T, E> CompletableResult<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Like [`await_result`](Self::await_result), but fails with [`AwaitError::Interrupted`]
    /// when `interrupter` is triggered while the result is still pending. Only this call is
    /// affected; the interrupt is consumed by it.
    pub fn await_result_interruptibly(&self, interrupter: &Interrupter) -> Result<T, AwaitError<E>> {
        let _parked = interrupter.park_on(self.shared.clone());
        self.wait_for_outcome(None, Some(interrupter))
    }

    pub fn await_result_interruptibly_timeout(
        &self,
        interrupter: &Interrupter,
        timeout: Duration,
    ) -> Result<T, AwaitError<E>> {
        let _parked = interrupter.park_on(self.shared.clone());
        self.wait_for_outcome(Some(timeout), Some(interrupter))
    }
}

impl<T, E> Clone for CompletableResult<T, E> {
    fn clone(&self) -> Self {
        CompletableResult {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> Default for CompletableResult<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for CompletableResult<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletableResult")
            .field("state", &self.state())
            .finish()
    }
}
