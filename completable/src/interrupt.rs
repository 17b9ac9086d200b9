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

use parking_lot::Mutex;
use tracing::trace;

/// Something with blocked waiters that can be woken so they re-check their condition.
pub(crate) trait WakeWaiters: Send + Sync {
    fn wake_waiters(&self);
}

/// Interruption signal for a blocking wait.
///
/// Threads cannot be interrupted from the outside, so a waiter that wants to be
/// interruptible hands an `Interrupter` to
/// [`await_result_interruptibly`](crate::CompletableResult::await_result_interruptibly) and
/// another thread calls [`interrupt`](Self::interrupt) on a clone. The blocked call then fails
/// with [`AwaitError::Interrupted`](completable_error::AwaitError::Interrupted) and consumes the
/// signal. Neither the awaited result nor its other waiters are affected.
///
/// An interrupter stands for one waiting thread: it should be parked on one wait at a time.
#[derive(Clone, Default)]
pub struct Interrupter {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    interrupted: AtomicBool,
    parked_on: Mutex<Option<Arc<dyn WakeWaiters>>>,
}

impl Interrupter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal and wakes the wait currently parked on it, if any. A signal raised
    /// while nothing waits is kept until the next interruptible wait observes it.
    pub fn interrupt(&self) {
        self.inner.interrupted.store(true, Ordering::SeqCst);
        let parked = self.inner.parked_on.lock().clone();
        if let Some(waiters) = parked {
            trace!("waking interrupted waiter");
            waiters.wake_waiters();
        }
    }

    #[inline]
    pub fn is_interrupted(&self) -> bool {
        self.inner.interrupted.load(Ordering::SeqCst)
    }

    /// Clears the signal, returning whether it was raised.
    #[inline]
    pub fn clear(&self) -> bool {
        self.take_interrupt()
    }

    pub(crate) fn take_interrupt(&self) -> bool {
        self.inner.interrupted.swap(false, Ordering::SeqCst)
    }

    /// Registers `waiters` as the wait to wake on [`interrupt`](Self::interrupt) until the
    /// returned guard is dropped. Must happen before the waiter checks the signal under its
    /// own lock, so an interrupt is either seen by that check or wakes the parked waiter.
    pub(crate) fn park_on(&self, waiters: Arc<dyn WakeWaiters>) -> Parked<'_> {
        *self.inner.parked_on.lock() = Some(waiters);
        Parked { interrupter: self }
    }
}

impl fmt::Debug for Interrupter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interrupter")
            .field("interrupted", &self.is_interrupted())
            .finish()
    }
}

pub(crate) struct Parked<'a> {
    interrupter: &'a Interrupter,
}

impl Drop for Parked<'_> {
    fn drop(&mut self) {
        *self.interrupter.inner.parked_on.lock() = None;
    }
}
