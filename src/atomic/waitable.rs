use std::{
    ops::Deref,
    sync::atomic::{self, AtomicU32},
    thread,
    time::{Duration, Instant},
};

use super::platform::platform;

/*------------------------------------------------------------*/

/// A 32-bit atomic whose waiters park on the platform address-wait
/// primitive (futex on Linux, `__ulock_wait` on macOS, `WaitOnAddress` on
/// Windows) after an optional spin-yield phase.
pub struct WaitableAtomicU32 {
    atomic: AtomicU32,
}

impl WaitableAtomicU32 {
    pub const fn new(initial_value: u32) -> Self {
        Self {
            atomic: AtomicU32::new(initial_value),
        }
    }

    pub fn wake_one(&self) {
        platform::wake_one(&self.atomic);
    }

    pub fn wake_all(&self) {
        platform::wake_all(&self.atomic);
    }

    pub fn wait_exchange(
        &self,
        current: u32,
        new: u32,
        yield_count: u32,
        order_success: atomic::Ordering,
        order_failure: atomic::Ordering,
    ) {
        loop {
            if self
                .atomic
                .compare_exchange(current, new, order_success, order_failure)
                .is_ok()
            {
                break;
            }

            self.wait_until(move |value| value == current, yield_count);
        }
    }

    /// Blocks until the value differs from `expected_not`, yielding up to
    /// `yield_count` times before parking. The platform wait may wake
    /// spuriously, so the value is re-checked until it actually differs.
    pub fn wait_not(&self, expected_not: u32, yield_count: u32) -> u32 {
        let mut loop_count: u32 = 0;
        loop {
            let value = self.atomic.load(atomic::Ordering::Acquire);
            if value != expected_not {
                break value;
            }

            if loop_count < yield_count {
                thread::yield_now();
                loop_count += 1;
            } else {
                platform::wait_not(&self.atomic, expected_not);
            }
        }
    }

    pub fn wait_until<TCheckFuncType>(&self, check_functor: TCheckFuncType, yield_count: u32) -> u32
    where
        TCheckFuncType: Fn(u32) -> bool,
    {
        let mut curr = self.atomic.load(atomic::Ordering::Acquire);
        loop {
            if check_functor(curr) {
                break curr;
            } else {
                curr = self.wait_not(curr, yield_count);
            }
        }
    }

    /// Bounded variant of `wait_until`. Returns `None` if the check never
    /// passed within `timeout`.
    pub fn wait_until_for<TCheckFuncType>(
        &self,
        check_functor: TCheckFuncType,
        timeout: Duration,
    ) -> Option<u32>
    where
        TCheckFuncType: Fn(u32) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            let value = self.atomic.load(atomic::Ordering::Acquire);
            if check_functor(value) {
                break Some(value);
            }

            let now = Instant::now();
            if now >= deadline {
                break None;
            }

            platform::wait_not_for(&self.atomic, value, deadline - now);
        }
    }
}

impl Deref for WaitableAtomicU32 {
    type Target = AtomicU32;

    fn deref(&self) -> &Self::Target {
        &self.atomic
    }
}

/*------------------------------------------------------------*/
