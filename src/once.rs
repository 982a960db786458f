use std::{mem, sync::atomic};

use crate::atomic::WaitableAtomicU32;

/*------------------------------------------*/

const STATE_UNINIT: u32 = 0;
const STATE_RUNNING: u32 = 1;
const STATE_COMPLETE: u32 = 2;

/// An idempotent initialization guard: across any number of concurrent
/// first calls, the initializer runs exactly once and every caller returns
/// only after it has completed.
///
/// `new` is const so a flag can live in a static.
pub struct OnceFlag {
    state: WaitableAtomicU32,
}

impl OnceFlag {
    const WAIT_YIELD_COUNT: u32 = 64;

    pub const fn new() -> Self {
        Self {
            state: WaitableAtomicU32::new(STATE_UNINIT),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state.load(atomic::Ordering::Acquire) == STATE_COMPLETE
    }

    /// Runs `func` unless a prior call already completed; loser threads
    /// block until the winner finishes. A panicking initializer returns the
    /// flag to its initial state, so the next caller gets to retry (unlike
    /// `std::sync::Once`, which poisons).
    pub fn call_once<TFuncType: FnOnce()>(&self, func: TFuncType) {
        let mut func = Some(func);
        loop {
            match self.state.compare_exchange(
                STATE_UNINIT,
                STATE_RUNNING,
                atomic::Ordering::Acquire,
                atomic::Ordering::Acquire,
            ) {
                Ok(_) => {
                    let reset_on_unwind = ResetGuard(&self.state);
                    (func.take().unwrap())();
                    mem::forget(reset_on_unwind);

                    self.state.store(STATE_COMPLETE, atomic::Ordering::Release);
                    self.state.wake_all();
                    break;
                }
                Err(observed) => {
                    if observed == STATE_COMPLETE {
                        break;
                    }

                    let state = self
                        .state
                        .wait_until(|value| value != STATE_RUNNING, Self::WAIT_YIELD_COUNT);
                    if state == STATE_COMPLETE {
                        break;
                    }
                    // The running initializer unwound; race for the retry.
                }
            }
        }
    }
}

impl Default for OnceFlag {
    fn default() -> Self {
        Self::new()
    }
}

struct ResetGuard<'a>(&'a WaitableAtomicU32);

impl Drop for ResetGuard<'_> {
    fn drop(&mut self) {
        self.0.store(STATE_UNINIT, atomic::Ordering::Release);
        self.0.wake_all();
    }
}

/*------------------------------------------*/
