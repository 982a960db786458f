use std::{sync::atomic::AtomicU32, time::Duration};

use libc::{c_int, c_void};

/*--------------------------------------------------------------------------------*/

const UL_COMPARE_AND_WAIT: u32 = 1;
const ULF_WAKE_ALL: u32 = 0x100;
const ULF_NO_ERRNO: u32 = 0x1000000;

extern "C" {
    fn __ulock_wait(operation: u32, addr: *mut c_void, value: u64, timeout_us: u32) -> c_int;
    fn __ulock_wake(operation: u32, addr: *mut c_void, wake_value: u64) -> c_int;
}

#[inline]
fn address_of(atomic: &AtomicU32) -> *mut c_void {
    let address: *const AtomicU32 = atomic;
    address as *mut c_void
}

#[inline]
pub fn wait_not(atomic: &AtomicU32, expected_not: u32) {
    // A timeout of 0 means wait indefinitely.
    unsafe {
        __ulock_wait(
            UL_COMPARE_AND_WAIT | ULF_NO_ERRNO,
            address_of(atomic),
            expected_not as u64,
            0,
        );
    }
}

#[inline]
pub fn wait_not_for(atomic: &AtomicU32, expected_not: u32, timeout: Duration) {
    let timeout_us = timeout.as_micros().clamp(1, u32::MAX as u128) as u32;
    unsafe {
        __ulock_wait(
            UL_COMPARE_AND_WAIT | ULF_NO_ERRNO,
            address_of(atomic),
            expected_not as u64,
            timeout_us,
        );
    }
}

#[inline]
pub fn wake_one(atomic: &AtomicU32) {
    unsafe {
        __ulock_wake(UL_COMPARE_AND_WAIT | ULF_NO_ERRNO, address_of(atomic), 0);
    }
}

#[inline]
pub fn wake_all(atomic: &AtomicU32) {
    unsafe {
        __ulock_wake(
            UL_COMPARE_AND_WAIT | ULF_NO_ERRNO | ULF_WAKE_ALL,
            address_of(atomic),
            0,
        );
    }
}
