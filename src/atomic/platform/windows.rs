use std::{mem, sync::atomic::AtomicU32, time::Duration};

use windows_sys::Win32::System::{
    Threading::{WaitOnAddress, WakeByAddressAll, WakeByAddressSingle},
    WindowsProgramming::INFINITE,
};

/*--------------------------------------------------------------------------------*/

#[inline]
fn wait_on_address(atomic: &AtomicU32, expected_not: u32, milliseconds: u32) {
    let address: *const AtomicU32 = atomic;
    let expected_not_address: *const u32 = &expected_not;
    unsafe {
        WaitOnAddress(
            address.cast(),
            expected_not_address.cast(),
            mem::size_of::<u32>(),
            milliseconds,
        );
    }
}

#[inline]
pub fn wait_not(atomic: &AtomicU32, expected_not: u32) {
    wait_on_address(atomic, expected_not, INFINITE);
}

#[inline]
pub fn wait_not_for(atomic: &AtomicU32, expected_not: u32, timeout: Duration) {
    let milliseconds = timeout.as_millis().clamp(1, (INFINITE - 1) as u128) as u32;
    wait_on_address(atomic, expected_not, milliseconds);
}

#[inline]
pub fn wake_one(atomic: &AtomicU32) {
    let address: *const AtomicU32 = atomic;
    unsafe { WakeByAddressSingle(address.cast()) };
}

#[inline]
pub fn wake_all(atomic: &AtomicU32) {
    let address: *const AtomicU32 = atomic;
    unsafe { WakeByAddressAll(address.cast()) };
}
