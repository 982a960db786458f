use std::{mem, ptr, sync::atomic::AtomicU32, time::Duration};

/*--------------------------------------------------------------------------------*/

#[inline]
fn futex_wait(atomic: &AtomicU32, expected_not: u32, timeout: *const libc::timespec) {
    let address: *const AtomicU32 = atomic;
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            address,
            libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
            expected_not,
            timeout,
        );
    }
}

#[inline]
pub fn wait_not(atomic: &AtomicU32, expected_not: u32) {
    futex_wait(atomic, expected_not, ptr::null());
}

#[inline]
pub fn wait_not_for(atomic: &AtomicU32, expected_not: u32, timeout: Duration) {
    let mut timespec: libc::timespec = unsafe { mem::zeroed() };
    timespec.tv_sec = timeout.as_secs().min(libc::time_t::MAX as u64) as libc::time_t;
    timespec.tv_nsec = timeout.subsec_nanos() as _;
    futex_wait(atomic, expected_not, &timespec);
}

#[inline]
pub fn wake_one(atomic: &AtomicU32) {
    let address: *const AtomicU32 = atomic;
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            address,
            libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
            1i32,
        );
    }
}

#[inline]
pub fn wake_all(atomic: &AtomicU32) {
    let address: *const AtomicU32 = atomic;
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            address,
            libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
            i32::MAX,
        );
    }
}
