pub mod lock;
pub mod waitable;

mod platform;

pub use waitable::WaitableAtomicU32;
