//! Worker pool with task-group join barriers, built on futex-backed
//! waitable atomics.

pub mod atomic;
pub mod group;
pub mod once;
pub mod pool;

pub use group::TaskGroup;
pub use once::OnceFlag;
pub use pool::{WorkItem, WorkerPool};
