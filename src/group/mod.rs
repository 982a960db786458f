use std::{
    mem,
    sync::{atomic, Arc},
    time::Duration,
};

use crate::{
    atomic::{lock::spinlock::SpinLock, WaitableAtomicU32},
    pool::{job_queue::JobQueue, ClosureItem, WorkItem, WorkerPool},
};

/*------------------------------------------*/

struct Notification {
    queue: Arc<JobQueue>,
    item: Box<dyn WorkItem>,
}

/// A join barrier over outstanding work. `enter` counts a unit of work in,
/// `leave` counts it out; the transition back to zero wakes every `wait`er
/// and hands each registered notification to its target pool, exactly once.
///
/// The group holds no execution context of its own; the only queues it ever
/// touches are the ones passed into `notify` and `submit`. Once drained it
/// may be re-armed with fresh `enter` calls, starting a new cycle.
///
/// There is no way to abort work in flight: every `enter` must eventually be
/// balanced by a `leave`.
pub struct TaskGroup {
    pending: WaitableAtomicU32,
    notifications: SpinLock<Vec<Notification>>,
}

impl TaskGroup {
    const WAIT_YIELD_COUNT: u32 = 64;

    pub const fn new() -> Self {
        Self {
            pending: WaitableAtomicU32::new(0),
            notifications: SpinLock::new(Vec::new()),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pending.load(atomic::Ordering::Acquire) == 0
    }

    /// Counts one more outstanding unit of work into the group.
    pub fn enter(&self) {
        self.pending.fetch_add(1, atomic::Ordering::AcqRel);
    }

    /// Balances one `enter`.
    ///
    /// Calling `leave` without a matching prior `enter` is a contract
    /// violation and panics immediately, before any notification fires.
    pub fn leave(&self) {
        let previous = self.pending.fetch_sub(1, atomic::Ordering::AcqRel);
        assert!(
            previous > 0,
            "TaskGroup::leave called without a matching enter"
        );

        if previous == 1 {
            self.pending.wake_all();

            let drained = {
                let mut guarded_notifications = self.notifications.lock();
                mem::take(&mut *guarded_notifications)
            };
            for notification in drained {
                notification.queue.push_boxed(notification.item);
            }
        }
    }

    /// Registers `func` to run on `pool` once the group next becomes idle.
    /// If the group is idle already, `func` is enqueued right away; either
    /// way it runs on a worker, never inline on the calling thread.
    ///
    /// Callbacks registered after a drain belong to the next cycle only.
    pub fn notify<TFuncType: FnOnce() + Send + 'static>(&self, pool: &WorkerPool, func: TFuncType) {
        let queue = pool.queue_handle();
        let item: Box<dyn WorkItem> = Box::new(ClosureItem::new(func));

        // The pending check happens under the notification lock. A draining
        // `leave` takes the same lock after its decrement, so the callback
        // either lands in the list before the drain collects it or is seen
        // as late and enqueued here; it can be neither lost nor run twice.
        let mut guarded_notifications = self.notifications.lock();
        if self.pending.load(atomic::Ordering::Acquire) == 0 {
            drop(guarded_notifications);
            queue.push_boxed(item);
        } else {
            guarded_notifications.push(Notification { queue, item });
        }
    }

    /// Blocks until the group is idle; returns immediately if it already
    /// is. Safe to call from any number of threads, repeatedly; nothing is
    /// consumed or cleared.
    ///
    /// Waiting for items that can only run on the caller's own worker
    /// deadlocks, same as `WorkerPool::submit_sync`.
    pub fn wait(&self) {
        self.pending
            .wait_until(|value| value == 0, Self::WAIT_YIELD_COUNT);
    }

    /// Bounded `wait`. Returns `false` if the group was still draining when
    /// `timeout` elapsed; the outstanding count is left untouched.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.pending
            .wait_until_for(|value| value == 0, timeout)
            .is_some()
    }

    /// Submits `func` to `pool` as a counted member of this group: `enter`
    /// now, `leave` when the item finishes, even if `func` panics.
    pub fn submit<TFuncType: FnOnce() + Send + 'static>(
        self: &Arc<Self>,
        pool: &WorkerPool,
        func: TFuncType,
    ) {
        self.enter();
        let group_local = self.clone();
        pool.submit_async(move || {
            let _leave_when_done = LeaveGuard(group_local);
            func();
        });
    }
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

struct LeaveGuard(Arc<TaskGroup>);

impl Drop for LeaveGuard {
    fn drop(&mut self) {
        self.0.leave();
    }
}

/*------------------------------------------*/
