pub(crate) mod job_queue;
mod worker;

use std::sync::{atomic, Arc};

use crate::atomic::WaitableAtomicU32;

use job_queue::JobQueue;
use worker::Worker;

/*------------------------------------------*/

/// A single unit of submitted work with no return value. Owned by the queue
/// until a worker dequeues it, then consumed by that worker exactly once.
pub trait WorkItem: Send {
    fn run(self: Box<Self>);
}

/*------------------------------------------*/

pub(crate) struct ClosureItem<TFuncType: FnOnce() + Send> {
    func: TFuncType,
}

impl<TFuncType: FnOnce() + Send> ClosureItem<TFuncType> {
    pub fn new(func: TFuncType) -> Self {
        Self { func }
    }
}

impl<TFuncType: FnOnce() + Send> WorkItem for ClosureItem<TFuncType> {
    fn run(self: Box<Self>) {
        (self.func)();
    }
}

/*------------------------------------------*/

// Both guards signal from their Drop impl so that a panicking work item
// still releases whoever is blocked on it.

struct CompletionGate(Arc<WaitableAtomicU32>);

impl Drop for CompletionGate {
    fn drop(&mut self) {
        self.0.store(1, atomic::Ordering::Release);
        self.0.wake_all();
    }
}

struct RemainingGuard(Arc<WaitableAtomicU32>);

impl Drop for RemainingGuard {
    fn drop(&mut self) {
        if self.0.fetch_sub(1, atomic::Ordering::AcqRel) == 1 {
            self.0.wake_all();
        }
    }
}

/*------------------------------------------*/

/// A fixed set of worker threads pulling work items from a shared FIFO
/// queue. Items submitted to the same pool start in submission order.
pub struct WorkerPool {
    job_queue: Arc<JobQueue>,
    workers: Vec<Worker>,
}

impl WorkerPool {
    const WAIT_YIELD_COUNT: u32 = 64;

    pub fn new(worker_count: usize) -> Self {
        debug_assert!(worker_count > 0, "Worker count can't be 0.");

        let job_queue = Arc::new(JobQueue::new());

        let workers = (0..worker_count.max(1))
            .map(|index| Worker::new(index, job_queue.clone()))
            .collect();

        Self { job_queue, workers }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn submit<TItem: WorkItem + 'static>(&self, item: TItem) {
        self.job_queue.push_job(item);
    }

    /// Enqueues `func` and returns immediately; no guarantee the item has
    /// started or finished by the time this returns. A fault inside the item
    /// is logged and lost, never propagated back to the submitter.
    pub fn submit_async<TFuncType: FnOnce() + Send + 'static>(&self, func: TFuncType) {
        self.submit(ClosureItem::new(func));
    }

    /// Runs `func` on a worker (not the calling thread) and returns only
    /// once it has completed. The caller is released even if `func` panics;
    /// the fault itself is not propagated.
    ///
    /// Calling this from the only worker thread of this pool deadlocks: the
    /// item can never be dequeued while its submitter blocks the worker.
    pub fn submit_sync<TFuncType: FnOnce() + Send + 'static>(&self, func: TFuncType) {
        let gate = Arc::new(WaitableAtomicU32::new(0));

        let gate_local = gate.clone();
        self.submit_async(move || {
            let _open_when_done = CompletionGate(gate_local);
            func();
        });

        gate.wait_not(0, Self::WAIT_YIELD_COUNT);
    }

    /// Runs `func(index)` for every index in `[0, n)`, distributed across
    /// the workers, and returns once all `n` invocations have completed.
    /// Which worker runs which index, and in which order they finish, is
    /// unspecified.
    pub fn submit_each<TFuncType>(&self, n: usize, func: TFuncType)
    where
        TFuncType: Fn(usize) + Send + Sync + 'static,
    {
        if n == 0 {
            return;
        }
        debug_assert!(n <= u32::MAX as usize);

        let remaining = Arc::new(WaitableAtomicU32::new(n as u32));
        let shared_func = Arc::new(func);

        for index in 0..n {
            let remaining_local = remaining.clone();
            let func_local = shared_func.clone();
            self.submit_async(move || {
                let _count_down = RemainingGuard(remaining_local);
                func_local(index);
            });
        }

        remaining.wait_until(|value| value == 0, Self::WAIT_YIELD_COUNT);
    }

    /// Stops the workers from dequeuing further items. Items already being
    /// executed run to completion; newly submitted items queue up.
    pub fn suspend(&self) {
        self.job_queue.suspend();
    }

    pub fn resume(&self) {
        self.job_queue.resume();
    }

    pub(crate) fn queue_handle(&self) -> Arc<JobQueue> {
        self.job_queue.clone()
    }

    /// Drains the remaining queued items and joins the workers. Dropping
    /// the pool does the same.
    pub fn shutdown(mut self) {
        self.join_workers();
    }

    fn join_workers(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.job_queue.flag_exit();
        for worker in self.workers.drain(..) {
            worker.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.join_workers();
    }
}

/*------------------------------------------*/

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicBool, AtomicUsize, Ordering},
            mpsc, Arc,
        },
        thread,
        time::Duration,
    };

    use super::WorkerPool;

    #[test]
    fn submit_async_runs_the_item() {
        let pool = WorkerPool::new(2);
        let (sender, receiver) = mpsc::channel();

        pool.submit_async(move || {
            sender.send(42u32).unwrap();
        });

        assert_eq!(receiver.recv_timeout(Duration::from_secs(5)).unwrap(), 42);
    }

    #[test]
    fn submit_sync_returns_after_completion() {
        let pool = WorkerPool::new(2);
        let ran = Arc::new(AtomicBool::new(false));

        let ran_local = ran.clone();
        pool.submit_sync(move || {
            thread::sleep(Duration::from_millis(20));
            ran_local.store(true, Ordering::Release);
        });

        assert!(ran.load(Ordering::Acquire));
    }

    #[test]
    fn submit_sync_releases_caller_when_item_panics() {
        let pool = WorkerPool::new(2);
        pool.submit_sync(|| panic!("inside the item"));
        // Reaching this point is the assertion.
    }

    #[test]
    fn submit_each_covers_every_index_exactly_once() {
        let pool = WorkerPool::new(4);
        let hits: Arc<Vec<AtomicUsize>> =
            Arc::new((0..3).map(|_| AtomicUsize::new(0)).collect());

        let hits_local = hits.clone();
        pool.submit_each(3, move |index| {
            hits_local[index].fetch_add(1, Ordering::SeqCst);
        });

        for hit in hits.iter() {
            assert_eq!(hit.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn submit_each_with_zero_iterations_returns_immediately() {
        let pool = WorkerPool::new(2);
        pool.submit_each(0, |_| panic!("must not run"));
    }

    #[test]
    fn single_worker_runs_items_in_submission_order() {
        let pool = WorkerPool::new(1);
        let (sender, receiver) = mpsc::channel();

        for value in 0..16 {
            let sender_local = sender.clone();
            pool.submit_async(move || {
                sender_local.send(value).unwrap();
            });
        }
        drop(sender);
        pool.shutdown();

        let received: Vec<i32> = receiver.iter().collect();
        assert_eq!(received, (0..16).collect::<Vec<i32>>());
    }

    #[test]
    fn panicking_item_does_not_kill_its_worker() {
        let pool = WorkerPool::new(1);
        let (sender, receiver) = mpsc::channel();

        pool.submit_async(|| panic!("first item blows up"));
        pool.submit_async(move || {
            sender.send("still alive").unwrap();
        });

        assert_eq!(
            receiver.recv_timeout(Duration::from_secs(5)).unwrap(),
            "still alive"
        );
    }

    #[test]
    fn suspend_defers_execution_until_resume() {
        let pool = WorkerPool::new(2);
        let ran = Arc::new(AtomicBool::new(false));

        pool.suspend();
        let ran_local = ran.clone();
        pool.submit_async(move || {
            ran_local.store(true, Ordering::Release);
        });

        thread::sleep(Duration::from_millis(50));
        assert!(!ran.load(Ordering::Acquire));

        pool.resume();
        pool.shutdown();
        assert!(ran.load(Ordering::Acquire));
    }

    #[test]
    fn shutdown_drains_queued_items() {
        let pool = WorkerPool::new(1);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..32 {
            let counter_local = counter.clone();
            pool.submit_async(move || {
                counter_local.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.shutdown();

        assert_eq!(counter.load(Ordering::SeqCst), 32);
    }
}
