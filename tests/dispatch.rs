use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc, Arc,
    },
    thread,
    time::Duration,
};

use workpool::{OnceFlag, TaskGroup, WorkerPool};

fn init_logging() {
    static LOGGING: OnceFlag = OnceFlag::new();
    LOGGING.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

#[test]
fn batch_of_deferred_completions_triggers_one_refresh() {
    init_logging();

    let pool = Arc::new(WorkerPool::new(4));
    let group = Arc::new(TaskGroup::new());
    let refreshes = Arc::new(AtomicUsize::new(0));
    let (sender, receiver) = mpsc::channel();

    // Two operations that finish on their own schedule, each balancing its
    // `enter` from inside its own completion path.
    for delay_ms in [15u64, 40] {
        group.enter();
        let group_local = group.clone();
        pool.submit_async(move || {
            thread::sleep(Duration::from_millis(delay_ms));
            group_local.leave();
        });
    }

    let refreshes_local = refreshes.clone();
    group.notify(&pool, move || {
        refreshes_local.fetch_add(1, Ordering::SeqCst);
        sender.send(()).unwrap();
    });

    group.wait();
    receiver.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
}

#[test]
fn grouped_submissions_then_parallel_iteration() {
    init_logging();

    let pool = WorkerPool::new(4);
    let group = Arc::new(TaskGroup::new());
    let completed = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let completed_local = completed.clone();
        group.submit(&pool, move || {
            completed_local.fetch_add(1, Ordering::SeqCst);
        });
    }
    group.wait();
    assert_eq!(completed.load(Ordering::SeqCst), 3);

    let sum = Arc::new(AtomicUsize::new(0));
    let sum_local = sum.clone();
    pool.submit_each(8, move |index| {
        sum_local.fetch_add(index, Ordering::SeqCst);
    });
    assert_eq!(sum.load(Ordering::SeqCst), (0..8).sum::<usize>());
}

#[test]
fn sync_submission_observes_prior_async_work_on_one_worker() {
    init_logging();

    let pool = WorkerPool::new(1);
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..4 {
        let counter_local = counter.clone();
        pool.submit_async(move || {
            counter_local.fetch_add(1, Ordering::SeqCst);
        });
    }

    // FIFO on a single worker: by the time the sync item runs, all four
    // async items before it have completed. The observation is shipped back
    // out because a failed assert inside a work item would only be logged.
    let observed = Arc::new(AtomicUsize::new(usize::MAX));
    let observed_local = observed.clone();
    let counter_local = counter.clone();
    pool.submit_sync(move || {
        observed_local.store(counter_local.load(Ordering::SeqCst), Ordering::SeqCst);
    });
    assert_eq!(observed.load(Ordering::SeqCst), 4);
}
