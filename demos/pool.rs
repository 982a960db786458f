use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use workpool::WorkerPool;

fn work_runner(worker_count: usize) -> Duration {
    let pool = WorkerPool::new(worker_count);

    let instant_start = Instant::now();
    let collector = Arc::new(AtomicU64::new(0));
    for _ in 0..100000 {
        let local_collector = collector.clone();
        pool.submit_async(move || {
            let mut val: u64 = 0;
            for i in 0..10000 {
                val = val.wrapping_mul(31).wrapping_add(i);
            }

            local_collector.fetch_add(val, Ordering::Relaxed);
        });
    }

    pool.shutdown();

    instant_start.elapsed()
}

fn main() {
    for worker_count in [1, 2, 4, 8, 16] {
        let duration = work_runner(worker_count);
        println!("Threads[{}]:\t Duration[{:.2?}]", worker_count, duration);
    }
}
