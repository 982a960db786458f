use std::{sync::Arc, thread, time::Duration};
use workpool::{TaskGroup, WorkerPool};

// Stand-in for an operation that completes on its own schedule and reports
// back through a callback.
fn network_task(pool: &WorkerPool, url: &'static str, complete: impl FnOnce() + Send + 'static) {
    println!("requesting {}", url);
    pool.submit_async(move || {
        thread::sleep(Duration::from_millis(200));
        complete();
    });
}

fn main() {
    let pool = WorkerPool::new(4);
    let group = Arc::new(TaskGroup::new());

    for url in ["http://www.xxx.xxx", "http://www.ooo.xxx"] {
        group.enter();
        let group_local = group.clone();
        network_task(&pool, url, move || {
            println!("{} finished", url);
            group_local.leave();
        });
    }

    group.notify(&pool, || {
        println!("both requests finished, refreshing");
    });

    group.wait();

    pool.submit_each(3, |index| println!("iteration {}", index));

    pool.shutdown();
}
