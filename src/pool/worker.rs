use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread::{self, JoinHandle},
};

use super::job_queue::{JobQueue, WorkEvent};

pub(crate) struct Worker {
    thread_handle: JoinHandle<()>,
}

impl Worker {
    pub fn new(index: usize, job_queue: Arc<JobQueue>) -> Self {
        let thread_handle = thread::Builder::new()
            .name(format!("workpool-worker-{}", index))
            .spawn(move || {
                log::trace!("worker {} starting", index);
                loop {
                    match job_queue.wait_event() {
                        WorkEvent::Available(job) => {
                            // A fault terminates the item, never the worker.
                            if let Err(payload) =
                                panic::catch_unwind(AssertUnwindSafe(|| job.run()))
                            {
                                log::warn!(
                                    "work item panicked: {}",
                                    panic_message(payload.as_ref())
                                );
                            }
                        }
                        WorkEvent::Exit => break,
                    }
                }
                log::trace!("worker {} exiting", index);
            })
            .unwrap();

        Self { thread_handle }
    }

    pub fn join(self) {
        self.thread_handle.join().unwrap();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "opaque panic payload"
    }
}
