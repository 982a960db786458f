use std::{collections::VecDeque, sync::atomic};

use crate::atomic::{lock::spinlock::SpinLock, WaitableAtomicU32};

use super::WorkItem;

/*------------------------------------------------------------*/

pub(crate) enum WorkEvent {
    Available(Box<dyn WorkItem>),
    Exit,
}

/*------------------------------------------------------------*/

pub(crate) struct JobQueue {
    job_queue: SpinLock<VecDeque<Box<dyn WorkItem>>>,
    state: WaitableAtomicU32,
}

impl JobQueue {
    const FLAG_WORK_AVAILABLE: u32 = 0b001;
    const FLAG_EXIT: u32 = 0b010;
    const FLAG_SUSPENDED: u32 = 0b100;

    pub fn new() -> Self {
        Self {
            job_queue: SpinLock::new(VecDeque::new()),
            state: WaitableAtomicU32::new(0),
        }
    }

    pub fn flag_exit(&self) {
        // Exit lifts suspension, otherwise the drain below could never finish.
        self.state
            .fetch_and(!Self::FLAG_SUSPENDED, atomic::Ordering::Release);
        self.state.fetch_or(Self::FLAG_EXIT, atomic::Ordering::Release);
        self.state.wake_all();
    }

    pub fn suspend(&self) {
        self.state
            .fetch_or(Self::FLAG_SUSPENDED, atomic::Ordering::Release);
    }

    pub fn resume(&self) {
        self.state
            .fetch_and(!Self::FLAG_SUSPENDED, atomic::Ordering::Release);
        self.state.wake_all();
    }

    pub fn wait_event(&self) -> WorkEvent {
        loop {
            let state = self.state.wait_until(
                |state| {
                    state & Self::FLAG_EXIT != 0
                        || (state & Self::FLAG_WORK_AVAILABLE != 0
                            && state & Self::FLAG_SUSPENDED == 0)
                },
                0,
            );

            if state & Self::FLAG_WORK_AVAILABLE != 0 && state & Self::FLAG_SUSPENDED == 0 {
                let mut guarded_job_queue = self.job_queue.lock();
                match guarded_job_queue.pop_front() {
                    Some(job) => {
                        if guarded_job_queue.is_empty() {
                            self.state
                                .fetch_and(!Self::FLAG_WORK_AVAILABLE, atomic::Ordering::Relaxed);
                        }

                        break WorkEvent::Available(job);
                    }
                    None => {
                        // Last job was claimed by a different worker, return to the waiting state.
                    }
                }
            } else if state & Self::FLAG_EXIT != 0 {
                // Queued work drains before the exit flag is honored.
                break WorkEvent::Exit;
            }
        }
    }

    pub fn push_job<TItem: WorkItem + 'static>(&self, job: TItem) {
        self.push_boxed(Box::new(job));
    }

    pub fn push_boxed(&self, job: Box<dyn WorkItem>) {
        let mut guarded_job_queue = self.job_queue.lock();
        guarded_job_queue.push_back(job);
        self.state
            .fetch_or(Self::FLAG_WORK_AVAILABLE, atomic::Ordering::Release);
        self.state.wake_one();
    }
}
