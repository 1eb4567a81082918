//! Fixed-size worker pool for request handlers.
//!
//! Jobs go through an unbounded crossbeam channel; each worker pulls the
//! next job as soon as it is free. Dropping the pool closes the channel and
//! waits for queued jobs to drain.

use crossbeam_channel::{unbounded, Sender};
use std::io;
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A pool of threads running boxed jobs.
#[derive(Debug)]
pub struct TaskPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl TaskPool {
    /// Spawn `threads` workers (at least one).
    pub fn new(threads: usize) -> io::Result<Self> {
        let (sender, receiver) = unbounded::<Job>();
        let workers = (0..threads.max(1))
            .map(|index| {
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("basiclang-worker-{index}"))
                    .spawn(move || {
                        for job in receiver {
                            job();
                        }
                    })
            })
            .collect::<io::Result<Vec<_>>>()?;

        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job.
    pub fn spawn(&self, job: impl FnOnce() + Send + 'static) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(Box::new(job)).is_err() {
            tracing::error!("Task pool is shut down; dropping job");
        }
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }
    }
}
