//! Fixed-size pool of named worker threads for blocking calls.
//!
//! Workers pull boxed jobs from a crossbeam channel, one job at a time each. Results come back
//! through a oneshot channel wrapped in [`TaskHandle`], which the async side awaits.

use anyhow::{Context as _, Result};
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::debug;
use std::any::Any;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;

use crate::error::JoinError;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed number of worker threads executing submitted closures.
///
/// Dropping the pool (or calling [`shutdown`](Self::shutdown)) closes the queue and blocks until
/// every already-submitted job has run. Nothing is orphaned.
pub struct BlockingPool {
    name: String,
    job_tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

/// Single worker: run jobs until the queue is closed and empty.
fn worker_loop(job_rx: Receiver<Job>) {
    while let Ok(job) = job_rx.recv() {
        job();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl BlockingPool {
    /// Spawn `size` workers named `{name}-{i}`.
    pub fn new(name: &str, size: usize) -> Result<Self> {
        anyhow::ensure!(size > 0, "pool {name}: size must be at least 1");
        let (job_tx, job_rx) = unbounded::<Job>();
        let workers = (0..size)
            .map(|i| {
                let job_rx = job_rx.clone();
                thread::Builder::new()
                    .name(format!("{name}-{i}"))
                    .spawn(move || worker_loop(job_rx))
                    .with_context(|| format!("spawn worker {name}-{i}"))
            })
            .collect::<Result<Vec<_>>>()?;
        debug!("Pool {} started with {} workers", name, size);
        Ok(Self {
            name: name.to_string(),
            job_tx: Some(job_tx),
            workers,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue `f` for execution. The handle resolves to its return value, or to a
    /// [`JoinError`] if it panicked or the pool was already shut down.
    pub fn submit<F, T>(&self, f: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            let outcome = catch_unwind(AssertUnwindSafe(f))
                .map_err(|payload| JoinError::Panicked(panic_message(payload)));
            // Receiver gone means nobody is waiting; the work still ran.
            let _ = result_tx.send(outcome);
        });
        if let Some(job_tx) = &self.job_tx {
            // On a closed queue the job (and its sender) is dropped; the handle reports Cancelled.
            let _ = job_tx.send(job);
        }
        TaskHandle { result_rx }
    }

    /// Close the queue and wait for every submitted job to finish.
    pub fn shutdown(mut self) {
        self.drain();
    }

    fn drain(&mut self) {
        // Dropping the last sender closes the channel so workers exit after the backlog.
        drop(self.job_tx.take());
        for handle in self.workers.drain(..) {
            let _: thread::Result<()> = handle.join();
        }
        debug!("Pool {} drained", self.name);
    }
}

impl Drop for BlockingPool {
    fn drop(&mut self) {
        if self.job_tx.is_some() {
            self.drain();
        }
    }
}

/// Pending result of a [`BlockingPool::submit`] call.
#[must_use = "a TaskHandle does nothing unless awaited"]
pub struct TaskHandle<T> {
    result_rx: oneshot::Receiver<Result<T, JoinError>>,
}

impl<T> TaskHandle<T> {
    /// Wait for the result from synchronous code. Must not be called inside an async context.
    pub fn blocking_join(self) -> Result<T, JoinError> {
        self.result_rx
            .blocking_recv()
            .unwrap_or(Err(JoinError::Cancelled))
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.result_rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(JoinError::Cancelled)))
    }
}
