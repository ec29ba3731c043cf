//! `WorkerPool` on dedicated OS threads over a bounded crossbeam channel.
//!
//! # Design Principles
//!
//! - **No polling**: producers and executors block in `select!`, waking on
//!   whichever of {slot/item, queue closure, cancellation} happens first
//! - **Clean shutdown**: dropping the last sender disconnects the queue once
//!   it is drained, which is how busy executors learn there is no more input
//! - **Lock-free fast path**: atomic counters; the sender sits behind an
//!   `RwLock` only so `stop` can take it away

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, never, select, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::WorkerPoolConfig;
use crate::core::cancel::CancellationSignal;
use crate::core::executor::spawn_executor;
use crate::core::job::Job;

use super::{PoolCounters, PoolError, PoolStats};

/// Fixed-size pool of executor threads sharing one bounded FIFO queue.
///
/// Built with zero running executors; [`start`](Self::start) spawns them.
pub struct WorkerPool {
    /// Pool configuration.
    config: WorkerPoolConfig,

    /// Producer side of the queue. `None` once stopped.
    queue_tx: RwLock<Option<Sender<Job>>>,

    /// Consumer side, cloned into every executor.
    queue_rx: Receiver<Job>,

    /// "No more input": fired by `stop`, wakes blocked producers.
    closed: CancellationSignal,

    /// "Stop now": the signal handed to `start`.
    cancel: Mutex<Option<CancellationSignal>>,

    /// Fired once `cancel` is populated, so producers parked before `start`
    /// re-arm on the real signal.
    armed: CancellationSignal,

    /// Set by the first `start`.
    started: AtomicBool,

    /// Pool statistics counters (lock-free atomics).
    counters: Arc<PoolCounters>,

    /// Executor thread handles, drained by `wait`.
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Create a pool with an empty queue and no executors.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidConfig` if the configuration is invalid.
    pub fn new(config: WorkerPoolConfig) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;

        let (queue_tx, queue_rx) = bounded::<Job>(config.queue_capacity);

        Ok(Self {
            config,
            queue_tx: RwLock::new(Some(queue_tx)),
            queue_rx,
            closed: CancellationSignal::new(),
            cancel: Mutex::new(None),
            armed: CancellationSignal::new(),
            started: AtomicBool::new(false),
            counters: Arc::new(PoolCounters::default()),
            workers: Mutex::new(Vec::new()),
        })
    }

    /// Spawn exactly `worker_count` executors bound to `signal`.
    ///
    /// # Errors
    ///
    /// - `PoolError::AlreadyStarted` on a second call (nothing is spawned)
    /// - `PoolError::PoolShutdown` if `stop` was already called
    /// - `PoolError::Internal` if the OS refused to spawn a thread; the queue
    ///   is then closed and any executors already spawned are joined
    pub fn start(&self, signal: CancellationSignal) -> Result<(), PoolError> {
        if self.closed.is_cancelled() {
            return Err(PoolError::PoolShutdown);
        }
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(PoolError::AlreadyStarted);
        }
        *self.cancel.lock() = Some(signal.clone());
        self.armed.cancel();

        let mut workers = self.workers.lock();
        workers.reserve(self.config.worker_count);
        for worker_id in 0..self.config.worker_count {
            info!(worker_id = worker_id + 1, "starting worker");
            let spawned = spawn_executor(
                worker_id + 1,
                self.queue_rx.clone(),
                signal.clone(),
                Arc::clone(&self.counters),
                self.config.thread_stack_size,
            );
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    warn!(worker_id = worker_id + 1, error = %e, "failed to spawn worker, rolling back");
                    drop(workers);
                    self.stop();
                    self.wait();
                    return Err(PoolError::Internal(format!("failed to spawn worker thread: {e}")));
                }
            }
        }

        info!(
            worker_count = self.config.worker_count,
            queue_capacity = self.config.queue_capacity,
            "WorkerPool started"
        );
        Ok(())
    }

    /// Enqueue a job, blocking while the queue is full.
    ///
    /// Wakes on whichever happens first: a free slot, `stop`, or cancellation.
    ///
    /// # Errors
    ///
    /// - `PoolError::PoolShutdown` once `stop` has been called
    /// - `PoolError::Cancelled` once the start signal has been cancelled
    pub fn enqueue(&self, job: Job) -> Result<(), PoolError> {
        let kind = job.kind();

        loop {
            let tx = self.sender()?;
            let closed = self.closed.listener();
            let (cancelled, armed) = self.cancel_listeners()?;

            // `job` is only moved when the send arm is the one selected.
            select! {
                send(tx, job) -> res => {
                    return match res {
                        Ok(()) => {
                            self.counters.submitted_jobs.fetch_add(1, Ordering::Relaxed);
                            debug!(job = kind, "job enqueued");
                            Ok(())
                        }
                        Err(_) => Err(PoolError::PoolShutdown),
                    };
                }
                recv(closed) -> _ => return Err(PoolError::PoolShutdown),
                recv(cancelled) -> _ => return Err(PoolError::Cancelled),
                recv(armed) -> _ => {
                    debug!(job = kind, "pool started while producer was blocked");
                }
            }
        }
    }

    /// Enqueue without blocking.
    ///
    /// # Errors
    ///
    /// - `PoolError::QueueFull` if the queue is at capacity
    /// - `PoolError::PoolShutdown` / `PoolError::Cancelled` as for [`enqueue`](Self::enqueue)
    pub fn try_enqueue(&self, job: Job) -> Result<(), PoolError> {
        let tx = self.sender()?;
        self.cancel_listeners()?;
        let kind = job.kind();

        match tx.try_send(job) {
            Ok(()) => {
                self.counters.submitted_jobs.fetch_add(1, Ordering::Relaxed);
                debug!(job = kind, "job enqueued");
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                warn!(job = kind, "work queue is full");
                Err(PoolError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(PoolError::PoolShutdown),
        }
    }

    /// Enqueue from async code: the blocking wait runs on tokio's blocking pool.
    ///
    /// # Errors
    ///
    /// As for [`enqueue`](Self::enqueue), plus `PoolError::Internal` if the
    /// blocking task could not be joined.
    pub async fn enqueue_async(self: &Arc<Self>, job: Job) -> Result<(), PoolError> {
        let pool = Arc::clone(self);
        tokio::task::spawn_blocking(move || pool.enqueue(job))
            .await
            .map_err(|e| PoolError::Internal(format!("enqueue task failed: {e}")))?
    }

    /// Close the queue to new submissions. Idempotent.
    ///
    /// In-flight jobs are not interrupted; executors drain what is already
    /// queued and then exit.
    pub fn stop(&self) {
        if self.closed.is_cancelled() {
            return;
        }
        info!("closing work queue");
        self.closed.cancel();
        self.queue_tx.write().take();
    }

    /// Block until every spawned executor has exited.
    ///
    /// Call after `stop` (and normally after cancelling the start signal);
    /// otherwise executors idle on an open queue and this never returns.
    pub fn wait(&self) {
        let handles: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();
        let count = handles.len();

        for (idx, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(()) => debug!(worker_id = idx + 1, "worker joined"),
                Err(_) => warn!(worker_id = idx + 1, "worker thread panicked"),
            }
        }

        info!(worker_count = count, "all workers exited");
    }

    /// Run the termination protocol: cancel, stop, wait.
    pub fn shutdown(&self, signal: &CancellationSignal) {
        info!("shutting down worker pool");
        signal.cancel();
        self.stop();
        self.wait();
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.counters.snapshot(
            self.config.worker_count,
            self.config.queue_capacity,
            self.queue_rx.len(),
        )
    }

    /// Whether `stop` has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Pool configuration.
    #[must_use]
    pub const fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }

    fn sender(&self) -> Result<Sender<Job>, PoolError> {
        if self.closed.is_cancelled() {
            return Err(PoolError::PoolShutdown);
        }
        self.queue_tx.read().clone().ok_or(PoolError::PoolShutdown)
    }

    /// `(cancelled, armed)` listeners for a producer.
    ///
    /// After `start`: the start signal's listener and a never-ready receiver.
    /// Before: a never-ready receiver and the `armed` listener, which fires
    /// when `start` installs the signal so the caller can re-arm.
    fn cancel_listeners(&self) -> Result<(Receiver<()>, Receiver<()>), PoolError> {
        match self.cancel.lock().as_ref() {
            Some(signal) if signal.is_cancelled() => Err(PoolError::Cancelled),
            Some(signal) => Ok((signal.listener(), never())),
            None => Ok((never(), self.armed.listener())),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Close the queue but don't join: explicit shutdown() is required for that.
        if !self.closed.is_cancelled() {
            self.closed.cancel();
            self.queue_tx.write().take();
            debug!("WorkerPool dropped without explicit shutdown - workers will be detached");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::job::Notification;
    use std::time::{Duration, Instant};

    fn quick(title: &str) -> Job {
        Notification::new(title).with_latency(Duration::from_millis(5)).into()
    }

    #[test]
    fn test_new_rejects_zero_capacity() {
        let err = WorkerPool::new(WorkerPoolConfig::new().with_queue_capacity(0)).err();
        assert!(matches!(err, Some(PoolError::InvalidConfig(_))));
    }

    #[test]
    fn test_starts_with_no_executors() {
        let pool = WorkerPool::new(WorkerPoolConfig::new()).unwrap();
        assert_eq!(pool.stats().live_workers, 0);
    }

    #[test]
    fn test_second_start_is_rejected() {
        let pool = WorkerPool::new(WorkerPoolConfig::new().with_worker_count(2)).unwrap();
        let signal = CancellationSignal::new();
        pool.start(signal.clone()).unwrap();
        assert_eq!(pool.start(signal.clone()), Err(PoolError::AlreadyStarted));
        assert_eq!(pool.stats().live_workers, 2);
        pool.shutdown(&signal);
    }

    #[test]
    fn test_try_enqueue_reports_full_queue() {
        let pool = WorkerPool::new(WorkerPoolConfig::new().with_queue_capacity(1)).unwrap();
        pool.try_enqueue(quick("a")).unwrap();
        assert_eq!(pool.try_enqueue(quick("b")), Err(PoolError::QueueFull));
        assert_eq!(pool.stats().queued_jobs, 1);
    }

    #[test]
    fn test_stop_drains_then_exits() {
        let pool = WorkerPool::new(WorkerPoolConfig::new().with_worker_count(2)).unwrap();
        for i in 0..6 {
            pool.enqueue(quick(&format!("n{i}"))).unwrap();
        }
        pool.start(CancellationSignal::new()).unwrap();
        pool.stop();

        let started = Instant::now();
        pool.wait();
        assert!(started.elapsed() < Duration::from_secs(5));

        let stats = pool.stats();
        assert_eq!(stats.completed_jobs, 6);
        assert_eq!(stats.live_workers, 0);
        assert_eq!(pool.enqueue(quick("late")), Err(PoolError::PoolShutdown));
    }

    #[cfg(all(target_os = "linux", target_pointer_width = "64"))]
    #[test]
    fn test_failed_spawn_rolls_back() {
        // A 1 PiB stack cannot be mapped, so the first spawn fails.
        let config = WorkerPoolConfig::new().with_worker_count(2).with_thread_stack_size(1 << 50);
        let pool = WorkerPool::new(config).unwrap();

        let result = pool.start(CancellationSignal::new());
        assert!(matches!(result, Err(PoolError::Internal(_))));
        assert_eq!(pool.stats().live_workers, 0);
        assert!(pool.is_stopped());
        assert_eq!(pool.enqueue(quick("after")), Err(PoolError::PoolShutdown));
    }

    #[test]
    fn test_start_after_stop_is_rejected() {
        let pool = WorkerPool::new(WorkerPoolConfig::new()).unwrap();
        pool.stop();
        assert_eq!(pool.start(CancellationSignal::new()), Err(PoolError::PoolShutdown));
    }
}
