//! Executor threads: the loop each pool worker runs and the failure boundary
//! around a single job.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{select, Receiver};
use tracing::{debug, error, info};

use super::cancel::CancellationSignal;
use super::error::JobError;
use super::job::{Job, Process};
use super::worker_pool::PoolCounters;

/// Decrements the live-executor count when the thread exits, panics included.
struct LiveGuard(Arc<PoolCounters>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.live_workers.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Spawn one executor thread.
pub(crate) fn spawn_executor(
    worker_id: usize,
    queue: Receiver<Job>,
    cancel: CancellationSignal,
    counters: Arc<PoolCounters>,
    stack_size: usize,
) -> std::io::Result<JoinHandle<()>> {
    counters.live_workers.fetch_add(1, Ordering::AcqRel);
    let guard = LiveGuard(Arc::clone(&counters));

    thread::Builder::new()
        .name(format!("taskq-worker-{worker_id}"))
        .stack_size(stack_size)
        .spawn(move || {
            let _live = guard;
            executor_loop(worker_id, &queue, &cancel, &counters);
        })
}

/// Pull jobs until cancelled or until the queue is closed and drained.
fn executor_loop(
    worker_id: usize,
    queue: &Receiver<Job>,
    cancel: &CancellationSignal,
    counters: &PoolCounters,
) {
    debug!(worker_id = worker_id, "executor started");
    let cancelled = cancel.listener();

    loop {
        // select! picks at random among ready arms; cancellation wins ties.
        if cancel.is_cancelled() {
            debug!(worker_id = worker_id, "executor exiting due to cancellation");
            break;
        }

        select! {
            recv(cancelled) -> _ => {
                debug!(worker_id = worker_id, "executor exiting due to cancellation");
                break;
            }
            recv(queue) -> msg => match msg {
                Ok(job) => {
                    run_job(worker_id, job, counters);
                }
                Err(_) => {
                    debug!(worker_id = worker_id, "work queue closed, executor exiting");
                    break;
                }
            },
        }
    }
}

/// Run one job behind the failure boundary. Returns whether it succeeded.
///
/// Errors and panics are logged and counted, never propagated.
pub(crate) fn run_job(worker_id: usize, job: Job, counters: &PoolCounters) -> bool {
    let kind = job.kind();
    counters.active_jobs.fetch_add(1, Ordering::Relaxed);
    debug!(worker_id = worker_id, job = kind, "job received");

    let outcome = panic::catch_unwind(AssertUnwindSafe(move || job.process()))
        .unwrap_or_else(|payload| Err(JobError::Panicked(panic_message(payload.as_ref()))));

    counters.active_jobs.fetch_sub(1, Ordering::Relaxed);
    match outcome {
        Ok(()) => {
            counters.completed_jobs.fetch_add(1, Ordering::Relaxed);
            info!(worker_id = worker_id, job = kind, "job completed");
            true
        }
        Err(e) => {
            counters.failed_jobs.fetch_add(1, Ordering::Relaxed);
            error!(worker_id = worker_id, job = kind, error = %e, "error processing job");
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EmailError;
    use crate::core::job::{EmailJob, EmailSender, Notification};
    use std::time::Duration;

    struct PanickingSender;

    impl EmailSender for PanickingSender {
        fn send_email(&self, _: &[String], _: &str, _: &str) -> Result<(), EmailError> {
            panic!("smtp client exploded");
        }
    }

    #[test]
    fn test_run_job_counts_success() {
        let counters = PoolCounters::default();
        let job = Job::from(Notification::new("ok").with_latency(Duration::ZERO));
        assert!(run_job(0, job, &counters));
        assert_eq!(counters.completed_jobs.load(Ordering::Relaxed), 1);
        assert_eq!(counters.active_jobs.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_run_job_contains_panics() {
        let counters = PoolCounters::default();
        let job = EmailJob::new(Arc::new(PanickingSender), vec!["a@b.c".into()], "s", "b").unwrap();
        assert!(!run_job(0, job.into(), &counters));
        assert_eq!(counters.failed_jobs.load(Ordering::Relaxed), 1);
        assert_eq!(counters.active_jobs.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_panic_message_extracts_text() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("boom"));
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new("static boom");
        assert_eq!(panic_message(payload.as_ref()), "static boom");
    }
}
