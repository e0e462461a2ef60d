//! Task scheduler
//!
//! Runs the registered jobs on independent intervals under a global
//! concurrency cap. Singleton tasks skip a tick when their previous
//! invocation is still running (rescheduled, never queued); different
//! task kinds may still run concurrently against the same store.

use crate::domain::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::time::MissedTickBehavior;

/// A recurring operation the scheduler can drive.
#[async_trait]
pub trait Job: Send + Sync {
    /// Run one sweep. The shutdown receiver is checked at per-record
    /// granularity inside the sweep.
    async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()>;
}

struct TaskSpec {
    name: &'static str,
    interval: Duration,
    singleton: bool,
    job: Arc<dyn Job>,
}

/// Interval scheduler with a global concurrency cap.
pub struct Scheduler {
    limiter: Arc<Semaphore>,
    tasks: Vec<TaskSpec>,
}

impl Scheduler {
    /// New scheduler allowing at most `max_concurrent` task invocations
    /// at a time across all task kinds.
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            limiter: Arc::new(Semaphore::new(max_concurrent.max(1))),
            tasks: Vec::new(),
        }
    }

    /// Register a recurring task.
    pub fn register(
        &mut self,
        name: &'static str,
        interval: Duration,
        singleton: bool,
        job: Arc<dyn Job>,
    ) {
        tracing::info!(task = name, interval_secs = interval.as_secs(), singleton, "task registered");
        self.tasks.push(TaskSpec {
            name,
            interval,
            singleton,
            job,
        });
    }

    /// Number of registered tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Drive all registered tasks until the shutdown signal fires.
    pub async fn run(self, shutdown: watch::Receiver<bool>) {
        let mut handles = Vec::with_capacity(self.tasks.len());
        for task in self.tasks {
            let limiter = self.limiter.clone();
            let shutdown = shutdown.clone();
            handles.push(tokio::spawn(run_task(task, limiter, shutdown)));
        }
        join_all(handles).await;
        tracing::info!("scheduler stopped");
    }
}

async fn run_task(task: TaskSpec, limiter: Arc<Semaphore>, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(task.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // One permit per task kind: a held permit means the previous
    // invocation is still running and the tick must be skipped.
    let busy = Arc::new(Semaphore::new(1));

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => {}
        }
        if *shutdown.borrow() {
            break;
        }

        let busy_permit = if task.singleton {
            match busy.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::debug!(task = task.name, "previous invocation still running, tick skipped");
                    continue;
                }
            }
        } else {
            None
        };

        let Ok(global_permit) = limiter.clone().acquire_owned().await else {
            break;
        };

        let job = task.job.clone();
        let name = task.name;
        let job_shutdown = shutdown.clone();
        tokio::spawn(async move {
            let _busy = busy_permit;
            let _global = global_permit;
            tracing::debug!(task = name, "task invocation started");
            if let Err(e) = job.run(job_shutdown).await {
                tracing::error!(task = name, error = %e, "task invocation failed");
            } else {
                tracing::debug!(task = name, "task invocation finished");
            }
        });
    }
}
