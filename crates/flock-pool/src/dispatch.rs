//! Bounded worker pools and the two-pool dispatcher
//!
//! Submission is fire-and-forget: every job is spawned immediately but gated
//! by a semaphore sized to the pool, so at most `size` jobs run at once
//! while the rest queue inside their own tasks. Handles are collected at
//! submit time and joined by `drain()`, which logs panicked jobs and never
//! lets one job's failure touch its siblings.
//!
//! The dispatcher owns two independent pools — pagination and mutation —
//! sized separately from each other and from the quota windows. Pool size
//! bounds how many jobs contend on a window at once; the request rate itself
//! is enforced solely by the windows.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

/// A fixed-size pool of concurrently running jobs.
pub struct WorkerPool {
    name: &'static str,
    slots: Arc<Semaphore>,
    handles: Vec<(String, JoinHandle<()>)>,
}

impl WorkerPool {
    /// Create a pool running at most `size` jobs concurrently.
    pub fn new(name: &'static str, size: usize) -> Self {
        Self {
            name,
            slots: Arc::new(Semaphore::new(size)),
            handles: Vec::new(),
        }
    }

    /// Submit a job under a human-readable label.
    ///
    /// The job starts as soon as a pool slot frees up. Submission never
    /// blocks; the handle is kept for [`drain`](Self::drain).
    pub fn submit<F>(&mut self, label: String, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let job_id = Uuid::new_v4().simple().to_string();
        let slots = self.slots.clone();
        let pool = self.name;
        let handle = tokio::spawn({
            let label = label.clone();
            async move {
                // The slot semaphore is never closed while jobs are live, so
                // a failed acquire can only mean teardown: skip the job.
                let Ok(_slot) = slots.acquire().await else {
                    return;
                };
                debug!(pool, job_id, job = %label, "job started");
                job.await;
                debug!(pool, job_id, job = %label, "job finished");
            }
        });
        self.handles.push((label, handle));
    }

    /// Number of submitted jobs.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether any jobs have been submitted.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Join every submitted job, in submission order.
    ///
    /// A panicked job is logged and skipped; it never aborts the drain or
    /// propagates to sibling jobs.
    pub async fn drain(self) {
        let jobs = self.handles.len();
        for (label, handle) in self.handles {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    error!(pool = self.name, job = %label, "job panicked");
                } else {
                    error!(pool = self.name, job = %label, error = %e, "job did not complete");
                }
            }
        }
        info!(pool = self.name, jobs, "pool drained");
    }
}

/// Two independent worker pools with a single combined drain.
pub struct Dispatcher {
    pagination: WorkerPool,
    mutation: WorkerPool,
}

impl Dispatcher {
    /// Create a dispatcher with separately sized pagination and mutation pools.
    pub fn new(pagination_workers: usize, mutation_workers: usize) -> Self {
        Self {
            pagination: WorkerPool::new("pagination", pagination_workers),
            mutation: WorkerPool::new("mutation", mutation_workers),
        }
    }

    /// Submit a pagination job (one full fetch of an account's graph).
    pub fn submit_pagination<F>(&mut self, label: String, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.pagination.submit(label, job);
    }

    /// Submit a mutation job (one follow/unfollow request).
    pub fn submit_mutation<F>(&mut self, label: String, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.mutation.submit(label, job);
    }

    /// Total jobs submitted across both pools.
    pub fn len(&self) -> usize {
        self.pagination.len() + self.mutation.len()
    }

    /// Whether any jobs have been submitted to either pool.
    pub fn is_empty(&self) -> bool {
        self.pagination.is_empty() && self.mutation.is_empty()
    }

    /// Wait for every job across both pools to finish.
    pub async fn drain(self) {
        info!(jobs = self.len(), "draining dispatcher");
        self.pagination.drain().await;
        self.mutation.drain().await;
    }
}
