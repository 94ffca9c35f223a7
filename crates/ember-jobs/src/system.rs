// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The job system: a fixed worker pool around three lifecycle queues.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use ember_core::{Job, JobId, JobStatus, JobStatusWatch, ScheduledJob};

use crate::config::JobSystemConfig;
use crate::error::{JobSystemError, QueueRejected};
use crate::queue::{ClaimList, JobQueue};
use crate::worker::JobWorker;

/// Running totals since startup.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JobSystemStats {
    /// Jobs accepted by [`JobSystem::queue_job`].
    pub queued: u64,
    /// Jobs that finished executing.
    pub completed: u64,
    /// Jobs handed back by [`JobSystem::retrieve_completed_job`].
    pub retrieved: u64,
    /// Jobs dropped by one of the clear operations.
    pub cleared: u64,
}

#[derive(Debug, Default)]
struct StatCounters {
    queued: AtomicU64,
    completed: AtomicU64,
    retrieved: AtomicU64,
    cleared: AtomicU64,
}

/// State shared between the producer-facing [`JobSystem`] and its workers.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) pending: JobQueue<ScheduledJob>,
    pub(crate) claimed: ClaimList,
    pub(crate) completed: JobQueue<ScheduledJob>,
    pub(crate) quitting: AtomicBool,
    pub(crate) idle_wait: Duration,
    // Jobs that are pending or claimed; the drain barrier waits for zero.
    outstanding: Mutex<usize>,
    drained: Condvar,
    stats: StatCounters,
}

impl Shared {
    fn new(idle_wait: Duration) -> Self {
        Self {
            pending: JobQueue::new(),
            claimed: ClaimList::default(),
            completed: JobQueue::new(),
            quitting: AtomicBool::new(false),
            idle_wait,
            outstanding: Mutex::new(0),
            drained: Condvar::new(),
            stats: StatCounters::default(),
        }
    }

    fn outstanding(&self) -> MutexGuard<'_, usize> {
        self.outstanding.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add_outstanding(&self) {
        *self.outstanding() += 1;
    }

    fn release_outstanding(&self, count: usize) {
        if count == 0 {
            return;
        }
        let mut outstanding = self.outstanding();
        *outstanding = outstanding.saturating_sub(count);
        if *outstanding == 0 {
            self.drained.notify_all();
        }
    }

    /// Called by a worker once a job has landed in the completed queue.
    pub(crate) fn job_finished(&self) {
        self.stats.completed.fetch_add(1, Ordering::Relaxed);
        self.release_outstanding(1);
    }
}

/// A fixed pool of worker threads consuming a shared job queue.
///
/// Jobs are claimed in submission order. They complete in whatever order the
/// workers finish them, and are retrieved in completion order.
///
/// The system is an ordinary owned value: construct it where it is needed and
/// pass it by reference to the code that submits work.
#[derive(Debug)]
pub struct JobSystem {
    config: JobSystemConfig,
    shared: Arc<Shared>,
    workers: Vec<JobWorker>,
    running: bool,
}

impl JobSystem {
    /// Validates `config` and spawns the worker pool.
    ///
    /// If any worker fails to spawn, the ones already running are shut down
    /// before the error is returned.
    pub fn startup(config: JobSystemConfig) -> Result<Self, JobSystemError> {
        config.validate()?;

        let worker_count = config.resolved_worker_count();
        if worker_count == 0 {
            log::warn!("Job system started with zero workers; queued jobs will not run.");
        }

        let mut system = Self {
            shared: Arc::new(Shared::new(config.idle_wait())),
            workers: Vec::with_capacity(worker_count),
            running: true,
            config,
        };

        for index in 0..worker_count {
            let name = format!("{}-{}", system.config.thread_name_prefix, index);
            match JobWorker::spawn(index, name, Arc::clone(&system.shared)) {
                Ok(worker) => system.workers.push(worker),
                Err(source) => {
                    system.shutdown();
                    return Err(JobSystemError::WorkerSpawn { index, source });
                }
            }
        }

        log::info!(
            "Job system started with {} worker(s) (requested {}).",
            worker_count,
            system.config.requested_worker_count
        );
        Ok(system)
    }

    /// The configuration this system was started with.
    pub fn config(&self) -> &JobSystemConfig {
        &self.config
    }

    /// Number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Returns `true` until [`Self::shutdown`] has run.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Hands `job` to the scheduler. Never blocks on the workers.
    ///
    /// On success the job is [`JobStatus::Queued`]. After shutdown the job is
    /// returned inside the error, untouched.
    pub fn queue_job(&self, job: ScheduledJob) -> Result<JobId, QueueRejected> {
        if !self.running {
            return Err(QueueRejected { job });
        }
        if !job.transition(JobStatus::Queued) {
            // Already queued elsewhere or finished; refuse rather than corrupt its lifecycle.
            return Err(QueueRejected { job });
        }

        let id = job.id();
        log::trace!("Queued job {} ({}).", id, job.name());
        self.shared.add_outstanding();
        self.shared.stats.queued.fetch_add(1, Ordering::Relaxed);
        self.shared.pending.push_back(job);
        Ok(id)
    }

    /// Wraps and queues `job`, returning a watch on its status.
    pub fn queue(&self, job: impl Job) -> Result<JobStatusWatch, QueueRejected> {
        let job = ScheduledJob::new(job);
        let watch = job.watch();
        self.queue_job(job)?;
        Ok(watch)
    }

    /// Takes back the oldest completed job, or `None` if none is ready.
    ///
    /// The returned job is [`JobStatus::RetrievedRetired`] and owned by the caller.
    pub fn retrieve_completed_job(&self) -> Option<ScheduledJob> {
        let job = self.shared.completed.pop_front()?;
        job.transition(JobStatus::RetrievedRetired);
        self.shared.stats.retrieved.fetch_add(1, Ordering::Relaxed);
        Some(job)
    }

    /// Takes back every completed job, in completion order.
    pub fn retrieve_completed_jobs(&self) -> Vec<ScheduledJob> {
        let jobs = self.shared.completed.drain();
        for job in &jobs {
            job.transition(JobStatus::RetrievedRetired);
        }
        self.shared
            .stats
            .retrieved
            .fetch_add(jobs.len() as u64, Ordering::Relaxed);
        jobs
    }

    /// Drops every job still waiting to be claimed. Returns how many were dropped.
    pub fn clear_queued_jobs(&self) -> usize {
        let dropped = self.retire_all(self.shared.pending.drain());
        self.shared.release_outstanding(dropped);
        if dropped > 0 {
            log::debug!("Cleared {dropped} queued job(s).");
        }
        dropped
    }

    /// Drops every completed job that has not been retrieved. Returns how many were dropped.
    pub fn clear_completed_jobs(&self) -> usize {
        let dropped = self.retire_all(self.shared.completed.drain());
        if dropped > 0 {
            log::debug!("Cleared {dropped} completed job(s).");
        }
        dropped
    }

    fn retire_all(&self, jobs: Vec<ScheduledJob>) -> usize {
        let count = jobs.len();
        for job in jobs {
            job.transition(JobStatus::RetrievedRetired);
        }
        self.shared
            .stats
            .cleared
            .fetch_add(count as u64, Ordering::Relaxed);
        count
    }

    /// Blocks until no job is pending or executing.
    ///
    /// Workers keep running afterwards, so this can be called any number of
    /// times. Returns immediately if there are no workers to make progress.
    pub fn wait_until_idle(&self) {
        if !self.can_make_progress() {
            return;
        }
        let mut outstanding = self.shared.outstanding();
        while *outstanding > 0 {
            outstanding = self
                .shared
                .drained
                .wait(outstanding)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`Self::wait_until_idle`], giving up after `timeout`.
    ///
    /// Returns `true` if the system drained in time.
    pub fn wait_until_idle_timeout(&self, timeout: Duration) -> bool {
        if !self.can_make_progress() {
            return *self.shared.outstanding() == 0;
        }
        let deadline = Instant::now() + timeout;
        let mut outstanding = self.shared.outstanding();
        while *outstanding > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            outstanding = self
                .shared
                .drained
                .wait_timeout(outstanding, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }

    fn can_make_progress(&self) -> bool {
        if self.running && !self.workers.is_empty() {
            return true;
        }
        log::warn!("wait_until_idle called on a job system with no running workers.");
        false
    }

    /// Number of jobs waiting to be claimed.
    pub fn pending_count(&self) -> usize {
        self.shared.pending.len()
    }

    /// Number of jobs currently executing.
    pub fn claimed_count(&self) -> usize {
        self.shared.claimed.len()
    }

    /// Number of finished jobs waiting to be retrieved.
    pub fn completed_count(&self) -> usize {
        self.shared.completed.len()
    }

    /// A snapshot of the running totals.
    pub fn stats(&self) -> JobSystemStats {
        let stats = &self.shared.stats;
        JobSystemStats {
            queued: stats.queued.load(Ordering::Relaxed),
            completed: stats.completed.load(Ordering::Relaxed),
            retrieved: stats.retrieved.load(Ordering::Relaxed),
            cleared: stats.cleared.load(Ordering::Relaxed),
        }
    }

    /// Stops the workers and joins their threads.
    ///
    /// Jobs already executing run to completion; nothing new is claimed. Jobs
    /// left in the pending or completed queue stay there until cleared or the
    /// system is dropped. Calling this more than once is a no-op.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.shared.quitting.store(true, Ordering::Release);
        self.shared.pending.wake_all();

        for worker in self.workers.drain(..) {
            worker.join();
        }

        log::info!(
            "Job system shut down ({} pending, {} completed left).",
            self.shared.pending.len(),
            self.shared.completed.len()
        );
    }
}

impl Drop for JobSystem {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::ClosureJob;

    #[test]
    fn test_job_system_lifecycle() {
        let mut jobs = JobSystem::startup(JobSystemConfig::with_workers(2)).expect("startup");
        assert!(jobs.is_running());
        assert_eq!(jobs.worker_count(), 2);
        jobs.shutdown();
        assert!(!jobs.is_running());
        assert_eq!(jobs.worker_count(), 0);
        jobs.shutdown();
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = JobSystemConfig {
            idle_wait_us: 0,
            ..JobSystemConfig::with_workers(1)
        };
        assert!(matches!(
            JobSystem::startup(config),
            Err(JobSystemError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_workers_leave_jobs_queued() {
        let jobs = JobSystem::startup(JobSystemConfig::with_workers(0)).expect("startup");
        let watch = jobs.queue(ClosureJob::new("idle", || {})).expect("queued");
        assert_eq!(watch.status(), JobStatus::Queued);
        assert_eq!(jobs.pending_count(), 1);
        assert!(!jobs.wait_until_idle_timeout(Duration::from_millis(10)));

        assert_eq!(jobs.clear_queued_jobs(), 1);
        assert_eq!(watch.status(), JobStatus::RetrievedRetired);
        assert_eq!(jobs.pending_count(), 0);
        assert!(jobs.wait_until_idle_timeout(Duration::from_millis(10)));
        assert_eq!(jobs.stats().cleared, 1);
    }

    #[test]
    fn test_requeueing_a_queued_job_is_rejected() {
        let jobs = JobSystem::startup(JobSystemConfig::with_workers(0)).expect("startup");
        let job = ScheduledJob::new(ClosureJob::new("once", || {}));
        job.transition(JobStatus::Queued);
        let rejected = jobs.queue_job(job).unwrap_err();
        assert_eq!(rejected.job.status(), JobStatus::Queued);
        assert_eq!(jobs.pending_count(), 0);
    }

    #[test]
    fn test_queue_after_shutdown_hands_job_back() {
        let mut jobs = JobSystem::startup(JobSystemConfig::with_workers(1)).expect("startup");
        jobs.shutdown();

        let job = ScheduledJob::new(ClosureJob::new("late", || {}));
        let id = job.id();
        let rejected = jobs.queue_job(job).unwrap_err();
        assert!(rejected.to_string().contains("shut down"));
        let job = rejected.into_job();
        assert_eq!(job.id(), id);
        assert_eq!(job.status(), JobStatus::Constructed);
    }
}
