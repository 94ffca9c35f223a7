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

//! The contract for background work and its tracked lifecycle.
//!
//! A [`Job`] is any `Send` value with an `execute` operation. Before it is handed
//! to a scheduler it is wrapped in a [`ScheduledJob`], a move-only handle that
//! carries the job's identity and an atomically updated [`JobStatus`]. Whoever
//! holds the `ScheduledJob` owns the job; a [`JobStatusWatch`] lets the producer
//! observe the lifecycle while the scheduler holds it.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

/// Upcasting support so a finished job can be recovered as its concrete type.
///
/// Blanket-implemented for every `'static` type; implementors of [`Job`] never
/// write it by hand.
pub trait AsAny: Any {
    /// Returns `self` as a `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Returns `self` as a `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Converts the box into a `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A unit of work that can run on any worker thread.
pub trait Job: AsAny + Send {
    /// Performs the work. Called exactly once, on a worker thread.
    fn execute(&mut self);

    /// A short label used in log output.
    fn name(&self) -> &str {
        "job"
    }
}

/// Adapts a closure into a [`Job`].
pub struct ClosureJob<F>
where
    F: FnMut() + Send + 'static,
{
    name: String,
    work: F,
}

impl<F> ClosureJob<F>
where
    F: FnMut() + Send + 'static,
{
    /// Creates a named closure job.
    pub fn new(name: impl Into<String>, work: F) -> Self {
        Self {
            name: name.into(),
            work,
        }
    }
}

impl<F> Job for ClosureJob<F>
where
    F: FnMut() + Send + 'static,
{
    fn execute(&mut self) {
        (self.work)()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A process-unique job identifier, assigned when the job is wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(u64);

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

impl JobId {
    fn next() -> Self {
        Self(NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identifier.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a job is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum JobStatus {
    /// Wrapped but not yet submitted; owned by the producer.
    Constructed = 0,
    /// Sitting in the scheduler's pending queue.
    Queued = 1,
    /// Claimed by a worker and running.
    ClaimedExecuting = 2,
    /// Finished and waiting in the completed queue.
    Completed = 3,
    /// Handed back to the producer, or dropped by a clear.
    RetrievedRetired = 4,
}

impl JobStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => JobStatus::Constructed,
            1 => JobStatus::Queued,
            2 => JobStatus::ClaimedExecuting,
            3 => JobStatus::Completed,
            _ => JobStatus::RetrievedRetired,
        }
    }

    /// Returns `true` if moving from `self` to `next` is a legal lifecycle step.
    ///
    /// A queued job may retire directly when the pending queue is cleared.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Constructed, JobStatus::Queued)
                | (JobStatus::Queued, JobStatus::ClaimedExecuting)
                | (JobStatus::Queued, JobStatus::RetrievedRetired)
                | (JobStatus::ClaimedExecuting, JobStatus::Completed)
                | (JobStatus::Completed, JobStatus::RetrievedRetired)
        )
    }
}

/// A read-only view of a job's status, usable from any thread.
#[derive(Debug, Clone)]
pub struct JobStatusWatch {
    id: JobId,
    cell: Arc<AtomicU8>,
}

impl JobStatusWatch {
    /// The identifier of the watched job.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// The watched job's current status.
    pub fn status(&self) -> JobStatus {
        JobStatus::from_u8(self.cell.load(Ordering::Acquire))
    }
}

/// The move-only handle a job travels in between producer and scheduler.
pub struct ScheduledJob {
    id: JobId,
    status: Arc<AtomicU8>,
    work: Box<dyn Job>,
}

impl ScheduledJob {
    /// Wraps a job. The new handle is in [`JobStatus::Constructed`].
    pub fn new(job: impl Job) -> Self {
        Self::from_boxed(Box::new(job))
    }

    /// Wraps an already boxed job.
    pub fn from_boxed(work: Box<dyn Job>) -> Self {
        Self {
            id: JobId::next(),
            status: Arc::new(AtomicU8::new(JobStatus::Constructed as u8)),
            work,
        }
    }

    /// The job's identifier.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// The job's label.
    pub fn name(&self) -> &str {
        self.work.name()
    }

    /// The job's current status.
    pub fn status(&self) -> JobStatus {
        JobStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Returns a watch that keeps observing this job's status after the handle moves.
    pub fn watch(&self) -> JobStatusWatch {
        JobStatusWatch {
            id: self.id,
            cell: Arc::clone(&self.status),
        }
    }

    /// Atomically advances the job's status.
    ///
    /// Returns `false` and leaves the status untouched if the step is not a legal
    /// lifecycle transition.
    pub fn transition(&self, next: JobStatus) -> bool {
        let result = self
            .status
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                JobStatus::from_u8(current)
                    .can_transition_to(next)
                    .then_some(next as u8)
            });
        if let Err(current) = result {
            log::warn!(
                "Job {} ({}): invalid transition {:?} -> {:?}",
                self.id,
                self.work.name(),
                JobStatus::from_u8(current),
                next
            );
            return false;
        }
        true
    }

    /// Runs the wrapped job.
    pub fn execute(&mut self) {
        self.work.execute();
    }

    /// Borrows the wrapped job as its concrete type, if it is a `T`.
    pub fn downcast_ref<T: Job>(&self) -> Option<&T> {
        <dyn Job as AsAny>::as_any(&*self.work).downcast_ref::<T>()
    }

    /// Mutably borrows the wrapped job as its concrete type, if it is a `T`.
    pub fn downcast_mut<T: Job>(&mut self) -> Option<&mut T> {
        <dyn Job as AsAny>::as_any_mut(&mut *self.work).downcast_mut::<T>()
    }

    /// Consumes the handle and returns the concrete job, or the handle unchanged
    /// if the job is not a `T`.
    pub fn downcast<T: Job>(self) -> Result<Box<T>, Self> {
        if self.downcast_ref::<T>().is_none() {
            return Err(self);
        }
        match <dyn Job as AsAny>::into_any(self.work).downcast::<T>() {
            Ok(job) => Ok(job),
            Err(_) => unreachable!("job type was checked before unboxing"),
        }
    }

    /// Consumes the handle and returns the boxed job.
    pub fn into_inner(self) -> Box<dyn Job> {
        self.work
    }
}

impl fmt::Debug for ScheduledJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledJob")
            .field("id", &self.id)
            .field("name", &self.work.name())
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SumJob {
        input: Vec<u32>,
        total: u32,
    }

    impl Job for SumJob {
        fn execute(&mut self) {
            self.total = self.input.iter().sum();
        }
    }

    #[test]
    fn test_new_job_is_constructed() {
        let job = ScheduledJob::new(SumJob {
            input: vec![1, 2],
            total: 0,
        });
        assert_eq!(job.status(), JobStatus::Constructed);
        assert_eq!(job.watch().status(), JobStatus::Constructed);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = ScheduledJob::new(ClosureJob::new("a", || {}));
        let b = ScheduledJob::new(ClosureJob::new("b", || {}));
        assert_ne!(a.id(), b.id());
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_full_lifecycle_is_legal() {
        let job = ScheduledJob::new(ClosureJob::new("noop", || {}));
        let watch = job.watch();
        assert!(job.transition(JobStatus::Queued));
        assert!(job.transition(JobStatus::ClaimedExecuting));
        assert!(job.transition(JobStatus::Completed));
        assert!(job.transition(JobStatus::RetrievedRetired));
        assert_eq!(watch.status(), JobStatus::RetrievedRetired);
    }

    #[test]
    fn test_illegal_transition_is_rejected() {
        let job = ScheduledJob::new(ClosureJob::new("noop", || {}));
        assert!(!job.transition(JobStatus::Completed));
        assert_eq!(job.status(), JobStatus::Constructed);
        assert!(job.transition(JobStatus::Queued));
        assert!(!job.transition(JobStatus::Queued));
    }

    #[test]
    fn test_execute_and_downcast() {
        let mut job = ScheduledJob::new(SumJob {
            input: vec![1, 2, 3],
            total: 0,
        });
        job.execute();
        assert_eq!(job.downcast_ref::<SumJob>().map(|j| j.total), Some(6));

        let job = match job.downcast::<ClosureJob<fn()>>() {
            Ok(_) => panic!("wrong type must not downcast"),
            Err(job) => job,
        };
        let sum = job.downcast::<SumJob>().expect("SumJob downcast");
        assert_eq!(sum.total, 6);
    }

    #[test]
    fn test_closure_job_name() {
        let job = ScheduledJob::new(ClosureJob::new("load-texture", || {}));
        assert_eq!(job.name(), "load-texture");
    }
}
