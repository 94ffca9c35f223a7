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

//! Worker threads: each one claims, executes and reports jobs until shutdown.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use ember_core::JobStatus;

use crate::queue::ClaimRecord;
use crate::system::Shared;

/// A worker thread bound to the pool for its whole lifetime.
#[derive(Debug)]
pub(crate) struct JobWorker {
    index: usize,
    handle: JoinHandle<()>,
}

impl JobWorker {
    pub(crate) fn spawn(index: usize, name: String, shared: Arc<Shared>) -> std::io::Result<Self> {
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || run(index, &shared))?;
        Ok(Self { index, handle })
    }

    pub(crate) fn join(self) {
        if self.handle.join().is_err() {
            log::error!("Job worker {} terminated abnormally.", self.index);
        }
    }
}

fn run(index: usize, shared: &Shared) {
    log::debug!("Job worker {index} started.");

    while !shared.quitting.load(Ordering::Acquire) {
        let claimed = shared
            .pending
            .claim_front(shared.idle_wait, &shared.quitting, |job| {
                job.transition(JobStatus::ClaimedExecuting);
                shared.claimed.insert(ClaimRecord {
                    worker: index,
                    watch: job.watch(),
                });
            });
        let Some(mut job) = claimed else {
            continue;
        };

        log::trace!("Worker {index} executing job {} ({}).", job.id(), job.name());
        if panic::catch_unwind(AssertUnwindSafe(|| job.execute())).is_err() {
            log::error!(
                "Job {} ({}) panicked on worker {index}; reporting it as completed.",
                job.id(),
                job.name()
            );
        }

        if let Some(record) = shared.claimed.remove(job.id()) {
            debug_assert_eq!(record.worker, index);
        }
        job.transition(JobStatus::Completed);
        shared.completed.push_back(job);
        shared.job_finished();
    }

    log::debug!("Job worker {index} stopped.");
}
