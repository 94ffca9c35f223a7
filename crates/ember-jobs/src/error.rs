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

//! Error types for the job system.

use std::path::PathBuf;

use ember_core::ScheduledJob;
use thiserror::Error;

/// Errors raised while configuring or starting a [`JobSystem`](crate::JobSystem).
#[derive(Debug, Error)]
pub enum JobSystemError {
    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn job worker {index}: {source}")]
    WorkerSpawn {
        /// Index of the worker that could not be started.
        index: usize,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// A configuration value is out of range.
    #[error("invalid job system configuration: {0}")]
    InvalidConfig(String),
    /// A configuration file could not be read.
    #[error("failed to read job system configuration '{}': {source}", .path.display())]
    ConfigIo {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A configuration document is not valid JSON for [`JobSystemConfig`](crate::JobSystemConfig).
    #[error("failed to parse job system configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// A job handed back because the job system no longer accepts work, or
/// because the job was not freshly constructed.
///
/// Like a channel's send error, it carries the rejected job so ownership
/// returns to the producer.
#[derive(Debug, Error)]
#[error(
    "job {} ({}) was rejected: the job system is shut down or the job is already {:?}",
    .job.id(),
    .job.name(),
    .job.status()
)]
pub struct QueueRejected {
    /// The job that was not queued.
    pub job: ScheduledJob,
}

impl QueueRejected {
    /// Takes the rejected job back.
    pub fn into_job(self) -> ScheduledJob {
        self.job
    }
}
