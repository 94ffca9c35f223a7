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

//! # Ember Jobs
//!
//! A fixed pool of worker threads that runs [`Job`](ember_core::Job)s in the
//! background. The producer submits jobs without blocking and reclaims finished
//! ones, typically once per frame, with
//! [`JobSystem::retrieve_completed_job`].
//!
//! ```no_run
//! use ember_core::ClosureJob;
//! use ember_jobs::{JobSystem, JobSystemConfig};
//!
//! let mut jobs = JobSystem::startup(JobSystemConfig::default())?;
//! jobs.queue(ClosureJob::new("hello", || log::info!("hello from a worker")))
//!     .map_err(|rejected| rejected.to_string())?;
//! jobs.wait_until_idle();
//! while let Some(done) = jobs.retrieve_completed_job() {
//!     log::info!("finished {}", done.name());
//! }
//! jobs.shutdown();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
mod queue;
mod system;
mod worker;

pub use config::JobSystemConfig;
pub use error::{JobSystemError, QueueRejected};
pub use system::{JobSystem, JobSystemStats};
