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

//! Configuration for the job system.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::JobSystemError;

/// Configuration for a [`JobSystem`](crate::JobSystem), fixed for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSystemConfig {
    /// Number of worker threads to start.
    /// A negative value means "hardware threads minus one" (at least one).
    pub requested_worker_count: i32,
    /// How long an idle worker waits for new work before re-checking for shutdown, in microseconds.
    pub idle_wait_us: u64,
    /// Worker threads are named `"{thread_name_prefix}-{index}"`.
    pub thread_name_prefix: String,
}

impl Default for JobSystemConfig {
    fn default() -> Self {
        Self {
            requested_worker_count: -1,
            idle_wait_us: 100,
            thread_name_prefix: "ember-job-worker".to_string(),
        }
    }
}

impl JobSystemConfig {
    /// Creates a default configuration with an explicit worker count.
    pub fn with_workers(requested_worker_count: i32) -> Self {
        Self {
            requested_worker_count,
            ..Default::default()
        }
    }

    /// Parses and validates a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, JobSystemError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, JobSystemError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| JobSystemError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loading job system configuration from '{}'", path.display());
        Self::from_json_str(&json)
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<(), JobSystemError> {
        if self.idle_wait_us == 0 {
            return Err(JobSystemError::InvalidConfig(
                "idle_wait_us must be greater than zero".to_string(),
            ));
        }
        if self.thread_name_prefix.is_empty() {
            return Err(JobSystemError::InvalidConfig(
                "thread_name_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The idle wait as a [`Duration`].
    pub fn idle_wait(&self) -> Duration {
        Duration::from_micros(self.idle_wait_us)
    }

    /// The number of workers this configuration starts on the current machine.
    pub fn resolved_worker_count(&self) -> usize {
        if self.requested_worker_count < 0 {
            let hardware = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1);
            hardware.saturating_sub(1).max(1)
        } else {
            self.requested_worker_count as usize
        }
    }
}
