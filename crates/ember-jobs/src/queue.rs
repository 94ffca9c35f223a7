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

//! The lock-guarded queues a job moves through.
//!
//! Each queue owns its own mutex; no operation here holds two of them, except
//! [`JobQueue::claim_front`], which runs the caller's bookkeeping while the
//! pending lock is still held.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ember_core::{JobId, JobStatusWatch};

/// A FIFO guarded by its own mutex, with a condition variable for idle consumers.
#[derive(Debug)]
pub(crate) struct JobQueue<T> {
    items: Mutex<VecDeque<T>>,
    available: Condvar,
}

impl<T> JobQueue<T> {
    pub(crate) fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    // Every critical section is a single push or pop, so a panic elsewhere
    // cannot leave the deque half-updated.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an item and wakes one idle consumer.
    pub(crate) fn push_back(&self, item: T) {
        self.lock().push_back(item);
        self.available.notify_one();
    }

    /// Removes the oldest item without waiting.
    pub(crate) fn pop_front(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Removes the oldest item, waiting up to `idle_wait` if the queue is empty.
    ///
    /// Nothing is claimed once `stop` is set. `on_claim` runs on the item before
    /// the queue lock is released.
    pub(crate) fn claim_front(
        &self,
        idle_wait: Duration,
        stop: &AtomicBool,
        on_claim: impl FnOnce(&T),
    ) -> Option<T> {
        let mut items = self.lock();
        if items.is_empty() {
            items = self
                .available
                .wait_timeout(items, idle_wait)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        if stop.load(Ordering::Acquire) {
            return None;
        }
        let item = items.pop_front()?;
        on_claim(&item);
        Some(item)
    }

    /// Removes every item, oldest first.
    pub(crate) fn drain(&self) -> Vec<T> {
        self.lock().drain(..).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Wakes every idle consumer.
    pub(crate) fn wake_all(&self) {
        self.available.notify_all();
    }
}

/// Bookkeeping entry for a job a worker is executing.
#[derive(Debug)]
pub(crate) struct ClaimRecord {
    pub(crate) worker: usize,
    pub(crate) watch: JobStatusWatch,
}

/// The set of jobs currently being executed.
#[derive(Debug, Default)]
pub(crate) struct ClaimList {
    records: Mutex<Vec<ClaimRecord>>,
}

impl ClaimList {
    fn lock(&self) -> MutexGuard<'_, Vec<ClaimRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn insert(&self, record: ClaimRecord) {
        self.lock().push(record);
    }

    /// Removes the claim for `id`. Linear in the number of in-flight jobs,
    /// which is bounded by the worker count.
    pub(crate) fn remove(&self, id: JobId) -> Option<ClaimRecord> {
        let mut records = self.lock();
        let position = records.iter().position(|r| r.watch.id() == id)?;
        Some(records.swap_remove(position))
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::{ClosureJob, ScheduledJob};
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_queue_is_fifo() {
        let queue = JobQueue::new();
        queue.push_back(1);
        queue.push_back(2);
        queue.push_back(3);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop_front(), Some(1));
        assert_eq!(queue.drain(), vec![2, 3]);
        assert_eq!(queue.pop_front(), None);
    }

    #[test]
    fn test_claim_front_runs_bookkeeping() {
        let queue = JobQueue::new();
        queue.push_back("a");
        let mut seen = None;
        let stop = AtomicBool::new(false);
        let claimed = queue.claim_front(Duration::from_millis(1), &stop, |item| seen = Some(*item));
        assert_eq!(claimed, Some("a"));
        assert_eq!(seen, Some("a"));
    }

    #[test]
    fn test_claim_front_times_out_when_empty() {
        let queue: JobQueue<u32> = JobQueue::new();
        let start = Instant::now();
        let stop = AtomicBool::new(false);
        let claimed =
            queue.claim_front(Duration::from_millis(5), &stop, |_| panic!("nothing to claim"));
        assert!(claimed.is_none());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_push_wakes_waiting_consumer() {
        let queue = Arc::new(JobQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let stop = AtomicBool::new(false);
                loop {
                    if let Some(v) = queue.claim_front(Duration::from_secs(1), &stop, |_| {}) {
                        return v;
                    }
                }
            })
        };
        thread::sleep(Duration::from_millis(20));
        queue.push_back(42u32);
        let value = consumer.join().expect("consumer thread");
        assert_eq!(value, 42);
    }

    #[test]
    fn test_stop_flag_prevents_claim() {
        let queue = JobQueue::new();
        queue.push_back(7u32);
        let stop = AtomicBool::new(true);
        assert!(queue
            .claim_front(Duration::from_millis(1), &stop, |_| {})
            .is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_claim_list_remove_by_id() {
        let list = ClaimList::default();
        let a = ScheduledJob::new(ClosureJob::new("a", || {}));
        let b = ScheduledJob::new(ClosureJob::new("b", || {}));
        list.insert(ClaimRecord {
            worker: 0,
            watch: a.watch(),
        });
        list.insert(ClaimRecord {
            worker: 1,
            watch: b.watch(),
        });

        let removed = list.remove(a.id()).expect("a was claimed");
        assert_eq!(removed.worker, 0);
        assert_eq!(list.len(), 1);
        assert!(list.remove(a.id()).is_none());
    }
}
