//! Cancellation bookkeeping for running download polls
//!
//! Every chat gets one cancellation token (a child of the tracker's root
//! token) shared by all of its running jobs. `/cancel` cancels a chat's token;
//! shutdown cancels the root and with it everything else.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

struct ChatJobs {
    generation: u64,
    token: CancellationToken,
    active: usize,
}

#[derive(Default)]
struct Inner {
    chats: HashMap<i64, ChatJobs>,
    next_generation: u64,
}

/// Tracks the running jobs of every chat
#[derive(Clone, Default)]
pub struct JobTracker {
    root: CancellationToken,
    inner: Arc<Mutex<Inner>>,
}

/// Held by a running job; releases its slot when dropped
pub struct JobGuard {
    tracker: JobTracker,
    chat_id: i64,
    generation: u64,
    token: CancellationToken,
}

impl JobGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.tracker.release(self.chat_id, self.generation);
    }
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job for `chat_id`
    pub fn start(&self, chat_id: i64) -> JobGuard {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.next_generation += 1;
        let generation = inner.next_generation;

        let entry = inner.chats.entry(chat_id).or_insert_with(|| ChatJobs {
            generation,
            token: self.root.child_token(),
            active: 0,
        });
        entry.active += 1;
        let guard_generation = entry.generation;
        let token = entry.token.child_token();

        JobGuard {
            tracker: self.clone(),
            chat_id,
            generation: guard_generation,
            token,
        }
    }

    /// Cancel every running job of `chat_id`
    ///
    /// # Returns
    /// * Number of jobs that were running
    pub fn cancel_chat(&self, chat_id: i64) -> usize {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match inner.chats.remove(&chat_id) {
            Some(jobs) => {
                jobs.token.cancel();
                jobs.active
            }
            None => 0,
        }
    }

    /// Number of running jobs for `chat_id`
    pub fn active(&self, chat_id: i64) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.chats.get(&chat_id).map_or(0, |jobs| jobs.active)
    }

    /// Cancel everything; used on shutdown
    pub fn shutdown(&self) {
        self.root.cancel();
    }

    fn release(&self, chat_id: i64, generation: u64) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let finished = match inner.chats.get_mut(&chat_id) {
            // A cancelled chat may have been re-registered since; leave the new entry alone
            Some(jobs) if jobs.generation == generation => {
                jobs.active = jobs.active.saturating_sub(1);
                jobs.active == 0
            }
            _ => false,
        };
        if finished {
            inner.chats.remove(&chat_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guards_count_and_release() {
        let tracker = JobTracker::new();
        let first = tracker.start(1);
        let second = tracker.start(1);
        assert_eq!(tracker.active(1), 2);

        drop(first);
        assert_eq!(tracker.active(1), 1);
        drop(second);
        assert_eq!(tracker.active(1), 0);
    }

    #[test]
    fn test_cancel_chat_only_hits_that_chat() {
        let tracker = JobTracker::new();
        let mine = tracker.start(1);
        let theirs = tracker.start(2);

        assert_eq!(tracker.cancel_chat(1), 1);
        assert!(mine.token().is_cancelled());
        assert!(!theirs.token().is_cancelled());
        assert_eq!(tracker.cancel_chat(1), 0);
    }

    #[test]
    fn test_new_job_after_cancel_is_live() {
        let tracker = JobTracker::new();
        let old = tracker.start(1);
        tracker.cancel_chat(1);

        let fresh = tracker.start(1);
        assert!(!fresh.token().is_cancelled());

        // Dropping the cancelled guard must not release the fresh job's slot
        drop(old);
        assert_eq!(tracker.active(1), 1);
    }

    #[test]
    fn test_shutdown_cancels_everything() {
        let tracker = JobTracker::new();
        let a = tracker.start(1);
        let b = tracker.start(2);

        tracker.shutdown();
        assert!(a.token().is_cancelled());
        assert!(b.token().is_cancelled());
    }
}
