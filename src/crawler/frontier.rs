//! Frontier and visited-set management
//!
//! One mutex guards the pending queue, the visited set, the in-flight count
//! and the cancellation flag together, so check-and-mark on push is atomic
//! and completion detection (empty queue, zero in-flight) cannot race a
//! concurrent push. Waiting poppers park on a `Notify`.

use std::collections::{HashSet, VecDeque};
use std::pin::pin;
use std::sync::Mutex;
use tokio::sync::Notify;

/// How a frontier entry should be processed once fetched
///
/// Sitemap-kind entries are re-examined after the fetch: a URL listed in a
/// sitemap index may itself turn out to be another index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Html,
    Sitemap,
    SitemapIndex,
}

/// A unit of pending work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Normalized absolute URL
    pub url: String,
    /// Discovery depth from the seed; non-decreasing along any chain
    pub depth: u32,
    pub kind: EntryKind,
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
    in_flight: usize,
    cancelled: bool,
}

/// Shared work queue with built-in deduplication and completion detection
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues an entry unless its URL was already seen or the run is
    /// cancelled. Marking visited and enqueueing happen under one lock, so a
    /// URL can be enqueued at most once regardless of interleaving.
    pub fn push(&self, entry: FrontierEntry) -> bool {
        {
            let mut state = self.state.lock().unwrap();
            if state.cancelled || !state.visited.insert(entry.url.clone()) {
                return false;
            }
            state.queue.push_back(entry);
        }
        self.notify.notify_waiters();
        true
    }

    /// Marks a URL as seen without enqueueing it
    ///
    /// Used for URLs that are recorded directly (sitemap entries), so a later
    /// HTML discovery of the same URL is not fetched again.
    pub fn mark_visited(&self, url: &str) -> bool {
        self.state.lock().unwrap().visited.insert(url.to_string())
    }

    /// Dequeues the next entry, waiting while the queue is empty but other
    /// workers still hold in-flight entries (they may push more work).
    ///
    /// Returns `None` once the run is complete (queue empty, nothing
    /// in-flight) or cancelled. Every `Some` must be paired with a
    /// [`Frontier::task_done`] call after processing.
    pub async fn pop(&self) -> Option<FrontierEntry> {
        loop {
            // Register for wake-ups before inspecting state, otherwise a
            // notify between the check and the await would be lost.
            let mut notified = pin!(self.notify.notified());
            notified.as_mut().enable();

            {
                let mut state = self.state.lock().unwrap();
                if state.cancelled {
                    return None;
                }
                if let Some(entry) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Some(entry);
                }
                if state.in_flight == 0 {
                    drop(state);
                    // Wake the other waiters so they observe completion too
                    self.notify.notify_waiters();
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Signals that a popped entry is fully processed (children pushed)
    pub fn task_done(&self) {
        let completed = {
            let mut state = self.state.lock().unwrap();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.queue.is_empty() && state.in_flight == 0
        };
        if completed {
            self.notify.notify_waiters();
        }
    }

    /// Cancels the run; pending entries are dropped and poppers unblock
    pub fn cancel(&self) {
        self.state.lock().unwrap().cancelled = true;
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.lock().unwrap().cancelled
    }

    /// Number of entries waiting in the queue
    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }

    /// Number of distinct URLs ever pushed or marked
    pub fn seen(&self) -> usize {
        self.state.lock().unwrap().visited.len()
    }
}
