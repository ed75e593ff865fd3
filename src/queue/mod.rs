//! Durable queue of bookmark submissions awaiting a retry.
//!
//! The whole queue is stored as one JSON array under [`QUEUE_KEY`]. An empty
//! queue has no stored value at all, so "absent" is the only way an empty
//! queue looks on disk. Every mutation is written through before it returns.

use std::future::Future;
use std::sync::Arc;

use crate::app::{Result, SubmitError};
use crate::domain::PendingSubmission;
use crate::store::KeyValueStore;

pub const QUEUE_KEY: &str = "pending_submissions";
pub const DEFAULT_MAX_PENDING: usize = 256;

/// One retry made by [`SubmissionQueue::drain_and_retry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub item: PendingSubmission,
    pub outcome: std::result::Result<(), SubmitError>,
}

pub struct SubmissionQueue {
    store: Arc<dyn KeyValueStore + Send + Sync>,
    items: Vec<PendingSubmission>,
    loaded: bool,
    max_pending: usize,
}

impl SubmissionQueue {
    pub fn new(store: Arc<dyn KeyValueStore + Send + Sync>) -> Self {
        Self::with_max_pending(store, DEFAULT_MAX_PENDING)
    }

    pub fn with_max_pending(store: Arc<dyn KeyValueStore + Send + Sync>, max_pending: usize) -> Self {
        Self {
            store,
            items: Vec::new(),
            loaded: false,
            max_pending: max_pending.max(1),
        }
    }

    /// Hydrate from storage on first access. In-memory entries are never
    /// replaced by stored ones.
    pub fn load_if_needed(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }

        if self.items.is_empty() {
            if let Some(blob) = self.store.get(QUEUE_KEY)? {
                self.items = serde_json::from_str(&blob)?;
                tracing::info!("Restored {} pending submissions", self.items.len());
            }
        }

        self.loaded = true;
        Ok(())
    }

    /// Add `item` unless an equal entry is already queued. Returns whether it
    /// was added. A full queue drops its oldest entry to make room.
    pub fn enqueue(&mut self, item: PendingSubmission) -> Result<bool> {
        self.load_if_needed()?;

        if self.items.contains(&item) {
            tracing::debug!("{} is already pending", item.url);
            return Ok(false);
        }

        let previous = self.items.clone();
        if self.items.len() >= self.max_pending {
            let evicted = self.items.remove(0);
            tracing::warn!(
                "Pending queue is full ({}), dropping {}",
                self.max_pending,
                evicted.url
            );
        }
        tracing::info!("Queued {} for later", item.url);
        self.items.push(item);

        self.persist_or_restore(previous)?;
        Ok(true)
    }

    /// Remove the entry equal to `item`. Returns whether one was removed.
    pub fn dequeue(&mut self, item: &PendingSubmission) -> Result<bool> {
        self.load_if_needed()?;

        let Some(index) = self.items.iter().position(|queued| queued == item) else {
            return Ok(false);
        };

        let previous = self.items.clone();
        self.items.remove(index);

        self.persist_or_restore(previous)?;
        Ok(true)
    }

    /// Retry every queued entry in insertion order, dropping the ones that
    /// now succeed. Failures are logged and leave the entry queued.
    ///
    /// Returns the outcome of each attempt, in the order they were made.
    pub async fn drain_and_retry<F, Fut>(&mut self, mut submit: F) -> Vec<Attempt>
    where
        F: FnMut(PendingSubmission) -> Fut,
        Fut: Future<Output = std::result::Result<(), SubmitError>>,
    {
        if let Err(e) = self.load_if_needed() {
            tracing::warn!("Could not load pending submissions: {}", e);
            return Vec::new();
        }

        let snapshot = self.items.clone();
        if snapshot.is_empty() {
            return Vec::new();
        }
        tracing::info!("Retrying {} pending submissions", snapshot.len());

        let mut attempts = Vec::with_capacity(snapshot.len());
        for item in snapshot {
            let outcome = submit(item.clone()).await;
            match outcome {
                Ok(()) => {
                    if let Err(e) = self.dequeue(&item) {
                        tracing::error!("Sent {} but could not drop it from the queue: {}", item.url, e);
                    }
                }
                Err(e) => {
                    tracing::debug!("Retry of {} failed: {}", item.url, e);
                }
            }
            attempts.push(Attempt { item, outcome });
        }
        attempts
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(QUEUE_KEY)?;
        self.items.clear();
        self.loaded = true;
        Ok(())
    }

    /// Entries currently in memory; call [`load_if_needed`](Self::load_if_needed) first.
    pub fn pending(&self) -> &[PendingSubmission] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn persist(&self) -> Result<()> {
        if self.items.is_empty() {
            self.store.remove(QUEUE_KEY)
        } else {
            let blob = serde_json::to_string(&self.items)?;
            self.store.set(QUEUE_KEY, &blob)
        }
    }

    // Memory must not run ahead of what is on disk.
    fn persist_or_restore(&mut self, previous: Vec<PendingSubmission>) -> Result<()> {
        if let Err(e) = self.persist() {
            self.items = previous;
            return Err(e);
        }
        Ok(())
    }
}
