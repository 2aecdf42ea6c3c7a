//! Short-lived store for type prompts awaiting a button press
//!
//! When a single link is resolved the bot shows one button per type. The
//! button's callback data is too small to carry the link, so the link and the
//! offered types are kept here under a generated id until the user picks one.

use chrono::{DateTime, Duration, Utc};
use getstocks::TypeOption;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::constants::{DEFAULT_SELECTION_TTL, SELECTION_ID_LEN};

/// A link waiting for the user to choose a type
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSelection {
    /// Chat that was shown the prompt; only it may answer
    pub chat_id: i64,
    pub link: String,
    pub premium: bool,
    pub types: Vec<TypeOption>,
    pub created_at: DateTime<Utc>,
}

impl PendingSelection {
    pub fn new(chat_id: i64, link: impl Into<String>, premium: bool, types: Vec<TypeOption>) -> Self {
        Self {
            chat_id,
            link: link.into(),
            premium,
            types,
            created_at: Utc::now(),
        }
    }
}

/// Generate an id for a pending selection
///
/// # Returns
/// * 16-character hexadecimal id
pub fn generate_selection_id(chat_id: i64, link: &str, sequence: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(chat_id.to_le_bytes());
    hasher.update(link.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(Utc::now().timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    let result = hasher.finalize();

    hex::encode(&result[..SELECTION_ID_LEN / 2])
}

/// Thread-safe map of pending selections with expiry
#[derive(Clone)]
pub struct SelectionStore {
    entries: Arc<RwLock<HashMap<String, PendingSelection>>>,
    sequence: Arc<AtomicU64>,
    ttl: Duration,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SELECTION_TTL)
    }
}

impl SelectionStore {
    /// Create an empty store whose entries live for `ttl`
    pub fn new(ttl: std::time::Duration) -> Self {
        let ttl = Duration::from_std(ttl).unwrap_or_else(|_| Duration::minutes(10));
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            sequence: Arc::new(AtomicU64::new(0)),
            ttl,
        }
    }

    /// Store a selection and return the id to put in the buttons
    pub fn insert(&self, selection: PendingSelection) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let id = generate_selection_id(selection.chat_id, &selection.link, sequence);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(id.clone(), selection);
        id
    }

    /// Remove and return the selection for `id`, if `chat_id` owns it and it
    /// has not expired.
    ///
    /// Removal happens under the write lock, so of two racing button presses
    /// exactly one gets the selection.
    pub fn take(&self, id: &str, chat_id: i64) -> Option<PendingSelection> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());

        match entries.get(id) {
            Some(entry) if entry.chat_id == chat_id => {}
            Some(_) => {
                tracing::warn!("Chat {} tried to answer a selection it does not own", chat_id);
                return None;
            }
            None => return None,
        }

        let entry = entries.remove(id)?;
        if self.is_expired(&entry, Utc::now()) {
            tracing::debug!("Selection {} expired before it was answered", id);
            return None;
        }
        Some(entry)
    }

    /// Drop every selection belonging to `chat_id`
    ///
    /// # Returns
    /// * Number of selections removed
    pub fn clear_chat(&self, chat_id: i64) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let initial_count = entries.len();
        entries.retain(|_, entry| entry.chat_id != chat_id);
        initial_count - entries.len()
    }

    /// Remove expired selections
    ///
    /// # Returns
    /// * Number of selections cleaned up
    pub fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let now = Utc::now();
        let initial_count = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        initial_count - entries.len()
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, entry: &PendingSelection, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.created_at) >= self.ttl
    }
}
