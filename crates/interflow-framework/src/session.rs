//! Transient session storage.
//!
//! When a reply carries continuations (buttons, selects, modals), the state of
//! the current request is saved under a fresh [`SessionToken`] and the token
//! is appended to every continuation identifier. The interaction raised by
//! the continuation brings the token back, and the state is looked up here.
//!
//! # Bounds
//!
//! The store is bounded two ways:
//!
//! - **Age**: an entry older than `max_age` (measured from insertion) is
//!   treated as missing, whatever the store's size. This is the hard
//!   guarantee.
//! - **Count**: once `max_entries` is reached, expired entries are purged
//!   and, if the store is still full, the entry that was least recently
//!   inserted or read is evicted.
//!
//! # Consumption
//!
//! [`SessionConsumption::Reusable`] keeps an entry after it is read, so a
//! user can reopen a cancelled modal or the platform can redeliver a
//! submission. [`SessionConsumption::Once`] removes it on the first
//! successful read.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::error::{FlowError, FlowResult};

/// Default maximum number of live sessions.
pub const DEFAULT_MAX_ENTRIES: usize = 1_000;

/// Default maximum age of a session.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(15 * 60);

/// Bounds for the state type carried by a session.
///
/// Sessions hold a partial view of some logical state: any subset of it may
/// be present. A struct of `Option` fields or a `serde_json::Map` both fit.
/// `Default` is the empty state a request starts from when no session was
/// found.
pub trait SessionData: Clone + Default + Send + Sync + 'static {}

impl<T: Clone + Default + Send + Sync + 'static> SessionData for T {}

// ============================================================================
// SessionToken
// ============================================================================

static TOKEN_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// An opaque key correlating a reply's continuations with saved state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generates a new token.
    ///
    /// Tokens combine a process-wide sequence number with a random UUID
    /// fragment, so two replies compiled in the same instant still get
    /// different tokens.
    pub fn generate() -> Self {
        let sequence = TOKEN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let nonce = Uuid::new_v4().simple().to_string();
        Self(format!("{sequence:x}-{}", &nonce[..16]))
    }

    /// Wraps a token received from an inbound identifier.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SessionToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Settings
// ============================================================================

/// What happens to a session when it is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionConsumption {
    /// The first successful read removes the session.
    Once,
    /// Reads leave the session in place until it expires or is evicted.
    #[default]
    Reusable,
}

/// Bounds and read policy of a [`SessionStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Maximum number of live sessions.
    pub max_entries: usize,
    /// Maximum age of a session, measured from insertion.
    pub max_age: Duration,
    /// Read policy.
    pub consumption: SessionConsumption,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_age: DEFAULT_MAX_AGE,
            consumption: SessionConsumption::default(),
        }
    }
}

// ============================================================================
// SessionStore
// ============================================================================

struct Entry<S> {
    record: S,
    inserted_at: Instant,
    /// Recency stamp; the smallest live stamp is evicted first.
    stamp: u64,
}

struct StoreInner<S> {
    entries: HashMap<SessionToken, Entry<S>>,
    recency: BTreeMap<u64, SessionToken>,
    next_stamp: u64,
}

impl<S> StoreInner<S> {
    fn stamp(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }

    fn remove(&mut self, token: &str) -> Option<Entry<S>> {
        let entry = self.entries.remove(token)?;
        self.recency.remove(&entry.stamp);
        Some(entry)
    }

    fn purge_expired(&mut self, now: Instant, max_age: Duration) -> usize {
        let expired: Vec<SessionToken> = self
            .entries
            .iter()
            .filter(|(_, entry)| is_expired(entry, now, max_age))
            .map(|(token, _)| token.clone())
            .collect();

        for token in &expired {
            self.remove(token.as_str());
        }
        expired.len()
    }

    fn evict_oldest(&mut self) -> Option<SessionToken> {
        let (_, token) = self.recency.pop_first()?;
        self.entries.remove(&token);
        Some(token)
    }
}

fn is_expired<S>(entry: &Entry<S>, now: Instant, max_age: Duration) -> bool {
    now.saturating_duration_since(entry.inserted_at) >= max_age
}

/// A bounded, time-aware key-value store of session state.
///
/// All operations take a single internal lock, so reads, takes and writes are
/// atomic with respect to one token.
pub struct SessionStore<S> {
    inner: Mutex<StoreInner<S>>,
    settings: SessionSettings,
}

impl<S: SessionData> Default for SessionStore<S> {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl<S: SessionData> SessionStore<S> {
    /// Creates an empty store with the given settings.
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                entries: HashMap::new(),
                recency: BTreeMap::new(),
                next_stamp: 0,
            }),
            settings,
        }
    }

    /// Returns the settings of this store.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Saves `record` under `token`.
    ///
    /// Fails with [`FlowError::SessionCollision`] if a live session already
    /// holds the token.
    pub fn set(&self, token: SessionToken, record: S) -> FlowResult<()> {
        let now = Instant::now();
        let max_age = self.settings.max_age;
        let mut inner = self.inner.lock();

        if let Some(existing) = inner.entries.get(&token) {
            if !is_expired(existing, now, max_age) {
                return Err(FlowError::SessionCollision {
                    token: token.to_string(),
                });
            }
            inner.remove(token.as_str());
        }

        if inner.entries.len() >= self.settings.max_entries {
            let purged = inner.purge_expired(now, max_age);
            if purged > 0 {
                trace!(purged, "purged expired sessions");
            }
        }
        while inner.entries.len() >= self.settings.max_entries {
            match inner.evict_oldest() {
                Some(evicted) => debug!(token = %evicted, "session store full, evicted oldest"),
                None => break,
            }
        }

        let stamp = inner.stamp();
        inner.recency.insert(stamp, token.clone());
        inner.entries.insert(
            token,
            Entry {
                record,
                inserted_at: now,
                stamp,
            },
        );
        Ok(())
    }

    /// Saves `record` under a freshly generated token and returns the token.
    pub fn insert(&self, record: S) -> FlowResult<SessionToken> {
        let token = SessionToken::generate();
        self.set(token.clone(), record)?;
        trace!(token = %token, "session saved");
        Ok(token)
    }

    /// Returns a copy of the session saved under `token`.
    ///
    /// A hit counts as an access for eviction purposes. Expired entries are
    /// dropped and reported as missing.
    pub fn get(&self, token: &str) -> Option<S> {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        let expired = is_expired(inner.entries.get(token)?, now, self.settings.max_age);
        if expired {
            inner.remove(token);
            trace!(token, "session expired");
            return None;
        }

        let stamp = inner.stamp();
        let StoreInner {
            entries, recency, ..
        } = &mut *inner;
        let (key, entry) = entries.get_key_value(token)?;
        recency.remove(&entry.stamp);
        recency.insert(stamp, key.clone());

        let entry = entries.get_mut(token)?;
        entry.stamp = stamp;
        Some(entry.record.clone())
    }

    /// Removes and returns the session saved under `token`.
    pub fn take(&self, token: &str) -> Option<S> {
        let now = Instant::now();
        let entry = self.inner.lock().remove(token)?;
        if is_expired(&entry, now, self.settings.max_age) {
            trace!(token, "session expired");
            return None;
        }
        Some(entry.record)
    }

    /// Reads a session according to the configured [`SessionConsumption`].
    pub fn lookup(&self, token: &str) -> Option<S> {
        match self.settings.consumption {
            SessionConsumption::Once => self.take(token),
            SessionConsumption::Reusable => self.get(token),
        }
    }

    /// Removes the session saved under `token`, returning whether it existed.
    pub fn remove(&self, token: &str) -> bool {
        self.inner.lock().remove(token).is_some()
    }

    /// Drops every expired session and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        self.inner
            .lock()
            .purge_expired(Instant::now(), self.settings.max_age)
    }

    /// Returns the number of stored sessions, expired ones included until
    /// they are purged.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S> fmt::Debug for SessionStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("len", &self.inner.lock().entries.len())
            .field("settings", &self.settings)
            .finish()
    }
}
