use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::models::ImuSample;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("session already exists: {0}")]
    Duplicate(String),
}

/// What `stop` hands back once a session's buffer is dropped.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub duration_s: f64,
    pub total_samples: usize,
}

/// A single session's ring buffer. Only the store touches this; all access
/// goes through the owning map entry's lock.
#[derive(Debug)]
struct Session {
    started_at: DateTime<Utc>,
    samples: VecDeque<ImuSample>,
    max_samples: usize,
}

impl Session {
    fn new(max_samples: usize) -> Self {
        Self {
            started_at: Utc::now(),
            samples: VecDeque::with_capacity(max_samples),
            max_samples,
        }
    }

    /// Append a batch, then evict from the front until the cap holds. A
    /// batch is admitted whole before eviction runs, so a batch larger than
    /// the cap leaves exactly the newest `max_samples` behind.
    fn append(&mut self, samples: Vec<ImuSample>) {
        self.samples.extend(samples);
        if self.samples.len() > self.max_samples {
            let excess = self.samples.len() - self.max_samples;
            self.samples.drain(..excess);
        }
    }

    /// Up to `count` most recent samples, oldest first.
    fn latest(&self, count: usize) -> Vec<ImuSample> {
        let skip = self.samples.len().saturating_sub(count);
        self.samples.iter().skip(skip).cloned().collect()
    }

    fn duration_s(&self) -> f64 {
        (Utc::now() - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Registry of live sessions. Each entry locks independently, so operations
/// on one session serialize while distinct sessions proceed in parallel.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    default_max_samples: usize,
}

impl SessionStore {
    pub fn new(default_max_samples: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            default_max_samples,
        }
    }

    /// Register a new session and return its id. Without an explicit id a
    /// UUID is generated; an explicit id that is already live is rejected.
    pub fn create(&self, id: Option<String>) -> Result<String, StoreError> {
        let session_id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
        match self.sessions.entry(session_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(session_id)),
            Entry::Vacant(entry) => {
                entry.insert(Session::new(self.default_max_samples));
                Ok(session_id)
            }
        }
    }

    /// Append one batch atomically: readers never observe a partially
    /// applied batch.
    pub fn append(&self, session_id: &str, samples: Vec<ImuSample>) -> Result<(), StoreError> {
        let mut session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| StoreError::NotFound(session_id.to_string()))?;
        session.append(samples);
        Ok(())
    }

    /// Most recent `count` samples in arrival order. Unknown sessions read
    /// as empty rather than failing; analysis handlers resolve existence
    /// before reading.
    pub fn latest(&self, session_id: &str, count: usize) -> Vec<ImuSample> {
        match self.sessions.get(session_id) {
            Some(session) => session.latest(count),
            None => Vec::new(),
        }
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn sample_count(&self, session_id: &str) -> usize {
        self.sessions
            .get(session_id)
            .map(|session| session.samples.len())
            .unwrap_or(0)
    }

    /// Drop the session and return its final stats. A second stop for the
    /// same id fails with `NotFound`.
    pub fn stop(&self, session_id: &str) -> Result<SessionSnapshot, StoreError> {
        let (_, session) = self
            .sessions
            .remove(session_id)
            .ok_or_else(|| StoreError::NotFound(session_id.to_string()))?;
        Ok(SessionSnapshot {
            duration_s: session.duration_s(),
            total_samples: session.samples.len(),
        })
    }

    pub fn active(&self) -> Vec<String> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// Remove sessions older than `max_age` and return how many went. Age
    /// is measured from start time, not last append, so a session that
    /// streams past the limit is reaped mid-stream.
    pub fn sweep(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let before = self.sessions.len();
        self.sessions.retain(|id, session| {
            let keep = session.started_at > cutoff;
            if !keep {
                let age_s = (Utc::now() - session.started_at).num_seconds();
                tracing::warn!("Sweeping session {} (started {}s ago)", id, age_s);
            }
            keep
        });
        before - self.sessions.len()
    }
}
