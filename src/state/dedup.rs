use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Fingerprints of transitions that have already been alerted.
///
/// Each fingerprint is indexed by the last instant it was seen, so the
/// cache can be pruned with the retention window instead of growing
/// without bound. A fingerprint that keeps suppressing duplicates has its
/// timestamp refreshed (least-recently-seen expiry).
#[derive(Default)]
pub struct DedupCache {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `fingerprint` as seen at `now`. Returns `true` when the
    /// fingerprint was not present, i.e. the transition is novel and
    /// should be alerted.
    pub fn insert_novel(&self, fingerprint: &str, now: DateTime<Utc>) -> bool {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(fingerprint.to_string(), now).is_none()
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.entries.lock().unwrap().contains_key(fingerprint)
    }

    /// Drop fingerprints last seen before `cutoff`. Returns how many were
    /// removed.
    pub fn prune_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, last_seen| *last_seen >= cutoff);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
