use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::domain::{DocumentId, EvaluationRecord};

/// Per-applicant slot holding the most recent evaluation record. Strictly a
/// read optimization: entries never outlive their TTL and a miss is always
/// satisfiable from the repository.
#[derive(Debug)]
pub struct LatestResultCache {
    ttl: Duration,
    entries: Mutex<HashMap<DocumentId, CacheEntry>>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    record: EvaluationRecord,
    completed_at: Instant,
    expires_at: Instant,
}

impl LatestResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Complete, unexpired record or a miss; stale entries are evicted on
    /// the way out.
    pub fn get(&self, document: &DocumentId) -> Option<EvaluationRecord> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(document) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.record.clone()),
            Some(_) => {
                entries.remove(document);
                None
            }
            None => None,
        }
    }

    /// Last-writer-wins keyed by completion time: an older evaluation that
    /// finished late never overwrites a fresher record.
    pub fn store(&self, record: EvaluationRecord, completed_at: Instant) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        if let Some(existing) = entries.get(&record.document_id) {
            if existing.completed_at > completed_at {
                return;
            }
        }
        let document = record.document_id.clone();
        entries.insert(
            document,
            CacheEntry {
                record,
                completed_at,
                expires_at: completed_at + self.ttl,
            },
        );
    }
}
