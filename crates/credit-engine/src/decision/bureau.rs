use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use super::domain::{BureauSnapshot, DocumentId};

/// Failures surfaced by a bureau lookup. Unknown documents are reported as
/// `NotFound` only by gateways whose contract distinguishes "no file" from
/// "clean record"; the orchestrator treats both as clean.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BureauError {
    #[error("credit bureau unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("document {0} has no bureau file")]
    NotFound(String),
}

/// Seam over the external credit bureau. An implementation must resolve all
/// four indicators (blacklist, history, active lines, delinquency) before
/// returning; partial bureau data is not an acceptable scoring input.
pub trait BureauGateway: Send + Sync {
    fn lookup(
        &self,
        document: &DocumentId,
    ) -> impl Future<Output = Result<BureauSnapshot, BureauError>> + Send;
}

/// Deterministic zero-latency gateway for tests and demos: canned snapshots
/// keyed by document, clean record for everything else.
#[derive(Debug, Clone, Default)]
pub struct StaticBureau {
    snapshots: BTreeMap<DocumentId, BureauSnapshot>,
    offline: bool,
}

impl StaticBureau {
    pub fn with_snapshot(mut self, document: DocumentId, snapshot: BureauSnapshot) -> Self {
        self.snapshots.insert(document, snapshot);
        self
    }

    /// Gateway that fails every lookup, for outage scenarios.
    pub fn unreachable() -> Self {
        Self {
            snapshots: BTreeMap::new(),
            offline: true,
        }
    }
}

impl BureauGateway for StaticBureau {
    fn lookup(
        &self,
        document: &DocumentId,
    ) -> impl Future<Output = Result<BureauSnapshot, BureauError>> + Send {
        let result = if self.offline {
            Err(BureauError::ServiceUnavailable(
                "bureau endpoint offline".to_string(),
            ))
        } else {
            Ok(self
                .snapshots
                .get(document)
                .cloned()
                .unwrap_or_else(BureauSnapshot::clean))
        };
        async move { result }
    }
}

/// Production-shaped gateway: per-read latency, the four logically
/// independent bureau reads fanned out concurrently, and at most one retry
/// on transient failure. A definitive response, including a blacklist hit,
/// is never re-queried.
#[derive(Debug, Default)]
pub struct SimulatedBureau {
    latency: Duration,
    files: BTreeMap<String, BureauSnapshot>,
    glitches: Mutex<HashSet<String>>,
}

impl SimulatedBureau {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            files: BTreeMap::new(),
            glitches: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_file(mut self, document: DocumentId, snapshot: BureauSnapshot) -> Self {
        self.files.insert(document.0, snapshot);
        self
    }

    /// Mark a document whose next lookup fails transiently once.
    pub fn with_glitch(self, document: DocumentId) -> Self {
        self.glitches
            .lock()
            .expect("glitch mutex poisoned")
            .insert(document.0);
        self
    }

    fn take_glitch(&self, document: &str) -> bool {
        self.glitches
            .lock()
            .expect("glitch mutex poisoned")
            .remove(document)
    }

    async fn blacklist_flag(&self, document: &str) -> bool {
        tokio::time::sleep(self.latency).await;
        self.files
            .get(document)
            .map(|file| file.blacklisted)
            .unwrap_or(false)
    }

    async fn historical_score(&self, document: &str) -> Option<u16> {
        tokio::time::sleep(self.latency).await;
        self.files.get(document).and_then(|file| file.historical_score)
    }

    async fn active_credit_lines(&self, document: &str) -> u8 {
        tokio::time::sleep(self.latency).await;
        self.files
            .get(document)
            .map(|file| file.active_credit_lines)
            .unwrap_or(0)
    }

    async fn recent_delinquency(&self, document: &str) -> bool {
        tokio::time::sleep(self.latency).await;
        self.files
            .get(document)
            .map(|file| file.recent_delinquency)
            .unwrap_or(false)
    }

    async fn fetch_once(&self, document: &str) -> Result<BureauSnapshot, BureauError> {
        if self.take_glitch(document) {
            return Err(BureauError::ServiceUnavailable(
                "transient bureau fault".to_string(),
            ));
        }

        // Independent reads; issue them together, wait for all four.
        let (blacklisted, historical_score, active_credit_lines, recent_delinquency) = tokio::join!(
            self.blacklist_flag(document),
            self.historical_score(document),
            self.active_credit_lines(document),
            self.recent_delinquency(document),
        );

        Ok(BureauSnapshot {
            blacklisted,
            historical_score,
            active_credit_lines,
            recent_delinquency,
        })
    }
}

impl BureauGateway for SimulatedBureau {
    fn lookup(
        &self,
        document: &DocumentId,
    ) -> impl Future<Output = Result<BureauSnapshot, BureauError>> + Send {
        async move {
            match self.fetch_once(&document.0).await {
                Ok(snapshot) => Ok(snapshot),
                Err(BureauError::ServiceUnavailable(_)) => self.fetch_once(&document.0).await,
                Err(other) => Err(other),
            }
        }
    }
}
