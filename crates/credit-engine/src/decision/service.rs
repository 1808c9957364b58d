use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use super::bureau::{BureauError, BureauGateway};
use super::cache::LatestResultCache;
use super::classify;
use super::config::{ConfigViolation, EngineConfig};
use super::domain::{
    ApplicantProfile, BureauSnapshot, DocumentId, EvaluationId, EvaluationRecord,
    EvaluationStatus, LoanRequest, RiskAssessment, StrategyKind,
};
use super::factors::{self, ValidationError};
use super::gates;
use super::repository::{EvaluationRepository, RepositoryError};
use super::scoring::{self, InvariantViolation};

/// Outcome of a completed evaluation. Rejection is a normal, successful
/// result of the function, distinct from infrastructure failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Approved(EvaluationRecord),
    Rejected(EvaluationRecord),
}

impl Decision {
    pub fn record(&self) -> &EvaluationRecord {
        match self {
            Decision::Approved(record) | Decision::Rejected(record) => record,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Decision::Approved(_))
    }
}

/// Infrastructure failures for one evaluation call; the `Failed` side of
/// the exposed result.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Bureau(#[from] BureauError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

static EVALUATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_evaluation_id() -> EvaluationId {
    let id = EVALUATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EvaluationId(format!("eval-{id:06}"))
}

/// Facade composing the bureau gateway, factor scoring, gate validation,
/// classification, persistence, and the latest-result cache.
pub struct DecisionService<B, R> {
    bureau: Arc<B>,
    repository: Arc<R>,
    config: Arc<EngineConfig>,
    cache: Arc<LatestResultCache>,
}

impl<B, R> DecisionService<B, R>
where
    B: BureauGateway + 'static,
    R: EvaluationRepository + 'static,
{
    /// Validates the calibration once; a broken weight set or sector table
    /// refuses to construct rather than surfacing mid-evaluation.
    pub fn new(bureau: Arc<B>, repository: Arc<R>, config: EngineConfig) -> Result<Self, ConfigViolation> {
        config.validate()?;
        let cache = Arc::new(LatestResultCache::new(config.cache_ttl));
        Ok(Self {
            bureau,
            repository,
            config: Arc::new(config),
            cache,
        })
    }

    /// Evaluate one applicant/request pair end to end and persist the
    /// outcome. A bureau outage fails fast: the engine never scores without
    /// bureau context, but an error-state record is still written for audit.
    pub async fn evaluate(
        &self,
        profile: &ApplicantProfile,
        request: &LoanRequest,
    ) -> Result<Decision, EvaluationError> {
        factors::validate_request(profile, request)?;
        let strategy = request.strategy.unwrap_or(StrategyKind::Balanced);

        let snapshot = match self.bureau.lookup(&profile.document_id).await {
            Ok(snapshot) => snapshot,
            // unknown document means clean record, not failure
            Err(BureauError::NotFound(_)) => BureauSnapshot::clean(),
            Err(err @ BureauError::ServiceUnavailable(_)) => {
                warn!(document = %profile.document_id.0, error = %err, "bureau lookup failed");
                let record = EvaluationRecord {
                    evaluation_id: next_evaluation_id(),
                    document_id: profile.document_id.clone(),
                    strategy,
                    status: EvaluationStatus::Error,
                    assessment: None,
                    error: Some(err.to_string()),
                    evaluated_at: Utc::now(),
                };
                // audit trail only; the cache never sees error states
                self.repository.save(record)?;
                return Err(EvaluationError::Bureau(err));
            }
        };

        let assessment = assess(profile, request, &snapshot, strategy, &self.config)?;
        let approved = assessment.approved;
        let blended_score = assessment.blended_score;

        let record = EvaluationRecord {
            evaluation_id: next_evaluation_id(),
            document_id: profile.document_id.clone(),
            strategy,
            status: if approved {
                EvaluationStatus::Approved
            } else {
                EvaluationStatus::Rejected
            },
            assessment: Some(assessment),
            error: None,
            evaluated_at: Utc::now(),
        };

        self.repository.save(record.clone())?;
        self.cache.store(record.clone(), Instant::now());
        info!(
            document = %record.document_id.0,
            approved,
            blended_score,
            strategy = strategy.label(),
            "evaluation persisted"
        );

        if approved {
            Ok(Decision::Approved(record))
        } else {
            Ok(Decision::Rejected(record))
        }
    }

    /// Latest persisted result for an applicant, served from the cache when
    /// fresh and recomputed from the repository otherwise.
    pub fn latest(
        &self,
        document: &DocumentId,
    ) -> Result<Option<EvaluationRecord>, EvaluationError> {
        if let Some(record) = self.cache.get(document) {
            return Ok(Some(record));
        }
        Ok(self.repository.find_latest(document)?)
    }

    /// Full append-only audit trail for an applicant.
    pub fn history(
        &self,
        document: &DocumentId,
    ) -> Result<Vec<EvaluationRecord>, EvaluationError> {
        Ok(self.repository.history(document)?)
    }
}

/// Deterministic core: the same (profile, request, snapshot) triple always
/// produces the same assessment. Ids and timestamps live outside.
pub(crate) fn assess(
    profile: &ApplicantProfile,
    request: &LoanRequest,
    snapshot: &BureauSnapshot,
    strategy_kind: StrategyKind,
    config: &EngineConfig,
) -> Result<RiskAssessment, EvaluationError> {
    let (components, signals) = factors::score_profile(profile, request, config)?;
    let strategy = config.strategies.profile(strategy_kind);

    let internal_score = scoring::internal_score(&components, &config.weights, strategy)?;
    let blended_score = scoring::blended_score(internal_score, snapshot.historical_score, config.blend);

    // gates dominate the threshold; the score is still computed for audit
    let findings = gates::run_gates(profile, snapshot, &signals, &config.gates);
    let approved = findings.is_empty() && blended_score >= strategy.minimum_approval_score;

    let tier = classify::classify(blended_score, &config.tiers);
    let recommendation = classify::recommendation(tier, profile.monthly_income, &config.tiers);
    let advisories = gates::advisories(&signals, snapshot, &config.gates);
    let rationale = classify::build_rationale(
        approved,
        blended_score,
        tier,
        strategy.minimum_approval_score,
        &findings,
        &advisories,
    );

    Ok(RiskAssessment {
        internal_score,
        blended_score,
        tier,
        approved,
        rationale,
        suggested_annual_rate: recommendation.annual_rate_percent,
        max_recommended_amount: recommendation.max_amount,
        max_term_months: recommendation.max_term_months,
        components,
        gate_findings: findings,
        bureau: snapshot.clone(),
    })
}
