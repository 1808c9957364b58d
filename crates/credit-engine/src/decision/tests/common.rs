use std::future::Future;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::decision::bureau::{BureauError, BureauGateway, StaticBureau};
use crate::decision::config::EngineConfig;
use crate::decision::domain::{
    ApplicantProfile, BureauSnapshot, DocumentId, EvaluationId, EvaluationRecord, LoanRequest,
    StrategyKind,
};
use crate::decision::repository::{EvaluationRepository, RepositoryError};
use crate::decision::service::DecisionService;

pub(super) fn document(id: &str) -> DocumentId {
    DocumentId(id.to_string())
}

/// High-income, low-debt applicant with an undisclosed sector so the
/// midpoint sector factor applies.
pub(super) fn strong_profile(id: &str) -> ApplicantProfile {
    ApplicantProfile {
        document_id: document(id),
        full_name: "Ana Cardoso".to_string(),
        email: "ana.cardoso@example.com".to_string(),
        age_years: 34,
        monthly_income: dec!(2500000),
        monthly_debt: dec!(300000),
        employment_tenure_months: 36,
        employment_sector: None,
    }
}

/// Mid-band applicant used for strategy threshold comparisons.
pub(super) fn borderline_profile(id: &str) -> ApplicantProfile {
    ApplicantProfile {
        document_id: document(id),
        full_name: "Bruno Leal".to_string(),
        email: "bruno.leal@example.com".to_string(),
        age_years: 29,
        monthly_income: dec!(800000),
        monthly_debt: dec!(200000),
        employment_tenure_months: 24,
        employment_sector: None,
    }
}

pub(super) fn loan(amount: Decimal, term_months: u32) -> LoanRequest {
    LoanRequest {
        amount,
        term_months,
        strategy: None,
    }
}

pub(super) fn loan_with_strategy(
    amount: Decimal,
    term_months: u32,
    strategy: StrategyKind,
) -> LoanRequest {
    LoanRequest {
        amount,
        term_months,
        strategy: Some(strategy),
    }
}

pub(super) fn clean_snapshot(historical_score: u16) -> BureauSnapshot {
    BureauSnapshot {
        blacklisted: false,
        historical_score: Some(historical_score),
        active_credit_lines: 2,
        recent_delinquency: false,
    }
}

pub(super) fn engine_config() -> EngineConfig {
    EngineConfig::standard()
}

/// Append-only in-memory ledger backing the service tests.
#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<Vec<EvaluationRecord>>,
}

impl MemoryRepository {
    pub(super) fn records(&self) -> Vec<EvaluationRecord> {
        self.records.lock().expect("repository mutex poisoned").clone()
    }
}

impl EvaluationRepository for MemoryRepository {
    fn save(&self, record: EvaluationRecord) -> Result<EvaluationId, RepositoryError> {
        let id = record.evaluation_id.clone();
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .push(record);
        Ok(id)
    }

    fn find_latest(
        &self,
        document: &DocumentId,
    ) -> Result<Option<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .find(|record| &record.document_id == document)
            .cloned())
    }

    fn history(&self, document: &DocumentId) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.document_id == document)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableRepository;

impl EvaluationRepository for UnavailableRepository {
    fn save(&self, _record: EvaluationRecord) -> Result<EvaluationId, RepositoryError> {
        Err(RepositoryError::Unavailable("ledger offline".to_string()))
    }

    fn find_latest(
        &self,
        _document: &DocumentId,
    ) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("ledger offline".to_string()))
    }

    fn history(&self, _document: &DocumentId) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("ledger offline".to_string()))
    }
}

/// Gateway whose contract reports unknown documents as `NotFound` instead
/// of synthesizing a clean record.
pub(super) struct StrictBureau;

impl BureauGateway for StrictBureau {
    fn lookup(
        &self,
        document: &DocumentId,
    ) -> impl Future<Output = Result<BureauSnapshot, BureauError>> + Send {
        let result = Err(BureauError::NotFound(document.0.clone()));
        async move { result }
    }
}

pub(super) fn build_service(
    bureau: StaticBureau,
) -> (
    Arc<DecisionService<StaticBureau, MemoryRepository>>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = DecisionService::new(Arc::new(bureau), repository.clone(), engine_config())
        .expect("standard calibration is valid");
    (Arc::new(service), repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
