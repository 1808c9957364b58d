use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal_macros::dec;

use credit_engine::decision::{
    ApplicantProfile, BureauSnapshot, DocumentId, EvaluationId, EvaluationRecord,
    EvaluationRepository, LoanRequest, RepositoryError, StaticBureau, StrategyKind,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Append-only in-memory ledger. Stands in for the durable store until the
/// persistence backend is wired up.
#[derive(Default, Clone)]
pub(crate) struct InMemoryEvaluationRepository {
    records: Arc<Mutex<Vec<EvaluationRecord>>>,
}

impl EvaluationRepository for InMemoryEvaluationRepository {
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

/// Canned bureau files backing the server and the CLI demo. Any document not
/// listed here resolves to a clean record.
pub(crate) fn demo_bureau() -> StaticBureau {
    StaticBureau::default()
        .with_snapshot(
            DocumentId("12345678901".to_string()),
            BureauSnapshot {
                blacklisted: false,
                historical_score: Some(780),
                active_credit_lines: 2,
                recent_delinquency: false,
            },
        )
        .with_snapshot(
            DocumentId("98765432109".to_string()),
            BureauSnapshot {
                blacklisted: false,
                historical_score: Some(560),
                active_credit_lines: 4,
                recent_delinquency: true,
            },
        )
        .with_snapshot(
            DocumentId("55544433322".to_string()),
            BureauSnapshot {
                blacklisted: true,
                historical_score: Some(430),
                active_credit_lines: 6,
                recent_delinquency: true,
            },
        )
}

pub(crate) fn sample_applicants() -> Vec<(ApplicantProfile, LoanRequest)> {
    vec![
        (
            ApplicantProfile {
                document_id: DocumentId("12345678901".to_string()),
                full_name: "Helena Prado".to_string(),
                email: "helena.prado@example.com".to_string(),
                age_years: 38,
                monthly_income: dec!(2500000),
                monthly_debt: dec!(300000),
                employment_tenure_months: 48,
                employment_sector: Some("technology".to_string()),
            },
            LoanRequest {
                amount: dec!(5000000),
                term_months: 36,
                strategy: None,
            },
        ),
        (
            ApplicantProfile {
                document_id: DocumentId("98765432109".to_string()),
                full_name: "Ruben Costa".to_string(),
                email: "ruben.costa@example.com".to_string(),
                age_years: 27,
                monthly_income: dec!(600000),
                monthly_debt: dec!(390000),
                employment_tenure_months: 14,
                employment_sector: Some("hospitality".to_string()),
            },
            LoanRequest {
                amount: dec!(8000000),
                term_months: 48,
                strategy: None,
            },
        ),
        (
            ApplicantProfile {
                document_id: DocumentId("55544433322".to_string()),
                full_name: "Otavio Braga".to_string(),
                email: "otavio.braga@example.com".to_string(),
                age_years: 45,
                monthly_income: dec!(1800000),
                monthly_debt: dec!(200000),
                employment_tenure_months: 90,
                employment_sector: Some("finance".to_string()),
            },
            LoanRequest {
                amount: dec!(4000000),
                term_months: 24,
                strategy: None,
            },
        ),
    ]
}

pub(crate) fn parse_strategy(raw: &str) -> Result<StrategyKind, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "conservative" => Ok(StrategyKind::Conservative),
        "balanced" => Ok(StrategyKind::Balanced),
        "aggressive" => Ok(StrategyKind::Aggressive),
        other => Err(format!(
            "unknown strategy '{other}' (expected conservative, balanced, or aggressive)"
        )),
    }
}
