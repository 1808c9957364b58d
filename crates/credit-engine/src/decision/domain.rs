use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for applicant identity documents.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

/// Identifier assigned to each persisted evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationId(pub String);

/// Applicant financial snapshot. Immutable once submitted for an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub document_id: DocumentId,
    pub full_name: String,
    pub email: String,
    pub age_years: u8,
    pub monthly_income: Decimal,
    pub monthly_debt: Decimal,
    pub employment_tenure_months: u32,
    pub employment_sector: Option<String>,
}

/// Loan parameters evaluated against exactly one applicant profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub amount: Decimal,
    pub term_months: u32,
    #[serde(default)]
    pub strategy: Option<StrategyKind>,
}

/// Named risk-appetite profile controlling multiplier and approval threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Conservative,
    Balanced,
    Aggressive,
}

impl StrategyKind {
    pub const fn label(self) -> &'static str {
        match self {
            StrategyKind::Conservative => "conservative",
            StrategyKind::Balanced => "balanced",
            StrategyKind::Aggressive => "aggressive",
        }
    }
}

/// Discrete risk bucket derived from the final blended score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    VeryPoor,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl RiskTier {
    pub const fn label(self) -> &'static str {
        match self {
            RiskTier::Excellent => "excellent",
            RiskTier::Good => "good",
            RiskTier::Fair => "fair",
            RiskTier::Poor => "poor",
            RiskTier::VeryPoor => "very_poor",
        }
    }
}

/// Factors permitted in the scoring rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    Income,
    Sector,
    DebtToIncome,
    Stability,
    Affordability,
    AmountToIncome,
}

/// Discrete contribution to an evaluation, kept for transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: FactorKind,
    pub points: Decimal,
    pub notes: String,
}

/// Deal-breaker rules evaluated ahead of any score threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateRule {
    Blacklisted,
    InsufficientTenure,
    ExcessiveDebtRatio,
    UnaffordableInstallment,
    ExcessiveActiveCredit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateSeverity {
    Critical,
    Standard,
}

impl GateSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            GateSeverity::Critical => "critical",
            GateSeverity::Standard => "standard",
        }
    }
}

/// One triggered gate rule with its human-readable reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateFinding {
    pub rule: GateRule,
    pub severity: GateSeverity,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

/// Result of one bureau query. Ephemeral; only embedded in a record.
///
/// `historical_score` lives on the bureau's own 300-850 scale, not the
/// engine's 0-1000 scale. `None` means the document has no file, which the
/// engine treats as a clean record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BureauSnapshot {
    pub blacklisted: bool,
    pub historical_score: Option<u16>,
    pub active_credit_lines: u8,
    pub recent_delinquency: bool,
}

impl BureauSnapshot {
    /// Neutral snapshot for documents unknown to the bureau.
    pub fn clean() -> Self {
        Self {
            blacklisted: false,
            historical_score: None,
            active_credit_lines: 0,
            recent_delinquency: false,
        }
    }
}

/// Terminal state of one evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Approved,
    Rejected,
    Error,
}

impl EvaluationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EvaluationStatus::Approved => "approved",
            EvaluationStatus::Rejected => "rejected",
            EvaluationStatus::Error => "error",
        }
    }
}

/// Full scoring outcome: scores, tier, recommendation, and the audit trail
/// of factor contributions and triggered gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub internal_score: i32,
    pub blended_score: i32,
    pub tier: RiskTier,
    pub approved: bool,
    pub rationale: String,
    pub suggested_annual_rate: Decimal,
    pub max_recommended_amount: Decimal,
    pub max_term_months: u32,
    pub components: Vec<ScoreComponent>,
    pub gate_findings: Vec<GateFinding>,
    pub bureau: BureauSnapshot,
}

/// Persisted outcome of one evaluation call. Append-only; never mutated
/// after creation. `assessment` is absent only for error-state records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub evaluation_id: EvaluationId,
    pub document_id: DocumentId,
    pub strategy: StrategyKind,
    pub status: EvaluationStatus,
    pub assessment: Option<RiskAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationRecord {
    pub fn rationale(&self) -> String {
        match (&self.assessment, &self.error) {
            (Some(assessment), _) => assessment.rationale.clone(),
            (None, Some(error)) => error.clone(),
            (None, None) => "no assessment on file".to_string(),
        }
    }

    pub fn view(&self) -> EvaluationView {
        let assessment = self.assessment.as_ref();
        EvaluationView {
            evaluation_id: self.evaluation_id.clone(),
            document_id: self.document_id.clone(),
            status: self.status.label(),
            strategy: self.strategy.label(),
            approved: assessment.map(|a| a.approved),
            internal_score: assessment.map(|a| a.internal_score),
            blended_score: assessment.map(|a| a.blended_score),
            tier: assessment.map(|a| a.tier.label()),
            suggested_annual_rate: assessment.map(|a| a.suggested_annual_rate),
            max_recommended_amount: assessment.map(|a| a.max_recommended_amount),
            max_term_months: assessment.map(|a| a.max_term_months),
            rationale: self.rationale(),
        }
    }
}

/// Sanitized projection of a record for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationView {
    pub evaluation_id: EvaluationId,
    pub document_id: DocumentId,
    pub status: &'static str,
    pub strategy: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blended_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_annual_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_recommended_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_term_months: Option<u32>,
    pub rationale: String,
}
