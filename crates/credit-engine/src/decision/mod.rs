//! Credit risk decision engine: factor scoring, critical-gate validation,
//! risk classification, bureau blending, and the evaluation facade.

pub mod bureau;
pub mod cache;
pub(crate) mod classify;
pub mod config;
pub mod domain;
pub(crate) mod factors;
pub(crate) mod gates;
pub mod repository;
pub mod router;
pub(crate) mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use bureau::{BureauError, BureauGateway, SimulatedBureau, StaticBureau};
pub use cache::LatestResultCache;
pub use config::{
    BlendMode, ConfigViolation, EngineConfig, FactorWeights, GatePolicy, SectorTable,
    StrategyProfile, StrategyTable, TierPolicy, TierTerms,
};
pub use domain::{
    ApplicantProfile, BureauSnapshot, DocumentId, EvaluationId, EvaluationRecord,
    EvaluationStatus, EvaluationView, FactorKind, GateFinding, GateRule, GateSeverity,
    LoanRequest, RiskAssessment, RiskTier, ScoreComponent, StrategyKind,
};
pub use factors::ValidationError;
pub use repository::{EvaluationRepository, RepositoryError};
pub use router::{decision_router, EvaluationRequest};
pub use scoring::InvariantViolation;
pub use service::{Decision, DecisionService, EvaluationError};
