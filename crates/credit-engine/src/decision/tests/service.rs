use std::sync::Arc;

use rust_decimal_macros::dec;

use super::common::*;
use crate::decision::bureau::{BureauError, StaticBureau};
use crate::decision::config::EngineConfig;
use crate::decision::domain::{
    BureauSnapshot, EvaluationStatus, GateRule, GateSeverity, RiskTier, StrategyKind,
};
use crate::decision::service::{DecisionService, EvaluationError};
use crate::decision::ValidationError;

#[tokio::test]
async fn strong_applicant_with_good_history_is_approved() {
    let bureau = StaticBureau::default().with_snapshot(document("doc-s1"), clean_snapshot(780));
    let (service, repository) = build_service(bureau);

    let decision = service
        .evaluate(&strong_profile("doc-s1"), &loan(dec!(5000000), 36))
        .await
        .expect("evaluation completes");

    assert!(decision.is_approved());
    let record = decision.record();
    assert_eq!(record.status, EvaluationStatus::Approved);
    assert_eq!(record.strategy, StrategyKind::Balanced);

    let assessment = record.assessment.as_ref().expect("assessment present");
    assert_eq!(assessment.internal_score, 674);
    assert_eq!(assessment.blended_score, 753);
    assert_eq!(assessment.tier, RiskTier::Good);
    assert!(assessment.gate_findings.is_empty());
    assert_eq!(assessment.suggested_annual_rate, dec!(12.0));
    assert_eq!(assessment.max_recommended_amount, dec!(9000000.00));
    assert_eq!(assessment.max_term_months, 60);
    assert!(assessment.rationale.starts_with("approved: blended score 753"));

    assert_eq!(repository.records().len(), 1);
}

#[tokio::test]
async fn over_indebted_applicant_is_rejected_by_the_ratio_gate() {
    let bureau = StaticBureau::default().with_snapshot(document("doc-s2"), clean_snapshot(760));
    let (service, _) = build_service(bureau);

    let mut profile = strong_profile("doc-s2");
    profile.monthly_debt = dec!(1750000);

    let decision = service
        .evaluate(&profile, &loan(dec!(5000000), 36))
        .await
        .expect("rejection is still a completed evaluation");

    assert!(!decision.is_approved());
    let assessment = decision.record().assessment.as_ref().expect("assessment");
    let rules: Vec<GateRule> = assessment
        .gate_findings
        .iter()
        .map(|finding| finding.rule)
        .collect();
    assert_eq!(rules, vec![GateRule::ExcessiveDebtRatio]);
    assert!(assessment.rationale.starts_with("rejected by policy gates"));
}

#[tokio::test]
async fn blacklist_overrides_an_otherwise_excellent_profile() {
    let snapshot = BureauSnapshot {
        blacklisted: true,
        ..clean_snapshot(840)
    };
    let bureau = StaticBureau::default().with_snapshot(document("doc-s3"), snapshot);
    let (service, _) = build_service(bureau);

    let decision = service
        .evaluate(&strong_profile("doc-s3"), &loan(dec!(5000000), 36))
        .await
        .expect("evaluation completes");

    assert!(!decision.is_approved());
    let assessment = decision.record().assessment.as_ref().expect("assessment");
    assert_eq!(assessment.gate_findings[0].rule, GateRule::Blacklisted);
    assert_eq!(assessment.gate_findings[0].severity, GateSeverity::Critical);
    // the score is still computed and recorded for the audit trail
    assert!(assessment.blended_score > 0);
}

#[tokio::test]
async fn bureau_outage_fails_the_call_but_leaves_an_audit_record() {
    let (service, repository) = build_service(StaticBureau::unreachable());

    let result = service
        .evaluate(&strong_profile("doc-s4"), &loan(dec!(5000000), 36))
        .await;
    match result {
        Err(EvaluationError::Bureau(BureauError::ServiceUnavailable(_))) => {}
        other => panic!("expected bureau outage, got {other:?}"),
    }

    let records = repository.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, EvaluationStatus::Error);
    assert!(records[0].assessment.is_none());
    assert!(records[0].error.as_deref().unwrap().contains("unavailable"));

    // the error record is on the ledger but never cached
    let latest = service.latest(&document("doc-s4")).expect("ledger readable");
    assert_eq!(latest.expect("record on file").status, EvaluationStatus::Error);
}

#[tokio::test]
async fn strategies_move_the_approval_threshold_on_a_borderline_profile() {
    let bureau = StaticBureau::default()
        .with_snapshot(document("doc-s5"), clean_snapshot(700))
        .with_snapshot(document("doc-s6"), clean_snapshot(700))
        .with_snapshot(document("doc-s7"), clean_snapshot(700));
    let (service, _) = build_service(bureau);

    let balanced = service
        .evaluate(
            &borderline_profile("doc-s5"),
            &loan_with_strategy(dec!(3000000), 36, StrategyKind::Balanced),
        )
        .await
        .expect("evaluation completes");
    assert!(balanced.is_approved());
    let assessment = balanced.record().assessment.as_ref().expect("assessment");
    assert_eq!(assessment.internal_score, 657);
    assert_eq!(assessment.blended_score, 685);

    let conservative = service
        .evaluate(
            &borderline_profile("doc-s6"),
            &loan_with_strategy(dec!(3000000), 36, StrategyKind::Conservative),
        )
        .await
        .expect("evaluation completes");
    assert!(!conservative.is_approved());
    let assessment = conservative
        .record()
        .assessment
        .as_ref()
        .expect("assessment");
    assert_eq!(assessment.internal_score, 559);
    assert_eq!(assessment.blended_score, 626);
    assert!(assessment
        .rationale
        .starts_with("rejected: blended score 626 below minimum 700"));

    let aggressive = service
        .evaluate(
            &borderline_profile("doc-s7"),
            &loan_with_strategy(dec!(3000000), 36, StrategyKind::Aggressive),
        )
        .await
        .expect("evaluation completes");
    assert!(aggressive.is_approved());
    let assessment = aggressive.record().assessment.as_ref().expect("assessment");
    assert_eq!(assessment.internal_score, 756);
    assert_eq!(assessment.blended_score, 745);
}

#[tokio::test]
async fn a_missing_bureau_file_counts_as_a_clean_record() {
    let repository = Arc::new(MemoryRepository::default());
    let service = DecisionService::new(
        Arc::new(StrictBureau),
        repository.clone(),
        engine_config(),
    )
    .expect("valid calibration");

    let decision = service
        .evaluate(&strong_profile("doc-s8"), &loan(dec!(5000000), 36))
        .await
        .expect("evaluation completes");

    assert!(decision.is_approved());
    let assessment = decision.record().assessment.as_ref().expect("assessment");
    assert_eq!(assessment.bureau, BureauSnapshot::clean());
    // no history to blend against
    assert_eq!(assessment.blended_score, assessment.internal_score);
}

#[tokio::test]
async fn validation_failures_never_reach_the_bureau_or_the_ledger() {
    let (service, repository) = build_service(StaticBureau::unreachable());

    let result = service
        .evaluate(&strong_profile("doc-s9"), &loan(dec!(-500), 36))
        .await;
    match result {
        Err(EvaluationError::Validation(ValidationError::NonPositiveAmount { .. })) => {}
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(repository.records().is_empty());
}

#[tokio::test]
async fn repository_outages_surface_as_evaluation_errors() {
    let bureau = StaticBureau::default();
    let service = DecisionService::new(
        Arc::new(bureau),
        Arc::new(UnavailableRepository),
        engine_config(),
    )
    .expect("valid calibration");

    let result = service
        .evaluate(&strong_profile("doc-s10"), &loan(dec!(5000000), 36))
        .await;
    assert!(matches!(result, Err(EvaluationError::Repository(_))));
}

#[tokio::test]
async fn latest_falls_back_to_the_ledger_when_the_cache_is_cold() {
    let bureau = StaticBureau::default().with_snapshot(document("doc-s11"), clean_snapshot(780));
    let repository = Arc::new(MemoryRepository::default());

    let writer = DecisionService::new(Arc::new(bureau.clone()), repository.clone(), engine_config())
        .expect("valid calibration");
    writer
        .evaluate(&strong_profile("doc-s11"), &loan(dec!(5000000), 36))
        .await
        .expect("evaluation completes");

    // a second service over the same ledger starts with an empty cache
    let reader = DecisionService::new(Arc::new(bureau), repository.clone(), engine_config())
        .expect("valid calibration");
    let latest = reader
        .latest(&document("doc-s11"))
        .expect("ledger readable")
        .expect("record on file");
    assert_eq!(latest.status, EvaluationStatus::Approved);
}

#[tokio::test]
async fn history_returns_every_evaluation_in_order() {
    let bureau = StaticBureau::default().with_snapshot(document("doc-s12"), clean_snapshot(700));
    let (service, _) = build_service(bureau);

    let profile = borderline_profile("doc-s12");
    service
        .evaluate(&profile, &loan_with_strategy(dec!(3000000), 36, StrategyKind::Conservative))
        .await
        .expect("first evaluation");
    service
        .evaluate(&profile, &loan_with_strategy(dec!(3000000), 36, StrategyKind::Balanced))
        .await
        .expect("second evaluation");

    let history = service.history(&document("doc-s12")).expect("ledger readable");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, EvaluationStatus::Rejected);
    assert_eq!(history[1].status, EvaluationStatus::Approved);
    assert_ne!(history[0].evaluation_id, history[1].evaluation_id);

    let latest = service
        .latest(&document("doc-s12"))
        .expect("ledger readable")
        .expect("record on file");
    assert_eq!(latest.evaluation_id, history[1].evaluation_id);
}

#[test]
fn assessment_is_deterministic_for_identical_inputs() {
    let profile = strong_profile("doc-s14");
    let request = loan(dec!(5000000), 36);
    let snapshot = clean_snapshot(780);
    let config = engine_config();

    let first = crate::decision::service::assess(
        &profile,
        &request,
        &snapshot,
        StrategyKind::Balanced,
        &config,
    )
    .expect("assessment completes");
    let second = crate::decision::service::assess(
        &profile,
        &request,
        &snapshot,
        StrategyKind::Balanced,
        &config,
    )
    .expect("assessment completes");

    assert_eq!(first, second);
}

#[tokio::test]
async fn a_broken_weight_set_refuses_to_construct() {
    let mut config = EngineConfig::standard();
    config.weights.income = dec!(0.50);

    let result = DecisionService::new(
        Arc::new(StaticBureau::default()),
        Arc::new(MemoryRepository::default()),
        config,
    );
    assert!(result.is_err());
}

#[tokio::test]
async fn record_views_surface_scores_and_rationale() {
    let bureau = StaticBureau::default().with_snapshot(document("doc-s13"), clean_snapshot(780));
    let (service, _) = build_service(bureau);

    let decision = service
        .evaluate(&strong_profile("doc-s13"), &loan(dec!(5000000), 36))
        .await
        .expect("evaluation completes");

    let view = decision.record().view();
    assert_eq!(view.status, "approved");
    assert_eq!(view.strategy, "balanced");
    assert_eq!(view.blended_score, Some(753));
    assert_eq!(view.tier, Some("good"));
    assert!(view.rationale.contains("risk tier good"));
}
