use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::config::GatePolicy;
use super::domain::{ApplicantProfile, BureauSnapshot, GateFinding, GateRule, GateSeverity};
use super::factors::FactorSignals;

/// Debt ratio above this level earns an advisory note even on approvals.
const ADVISORY_DEBT_RATIO_PERCENT: Decimal = dec!(35);

/// Evaluate the deal-breaker rules in policy order, ahead of any score
/// threshold. Every firing rule is collected; a non-empty result forces
/// rejection regardless of score.
pub(crate) fn run_gates(
    profile: &ApplicantProfile,
    bureau: &BureauSnapshot,
    signals: &FactorSignals,
    policy: &GatePolicy,
) -> Vec<GateFinding> {
    let mut findings = Vec::new();

    if bureau.blacklisted {
        findings.push(GateFinding {
            rule: GateRule::Blacklisted,
            severity: GateSeverity::Critical,
            reason: "applicant is blacklisted by the credit bureau".to_string(),
            remediation: None,
        });
    }

    if profile.employment_tenure_months < policy.minimum_tenure_months {
        findings.push(GateFinding {
            rule: GateRule::InsufficientTenure,
            severity: GateSeverity::Standard,
            reason: format!(
                "insufficient employment tenure ({} months, minimum {})",
                profile.employment_tenure_months, policy.minimum_tenure_months
            ),
            remediation: Some(format!(
                "reapply after {} months of continuous employment",
                policy.minimum_tenure_months
            )),
        });
    }

    if let Some(ratio) = signals.debt_ratio_percent {
        if ratio > policy.max_debt_ratio_percent {
            findings.push(GateFinding {
                rule: GateRule::ExcessiveDebtRatio,
                severity: GateSeverity::Standard,
                reason: format!(
                    "debt ratio {ratio}% exceeds policy limit {}%",
                    policy.max_debt_ratio_percent
                ),
                remediation: Some(format!(
                    "reduce monthly obligations below {}% of income",
                    policy.max_debt_ratio_percent
                )),
            });
        }
    }

    let stressed_capacity = signals.monthly_capacity * policy.installment_stress_multiplier;
    if signals.estimated_installment > stressed_capacity {
        findings.push(GateFinding {
            rule: GateRule::UnaffordableInstallment,
            severity: GateSeverity::Standard,
            reason: format!(
                "estimated installment {} exceeds stressed capacity {stressed_capacity}",
                signals.estimated_installment
            ),
            remediation: Some("request a smaller amount or a longer term".to_string()),
        });
    }

    if bureau.active_credit_lines > policy.max_active_credit_lines {
        findings.push(GateFinding {
            rule: GateRule::ExcessiveActiveCredit,
            severity: GateSeverity::Standard,
            reason: format!(
                "excessive active obligations ({} open lines, maximum {})",
                bureau.active_credit_lines, policy.max_active_credit_lines
            ),
            remediation: Some("settle existing credit lines before reapplying".to_string()),
        });
    }

    findings
}

/// Non-blocking observations surfaced in the rationale even on approvals.
pub(crate) fn advisories(
    signals: &FactorSignals,
    bureau: &BureauSnapshot,
    policy: &GatePolicy,
) -> Vec<String> {
    let mut notes = Vec::new();

    if let Some(ratio) = signals.debt_ratio_percent {
        if ratio > ADVISORY_DEBT_RATIO_PERCENT && ratio <= policy.max_debt_ratio_percent {
            notes.push(format!("elevated debt ratio {ratio}%"));
        }
    }
    if bureau.recent_delinquency {
        notes.push("recent delinquency on the bureau file".to_string());
    }

    notes
}
