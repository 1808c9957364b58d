use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::config::TierPolicy;
use super::domain::{GateFinding, RiskTier};

/// Lending terms derived from a tier and the applicant's income.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Recommendation {
    pub annual_rate_percent: Decimal,
    pub max_amount: Decimal,
    pub max_term_months: u32,
}

/// Pure threshold classification; re-classifying the same score always
/// yields the same tier.
pub(crate) fn classify(score: i32, policy: &TierPolicy) -> RiskTier {
    if score >= policy.excellent_floor {
        RiskTier::Excellent
    } else if score >= policy.good_floor {
        RiskTier::Good
    } else if score >= policy.fair_floor {
        RiskTier::Fair
    } else if score >= policy.poor_floor {
        RiskTier::Poor
    } else {
        RiskTier::VeryPoor
    }
}

pub(crate) fn recommendation(
    tier: RiskTier,
    monthly_income: Decimal,
    policy: &TierPolicy,
) -> Recommendation {
    let terms = policy.terms(tier);
    let annual_income = monthly_income.max(Decimal::ZERO) * dec!(12);
    let max_amount = (annual_income * policy.income_share)
        .min(terms.amount_ceiling)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Recommendation {
        annual_rate_percent: terms.annual_rate_percent,
        max_amount,
        max_term_months: terms.max_term_months,
    }
}

/// Headline, score/tier sentence, gate reasons, then advisory warnings.
pub(crate) fn build_rationale(
    approved: bool,
    blended_score: i32,
    tier: RiskTier,
    minimum_approval_score: i32,
    findings: &[GateFinding],
    advisories: &[String],
) -> String {
    let mut lines = Vec::new();

    if !findings.is_empty() {
        lines.push("rejected by policy gates".to_string());
        for finding in findings {
            lines.push(finding.reason.clone());
        }
    } else if approved {
        lines.push(format!(
            "approved: blended score {blended_score} meets minimum {minimum_approval_score}"
        ));
    } else {
        lines.push(format!(
            "rejected: blended score {blended_score} below minimum {minimum_approval_score}"
        ));
    }

    lines.push(format!("risk tier {}", tier.label()));
    for note in advisories {
        lines.push(format!("warning: {note}"));
    }

    lines.join("; ")
}
