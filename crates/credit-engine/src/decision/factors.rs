use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

use super::config::{EngineConfig, SectorTable};
use super::domain::{ApplicantProfile, FactorKind, LoanRequest, ScoreComponent};

/// Fixed term used to estimate a monthly installment for affordability
/// purposes, independent of the requested term.
pub(crate) const STANDARD_TERM_MONTHS: Decimal = dec!(36);
/// Share of monthly income considered available for debt service.
const CAPACITY_SHARE: Decimal = dec!(0.40);

/// Malformed input the calculators refuse outright. Zero or undisclosed
/// income is not in this set; it degrades to each factor's documented floor
/// so the aggregate stays total-defined.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("requested amount must be positive (found {found})")]
    NonPositiveAmount { found: Decimal },
    #[error("requested term must cover at least one month")]
    NonPositiveTerm,
    #[error("monthly debt obligations cannot be negative (found {found})")]
    NegativeDebt { found: Decimal },
}

/// Intermediate figures shared with the gate validator so debt ratio and
/// installment math is computed exactly once.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FactorSignals {
    /// `None` when income is zero or undisclosed (ratio undefined).
    pub debt_ratio_percent: Option<Decimal>,
    pub estimated_installment: Decimal,
    pub monthly_capacity: Decimal,
}

pub(crate) fn validate_request(
    profile: &ApplicantProfile,
    request: &LoanRequest,
) -> Result<(), ValidationError> {
    if request.amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount {
            found: request.amount,
        });
    }
    if request.term_months == 0 {
        return Err(ValidationError::NonPositiveTerm);
    }
    if profile.monthly_debt < Decimal::ZERO {
        return Err(ValidationError::NegativeDebt {
            found: profile.monthly_debt,
        });
    }
    Ok(())
}

/// Run every factor calculator over one applicant/request pair.
pub(crate) fn score_profile(
    profile: &ApplicantProfile,
    request: &LoanRequest,
    config: &EngineConfig,
) -> Result<(Vec<ScoreComponent>, FactorSignals), ValidationError> {
    validate_request(profile, request)?;

    let mut components = Vec::with_capacity(6);
    components.push(income_points(profile.monthly_income));
    components.push(sector_points(
        profile.employment_sector.as_deref(),
        &config.sectors,
    ));

    let (debt_component, debt_ratio_percent) =
        debt_ratio_points(profile.monthly_debt, profile.monthly_income);
    components.push(debt_component);
    components.push(stability_points(profile.employment_tenure_months));

    let (affordability_component, estimated_installment, monthly_capacity) =
        affordability_points(request.amount, profile.monthly_income);
    components.push(affordability_component);
    components.push(amount_ratio_points(request.amount, profile.monthly_income));

    Ok((
        components,
        FactorSignals {
            debt_ratio_percent,
            estimated_installment,
            monthly_capacity,
        },
    ))
}

fn round_points(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// 0-300 points. Logarithmic scaling deliberately compresses the advantage
/// of very large incomes.
fn income_points(monthly_income: Decimal) -> ScoreComponent {
    if monthly_income <= Decimal::ZERO {
        return ScoreComponent {
            factor: FactorKind::Income,
            points: Decimal::ZERO,
            notes: "no verifiable monthly income".to_string(),
        };
    }

    let points = round_points(
        (monthly_income.log10() * dec!(30)).clamp(Decimal::ZERO, dec!(300)),
    );
    ScoreComponent {
        factor: FactorKind::Income,
        points,
        notes: format!("monthly income {monthly_income} scales to {points} points"),
    }
}

/// 0-250 points from the sector risk table; undisclosed sectors land on the
/// midpoint (175).
fn sector_points(sector: Option<&str>, table: &SectorTable) -> ScoreComponent {
    let risk = table.risk_factor(sector);
    let points = round_points(risk * dec!(250));
    let notes = match sector {
        Some(name) => format!("sector '{name}' risk factor {risk}"),
        None => "sector undisclosed, midpoint risk applied".to_string(),
    };
    ScoreComponent {
        factor: FactorKind::Sector,
        points,
        notes,
    }
}

/// Piecewise-linear debt-to-income bands. Returns the ratio alongside the
/// component so the gate validator reuses it.
fn debt_ratio_points(
    monthly_debt: Decimal,
    monthly_income: Decimal,
) -> (ScoreComponent, Option<Decimal>) {
    if monthly_income <= Decimal::ZERO {
        let component = ScoreComponent {
            factor: FactorKind::DebtToIncome,
            points: Decimal::ZERO,
            notes: "debt ratio undefined without income".to_string(),
        };
        return (component, None);
    }

    let ratio = round_points(monthly_debt / monthly_income * dec!(100));
    let points = if ratio < dec!(10) {
        dec!(250)
    } else if ratio < dec!(20) {
        dec!(250) - (ratio - dec!(10)) * dec!(5)
    } else if ratio < dec!(30) {
        dec!(200) - (ratio - dec!(20)) * dec!(5)
    } else if ratio < dec!(40) {
        dec!(150) - (ratio - dec!(30)) * dec!(10)
    } else {
        (dec!(50) - (ratio - dec!(40)) * dec!(5)).max(Decimal::ZERO)
    };

    let component = ScoreComponent {
        factor: FactorKind::DebtToIncome,
        points: round_points(points),
        notes: format!("debt ratio {ratio}% of monthly income"),
    };
    (component, Some(ratio))
}

/// Employment stability bands. Calibrated on applicant employment tenure in
/// months converted to fractional years; never on company age. The two
/// scales existed side by side upstream and must not be mixed.
fn stability_points(tenure_months: u32) -> ScoreComponent {
    let years = Decimal::from(tenure_months) / dec!(12);
    let points = if years < Decimal::ONE {
        dec!(50)
    } else if years < dec!(3) {
        dec!(100) + dec!(10) * years
    } else if years < dec!(10) {
        dec!(120) + dec!(9) * (years - dec!(3))
    } else {
        (dec!(180) + dec!(2) * years.min(dec!(20)) - dec!(10)).min(dec!(200))
    };

    ScoreComponent {
        factor: FactorKind::Stability,
        points: round_points(points),
        notes: format!("{tenure_months} months of continuous employment"),
    }
}

/// Capacity-to-pay check against an installment estimated over the standard
/// 36-month term.
fn affordability_points(
    amount: Decimal,
    monthly_income: Decimal,
) -> (ScoreComponent, Decimal, Decimal) {
    let installment = round_points(amount / STANDARD_TERM_MONTHS);
    let capacity = round_points(monthly_income.max(Decimal::ZERO) * CAPACITY_SHARE);

    let (points, notes) = if installment <= capacity {
        (
            dec!(150),
            format!("estimated installment {installment} within capacity {capacity}"),
        )
    } else if installment <= capacity * dec!(1.2) {
        (
            dec!(50),
            format!("estimated installment {installment} slightly above capacity {capacity}"),
        )
    } else {
        (
            dec!(-100),
            format!("estimated installment {installment} exceeds capacity {capacity}"),
        )
    };

    let component = ScoreComponent {
        factor: FactorKind::Affordability,
        points,
        notes,
    };
    (component, installment, capacity)
}

/// Requested-amount-to-income bands; undefined income lands in the worst
/// band rather than erroring.
fn amount_ratio_points(amount: Decimal, monthly_income: Decimal) -> ScoreComponent {
    if monthly_income <= Decimal::ZERO {
        return ScoreComponent {
            factor: FactorKind::AmountToIncome,
            points: dec!(-50),
            notes: "amount-to-income ratio undefined without income".to_string(),
        };
    }

    let ratio = round_points(amount / monthly_income);
    let points = if ratio <= dec!(10) {
        dec!(100)
    } else if ratio <= dec!(20) {
        dec!(50)
    } else if ratio <= dec!(30) {
        Decimal::ZERO
    } else {
        dec!(-50)
    };

    ScoreComponent {
        factor: FactorKind::AmountToIncome,
        points,
        notes: format!("requested amount is {ratio}x monthly income"),
    }
}
