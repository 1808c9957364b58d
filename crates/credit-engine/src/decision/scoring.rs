use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::config::{BlendMode, FactorWeights, StrategyProfile};
use super::domain::{FactorKind, ScoreComponent};

pub(crate) const SCORE_FLOOR: i32 = 0;
pub(crate) const SCORE_CEILING: i32 = 1000;

const BASE_OFFSET: Decimal = dec!(500);
const INTERNAL_BLEND_WEIGHT: Decimal = dec!(0.6);
const BUREAU_BLEND_WEIGHT: Decimal = dec!(0.4);
/// Bureau historical scores arrive on a 300-850 scale.
const BUREAU_SCALE_FLOOR: Decimal = dec!(300);
const BUREAU_SCALE_SPAN: Decimal = dec!(550);

/// A factor produced points outside its contract. Programming defect;
/// fatal for the affected evaluation, never partially-computed output.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("factor {factor:?} produced {points} points outside {min}..={max}")]
    FactorOutOfRange {
        factor: FactorKind,
        points: Decimal,
        min: Decimal,
        max: Decimal,
    },
}

fn factor_range(factor: FactorKind) -> (Decimal, Decimal) {
    match factor {
        FactorKind::Income => (Decimal::ZERO, dec!(300)),
        FactorKind::Sector => (Decimal::ZERO, dec!(250)),
        FactorKind::DebtToIncome => (Decimal::ZERO, dec!(250)),
        FactorKind::Stability => (dec!(-20), dec!(200)),
        FactorKind::Affordability => (dec!(-100), dec!(150)),
        FactorKind::AmountToIncome => (dec!(-50), dec!(100)),
    }
}

/// `500 + sum(points * weight)`, strategy-adjusted, then clamped to
/// [0, 1000] exactly once. Weight-sum validity is a startup assertion, not a
/// per-call check; per-factor range is re-verified here because a violation
/// means a broken calculator.
pub(crate) fn internal_score(
    components: &[ScoreComponent],
    weights: &FactorWeights,
    strategy: &StrategyProfile,
) -> Result<i32, InvariantViolation> {
    let mut weighted = Decimal::ZERO;
    for component in components {
        let (min, max) = factor_range(component.factor);
        if component.points < min || component.points > max {
            return Err(InvariantViolation::FactorOutOfRange {
                factor: component.factor,
                points: component.points,
                min,
                max,
            });
        }
        weighted += component.points * weights.weight_for(component.factor);
    }

    let adjusted = (BASE_OFFSET + weighted) * strategy.multiplier;
    Ok(clamp_score(round_to_score(adjusted)))
}

/// 60/40 blend of the internal score with the bureau's historical score.
/// Without a bureau file the internal score stands alone.
///
/// `Legacy` feeds the raw 300-850 figure into the 0-1000 scale unchanged,
/// matching the source system's numbers; `Rescaled` maps it onto 0-1000
/// first. Both land on a single final clamp.
pub(crate) fn blended_score(internal: i32, bureau_history: Option<u16>, mode: BlendMode) -> i32 {
    let Some(history) = bureau_history else {
        return internal;
    };

    let bureau = match mode {
        BlendMode::Legacy => Decimal::from(history),
        BlendMode::Rescaled => {
            (Decimal::from(history) - BUREAU_SCALE_FLOOR) * dec!(1000) / BUREAU_SCALE_SPAN
        }
    };

    let blended = Decimal::from(internal) * INTERNAL_BLEND_WEIGHT + bureau * BUREAU_BLEND_WEIGHT;
    clamp_score(round_to_score(blended))
}

fn round_to_score(value: Decimal) -> i32 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i32()
        .unwrap_or(i32::MAX)
}

fn clamp_score(score: i32) -> i32 {
    score.clamp(SCORE_FLOOR, SCORE_CEILING)
}
