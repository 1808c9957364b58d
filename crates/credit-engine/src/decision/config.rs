use std::collections::BTreeMap;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::domain::{FactorKind, RiskTier, StrategyKind};

/// Calibration defects caught by the startup validation pass. A service
/// refuses to construct on any of these instead of failing per call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigViolation {
    #[error("factor weights must sum to exactly 1.0 (found {found})")]
    WeightSum { found: Decimal },
    #[error("sector '{sector}' carries risk factor {value} outside [0, 1]")]
    SectorRisk { sector: String, value: Decimal },
    #[error("strategy {strategy:?} multiplier {value} outside (0, 2]")]
    StrategyMultiplier {
        strategy: StrategyKind,
        value: Decimal,
    },
}

/// Weight assigned to each factor. Profiles are named calibrations; the
/// weights of any profile sum to exactly 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub income: Decimal,
    pub sector: Decimal,
    pub debt_to_income: Decimal,
    pub stability: Decimal,
    pub affordability: Decimal,
    pub amount_to_income: Decimal,
}

impl FactorWeights {
    /// Default six-factor calibration.
    pub fn standard() -> Self {
        Self {
            income: dec!(0.25),
            sector: dec!(0.20),
            debt_to_income: dec!(0.20),
            stability: dec!(0.15),
            affordability: dec!(0.10),
            amount_to_income: dec!(0.10),
        }
    }

    /// Legacy four-factor calibration, kept as a named profile.
    pub fn classic_four() -> Self {
        Self {
            income: dec!(0.30),
            sector: dec!(0.25),
            debt_to_income: dec!(0.25),
            stability: dec!(0.20),
            affordability: Decimal::ZERO,
            amount_to_income: Decimal::ZERO,
        }
    }

    pub fn weight_for(&self, factor: FactorKind) -> Decimal {
        match factor {
            FactorKind::Income => self.income,
            FactorKind::Sector => self.sector,
            FactorKind::DebtToIncome => self.debt_to_income,
            FactorKind::Stability => self.stability,
            FactorKind::Affordability => self.affordability,
            FactorKind::AmountToIncome => self.amount_to_income,
        }
    }

    pub fn sum(&self) -> Decimal {
        self.income
            + self.sector
            + self.debt_to_income
            + self.stability
            + self.affordability
            + self.amount_to_income
    }
}

/// One risk-appetite configuration: score multiplier plus approval floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyProfile {
    pub kind: StrategyKind,
    pub multiplier: Decimal,
    pub minimum_approval_score: i32,
}

/// Read-only table of the three strategy profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyTable {
    pub conservative: StrategyProfile,
    pub balanced: StrategyProfile,
    pub aggressive: StrategyProfile,
}

impl StrategyTable {
    pub fn standard() -> Self {
        Self {
            conservative: StrategyProfile {
                kind: StrategyKind::Conservative,
                multiplier: dec!(0.85),
                minimum_approval_score: 700,
            },
            balanced: StrategyProfile {
                kind: StrategyKind::Balanced,
                multiplier: dec!(1.00),
                minimum_approval_score: 650,
            },
            aggressive: StrategyProfile {
                kind: StrategyKind::Aggressive,
                multiplier: dec!(1.15),
                minimum_approval_score: 600,
            },
        }
    }

    pub fn profile(&self, kind: StrategyKind) -> &StrategyProfile {
        match kind {
            StrategyKind::Conservative => &self.conservative,
            StrategyKind::Balanced => &self.balanced,
            StrategyKind::Aggressive => &self.aggressive,
        }
    }
}

const SECTOR_FALLBACK_RISK: Decimal = dec!(0.70);

/// Lookup table mapping employment sector codes to a risk factor in [0, 1].
/// Unknown or undisclosed sectors resolve to the midpoint factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorTable {
    factors: BTreeMap<String, Decimal>,
    fallback: Decimal,
}

impl SectorTable {
    pub fn standard() -> Self {
        let mut factors = BTreeMap::new();
        for (sector, risk) in [
            ("public_administration", dec!(0.95)),
            ("health", dec!(0.90)),
            ("technology", dec!(0.85)),
            ("education", dec!(0.85)),
            ("finance", dec!(0.80)),
            ("manufacturing", dec!(0.75)),
            ("retail", dec!(0.65)),
            ("transport", dec!(0.60)),
            ("agriculture", dec!(0.55)),
            ("construction", dec!(0.50)),
            ("hospitality", dec!(0.45)),
        ] {
            factors.insert(sector.to_string(), risk);
        }
        Self {
            factors,
            fallback: SECTOR_FALLBACK_RISK,
        }
    }

    pub fn risk_factor(&self, sector: Option<&str>) -> Decimal {
        sector
            .map(|value| value.trim().to_ascii_lowercase())
            .and_then(|key| self.factors.get(&key).copied())
            .unwrap_or(self.fallback)
    }

    fn validate(&self) -> Result<(), ConfigViolation> {
        for (sector, value) in &self.factors {
            if *value < Decimal::ZERO || *value > Decimal::ONE {
                return Err(ConfigViolation::SectorRisk {
                    sector: sector.clone(),
                    value: *value,
                });
            }
        }
        Ok(())
    }
}

/// Thresholds backing the critical-gate validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatePolicy {
    pub minimum_tenure_months: u32,
    pub max_debt_ratio_percent: Decimal,
    pub installment_stress_multiplier: Decimal,
    pub max_active_credit_lines: u8,
}

impl GatePolicy {
    pub fn standard() -> Self {
        Self {
            minimum_tenure_months: 3,
            max_debt_ratio_percent: dec!(50),
            installment_stress_multiplier: dec!(1.5),
            max_active_credit_lines: 5,
        }
    }
}

/// Lending terms attached to one risk tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierTerms {
    pub annual_rate_percent: Decimal,
    pub amount_ceiling: Decimal,
    pub max_term_months: u32,
}

/// Tier thresholds plus per-tier lending terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPolicy {
    /// Share of annual income backing the maximum recommended amount.
    pub income_share: Decimal,
    pub excellent_floor: i32,
    pub good_floor: i32,
    pub fair_floor: i32,
    pub poor_floor: i32,
    pub excellent: TierTerms,
    pub good: TierTerms,
    pub fair: TierTerms,
    pub poor: TierTerms,
    pub very_poor: TierTerms,
}

impl TierPolicy {
    pub fn standard() -> Self {
        Self {
            income_share: dec!(0.30),
            excellent_floor: 800,
            good_floor: 650,
            fair_floor: 500,
            poor_floor: 350,
            excellent: TierTerms {
                annual_rate_percent: dec!(8.5),
                amount_ceiling: dec!(100000000),
                max_term_months: 84,
            },
            good: TierTerms {
                annual_rate_percent: dec!(12.0),
                amount_ceiling: dec!(50000000),
                max_term_months: 60,
            },
            fair: TierTerms {
                annual_rate_percent: dec!(18.0),
                amount_ceiling: dec!(20000000),
                max_term_months: 36,
            },
            poor: TierTerms {
                annual_rate_percent: dec!(25.0),
                amount_ceiling: dec!(5000000),
                max_term_months: 24,
            },
            very_poor: TierTerms {
                annual_rate_percent: dec!(35.0),
                amount_ceiling: Decimal::ZERO,
                max_term_months: 12,
            },
        }
    }

    pub fn terms(&self, tier: RiskTier) -> &TierTerms {
        match tier {
            RiskTier::Excellent => &self.excellent,
            RiskTier::Good => &self.good,
            RiskTier::Fair => &self.fair,
            RiskTier::Poor => &self.poor,
            RiskTier::VeryPoor => &self.very_poor,
        }
    }
}

/// How the internal score is blended with the bureau's historical score.
///
/// The source system summed the raw 300-850 bureau figure straight into the
/// 0-1000 internal scale at 60/40. That scale mismatch is preserved verbatim
/// under `Legacy` for output compatibility; `Rescaled` (the default) maps the
/// bureau score onto 0-1000 before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    Legacy,
    Rescaled,
}

/// Full engine calibration. Loaded once at process start and treated as
/// immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub weights: FactorWeights,
    pub strategies: StrategyTable,
    pub sectors: SectorTable,
    pub gates: GatePolicy,
    pub tiers: TierPolicy,
    pub blend: BlendMode,
    pub cache_ttl: Duration,
}

impl EngineConfig {
    pub fn standard() -> Self {
        Self {
            weights: FactorWeights::standard(),
            strategies: StrategyTable::standard(),
            sectors: SectorTable::standard(),
            gates: GatePolicy::standard(),
            tiers: TierPolicy::standard(),
            blend: BlendMode::Rescaled,
            cache_ttl: Duration::from_secs(300),
        }
    }

    /// Startup assertion over the whole calibration; not re-checked per call.
    pub fn validate(&self) -> Result<(), ConfigViolation> {
        let sum = self.weights.sum();
        if sum != Decimal::ONE {
            return Err(ConfigViolation::WeightSum { found: sum });
        }
        self.sectors.validate()?;
        for profile in [
            &self.strategies.conservative,
            &self.strategies.balanced,
            &self.strategies.aggressive,
        ] {
            if profile.multiplier <= Decimal::ZERO || profile.multiplier > dec!(2) {
                return Err(ConfigViolation::StrategyMultiplier {
                    strategy: profile.kind,
                    value: profile.multiplier,
                });
            }
        }
        Ok(())
    }
}
