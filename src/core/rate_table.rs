//! Rate Table Module
//! Static registry of insurance categories, base prices and weighted factors
//!
//! The table is immutable once built. The built-in table is initialised once
//! per process and handed out as a shared `Arc`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{FactorKind, InsuranceCategory};
use crate::utils::constants::WEIGHT_SUM_TOLERANCE;

/// Weighted contribution of one factor to the blended multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingFactor {
    /// Share of the blended multiplier (0..1)
    pub weight: f64,
    /// Reference value deviation is measured from (age factors only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f64>,
}

impl RatingFactor {
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            baseline: None,
        }
    }

    pub fn with_baseline(weight: f64, baseline: f64) -> Self {
        Self {
            weight,
            baseline: Some(baseline),
        }
    }
}

/// Pricing profile for one insurance category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProfile {
    pub label: String,
    /// Annual price before factors, in whole currency units
    pub base_price: f64,
    pub factors: BTreeMap<FactorKind, RatingFactor>,
}

impl CategoryProfile {
    /// Declared weight of a factor, 0 when the profile does not declare it
    pub fn weight(&self, kind: FactorKind) -> f64 {
        self.factors.get(&kind).map(|f| f.weight).unwrap_or(0.0)
    }

    /// Declared baseline of a factor, if any
    pub fn baseline(&self, kind: FactorKind) -> Option<f64> {
        self.factors.get(&kind).and_then(|f| f.baseline)
    }

    /// Sum of every declared weight
    pub fn declared_weight_sum(&self) -> f64 {
        self.factors.values().map(|f| f.weight).sum()
    }

    fn validate(&self, category: InsuranceCategory) -> AppResult<()> {
        if !(self.base_price.is_finite() && self.base_price > 0.0) {
            return Err(AppError::invalid_rate_table(format!(
                "{}: base_price must be positive, got {}",
                category, self.base_price
            )));
        }

        if !self.factors.contains_key(&FactorKind::Coverage) {
            return Err(AppError::invalid_rate_table(format!(
                "{}: every category must declare a coverage factor",
                category
            )));
        }

        for (kind, factor) in &self.factors {
            if !(0.0..=1.0).contains(&factor.weight) {
                return Err(AppError::invalid_rate_table(format!(
                    "{}: weight of {} must lie in [0, 1], got {}",
                    category,
                    kind.as_str(),
                    factor.weight
                )));
            }
            if *kind == FactorKind::Age && factor.baseline.is_none() {
                return Err(AppError::invalid_rate_table(format!(
                    "{}: age factor requires a baseline",
                    category
                )));
            }
        }

        Ok(())
    }
}

/// Category → pricing profile lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable {
    profiles: BTreeMap<InsuranceCategory, CategoryProfile>,
}

lazy_static::lazy_static! {
    static ref BUILTIN_RATE_TABLE: Arc<RateTable> = Arc::new(RateTable::build_builtin());
}

impl RateTable {
    /// Shared handle to the built-in table
    pub fn builtin() -> Arc<RateTable> {
        BUILTIN_RATE_TABLE.clone()
    }

    fn build_builtin() -> Self {
        let mut profiles = BTreeMap::new();

        profiles.insert(
            InsuranceCategory::Auto,
            CategoryProfile {
                label: "Auto Insurance".to_string(),
                base_price: 1200.0,
                factors: BTreeMap::from([
                    (FactorKind::Age, RatingFactor::with_baseline(0.3, 25.0)),
                    (FactorKind::DrivingHistory, RatingFactor::new(0.4)),
                    (FactorKind::Coverage, RatingFactor::new(0.3)),
                ]),
            },
        );

        profiles.insert(
            InsuranceCategory::Home,
            CategoryProfile {
                label: "Home Insurance".to_string(),
                base_price: 1500.0,
                factors: BTreeMap::from([
                    (FactorKind::PropertyValue, RatingFactor::new(0.4)),
                    (FactorKind::Location, RatingFactor::new(0.3)),
                    (FactorKind::Coverage, RatingFactor::new(0.3)),
                ]),
            },
        );

        profiles.insert(
            InsuranceCategory::Life,
            CategoryProfile {
                label: "Life Insurance".to_string(),
                base_price: 800.0,
                factors: BTreeMap::from([
                    (FactorKind::Age, RatingFactor::with_baseline(0.4, 30.0)),
                    (FactorKind::HealthStatus, RatingFactor::new(0.4)),
                    (FactorKind::Coverage, RatingFactor::new(0.2)),
                ]),
            },
        );

        profiles.insert(
            InsuranceCategory::Health,
            CategoryProfile {
                label: "Health Insurance".to_string(),
                base_price: 2000.0,
                factors: BTreeMap::from([
                    (FactorKind::Age, RatingFactor::with_baseline(0.3, 30.0)),
                    (FactorKind::HealthHistory, RatingFactor::new(0.4)),
                    (FactorKind::Coverage, RatingFactor::new(0.3)),
                ]),
            },
        );

        Self { profiles }
    }

    /// Parse and validate a JSON rate table
    ///
    /// Shape: `{ "auto": { "label": .., "base_price": .., "factors": { "age": { "weight": .., "baseline": .. } } } }`
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let table: RateTable = serde_json::from_str(raw)?;
        table.validate()?;
        Ok(table)
    }

    /// Check structural invariants; weight sums are only reported
    pub fn validate(&self) -> AppResult<()> {
        if self.profiles.is_empty() {
            return Err(AppError::invalid_rate_table("rate table has no categories"));
        }

        for (category, profile) in &self.profiles {
            profile.validate(*category)?;

            let sum = profile.declared_weight_sum();
            if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                warn!(
                    category = %category,
                    weight_sum = sum,
                    "⚠️ Declared factor weights do not sum to 1.0"
                );
            }
        }

        Ok(())
    }

    /// Look up a category by its string key
    pub fn lookup(&self, key: &str) -> AppResult<(InsuranceCategory, &CategoryProfile)> {
        let category: InsuranceCategory = key.parse()?;
        self.profile(category)
            .map(|profile| (category, profile))
            .ok_or_else(|| AppError::unknown_category(key))
    }

    /// Profile for a category, if the table carries it
    pub fn profile(&self, category: InsuranceCategory) -> Option<&CategoryProfile> {
        self.profiles.get(&category)
    }

    /// All categories in stable order
    pub fn iter(&self) -> impl Iterator<Item = (InsuranceCategory, &CategoryProfile)> {
        self.profiles.iter().map(|(c, p)| (*c, p))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
