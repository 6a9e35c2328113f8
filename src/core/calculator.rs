//! Premium Calculator Module
//! Turns a category and rating inputs into an estimated annual premium
//!
//! Each category blends a few factor values with the weights declared in the
//! rate table into one multiplier that scales the base price. The calculation
//! is pure: no caching, no shared mutable state.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::rate_table::{CategoryProfile, RateTable};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{FactorKind, InsuranceCategory, RatingInputs};
use crate::utils::constants::{
    format_currency, round_to_cents, AUTO_AGE_SLOPE, LIFE_HEALTH_AGE_SLOPE, MIN_AGE_FACTOR,
    MONTHS_PER_YEAR, REFERENCE_PROPERTY_VALUE,
};

/// One factor's share of the blended multiplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    pub factor: FactorKind,
    /// Factor value before weighting
    pub value: f64,
    pub weight: f64,
    /// `value * weight`
    pub contribution: f64,
    pub reason: String,
}

impl FactorContribution {
    fn new(factor: FactorKind, value: f64, weight: f64, reason: String) -> Self {
        Self {
            factor,
            value,
            weight,
            contribution: value * weight,
            reason,
        }
    }
}

/// Estimated premium for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    pub category: InsuranceCategory,
    /// Whole currency units
    pub annual_premium: i64,
    /// `annual_premium / 12`, unrounded
    pub monthly_premium: f64,
    /// Blended multiplier applied to the base price
    pub multiplier: f64,
    pub breakdown: Vec<FactorContribution>,
}

impl EstimateResult {
    /// Monthly premium rounded to cents
    pub fn monthly_premium_cents(&self) -> f64 {
        round_to_cents(self.monthly_premium)
    }

    pub fn annual_display(&self) -> String {
        format_currency(self.annual_premium as f64)
    }

    pub fn monthly_display(&self) -> String {
        format_currency(self.monthly_premium)
    }
}

/// Rating engine bound to one immutable rate table
#[derive(Debug, Clone)]
pub struct PremiumCalculator {
    table: Arc<RateTable>,
}

impl PremiumCalculator {
    pub fn new(table: Arc<RateTable>) -> Self {
        Self { table }
    }

    /// Calculator over the built-in rate table
    pub fn builtin() -> Self {
        Self::new(RateTable::builtin())
    }

    pub fn table(&self) -> &RateTable {
        &self.table
    }

    /// Estimate the premium for a category key
    pub fn compute(&self, category: &str, inputs: &RatingInputs) -> AppResult<EstimateResult> {
        let (category, profile) = self.table.lookup(category)?;
        Self::estimate(category, profile, inputs)
    }

    /// Estimate the premium for an already-parsed category
    pub fn compute_for(
        &self,
        category: InsuranceCategory,
        inputs: &RatingInputs,
    ) -> AppResult<EstimateResult> {
        let profile = self
            .table
            .profile(category)
            .ok_or_else(|| AppError::unknown_category(category.as_str()))?;
        Self::estimate(category, profile, inputs)
    }

    fn estimate(
        category: InsuranceCategory,
        profile: &CategoryProfile,
        inputs: &RatingInputs,
    ) -> AppResult<EstimateResult> {
        let breakdown = match category {
            InsuranceCategory::Auto => Self::auto_factors(profile, inputs)?,
            InsuranceCategory::Home => Self::home_factors(profile, inputs)?,
            InsuranceCategory::Life | InsuranceCategory::Health => {
                Self::life_health_factors(category, profile, inputs)?
            }
        };

        let multiplier: f64 = breakdown.iter().map(|f| f.contribution).sum();
        let annual_premium = (profile.base_price * multiplier).round() as i64;
        let monthly_premium = annual_premium as f64 / MONTHS_PER_YEAR;

        if !inputs.age_in_form_range() && category.required_fields().contains(&FactorKind::Age) {
            debug!(category = %category, age = ?inputs.age, "Age outside form range, absorbed by deviation penalty");
        }

        debug!(
            category = %category,
            multiplier,
            annual_premium,
            "Premium estimated"
        );

        Ok(EstimateResult {
            category,
            annual_premium,
            monthly_premium,
            multiplier,
            breakdown,
        })
    }

    fn auto_factors(
        profile: &CategoryProfile,
        inputs: &RatingInputs,
    ) -> AppResult<Vec<FactorContribution>> {
        let age = require(inputs.age, FactorKind::Age)?;
        let driving = require(inputs.driving_history, FactorKind::DrivingHistory)?;
        let coverage = require(inputs.coverage, FactorKind::Coverage)?;

        Ok(vec![
            age_contribution(profile, age, AUTO_AGE_SLOPE),
            FactorContribution::new(
                FactorKind::DrivingHistory,
                driving.factor(),
                profile.weight(FactorKind::DrivingHistory),
                format!("Driving history: {:?}", driving),
            ),
            FactorContribution::new(
                FactorKind::Coverage,
                coverage.factor(),
                profile.weight(FactorKind::Coverage),
                format!("Coverage: {:?}", coverage),
            ),
        ])
    }

    fn home_factors(
        profile: &CategoryProfile,
        inputs: &RatingInputs,
    ) -> AppResult<Vec<FactorContribution>> {
        let property_value = require(inputs.property_value, FactorKind::PropertyValue)?;
        let location = require(inputs.location, FactorKind::Location)?;
        let coverage = require(inputs.coverage, FactorKind::Coverage)?;

        Ok(vec![
            FactorContribution::new(
                FactorKind::PropertyValue,
                property_value / REFERENCE_PROPERTY_VALUE,
                profile.weight(FactorKind::PropertyValue),
                format!("Property value: {}", format_currency(property_value)),
            ),
            FactorContribution::new(
                FactorKind::Location,
                location.factor(),
                profile.weight(FactorKind::Location),
                format!("Location: {:?}", location),
            ),
            FactorContribution::new(
                FactorKind::Coverage,
                coverage.factor(),
                profile.weight(FactorKind::Coverage),
                format!("Coverage: {:?}", coverage),
            ),
        ])
    }

    fn life_health_factors(
        category: InsuranceCategory,
        profile: &CategoryProfile,
        inputs: &RatingInputs,
    ) -> AppResult<Vec<FactorContribution>> {
        let age = require(inputs.age, FactorKind::Age)?;
        let health = require(inputs.health_status, FactorKind::HealthStatus)?;
        let coverage = require(inputs.coverage, FactorKind::Coverage)?;

        // Life weighs health status, health insurance weighs health history;
        // both read the same input.
        let health_kind = if category == InsuranceCategory::Life
            && profile.factors.contains_key(&FactorKind::HealthStatus)
        {
            FactorKind::HealthStatus
        } else {
            FactorKind::HealthHistory
        };

        Ok(vec![
            age_contribution(profile, age, LIFE_HEALTH_AGE_SLOPE),
            FactorContribution::new(
                health_kind,
                health.factor(),
                profile.weight(health_kind),
                format!("Health status: {:?}", health),
            ),
            FactorContribution::new(
                FactorKind::Coverage,
                coverage.factor(),
                profile.weight(FactorKind::Coverage),
                format!("Coverage: {:?}", coverage),
            ),
        ])
    }
}

impl Default for PremiumCalculator {
    fn default() -> Self {
        Self::builtin()
    }
}

fn require<T>(value: Option<T>, kind: FactorKind) -> AppResult<T> {
    value.ok_or_else(|| AppError::missing_field(kind.as_str()))
}

/// `max(1, |age - baseline| * slope)`
fn age_contribution(profile: &CategoryProfile, age: i32, slope: f64) -> FactorContribution {
    let baseline = profile.baseline(FactorKind::Age).unwrap_or(0.0);
    let value = MIN_AGE_FACTOR.max((age as f64 - baseline).abs() * slope);

    FactorContribution::new(
        FactorKind::Age,
        value,
        profile.weight(FactorKind::Age),
        format!("Age {} vs baseline {}", age, baseline),
    )
}

/// Estimate against the built-in rate table
pub fn compute(category: &str, inputs: &RatingInputs) -> AppResult<EstimateResult> {
    PremiumCalculator::builtin().compute(category, inputs)
}
