use serde::Serialize;

use super::error::{ValidationError, require_non_negative, require_positive, require_rate_pct};

/// Longest horizon accepted by [`ProjectionParams::validate`].
pub const MAX_PROJECTION_YEARS: u32 = 200;

/// Inputs for one projection run. All rates are nominal annual percentages.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionParams {
    pub initial_capital: f64,
    pub monthly_etf_contribution: f64,
    pub monthly_growth_asset_contribution: f64,
    pub etf_annual_return_pct: f64,
    pub growth_asset_annual_growth_pct: f64,
    pub annual_inflation_pct: f64,
    pub years: u32,
    pub initial_growth_asset_units: f64,
    pub current_growth_asset_unit_price: f64,
    /// Calendar year used as the label of the first snapshot.
    pub start_year: i32,
}

impl ProjectionParams {
    /// Rejects inputs the engine has no defined result for.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_negative("initialCapital", self.initial_capital)?;
        require_non_negative("monthlyEtfContribution", self.monthly_etf_contribution)?;
        require_non_negative(
            "monthlyGrowthAssetContribution",
            self.monthly_growth_asset_contribution,
        )?;
        require_rate_pct("etfAnnualReturnPct", self.etf_annual_return_pct)?;
        require_rate_pct(
            "growthAssetAnnualGrowthPct",
            self.growth_asset_annual_growth_pct,
        )?;
        require_rate_pct("annualInflationPct", self.annual_inflation_pct)?;
        if self.years > MAX_PROJECTION_YEARS {
            return Err(ValidationError::HorizonTooLong {
                years: self.years,
                max: MAX_PROJECTION_YEARS,
            });
        }
        if self.start_year.checked_add_unsigned(self.years).is_none() {
            return Err(ValidationError::YearOverflow {
                start_year: self.start_year,
                years: self.years,
            });
        }
        require_non_negative("initialGrowthAssetUnits", self.initial_growth_asset_units)?;
        require_positive(
            "currentGrowthAssetUnitPrice",
            self.current_growth_asset_unit_price,
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlySnapshot {
    pub year: i32,
    pub total_value: f64,
    pub total_units: f64,
    pub unit_price: f64,
    pub etf_value: f64,
    pub growth_asset_value: f64,
    pub units_purchased: f64,
    pub etf_contribution: f64,
    pub growth_asset_contribution: f64,
    pub etf_growth: f64,
    pub growth_asset_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub total_value: f64,
    pub total_units_held: f64,
    pub total_steady_asset_value: f64,
    pub final_unit_price: f64,
    pub yearly_breakdown: Vec<YearlySnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SustainabilityResult {
    pub sustainable_annual_withdrawal: f64,
    /// `None` when the portfolio is never depleted.
    pub years_until_depletion: Option<u32>,
    pub months_remaining: u32,
    pub is_sustainable: bool,
}

impl SustainabilityResult {
    pub fn is_unbounded(&self) -> bool {
        self.years_until_depletion.is_none()
    }
}
