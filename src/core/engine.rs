use super::error::ValidationError;
use super::types::{ProjectionParams, ProjectionResult, YearlySnapshot};

const MONTHS_PER_YEAR: u32 = 12;

/// Effective monthly rates derived from the annual percentages.
#[derive(Debug, Clone, Copy)]
struct MonthlyRates {
    etf_return: f64,
    growth_asset_growth: f64,
    inflation: f64,
}

impl MonthlyRates {
    fn from_params(params: &ProjectionParams) -> Self {
        Self {
            etf_return: effective_monthly_rate(params.etf_annual_return_pct),
            growth_asset_growth: effective_monthly_rate(params.growth_asset_annual_growth_pct),
            inflation: effective_monthly_rate(params.annual_inflation_pct),
        }
    }
}

#[derive(Debug)]
struct Holdings {
    etf_balance: f64,
    units: f64,
    unit_price: f64,
}

/// Validates `params` and runs the projection.
pub fn project(params: &ProjectionParams) -> Result<ProjectionResult, ValidationError> {
    params.validate()?;
    let result = run_projection(params);
    tracing::debug!(
        years = params.years,
        total_value = result.total_value,
        final_unit_price = result.final_unit_price,
        "projection complete"
    );
    Ok(result)
}

/// Month-by-month projection over `0..=years`.
///
/// Rates are nominal; both asset values are deflated by the monthly inflation
/// rate, so every reported figure is in start-of-projection money. Inputs are
/// assumed valid, see [`ProjectionParams::validate`].
pub fn run_projection(params: &ProjectionParams) -> ProjectionResult {
    let rates = MonthlyRates::from_params(params);
    let mut holdings = Holdings {
        etf_balance: params.initial_capital,
        units: params.initial_growth_asset_units,
        unit_price: params.current_growth_asset_unit_price,
    };

    let mut yearly_breakdown = Vec::with_capacity(params.years as usize + 1);
    for year_index in 0..=params.years {
        yearly_breakdown.push(simulate_year(params, rates, &mut holdings, year_index));
    }

    let total_value = yearly_breakdown
        .last()
        .map(|snapshot| snapshot.total_value)
        .unwrap_or(0.0);

    ProjectionResult {
        total_value,
        total_units_held: holdings.units,
        total_steady_asset_value: holdings.etf_balance,
        final_unit_price: holdings.unit_price,
        yearly_breakdown,
    }
}

fn simulate_year(
    params: &ProjectionParams,
    rates: MonthlyRates,
    holdings: &mut Holdings,
    year_index: u32,
) -> YearlySnapshot {
    let start_etf = holdings.etf_balance;
    let start_units = holdings.units;
    let mut units_purchased = 0.0;

    for _ in 0..MONTHS_PER_YEAR {
        holdings.etf_balance = (holdings.etf_balance + params.monthly_etf_contribution)
            * (1.0 + rates.etf_return)
            / (1.0 + rates.inflation);

        if params.monthly_growth_asset_contribution > 0.0 {
            let bought = params.monthly_growth_asset_contribution / holdings.unit_price;
            holdings.units += bought;
            units_purchased += bought;
        }

        holdings.unit_price *= 1.0 + rates.growth_asset_growth;
        holdings.unit_price /= 1.0 + rates.inflation;
    }

    let etf_contribution = params.monthly_etf_contribution * MONTHS_PER_YEAR as f64;
    let growth_asset_contribution =
        params.monthly_growth_asset_contribution * MONTHS_PER_YEAR as f64;
    let growth_asset_value = holdings.units * holdings.unit_price;
    let total_value = (holdings.etf_balance + growth_asset_value).max(0.0);

    YearlySnapshot {
        year: params.start_year.saturating_add_unsigned(year_index),
        total_value,
        total_units: holdings.units,
        unit_price: holdings.unit_price,
        etf_value: holdings.etf_balance,
        growth_asset_value,
        units_purchased,
        etf_contribution,
        growth_asset_contribution,
        etf_growth: holdings.etf_balance - start_etf - etf_contribution,
        growth_asset_growth: growth_asset_value
            - start_units * holdings.unit_price
            - growth_asset_contribution,
    }
}

fn effective_monthly_rate(annual_pct: f64) -> f64 {
    (1.0 + annual_pct / 100.0).powf(1.0 / MONTHS_PER_YEAR as f64) - 1.0
}
