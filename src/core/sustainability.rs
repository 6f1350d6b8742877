use super::error::{ValidationError, require_non_negative, require_rate_pct};
use super::types::SustainabilityResult;

/// Share of the portfolio that may be withdrawn each year.
pub const SAFE_WITHDRAWAL_RATE: f64 = 0.04;
/// Depletion horizon, in years, that still counts as sustainable.
pub const SUSTAINABLE_YEARS_THRESHOLD: u32 = 30;
/// Simulations reaching this many years without depletion are treated as unbounded.
pub const MAX_SIMULATED_YEARS: u32 = 100;
pub const DEFAULT_RETIREMENT_INFLATION_PCT: f64 = 2.0;

const MONTHS_PER_YEAR: u32 = 12;

/// Validates the inputs and runs [`assess_sustainability`].
pub fn try_assess_sustainability(
    portfolio_value: f64,
    desired_annual_income: f64,
    inflation_pct: f64,
) -> Result<SustainabilityResult, ValidationError> {
    require_non_negative("portfolioValue", portfolio_value)?;
    require_non_negative("desiredAnnualIncome", desired_annual_income)?;
    require_rate_pct("inflationPct", inflation_pct)?;
    Ok(assess_sustainability(
        portfolio_value,
        desired_annual_income,
        inflation_pct,
    ))
}

/// Checks whether a 4% withdrawal covers `desired_annual_income`; if not,
/// estimates how long the portfolio lasts.
///
/// While depleting, the balance earns a flat 4% nominal (compounded monthly)
/// and the monthly withdrawal grows with `inflation_pct`, independent of the
/// portfolio's own asset mix.
pub fn assess_sustainability(
    portfolio_value: f64,
    desired_annual_income: f64,
    inflation_pct: f64,
) -> SustainabilityResult {
    let sustainable_annual_withdrawal = portfolio_value * SAFE_WITHDRAWAL_RATE;
    if sustainable_annual_withdrawal >= desired_annual_income {
        return unbounded(sustainable_annual_withdrawal);
    }

    let monthly_growth = 1.0 + SAFE_WITHDRAWAL_RATE / MONTHS_PER_YEAR as f64;
    let monthly_withdrawal = desired_annual_income / MONTHS_PER_YEAR as f64;
    let monthly_inflation = 1.0 + inflation_pct / MONTHS_PER_YEAR as f64 / 100.0;

    let mut remaining = portfolio_value;
    let mut years = 0u32;
    let mut months_remaining = 0u32;

    while remaining > 0.0 {
        for month in 0..MONTHS_PER_YEAR {
            remaining *= monthly_growth;
            let elapsed_months = years * MONTHS_PER_YEAR + month;
            remaining -= monthly_withdrawal * monthly_inflation.powi(elapsed_months as i32);
            if remaining <= 0.0 {
                months_remaining = month;
                break;
            }
        }

        if remaining > 0.0 {
            years += 1;
        }
        if years >= MAX_SIMULATED_YEARS {
            return unbounded(sustainable_annual_withdrawal);
        }
    }

    SustainabilityResult {
        sustainable_annual_withdrawal,
        years_until_depletion: Some(years),
        months_remaining,
        is_sustainable: years >= SUSTAINABLE_YEARS_THRESHOLD,
    }
}

fn unbounded(sustainable_annual_withdrawal: f64) -> SustainabilityResult {
    SustainabilityResult {
        sustainable_annual_withdrawal,
        years_until_depletion: None,
        months_remaining: 0,
        is_sustainable: true,
    }
}
