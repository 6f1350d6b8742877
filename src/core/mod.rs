mod engine;
mod error;
mod sustainability;
mod types;

pub use engine::{project, run_projection};
pub use error::ValidationError;
pub use sustainability::{
    DEFAULT_RETIREMENT_INFLATION_PCT, SAFE_WITHDRAWAL_RATE, SUSTAINABLE_YEARS_THRESHOLD,
    assess_sustainability, try_assess_sustainability,
};
pub use types::{
    MAX_PROJECTION_YEARS, ProjectionParams, ProjectionResult, SustainabilityResult,
    YearlySnapshot,
};
