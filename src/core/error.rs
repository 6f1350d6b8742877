use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be >= 0")]
    Negative { field: &'static str },

    #[error("{field} must be > 0")]
    NotPositive { field: &'static str },

    #[error("{field} must be > -100")]
    RateOutOfRange { field: &'static str },

    #[error("years must be <= {max}, got {years}")]
    HorizonTooLong { years: u32, max: u32 },

    #[error("startYear {start_year} plus {years} years is not a representable year")]
    YearOverflow { start_year: i32, years: u32 },
}

impl ValidationError {
    /// Name of the offending input.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NotFinite { field }
            | ValidationError::Negative { field }
            | ValidationError::NotPositive { field }
            | ValidationError::RateOutOfRange { field } => field,
            ValidationError::HorizonTooLong { .. } => "years",
            ValidationError::YearOverflow { .. } => "startYear",
        }
    }
}

pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field });
    }
    Ok(())
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NotPositive { field });
    }
    Ok(())
}

pub(crate) fn require_rate_pct(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value <= -100.0 {
        return Err(ValidationError::RateOutOfRange { field });
    }
    Ok(())
}
