use thiserror::Error;

/// Failures while obtaining a dataset.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Unreadable dataset: {0}")]
    Unreadable(String),

    #[error("Dataset contains no data rows")]
    Empty,
}

impl LoadError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unreadable(_) => "unreadable",
            Self::Empty => "empty",
        }
    }
}

/// Failures while validating the time/value column choice.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColumnError {
    #[error("Column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("Column '{0}' selected as both time axis and value")]
    DuplicateSelection(String),

    #[error("Dataset has {0} column(s), at least 2 required")]
    InsufficientColumns(usize),
}

impl ColumnError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingColumn(_) => "missing_column",
            Self::DuplicateSelection(_) => "duplicate_selection",
            Self::InsufficientColumns(_) => "insufficient_columns",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CleanError {
    #[error("Too few rows after cleaning: {have} rows, minimum {need} required")]
    TooFewRows { have: usize, need: usize },

    #[error("Column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("Value conversion failed: {0}")]
    Conversion(String),
}

impl CleanError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::TooFewRows { .. } => "too_few_rows",
            Self::MissingColumn(_) => "missing_column",
            Self::Conversion(_) => "conversion_failed",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("Insufficient observations: {have} available, more than {need} required")]
    InsufficientObservations { have: usize, need: usize },

    #[error("Model fit did not converge after {iterations} iterations")]
    NonConvergent { iterations: usize },

    #[error("Model fit exceeded its time budget of {budget_ms} ms")]
    TimeBudgetExceeded { budget_ms: u64 },

    #[error("Invalid model order: {0}")]
    InvalidOrder(String),
}

impl FitError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InsufficientObservations { .. } => "insufficient_observations",
            Self::NonConvergent { .. } => "non_convergent",
            Self::TimeBudgetExceeded { .. } => "time_budget_exceeded",
            Self::InvalidOrder(_) => "invalid_order",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Invalid horizon {0}: must be between 1 and 365")]
    InvalidHorizon(usize),

    #[error("Future timestamps overflow the calendar")]
    TimestampOverflow,

    #[error("Invalid confidence level {0}: must lie strictly between 0 and 1")]
    InvalidConfidence(f64),
}

impl ForecastError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidHorizon(_) => "invalid_horizon",
            Self::TimestampOverflow => "timestamp_overflow",
            Self::InvalidConfidence(_) => "invalid_confidence",
        }
    }
}

#[derive(Error, Debug)]
pub enum SalescastError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Column(#[from] ColumnError),

    #[error(transparent)]
    Clean(#[from] CleanError),

    #[error(transparent)]
    Fit(#[from] FitError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl SalescastError {
    /// Machine-readable failure code, suitable for an API response.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Load(e) => e.reason(),
            Self::Column(e) => e.reason(),
            Self::Clean(e) => e.reason(),
            Self::Fit(e) => e.reason(),
            Self::Forecast(e) => e.reason(),
            Self::Configuration(_) => "configuration",
            Self::Io(_) => "io",
            Self::Polars(_) => "dataframe",
            Self::Serde(_) => "serialization",
        }
    }
}

pub type Result<T> = std::result::Result<T, SalescastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_forward_through_umbrella() {
        let err: SalescastError = ColumnError::DuplicateSelection("Sales".to_string()).into();
        assert_eq!(err.reason(), "duplicate_selection");

        let err: SalescastError = CleanError::TooFewRows { have: 3, need: 30 }.into();
        assert_eq!(err.reason(), "too_few_rows");
        assert!(err.to_string().contains("3 rows"));

        let err: SalescastError = ForecastError::InvalidHorizon(0).into();
        assert_eq!(err.reason(), "invalid_horizon");
    }
}
