//! ARIMA fitting, forecasting and order selection.

mod arima;
mod backtest;
mod intervals;
mod optimizer;

pub mod engine;
pub mod selection;

pub use engine::{
    FitOptions,
    FittedModel,
    ForecastEngine,
    ForecastPoint,
    ForecastRecord,
    ForecastResult,
    ModelSummary,
    MAX_HORIZON,
};
pub use selection::{CandidateScore, Selection};
