pub mod accuracy;
pub mod breakdown;
pub mod summary;
pub mod engine;

pub use accuracy::AccuracyMetrics;
pub use breakdown::{GroupBreakdown, HistogramBin};
pub use summary::SeriesSummary;
pub use engine::MetricsEngine;
