pub mod forecast;
pub mod metrics;
