use super::traits::{ConfigSection, ConfigManifest, FieldManifest};
use crate::engines::forecast::MAX_HORIZON;
use crate::error::SalescastError;
use crate::types::{ArimaOrder, MissingPolicy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub order: ArimaOrder,
    pub horizon: usize,
    pub missing_policy: MissingPolicy,
    /// Prediction interval coverage, strictly between 0 and 1
    pub confidence: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub fit_time_budget_ms: Option<u64>,
    pub cache_capacity: usize,
    pub auto_order: bool,
    /// Trailing points held out for accuracy metrics, 0 disables
    pub holdout: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            order: ArimaOrder::default(),
            horizon: 30,
            missing_policy: MissingPolicy::DropRows,
            confidence: 0.95,
            max_iterations: 500,
            tolerance: 1e-8,
            fit_time_budget_ms: Some(5000),
            cache_capacity: 32,
            auto_order: false,
            holdout: 30,
        }
    }
}

impl ConfigSection for ForecastConfig {
    fn section_name() -> &'static str {
        "forecast"
    }

    fn validate(&self) -> Result<(), SalescastError> {
        let ArimaOrder { p, d, q } = self.order;
        if p > ArimaOrder::MAX_P || d > ArimaOrder::MAX_D || q > ArimaOrder::MAX_Q {
            return Err(SalescastError::Configuration(format!(
                "Order {} exceeds limits p <= {}, d <= {}, q <= {}",
                self.order,
                ArimaOrder::MAX_P,
                ArimaOrder::MAX_D,
                ArimaOrder::MAX_Q
            )));
        }
        if self.horizon == 0 || self.horizon > MAX_HORIZON {
            return Err(SalescastError::Configuration(format!(
                "Horizon must be between 1 and {}",
                MAX_HORIZON
            )));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(SalescastError::Configuration(
                "Confidence must be between 0 and 1".to_string()
            ));
        }
        if self.max_iterations == 0 {
            return Err(SalescastError::Configuration(
                "Max iterations must be positive".to_string()
            ));
        }
        if !(self.tolerance > 0.0) {
            return Err(SalescastError::Configuration(
                "Tolerance must be positive".to_string()
            ));
        }
        if self.holdout > MAX_HORIZON {
            return Err(SalescastError::Configuration(format!(
                "Holdout must be between 0 and {}",
                MAX_HORIZON
            )));
        }
        if self.cache_capacity == 0 {
            return Err(SalescastError::Configuration(
                "Cache capacity must be positive".to_string()
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Forecast".to_string(),
            fields: vec![
                FieldManifest::new(
                    "order",
                    "order",
                    serde_json::json!(self.order.to_string()),
                    "Default ARIMA order (p, d, q)",
                ),
                FieldManifest::new(
                    "horizon",
                    "integer",
                    serde_json::json!(self.horizon),
                    "Number of future periods to forecast",
                )
                .with_range(1.0, MAX_HORIZON as f64),
                FieldManifest::new(
                    "missing_policy",
                    "enum",
                    serde_json::json!(self.missing_policy.as_str()),
                    "How missing values are handled",
                ),
                FieldManifest::new(
                    "confidence",
                    "float",
                    serde_json::json!(self.confidence),
                    "Prediction interval coverage",
                )
                .with_range(0.5, 0.999),
                FieldManifest::new(
                    "max_iterations",
                    "integer",
                    serde_json::json!(self.max_iterations),
                    "Simplex iteration limit for models with an MA part",
                ),
                FieldManifest::new(
                    "fit_time_budget_ms",
                    "integer",
                    serde_json::json!(self.fit_time_budget_ms),
                    "Wall-clock limit for a single fit",
                ),
                FieldManifest::new(
                    "auto_order",
                    "bool",
                    serde_json::json!(self.auto_order),
                    "Select the order by AIC over a candidate grid",
                ),
                FieldManifest::new(
                    "holdout",
                    "integer",
                    serde_json::json!(self.holdout),
                    "Trailing points used for accuracy metrics",
                )
                .with_range(0.0, MAX_HORIZON as f64),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ForecastConfig::default().validate().is_ok());
    }

    #[test]
    fn test_holdout_limited_to_max_horizon() {
        let mut config = ForecastConfig {
            holdout: MAX_HORIZON,
            ..ForecastConfig::default()
        };
        assert!(config.validate().is_ok());

        config.holdout = MAX_HORIZON + 1;
        let err = config.validate().unwrap_err();
        assert_eq!(err.reason(), "configuration");
    }
}
