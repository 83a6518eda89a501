use crate::config::AppConfig;
use crate::pipeline::ForecastRequest;
use crate::types::{ArimaOrder, OrderChoice};
use crate::ui::state::AppState;

pub struct ConfigBridge;

impl ConfigBridge {
    /// Convert AppState to a ForecastRequest
    pub fn to_request(state: &AppState) -> ForecastRequest {
        let order = if state.auto_order {
            OrderChoice::Auto(ArimaOrder::default_grid())
        } else {
            OrderChoice::Fixed(state.order)
        };

        ForecastRequest {
            time_column: state.time_column.clone(),
            value_column: state.value_column.clone(),
            missing_policy: state.missing_policy,
            horizon: state.horizon,
            order,
        }
    }

    /// Configuration with the forecast settings currently shown in the UI
    pub fn to_app_config(state: &AppState) -> AppConfig {
        let mut config = state.config.clone();
        config.forecast.order = state.order;
        config.forecast.horizon = state.horizon;
        config.forecast.missing_policy = state.missing_policy;
        config.forecast.auto_order = state.auto_order;
        config
    }
}
