mod app;
mod panels;
mod state;
mod widgets;
mod services;

pub use app::SalescastApp;
pub use state::{AppState, DatasetBreakdown, RunFailure};
