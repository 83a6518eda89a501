// src/engines/metrics/summary.rs
use crate::data::cleaner::CleanSeries;
use crate::data::timestamp::format_timestamp;
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

/// Descriptive statistics of a clean series and its date range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1)
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}

impl SeriesSummary {
    pub fn from_series(series: &CleanSeries) -> Self {
        let mut summary = Self::from_values(series.values());
        summary.first_date = series.first_timestamp().map(|ts| format_timestamp(&ts));
        summary.last_date = series.last_timestamp().map(|ts| format_timestamp(&ts));
        summary
    }

    pub fn from_values(values: &[f64]) -> Self {
        let column = Float64Chunked::from_slice("values".into(), values);
        let quantile = |q: f64| {
            column
                .quantile(q, QuantileMethod::Linear)
                .ok()
                .flatten()
                .unwrap_or(f64::NAN)
        };

        Self {
            count: column.len(),
            mean: column.mean().unwrap_or(f64::NAN),
            std: column.std(1).unwrap_or(f64::NAN),
            min: column.min().unwrap_or(f64::NAN),
            q25: quantile(0.25),
            median: column.median().unwrap_or(f64::NAN),
            q75: quantile(0.75),
            max: column.max().unwrap_or(f64::NAN),
            first_date: None,
            last_date: None,
        }
    }

    /// "From <first> to <last>", or `None` for an empty series
    pub fn date_range(&self) -> Option<String> {
        match (&self.first_date, &self.last_date) {
            (Some(first), Some(last)) => Some(format!("From {} to {}", first, last)),
            _ => None,
        }
    }

    pub fn to_map(&self) -> HashMap<String, f64> {
        let mut map = HashMap::new();
        map.insert("count".to_string(), self.count as f64);
        map.insert("mean".to_string(), self.mean);
        map.insert("std".to_string(), self.std);
        map.insert("min".to_string(), self.min);
        map.insert("25%".to_string(), self.q25);
        map.insert("50%".to_string(), self.median);
        map.insert("75%".to_string(), self.q75);
        map.insert("max".to_string(), self.max);
        map
    }
}
