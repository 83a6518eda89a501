use crate::data::connectors::{ColumnSelection, RawTable};
use crate::data::timestamp::{format_timestamp, parse_timestamp};
use crate::error::CleanError;
use crate::types::MissingPolicy;
use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Time-ordered (timestamp, value) pairs with no missing values
#[derive(Debug, Clone, PartialEq)]
pub struct CleanSeries {
    time_column: String,
    value_column: String,
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
}

impl CleanSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn time_column(&self) -> &str {
        &self.time_column
    }

    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn points(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.last().copied()
    }

    /// The first `len` points, used for holdout evaluation
    pub fn truncated(&self, len: usize) -> Self {
        let len = len.min(self.len());
        Self {
            time_column: self.time_column.clone(),
            value_column: self.value_column.clone(),
            timestamps: self.timestamps[..len].to_vec(),
            values: self.values[..len].to_vec(),
        }
    }

    /// Per-process content hash of the points
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.timestamps.hash(&mut hasher);
        for value in &self.values {
            value.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Re-export as a raw table that cleans back to the same series
    pub fn to_raw_table(&self) -> PolarsResult<RawTable> {
        let times = self
            .timestamps
            .iter()
            .map(|ts| Some(format_timestamp(ts)))
            .collect();
        let values = self.values.iter().map(|v| Some(v.to_string())).collect();

        RawTable::from_columns(vec![
            (self.time_column.clone(), times),
            (self.value_column.clone(), values),
        ])
    }
}

/// Row accounting for one cleaning pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanReport {
    pub input_rows: usize,
    pub invalid_timestamps: usize,
    pub missing_values: usize,
    pub filled_values: usize,
    pub dropped_rows: usize,
    pub output_rows: usize,
}

pub struct SeriesCleaner;

impl SeriesCleaner {
    pub fn clean(
        table: &RawTable,
        selection: &ColumnSelection,
        policy: MissingPolicy,
        min_length: usize,
    ) -> Result<CleanSeries, CleanError> {
        Self::clean_with_report(table, selection, policy, min_length).map(|(series, _)| series)
    }

    pub fn clean_with_report(
        table: &RawTable,
        selection: &ColumnSelection,
        policy: MissingPolicy,
        min_length: usize,
    ) -> Result<(CleanSeries, CleanReport), CleanError> {
        let time_cells = table
            .cells(selection.time_column())
            .ok_or_else(|| CleanError::MissingColumn(selection.time_column().to_string()))?;
        if !table.has_column(selection.value_column()) {
            return Err(CleanError::MissingColumn(selection.value_column().to_string()));
        }

        let mut report = CleanReport {
            input_rows: table.height(),
            ..CleanReport::default()
        };

        // 1. timestamps, 2. numeric coercion
        let timestamps: Vec<Option<NaiveDateTime>> = time_cells
            .iter()
            .map(|cell| cell.and_then(parse_timestamp))
            .collect();
        let mut numeric = table
            .numeric(selection.value_column())
            .map_err(|e| CleanError::Conversion(e.to_string()))?;

        report.invalid_timestamps = timestamps.iter().filter(|t| t.is_none()).count();
        report.missing_values = numeric.null_count();

        // 3. missing-value policy, fill computed once over the valid values
        if policy != MissingPolicy::DropRows && report.missing_values > 0 {
            match Self::fill_value(policy, &numeric) {
                Some(fill) => {
                    numeric = numeric
                        .fill_null_with_values(fill)
                        .map_err(|e| CleanError::Conversion(e.to_string()))?;
                    report.filled_values = report.missing_values;
                }
                None => log::warn!(
                    "Column '{}' has no valid values to {}; dropping missing rows",
                    selection.value_column(),
                    policy
                ),
            }
        }

        // 4. drop rows with no timestamp or (still) no value
        let mut rows: Vec<(NaiveDateTime, f64)> = timestamps
            .into_iter()
            .zip(&numeric)
            .filter_map(|(ts, value)| Some((ts?, value?)))
            .collect();

        // 5. stable: ties keep their original order
        rows.sort_by_key(|(ts, _)| *ts);

        report.output_rows = rows.len();
        report.dropped_rows = report.input_rows - report.output_rows;
        log::debug!("Cleaning report for '{}': {:?}", selection.value_column(), report);

        // 6. minimum length
        if rows.len() < min_length {
            return Err(CleanError::TooFewRows {
                have: rows.len(),
                need: min_length,
            });
        }

        let (timestamps, values): (Vec<NaiveDateTime>, Vec<f64>) = rows.into_iter().unzip();
        let series = CleanSeries {
            time_column: selection.time_column().to_string(),
            value_column: selection.value_column().to_string(),
            timestamps,
            values,
        };

        Ok((series, report))
    }

    /// Mean or median of the non-null values, `None` when there are none
    fn fill_value(policy: MissingPolicy, values: &Float64Chunked) -> Option<f64> {
        let fill = match policy {
            MissingPolicy::DropRows => None,
            MissingPolicy::FillMean => values.mean().map(|mean| {
                if mean.is_finite() {
                    mean
                } else {
                    // The plain sum overflowed; scale before summing
                    let count = (values.len() - values.null_count()) as f64;
                    (values / count).sum().unwrap_or(mean)
                }
            }),
            MissingPolicy::FillMedian => values.median().map(|median| {
                if median.is_finite() {
                    median
                } else {
                    let lower = values.quantile(0.5, QuantileMethod::Lower).ok().flatten();
                    let higher = values.quantile(0.5, QuantileMethod::Higher).ok().flatten();
                    match (lower, higher) {
                        (Some(lower), Some(higher)) => lower / 2.0 + higher / 2.0,
                        _ => median,
                    }
                }
            }),
        };
        fill.filter(|v| v.is_finite())
    }
}
