// src/engines/metrics/breakdown.rs
use crate::data::connectors::{DataValidator, RawTable};
use crate::engines::metrics::MetricsEngine;
use crate::error::Result;
use polars::prelude::*;
use serde::Serialize;

const MISSING_GROUP: &str = "(missing)";

/// Aggregates of the value column for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBreakdown {
    pub group: String,
    pub rows: usize,
    pub total: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// One equal-width histogram bin, `[lower, upper)` except the last
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl MetricsEngine {
    /// Totals of `value_column` per category of `group_column`, largest total first.
    ///
    /// Non-numeric values count toward `rows` but not toward the aggregates.
    pub fn breakdown(
        table: &RawTable,
        group_column: &str,
        value_column: &str,
    ) -> Result<Vec<GroupBreakdown>> {
        DataValidator::resolve(table, group_column, value_column)?;

        let df = DataFrame::new(vec![
            table
                .as_dataframe()
                .column(group_column)?
                .clone()
                .with_name("group".into()),
            table
                .numeric(value_column)?
                .with_name("value".into())
                .into_series()
                .into(),
        ])?;

        let grouped = df
            .lazy()
            .group_by([col("group")])
            .agg([
                len().alias("rows"),
                col("value").sum().alias("total"),
                col("value").mean().alias("mean"),
                col("value").min().alias("min"),
                col("value").max().alias("max"),
            ])
            .sort(
                ["total", "group"],
                SortMultipleOptions::default()
                    .with_order_descending_multi([true, false])
                    .with_nulls_last(true),
            )
            .collect()?;

        let groups = grouped.column("group")?.str()?;
        let rows_column = grouped.column("rows")?.cast(&DataType::UInt64)?;
        let rows = rows_column.u64()?;
        let total = grouped.column("total")?.f64()?;
        let mean = grouped.column("mean")?.f64()?;
        let min = grouped.column("min")?.f64()?;
        let max = grouped.column("max")?.f64()?;

        let breakdown = (0..grouped.height())
            .map(|i| GroupBreakdown {
                group: groups.get(i).unwrap_or(MISSING_GROUP).to_string(),
                rows: rows.get(i).unwrap_or(0) as usize,
                total: total.get(i).unwrap_or(0.0),
                mean: mean.get(i).unwrap_or(f64::NAN),
                min: min.get(i).unwrap_or(f64::NAN),
                max: max.get(i).unwrap_or(f64::NAN),
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Breakdown of '{}' by '{}': {} groups",
            value_column,
            group_column,
            breakdown.len()
        );
        Ok(breakdown)
    }

    /// Distribution of `value_column` over `bins` equal-width bins.
    ///
    /// Empty when the column has no numeric values.
    pub fn histogram(table: &RawTable, value_column: &str, bins: usize) -> Result<Vec<HistogramBin>> {
        let values = table.numeric(value_column)?;
        let (Some(lo), Some(hi)) = (values.min(), values.max()) else {
            return Ok(Vec::new());
        };
        let bins = bins.max(1);
        let width = if hi > lo { (hi - lo) / bins as f64 } else { 1.0 };
        let last = bins as i64 - 1;

        let df = DataFrame::new(vec![values.with_name("value".into()).into_series().into()])?;
        let counted = df
            .lazy()
            .filter(col("value").is_not_null())
            // Offsets are non-negative, so the cast truncates to the bin index
            .select([((col("value") - lit(lo)) / lit(width))
                .cast(DataType::Int64)
                .alias("bin")])
            .group_by([col("bin")])
            .agg([len().alias("count")])
            .collect()?;

        let bin_column = counted.column("bin")?.i64()?;
        let count_column = counted.column("count")?.cast(&DataType::UInt64)?;
        let counts = count_column.u64()?;

        let mut histogram: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                lower: lo + width * i as f64,
                upper: lo + width * (i + 1) as f64,
                count: 0,
            })
            .collect();
        for (bin, count) in bin_column.into_iter().zip(counts) {
            if let (Some(bin), Some(count)) = (bin, count) {
                if let Some(slot) = histogram.get_mut(bin.clamp(0, last) as usize) {
                    slot.count += count as usize;
                }
            }
        }

        Ok(histogram)
    }
}
