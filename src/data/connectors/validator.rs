use crate::error::ColumnError;
use super::types::{ColumnSelection, RawTable};

pub struct DataValidator;

impl DataValidator {
    /// Validate the caller's time and value column choice against a table
    pub fn resolve(
        table: &RawTable,
        time_name: &str,
        value_name: &str,
    ) -> Result<ColumnSelection, ColumnError> {
        if table.width() < 2 {
            return Err(ColumnError::InsufficientColumns(table.width()));
        }

        if time_name == value_name {
            return Err(ColumnError::DuplicateSelection(time_name.to_string()));
        }

        for name in [time_name, value_name] {
            if !table.has_column(name) {
                return Err(ColumnError::MissingColumn(name.to_string()));
            }
        }

        ColumnSelection::new(time_name, value_name)
    }

    /// Guess a (time, value) pair, preferring the given names when present
    pub fn suggest(
        table: &RawTable,
        preferred_time: &str,
        preferred_value: &str,
    ) -> Option<(String, String)> {
        let columns = table.column_names();
        if columns.len() < 2 {
            return None;
        }

        let time = Self::find_column(&columns, preferred_time, &Self::datetime_aliases())
            .unwrap_or_else(|| columns[0].clone());

        let value = Self::find_column(&columns, preferred_value, &["sales", "value", "amount"])
            .filter(|name| *name != time)
            .or_else(|| columns.iter().find(|name| **name != time).cloned())?;

        Some((time, value))
    }

    fn datetime_aliases() -> [&'static str; 4] {
        ["date", "datetime", "time", "timestamp"]
    }

    fn find_column(columns: &[String], preferred: &str, aliases: &[&str]) -> Option<String> {
        if columns.iter().any(|col| col == preferred) {
            return Some(preferred.to_string());
        }
        aliases.iter().find_map(|alias| {
            columns
                .iter()
                .find(|col| col.eq_ignore_ascii_case(alias))
                .cloned()
        })
    }

    /// Null cell counts for every column that has any
    pub fn check_nulls(table: &RawTable) -> Vec<(String, usize)> {
        table
            .column_names()
            .into_iter()
            .filter_map(|name| {
                let nulls = table.cells(&name)?.iter().filter(|c| c.is_none()).count();
                (nulls > 0).then_some((name, nulls))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn table() -> RawTable {
        let df = df! {
            "Date" => &["2024-01-01", "2024-01-02"],
            "Product" => &["A", "B"],
            "Sales" => &["10", "12"],
        }
        .unwrap();
        RawTable::from_dataframe(&df).unwrap()
    }

    #[test]
    fn test_resolve_good_selection() {
        let selection = DataValidator::resolve(&table(), "Date", "Sales").unwrap();
        assert_eq!(selection.time_column(), "Date");
        assert_eq!(selection.value_column(), "Sales");
    }

    #[test]
    fn test_resolve_missing_column() {
        let err = DataValidator::resolve(&table(), "Date", "Revenue").unwrap_err();
        assert_eq!(err.reason(), "missing_column");
        assert_eq!(err, ColumnError::MissingColumn("Revenue".to_string()));
    }

    #[test]
    fn test_resolve_duplicate_selection() {
        let err = DataValidator::resolve(&table(), "Sales", "Sales").unwrap_err();
        assert_eq!(err.reason(), "duplicate_selection");
    }

    #[test]
    fn test_resolve_insufficient_columns() {
        let df = df! { "Sales" => &["1", "2"] }.unwrap();
        let single = RawTable::from_dataframe(&df).unwrap();
        let err = DataValidator::resolve(&single, "Date", "Sales").unwrap_err();
        assert_eq!(err.reason(), "insufficient_columns");
    }

    #[test]
    fn test_suggest_prefers_configured_names_then_aliases() {
        let suggestion = DataValidator::suggest(&table(), "Date", "Sales");
        assert_eq!(suggestion, Some(("Date".to_string(), "Sales".to_string())));

        let df = df! {
            "timestamp" => &["2024-01-01"],
            "units" => &["3"],
        }
        .unwrap();
        let other = RawTable::from_dataframe(&df).unwrap();
        let suggestion = DataValidator::suggest(&other, "Date", "Sales");
        assert_eq!(suggestion, Some(("timestamp".to_string(), "units".to_string())));
    }

    #[test]
    fn test_check_nulls() {
        let raw = RawTable::from_columns(vec![
            ("Date".to_string(), vec![Some("2024-01-01".to_string()), None]),
            ("Sales".to_string(), vec![Some("1".to_string()), Some("2".to_string())]),
        ])
        .unwrap();
        assert_eq!(DataValidator::check_nulls(&raw), vec![("Date".to_string(), 1)]);
    }
}
