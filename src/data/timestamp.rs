use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%b %d, %Y",
];

/// Parse a date-like cell. Plain dates map to midnight.
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(cell) {
        return Some(parsed.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(cell, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// ISO-8601 rendering: `YYYY-MM-DD` at midnight, full date-time otherwise
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.time() == NaiveTime::MIN {
        ts.format("%Y-%m-%d").to_string()
    } else if ts.and_utc().timestamp_subsec_nanos() == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN)
    }

    #[test]
    fn test_parse_common_formats() {
        assert_eq!(parse_timestamp("2024-03-05"), Some(date(2024, 3, 5)));
        assert_eq!(parse_timestamp(" 2024/03/05 "), Some(date(2024, 3, 5)));
        assert_eq!(parse_timestamp("3/5/2024"), Some(date(2024, 3, 5)));
        assert_eq!(parse_timestamp("05.03.2024"), Some(date(2024, 3, 5)));
        assert_eq!(parse_timestamp("05-Mar-2024"), Some(date(2024, 3, 5)));

        let with_time = parse_timestamp("2024-03-05 13:30:00").unwrap();
        assert_eq!(with_time, date(2024, 3, 5) + chrono::Duration::minutes(13 * 60 + 30));

        let rfc = parse_timestamp("2024-03-05T12:00:00+02:00").unwrap();
        assert_eq!(rfc, date(2024, 3, 5) + chrono::Duration::hours(10));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("N/A"), None);
        assert_eq!(parse_timestamp("2024-13-45"), None);
        assert_eq!(parse_timestamp("12345"), None);
    }

    #[test]
    fn test_format_round_trips() {
        for ts in [
            date(2024, 1, 31),
            date(2024, 1, 31) + chrono::Duration::hours(6),
            date(2024, 1, 31) + chrono::Duration::milliseconds(1500),
        ] {
            let text = format_timestamp(&ts);
            assert_eq!(parse_timestamp(&text), Some(ts), "{}", text);
        }
        assert_eq!(format_timestamp(&date(2024, 1, 31)), "2024-01-31");
    }
}
