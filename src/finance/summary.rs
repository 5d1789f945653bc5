// src/finance/summary.rs - First-to-last-year evolution per indicator
use serde::Serialize;
use std::fmt;

use crate::finance::ratios::round2;
use crate::finance::topics::TopicTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Up => "↗",
            Direction::Down => "↘",
            Direction::Flat => "→",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evolution {
    pub column: String,
    pub first_year: i32,
    pub last_year: i32,
    pub first: f64,
    pub last: f64,
    /// `(last - first) / first * 100`, two decimals
    pub percent: f64,
    pub direction: Direction,
}

impl fmt::Display for Evolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:+.2}% ({} {} → {} {})",
            self.direction.arrow(),
            self.column,
            self.percent,
            self.first_year,
            self.first,
            self.last_year,
            self.last
        )
    }
}

/// Evolution of one column between the first and last year carrying a value.
///
/// `None` with fewer than two values or when the first value is zero.
pub fn evolution(table: &TopicTable, column: &str) -> Option<Evolution> {
    let series = table.series(column);
    if series.len() < 2 {
        return None;
    }
    let (first_year, first) = series[0];
    let (last_year, last) = series[series.len() - 1];
    if first == 0.0 {
        return None;
    }
    let percent = round2((last - first) / first * 100.0);
    if !percent.is_finite() {
        return None;
    }
    let direction = if percent > 0.0 {
        Direction::Up
    } else if percent < 0.0 {
        Direction::Down
    } else {
        Direction::Flat
    };

    Some(Evolution {
        column: column.to_string(),
        first_year,
        last_year,
        first,
        last,
        percent,
        direction,
    })
}

/// Evolution of every column of the table that has one.
pub fn summarize(table: &TopicTable) -> Vec<Evolution> {
    table
        .columns
        .iter()
        .filter_map(|label| evolution(table, label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::Record;
    use crate::finance::topics::Topic;
    use serde_json::json;

    fn table(values: &[(i32, Option<f64>)]) -> TopicTable {
        let records: Vec<(i32, Record)> = values
            .iter()
            .map(|(year, v)| {
                let mut r = json!({ "inom": "RENAGE", "dep": "038", "ffdr": 1.0 });
                if let Some(v) = v {
                    r["mfdr"] = json!(v);
                }
                (*year, r.as_object().cloned().unwrap())
            })
            .collect();
        let refs: Vec<(i32, &Record)> = records.iter().map(|(y, r)| (*y, r)).collect();
        let years: Vec<i32> = values.iter().map(|(y, _)| *y).collect();
        TopicTable::build(Topic::Fdr, &years, &refs)
    }

    #[test]
    fn test_growth_between_first_and_last_value() {
        let t = table(&[(2019, Some(200.0)), (2020, None), (2021, Some(250.0))]);
        let e = evolution(&t, "FDR / hab Moyenne").unwrap();
        assert_eq!((e.first_year, e.last_year), (2019, 2021));
        assert_eq!(e.percent, 25.0);
        assert_eq!(e.direction, Direction::Up);
    }

    #[test]
    fn test_decline_and_flat() {
        let down = table(&[(2019, Some(400.0)), (2020, Some(300.0))]);
        let e = evolution(&down, "FDR / hab Moyenne").unwrap();
        assert_eq!(e.percent, -25.0);
        assert_eq!(e.direction, Direction::Down);

        let flat = table(&[(2019, Some(5.0)), (2020, Some(5.0))]);
        assert_eq!(evolution(&flat, "FDR / hab Moyenne").unwrap().direction, Direction::Flat);
    }

    #[test]
    fn test_undefined_cases() {
        let single = table(&[(2019, Some(5.0)), (2020, None)]);
        assert!(evolution(&single, "FDR / hab Moyenne").is_none());

        let from_zero = table(&[(2019, Some(0.0)), (2020, Some(10.0))]);
        assert!(evolution(&from_zero, "FDR / hab Moyenne").is_none());
    }

    #[test]
    fn test_summarize_skips_columns_without_series() {
        let t = table(&[(2019, Some(100.0)), (2020, Some(110.0))]);
        let all = summarize(&t);
        let columns: Vec<&str> = all.iter().map(|e| e.column.as_str()).collect();
        // ffdr is constant, mfdr moves, the day ratios have no denominator
        assert_eq!(columns, vec!["FDR / hab Commune", "FDR / hab Moyenne"]);
        assert_eq!(all[0].direction, Direction::Flat);
    }
}
