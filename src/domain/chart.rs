// Chart dataset domain models
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

/// One row of the chart CSV, reduced to the columns the chart needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRecord {
    pub date: NaiveDate,
    pub category: String,
    /// Whether the counted column held a value in this row
    pub has_value: bool,
}

impl ChartRecord {
    pub fn new(date: NaiveDate, category: impl Into<String>, has_value: bool) -> Self {
        Self {
            date,
            category: category.into(),
            has_value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearCount {
    pub year: i32,
    pub count: u32,
}

/// One line on the chart: per-year counts for a single category, years ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySeries {
    pub category: String,
    pub points: Vec<YearCount>,
}

/// Styling resolved from configuration before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub background: String,
    /// Heading shown above the category entries in the legend
    pub legend_title: String,
    pub width_px: u32,
    pub height_px: u32,
}

/// Count rows with a value per (year, category).
///
/// Every (year, category) pair seen in the input gets a point, even when none of its rows
/// carried a value. Categories come out sorted by name.
pub fn count_by_year_and_category(records: &[ChartRecord]) -> Vec<CategorySeries> {
    let mut grouped: BTreeMap<&str, BTreeMap<i32, u32>> = BTreeMap::new();

    for record in records {
        let count = grouped
            .entry(record.category.as_str())
            .or_default()
            .entry(record.date.year())
            .or_insert(0);
        if record.has_value {
            *count += 1;
        }
    }

    grouped
        .into_iter()
        .map(|(category, years)| CategorySeries {
            category: category.to_string(),
            points: years
                .into_iter()
                .map(|(year, count)| YearCount { year, count })
                .collect(),
        })
        .collect()
}

/// Parse the date formats seen in open-data CSV exports.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d") {
        return Some(date);
    }
    NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok()
}
