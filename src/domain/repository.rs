// Repository domain model and the size statistic
use serde::Deserialize;

/// One entry of a GitHub user's repository listing.
///
/// Only `size` is needed for the statistic; everything else the API returns is ignored.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RepositoryRecord {
    #[serde(default)]
    pub name: Option<String>,
    /// Size in KiB as reported by GitHub
    pub size: f64,
}

impl RepositoryRecord {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, size: f64) -> Self {
        Self {
            name: Some(name.into()),
            size,
        }
    }
}

/// Median of the given values; the mean of the two middle values for even lengths.
///
/// Returns `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Median repository size over a dataset.
pub fn median_size(records: &[RepositoryRecord]) -> Option<f64> {
    let sizes: Vec<f64> = records.iter().map(|r| r.size).collect();
    median(&sizes)
}
