use campus_primitives::{ConfigName, Timestamp};
use serde::{Deserialize, Serialize};

use crate::{ConfigDomain, ValidationError};

/// One named data series, aligned with [`ChartStats::labels`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSeries {
	pub name: String,
	pub values: Vec<f64>,
}

/// Statistics panel data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartStats {
	pub labels: Vec<String>,
	pub series: Vec<ChartSeries>,
	pub generated_at: Option<Timestamp>,
}

impl ChartStats {
	/// Sum of one series, or `None` if no series has that name.
	pub fn total(&self, series: &str) -> Option<f64> {
		self.series.iter().find(|s| s.name == series).map(|s| s.values.iter().sum())
	}
}

/// The `chartData` domain: fetched only, and the one domain that accepts a
/// caller-selected polling interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartDomain;

impl ConfigDomain for ChartDomain {
	type Value = ChartStats;

	const POLLING: bool = true;
	const READ_ONLY: bool = true;

	fn name(&self) -> ConfigName {
		ConfigName::ChartData
	}

	fn validate(&self, value: &ChartStats) -> Result<(), ValidationError> {
		for series in &value.series {
			if series.values.len() != value.labels.len() {
				return Err(ValidationError::new(
					format!("series.{}", series.name),
					format!("has {} values for {} labels", series.values.len(), value.labels.len()),
				));
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn stats() -> ChartStats {
		ChartStats {
			labels: vec!["Mon".into(), "Tue".into()],
			series: vec![ChartSeries {
				name: "visits".into(),
				values: vec![3.0, 4.5],
			}],
			generated_at: None,
		}
	}

	#[test]
	fn totals_by_series_name() {
		assert_eq!(stats().total("visits"), Some(7.5));
		assert_eq!(stats().total("enrolments"), None);
	}

	#[test]
	fn misaligned_series_rejected() {
		let mut s = stats();
		assert!(ChartDomain.validate(&s).is_ok());
		s.labels.push("Wed".into());
		assert_eq!(ChartDomain.validate(&s).unwrap_err().field, "series.visits");
	}
}
