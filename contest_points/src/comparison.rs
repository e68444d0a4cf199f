//! Comparison between the polling before the contest and the actual votes.

use std::collections::HashMap;

use log::debug;

use crate::config::AnalysisErrors;
use crate::stats::{normalize, pearson, zscores, Correlation};

/// Absolute z-score above which a contestant is flagged as an outlier.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 2.0;

#[derive(PartialEq, Debug, Clone)]
pub struct ComparisonRow {
    pub name: String,
    /// Share of the poll votes.
    pub polling: f64,
    /// Share of the actual votes.
    pub actual: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct OutlierRow {
    pub name: String,
    pub polling: f64,
    pub actual: f64,
    /// Standard score of `actual - polling` among all the compared contestants.
    pub z_score: f64,
    pub is_outlier: bool,
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct Comparison {
    pub rows: Vec<ComparisonRow>,
}

impl Comparison {
    /// Pairs the polling and the actual results of the same contestants.
    ///
    /// Each side is turned into shares over all of its own entries first.
    /// The excluded contestants are then dropped, as well as the contestants
    /// that appear on one side only. Rows are sorted by name.
    pub fn build(
        polling: &[(String, u64)],
        actual: &[(String, u64)],
        excluded: &[String],
    ) -> Result<Comparison, AnalysisErrors> {
        let polling_shares = shares(polling)?;
        let actual_shares: HashMap<&str, f64> = actual
            .iter()
            .map(|(name, _)| name.as_str())
            .zip(shares(actual)?)
            .collect();

        let mut rows: Vec<ComparisonRow> = polling
            .iter()
            .zip(polling_shares)
            .filter(|((name, _), _)| !excluded.contains(name))
            .filter_map(|((name, _), polling)| {
                actual_shares.get(name.as_str()).map(|actual| ComparisonRow {
                    name: name.clone(),
                    polling,
                    actual: *actual,
                })
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(
            "Comparison::build: {} polled, {} voted, {} excluded, {} compared",
            polling.len(),
            actual.len(),
            excluded.len(),
            rows.len()
        );
        Ok(Comparison { rows })
    }

    pub fn polling_shares(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.polling).collect()
    }

    pub fn actual_shares(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.actual).collect()
    }

    pub fn correlation(&self) -> Result<Correlation, AnalysisErrors> {
        pearson(&self.polling_shares(), &self.actual_shares())
    }

    /// Scores every contestant on how far its actual share is from its poll.
    pub fn outliers(&self, threshold: f64) -> Result<Vec<OutlierRow>, AnalysisErrors> {
        let differences: Vec<f64> = self.rows.iter().map(|r| r.actual - r.polling).collect();
        let z = zscores(&differences)?;
        Ok(self
            .rows
            .iter()
            .zip(z)
            .map(|(r, z_score)| OutlierRow {
                name: r.name.clone(),
                polling: r.polling,
                actual: r.actual,
                z_score,
                is_outlier: z_score.abs() > threshold,
            })
            .collect())
    }
}

fn shares(entries: &[(String, u64)]) -> Result<Vec<f64>, AnalysisErrors> {
    let values: Vec<f64> = entries.iter().map(|(_, v)| *v as f64).collect();
    normalize(&values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(l: &[(&str, u64)]) -> Vec<(String, u64)> {
        l.iter().map(|(n, v)| (n.to_string(), *v)).collect()
    }

    #[test]
    fn shares_computed_before_join() {
        let polling = entries(&[("Sweden", 60), ("Italy", 30), ("Malta", 10)]);
        let actual = entries(&[("Italy", 50), ("Sweden", 25), ("Norway", 25)]);
        let cmp = Comparison::build(&polling, &actual, &[]).unwrap();
        assert_eq!(
            cmp.rows,
            vec![
                ComparisonRow {
                    name: "Italy".to_string(),
                    polling: 0.3,
                    actual: 0.5
                },
                ComparisonRow {
                    name: "Sweden".to_string(),
                    polling: 0.6,
                    actual: 0.25
                },
            ]
        );
    }

    #[test]
    fn exclusions_applied_after_normalization() {
        let polling = entries(&[("A", 50), ("B", 25), ("C", 25)]);
        let actual = entries(&[("A", 1), ("B", 1), ("C", 2)]);
        let cmp = Comparison::build(&polling, &actual, &["A".to_string()]).unwrap();
        assert_eq!(cmp.polling_shares(), vec![0.25, 0.25]);
        assert_eq!(cmp.actual_shares(), vec![0.25, 0.5]);
    }

    #[test]
    fn empty_polling_is_an_error() {
        let polling = entries(&[("A", 0)]);
        let actual = entries(&[("A", 1)]);
        assert_eq!(
            Comparison::build(&polling, &actual, &[]),
            Err(AnalysisErrors::EmptyTotal)
        );
    }

    #[test]
    fn flags_the_large_deviation() {
        // Nine contestants match their poll, the last one doubles it.
        let mut polling: Vec<(String, u64)> = Vec::new();
        let mut actual: Vec<(String, u64)> = Vec::new();
        for idx in 0..9 {
            polling.push((format!("C{}", idx), 10));
            actual.push((format!("C{}", idx), 10));
        }
        polling.push(("Z".to_string(), 10));
        actual.push(("Z".to_string(), 40));
        let cmp = Comparison::build(&polling, &actual, &[]).unwrap();
        let rows = cmp.outliers(DEFAULT_OUTLIER_THRESHOLD).unwrap();
        let flagged: Vec<&str> = rows
            .iter()
            .filter(|r| r.is_outlier)
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(flagged, vec!["Z"]);
        assert!(rows.iter().find(|r| r.name == "Z").unwrap().z_score > 2.0);
    }

    #[test]
    fn correlation_of_identical_shares() {
        let polling = entries(&[("A", 1), ("B", 2), ("C", 3)]);
        let cmp = Comparison::build(&polling, &polling, &[]).unwrap();
        let c = cmp.correlation().unwrap();
        assert!((c.coefficient - 1.0).abs() < 1e-12);
    }
}
