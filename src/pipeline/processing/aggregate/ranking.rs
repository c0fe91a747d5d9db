use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::rollup::CompanyRollup;
use crate::domain::{Field, ProfileTable, Tier};

/// Descending by `key`; ties keep their input order. Truncated to `n`.
pub fn top_n<T, F>(items: &[T], n: usize, key: F) -> Vec<&T>
where
    F: Fn(&T) -> f64,
{
    let mut ranked: Vec<&T> = items.iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
    ranked.truncate(n);
    ranked
}

/// A value and how often it occurs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub label: String,
    pub count: usize,
}

/// Occurrences of each present value, most frequent first, ties in order of first appearance
pub fn value_counts<I>(values: I) -> Vec<ValueCount>
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<ValueCount> = Vec::new();
    for label in values.into_iter().flatten() {
        match index.get(&label) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(label.clone(), counts.len());
                counts.push(ValueCount { label, count: 1 });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyRank {
    pub company: String,
    pub profile_count: usize,
    pub tier: Option<Tier>,
    pub patents_total: Option<f64>,
    pub patents_recent: Option<f64>,
}

impl From<&CompanyRollup> for CompanyRank {
    fn from(rollup: &CompanyRollup) -> Self {
        Self {
            company: rollup.name().to_string(),
            profile_count: rollup.profile_count,
            tier: rollup.custom_tier,
            patents_total: rollup.patents_total,
            patents_recent: rollup.patents_recent,
        }
    }
}

pub fn top_companies_by_profiles(rollups: &[CompanyRollup], n: usize) -> Vec<CompanyRank> {
    top_n(rollups, n, |r| r.profile_count as f64)
        .into_iter()
        .map(CompanyRank::from)
        .collect()
}

/// Companies with lifetime patents, most first; companies without patent data never rank
pub fn top_patent_companies(rollups: &[CompanyRollup], n: usize) -> Vec<CompanyRank> {
    let with_patents: Vec<&CompanyRollup> = rollups
        .iter()
        .filter(|r| r.patents_total.map_or(false, |p| p > 0.0))
        .collect();
    top_n(&with_patents, n, |r| r.patents_total.unwrap_or(0.0))
        .into_iter()
        .map(|r| CompanyRank::from(*r))
        .collect()
}

/// Most common normalized job titles in the row-level view
pub fn top_job_titles(table: &ProfileTable, n: usize) -> Vec<ValueCount> {
    if !table.has_field(Field::JobTitleNormalized) {
        return Vec::new();
    }
    let mut counts = value_counts(table.rows.iter().map(|r| r.job_title_normalized.clone()));
    counts.truncate(n);
    counts
}
