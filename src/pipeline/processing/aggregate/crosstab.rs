use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Count matrix of two categorical facets, with row-normalized percentages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    pub name: String,
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    pub counts: Vec<Vec<usize>>,
    /// Each row sums to 100, or is all zeros when the row is empty
    pub percentages: Vec<Vec<f64>>,
}

impl CrossTab {
    /// Tabulate `(row, column)` pairs; pairs with either side missing are skipped.
    ///
    /// Labels listed in an order slice come first in that order, any others
    /// follow alphabetically. Only labels that occur become rows/columns.
    pub fn from_pairs<I>(name: &str, pairs: I, row_order: &[&str], column_order: &[&str]) -> CrossTab
    where
        I: IntoIterator<Item = (Option<String>, Option<String>)>,
    {
        let pairs: Vec<(String, String)> = pairs
            .into_iter()
            .filter_map(|(r, c)| Some((r?, c?)))
            .collect();

        let row_labels = order_labels(pairs.iter().map(|(r, _)| r.as_str()), row_order);
        let column_labels = order_labels(pairs.iter().map(|(_, c)| c.as_str()), column_order);
        let row_index: HashMap<&str, usize> =
            row_labels.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();
        let column_index: HashMap<&str, usize> =
            column_labels.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();

        let mut counts = vec![vec![0usize; column_labels.len()]; row_labels.len()];
        for (r, c) in &pairs {
            counts[row_index[r.as_str()]][column_index[c.as_str()]] += 1;
        }
        let percentages = counts.iter().map(|row| row_percentages(row)).collect();

        CrossTab {
            name: name.to_string(),
            row_labels,
            column_labels,
            counts,
            percentages,
        }
    }

    pub fn count(&self, row: &str, column: &str) -> Option<usize> {
        let r = self.row_labels.iter().position(|l| l == row)?;
        let c = self.column_labels.iter().position(|l| l == column)?;
        Some(self.counts[r][c])
    }

    pub fn percentage(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.row_labels.iter().position(|l| l == row)?;
        let c = self.column_labels.iter().position(|l| l == column)?;
        Some(self.percentages[r][c])
    }
}

fn row_percentages(row: &[usize]) -> Vec<f64> {
    let total: usize = row.iter().sum();
    if total == 0 {
        return vec![0.0; row.len()];
    }
    row.iter().map(|&n| n as f64 / total as f64 * 100.0).collect()
}

fn order_labels<'a>(present: impl Iterator<Item = &'a str>, order: &[&str]) -> Vec<String> {
    let present: BTreeSet<&str> = present.collect();
    let mut labels: Vec<String> = order
        .iter()
        .filter(|l| present.contains(*l))
        .map(|l| l.to_string())
        .collect();
    labels.extend(
        present
            .into_iter()
            .filter(|l| !order.contains(l))
            .map(str::to_string),
    );
    labels
}
