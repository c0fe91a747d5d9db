//! Summary statistics and distributions over the current view.
//!
//! Patent figures are read from company rollups, never from profile rows,
//! so a company's patents are counted once however many profiles it has.

use serde::Serialize;

use super::ranking::value_counts;
use super::rollup::CompanyRollup;
use crate::config::DisplayConfig;
use crate::constants::*;
use crate::domain::{Field, ProfileTable, Seniority, Tier};

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// `part / whole × 100`, zero for an empty whole
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionEntry {
    pub label: String,
    pub count: usize,
    /// Share of the whole population, missing values included
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub name: String,
    pub population: usize,
    pub entries: Vec<DistributionEntry>,
}

impl Distribution {
    /// Entries ordered by frequency, or by `order` first when given;
    /// labels outside `order` follow by frequency. `limit` truncates.
    pub fn from_values<I>(name: &str, values: I, order: &[&str], limit: Option<usize>) -> Distribution
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let values: Vec<Option<String>> = values.into_iter().collect();
        let population = values.len();
        let mut counts = value_counts(values);
        if !order.is_empty() {
            // stable: unordered labels keep their frequency order
            counts.sort_by_key(|c| order.iter().position(|o| *o == c.label).unwrap_or(order.len()));
        }
        if let Some(limit) = limit {
            counts.truncate(limit);
        }
        Distribution {
            name: name.to_string(),
            population,
            entries: counts
                .into_iter()
                .map(|c| DistributionEntry {
                    percentage: percentage(c.count, population),
                    label: c.label,
                    count: c.count,
                })
                .collect(),
        }
    }

    pub fn count(&self, label: &str) -> usize {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map_or(0, |e| e.count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierShare {
    pub tier: Tier,
    pub accounts: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierPatentMeans {
    pub tier: Tier,
    pub accounts: usize,
    pub mean_total: f64,
    pub mean_recent: Option<f64>,
}

/// Patent figures over the accounts with `Patents_Total > 0`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatentStats {
    pub accounts: usize,
    pub share_of_accounts: f64,
    pub mean_total: f64,
    pub mean_recent: Option<f64>,
    pub median_total: f64,
    pub by_tier: Vec<TierPatentMeans>,
}

/// Headline numbers; `None` marks a statistic whose column is absent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub accounts: usize,
    pub profiles: usize,
    pub total_patents: Option<f64>,
    pub total_patents_recent: Option<f64>,
    pub accounts_with_patent_data: Option<usize>,
    pub tiers: Vec<TierShare>,
    pub patents: Option<PatentStats>,
}

pub fn summarize(table: &ProfileTable, rollups: &[CompanyRollup]) -> SummaryStats {
    let accounts = rollups.len();
    let has_total = table.has_field(Field::PatentsTotal);
    let has_recent = table.has_field(Field::PatentsRecent);

    let tiers = Tier::ORDER
        .into_iter()
        .map(|tier| {
            let n = rollups.iter().filter(|r| r.custom_tier == Some(tier)).count();
            TierShare {
                tier,
                accounts: n,
                percentage: percentage(n, accounts),
            }
        })
        .collect();

    SummaryStats {
        accounts,
        profiles: table.len(),
        total_patents: has_total.then(|| rollups.iter().filter_map(|r| r.patents_total).sum()),
        total_patents_recent: has_recent
            .then(|| rollups.iter().filter_map(|r| r.patents_recent).sum()),
        accounts_with_patent_data: has_total
            .then(|| rollups.iter().filter(|r| r.patents_total.is_some()).count()),
        tiers,
        patents: if has_total {
            patent_stats(rollups, has_recent)
        } else {
            None
        },
    }
}

fn patent_stats(rollups: &[CompanyRollup], has_recent: bool) -> Option<PatentStats> {
    let with_patents: Vec<&CompanyRollup> = rollups
        .iter()
        .filter(|r| r.patents_total.map_or(false, |p| p > 0.0))
        .collect();
    let totals: Vec<f64> = with_patents.iter().filter_map(|r| r.patents_total).collect();
    let recent_mean = |group: &[&CompanyRollup]| -> Option<f64> {
        if !has_recent {
            return None;
        }
        let recent: Vec<f64> = group.iter().filter_map(|r| r.patents_recent).collect();
        mean(&recent)
    };

    let by_tier = [Tier::T1, Tier::T2, Tier::T3]
        .into_iter()
        .filter_map(|tier| {
            let group: Vec<&CompanyRollup> = with_patents
                .iter()
                .copied()
                .filter(|r| r.custom_tier == Some(tier))
                .collect();
            let group_totals: Vec<f64> = group.iter().filter_map(|r| r.patents_total).collect();
            Some(TierPatentMeans {
                tier,
                accounts: group.len(),
                mean_total: mean(&group_totals)?,
                mean_recent: recent_mean(&group),
            })
        })
        .collect();

    Some(PatentStats {
        accounts: with_patents.len(),
        share_of_accounts: percentage(with_patents.len(), rollups.len()),
        mean_total: mean(&totals)?,
        mean_recent: recent_mean(&with_patents),
        median_total: median(&totals)?,
        by_tier,
    })
}

/// Every distribution the dashboard charts; facets whose column is absent are left out
pub fn distributions(
    table: &ProfileTable,
    rollups: &[CompanyRollup],
    display: &DisplayConfig,
) -> Vec<Distribution> {
    let tier_order: Vec<&str> = Tier::ORDER.iter().map(|t| t.label()).collect();
    let seniority_order: Vec<&str> = Seniority::ALL.iter().map(|s| s.label()).collect();
    let of_rollups = |field: Field| rollups.iter().map(move |r| r.text(field));

    let mut out = Vec::new();
    if table.has_field(Field::CustomTier) {
        out.push(Distribution::from_values(
            DIST_CUSTOM_TIER,
            of_rollups(Field::CustomTier),
            &tier_order,
            None,
        ));
    }
    if table.has_field(Field::Region) {
        out.push(Distribution::from_values(
            DIST_REGION,
            of_rollups(Field::Region),
            &[],
            Some(display.top_regions),
        ));
    }
    if table.has_field(Field::Industry) {
        out.push(Distribution::from_values(
            DIST_INDUSTRY,
            of_rollups(Field::Industry),
            &[],
            Some(display.top_industries),
        ));
    }
    if table.has_field(Field::CompanySize) {
        out.push(Distribution::from_values(
            DIST_COMPANY_SIZE,
            of_rollups(Field::CompanySize),
            COMPANY_SIZE_ORDER,
            None,
        ));
    }
    if table.has_field(Field::Workflow) {
        out.push(Distribution::from_values(DIST_WORKFLOW, of_rollups(Field::Workflow), &[], None));
    }
    if table.has_field(Field::Persona) {
        out.push(Distribution::from_values(DIST_PERSONA, of_rollups(Field::Persona), &[], None));
    }
    if table.has_field(Field::Seniority) {
        out.push(Distribution::from_values(
            DIST_SENIORITY,
            table.rows.iter().map(|r| r.seniority.map(|s| s.label().to_string())),
            &seniority_order,
            None,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, ProfileRow};

    fn rollup(name: &str, tier: Tier, total: Option<f64>, recent: Option<f64>) -> CompanyRollup {
        CompanyRollup {
            company: Some(name.to_string()),
            profile_count: 1,
            tier: None,
            custom_tier: Some(tier),
            region: None,
            industry: None,
            company_size: None,
            workflow: None,
            persona: None,
            headcount: None,
            ip_team_size: None,
            patents_recent: recent,
            patents_total: total,
        }
    }

    fn table_with(fields: &[Field], rows: usize) -> ProfileTable {
        ProfileTable {
            columns: fields.iter().map(|f| Column::Field(*f)).collect(),
            rows: vec![ProfileRow::default(); rows],
        }
    }

    #[test]
    fn test_mean_and_median() {
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
        assert_eq!(median(&[9.0, 1.0, 5.0]), Some(5.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_patent_stats_skip_accounts_without_patents() {
        let rollups = vec![
            rollup("A", Tier::T1, Some(100.0), Some(10.0)),
            rollup("B", Tier::T1, Some(0.0), Some(0.0)),
            rollup("C", Tier::T2, Some(20.0), None),
            rollup("D", Tier::T3, None, None),
        ];
        let table = table_with(&[Field::Company, Field::PatentsTotal, Field::PatentsRecent], 4);
        let summary = summarize(&table, &rollups);

        assert_eq!(summary.total_patents, Some(120.0));
        assert_eq!(summary.total_patents_recent, Some(10.0));
        assert_eq!(summary.accounts_with_patent_data, Some(3));

        let patents = summary.patents.unwrap();
        assert_eq!(patents.accounts, 2);
        assert_eq!(patents.share_of_accounts, 50.0);
        assert_eq!(patents.mean_total, 60.0);
        assert_eq!(patents.median_total, 60.0);
        assert_eq!(patents.mean_recent, Some(10.0));
        assert_eq!(patents.by_tier.len(), 2);
        assert_eq!(patents.by_tier[0].mean_total, 100.0);
        assert_eq!(patents.by_tier[1].mean_recent, None);
    }

    #[test]
    fn test_absent_patent_columns_are_not_applicable() {
        let rollups = vec![rollup("A", Tier::T3, None, None)];
        let summary = summarize(&table_with(&[Field::Company], 1), &rollups);
        assert_eq!(summary.total_patents, None);
        assert_eq!(summary.accounts_with_patent_data, None);
        assert!(summary.patents.is_none());
        assert_eq!(summary.tiers[2].accounts, 1);
        assert_eq!(summary.tiers[2].percentage, 100.0);
    }

    #[test]
    fn test_distribution_ordering() {
        let values = vec!["Large", "Small", "Large", "Startup", "Enterprise"]
            .into_iter()
            .map(|v| Some(v.to_string()));
        let dist = Distribution::from_values(DIST_COMPANY_SIZE, values, COMPANY_SIZE_ORDER, None);
        let labels: Vec<&str> = dist.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Small", "Large", "Enterprise", "Startup"]);
        assert_eq!(dist.count("Large"), 2);
        assert_eq!(dist.entries[1].percentage, 40.0);
    }
}
