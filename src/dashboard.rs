//! Pure recomputation of a dashboard view.
//!
//! `(base table, parameters) → view`. Nothing here reads ambient state or
//! mutates the base table; the caller owns the parameter lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

use crate::config::{Config, DisplayConfig};
use crate::constants::*;
use crate::domain::{Field, ProfileTable, Seniority, Tier};
use crate::metrics::RecomputeMetrics;
use crate::pipeline::processing::aggregate::crosstab::CrossTab;
use crate::pipeline::processing::aggregate::density::{density_report, DensityReport};
use crate::pipeline::processing::aggregate::ranking::{
    top_companies_by_profiles, top_job_titles, top_patent_companies, CompanyRank, ValueCount,
};
use crate::pipeline::processing::aggregate::rollup::{rollup_companies, CompanyRollup};
use crate::pipeline::processing::aggregate::stats::{distributions, summarize, Distribution, SummaryStats};
use crate::pipeline::processing::filter::{apply_filters, FilterSet};
use crate::pipeline::processing::tiering::{annotate_tiers, TierThresholds};

/// Everything a view depends on besides the base table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardParams {
    pub filters: FilterSet,
    pub thresholds: TierThresholds,
    pub display: DisplayConfig,
}

impl DashboardParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            filters: config.filters.clone(),
            thresholds: config.tiers,
            display: config.display.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rankings {
    pub top_companies: Vec<CompanyRank>,
    pub top_job_titles: Vec<ValueCount>,
    pub top_patent_companies: Vec<CompanyRank>,
}

/// The derived tables and statistics handed to the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub computed_at: DateTime<Utc>,
    pub active_filters: Vec<String>,
    pub summary: SummaryStats,
    pub companies: Vec<CompanyRollup>,
    pub distributions: Vec<Distribution>,
    pub rankings: Rankings,
    pub crosstabs: Vec<CrossTab>,
    pub density: DensityReport,
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Row-level filtered table, with both tier columns
    pub filtered: ProfileTable,
    pub snapshot: Snapshot,
}

/// Recompute the full view from the base table
pub fn recompute(base: &ProfileTable, params: &DashboardParams) -> DashboardView {
    let started = Instant::now();

    // tiers always come from the unfiltered table
    let tiered = annotate_tiers(base, &params.thresholds);
    let filtered = apply_filters(&tiered, &params.filters);
    let companies = rollup_companies(&filtered);

    let snapshot = Snapshot {
        computed_at: Utc::now(),
        active_filters: params.filters.describe(),
        summary: summarize(&filtered, &companies),
        distributions: distributions(&filtered, &companies, &params.display),
        rankings: Rankings {
            top_companies: top_companies_by_profiles(&companies, params.display.top_companies),
            top_job_titles: top_job_titles(&filtered, params.display.top_job_titles),
            top_patent_companies: top_patent_companies(
                &companies,
                params.display.top_patent_companies,
            ),
        },
        crosstabs: crosstabs(&filtered, &companies),
        density: density_report(&companies, params.display.density_outlier_cutoff),
        companies,
    };

    RecomputeMetrics::record_recompute(
        base.len(),
        filtered.len(),
        snapshot.companies.len(),
        started.elapsed().as_secs_f64(),
    );
    info!(
        rows = filtered.len(),
        companies = snapshot.companies.len(),
        "Recomputed dashboard view"
    );

    DashboardView { filtered, snapshot }
}

fn crosstabs(filtered: &ProfileTable, companies: &[CompanyRollup]) -> Vec<CrossTab> {
    let tiers: Vec<&str> = Tier::ORDER.iter().map(|t| t.label()).collect();
    let seniority: Vec<&str> = Seniority::ALL.iter().map(|s| s.label()).collect();
    let row_pairs = |a: Field, b: Field| {
        filtered
            .rows
            .iter()
            .map(move |r| (r.text(a).map(|v| v.into_owned()), r.text(b).map(|v| v.into_owned())))
    };

    let mut out = Vec::new();
    if filtered.has_field(Field::Workflow) {
        out.push(CrossTab::from_pairs(
            CROSSTAB_TIER_VS_WORKFLOW,
            companies
                .iter()
                .map(|c| (c.text(Field::CustomTier), c.text(Field::Workflow))),
            &tiers,
            &[],
        ));
    }
    if filtered.has_field(Field::Seniority) {
        out.push(CrossTab::from_pairs(
            CROSSTAB_TIER_VS_SENIORITY,
            row_pairs(Field::CustomTier, Field::Seniority),
            &tiers,
            &seniority,
        ));
        if filtered.has_field(Field::Persona) {
            out.push(CrossTab::from_pairs(
                CROSSTAB_PERSONA_VS_SENIORITY,
                row_pairs(Field::Persona, Field::Seniority),
                &[],
                &seniority,
            ));
        }
    }
    out
}

/// Right-minus-left differences of the headline numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryDelta {
    pub accounts: i64,
    pub profiles: i64,
    pub total_patents: Option<f64>,
    pub tier_accounts: Vec<(Tier, i64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub left: Snapshot,
    pub right: Snapshot,
    pub delta: SummaryDelta,
}

/// Two views over the same base table, side by side
pub fn compare(base: &ProfileTable, left: &DashboardParams, right: &DashboardParams) -> Comparison {
    let left = recompute(base, left).snapshot;
    let right = recompute(base, right).snapshot;
    let delta = summary_delta(&left.summary, &right.summary);
    Comparison { left, right, delta }
}

fn summary_delta(left: &SummaryStats, right: &SummaryStats) -> SummaryDelta {
    SummaryDelta {
        accounts: right.accounts as i64 - left.accounts as i64,
        profiles: right.profiles as i64 - left.profiles as i64,
        total_patents: match (left.total_patents, right.total_patents) {
            (Some(l), Some(r)) => Some(r - l),
            _ => None,
        },
        tier_accounts: left
            .tiers
            .iter()
            .zip(&right.tiers)
            .map(|(l, r)| (l.tier, r.accounts as i64 - l.accounts as i64))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, ProfileRow};
    use crate::pipeline::processing::filter::Facet;

    fn company_rows(name: &str, count: usize, seniority: Seniority) -> Vec<ProfileRow> {
        (0..count)
            .map(|_| ProfileRow {
                company: Some(name.to_string()),
                seniority: Some(seniority),
                headcount: Some(1000.0),
                ..Default::default()
            })
            .collect()
    }

    fn base() -> ProfileTable {
        let mut rows = company_rows("Big", 35, Seniority::Senior);
        rows.extend(company_rows("Mid", 12, Seniority::Mid));
        rows.extend(company_rows("Small", 3, Seniority::Entry));
        ProfileTable {
            columns: vec![
                Column::Field(Field::Company),
                Column::Field(Field::Seniority),
                Column::Field(Field::Headcount),
            ],
            rows,
        }
    }

    #[test]
    fn test_unfiltered_view() {
        let view = recompute(&base(), &DashboardParams::default());
        let s = &view.snapshot;

        assert_eq!(s.summary.accounts, 3);
        assert_eq!(s.summary.profiles, 50);
        let tiers: Vec<Option<Tier>> = s.companies.iter().map(|c| c.tier).collect();
        assert_eq!(tiers, vec![Some(Tier::T1), Some(Tier::T2), Some(Tier::T3)]);
        assert_eq!(s.rankings.top_companies[0].company, "Big");
        assert!(s.active_filters.is_empty());
        assert!(s.crosstabs.iter().any(|c| c.name == CROSSTAB_TIER_VS_SENIORITY));
        assert_eq!(s.density.points.len(), 3);
    }

    #[test]
    fn test_tier_filter_keeps_base_tiers() {
        let params = DashboardParams {
            filters: FilterSet::default().include(Facet::Tier, "T1"),
            ..Default::default()
        };
        let view = recompute(&base(), &params);
        assert_eq!(view.snapshot.companies.len(), 1);
        assert_eq!(view.snapshot.companies[0].profile_count, 35);
        assert_eq!(view.filtered.len(), 35);
    }

    #[test]
    fn test_thresholds_change_custom_tier_only() {
        let params = DashboardParams {
            thresholds: TierThresholds {
                t1: crate::pipeline::processing::tiering::TierRange::new((10, 20), (0, 10)),
                ..Default::default()
            },
            ..Default::default()
        };
        let view = recompute(&base(), &params);
        let mid = &view.snapshot.companies[1];
        assert_eq!(mid.tier, Some(Tier::T2));
        assert_eq!(mid.custom_tier, Some(Tier::T1));
        // 35 profiles fall outside every range
        assert_eq!(view.snapshot.companies[0].custom_tier, Some(Tier::Unclassified));
    }

    #[test]
    fn test_compare_deltas() {
        let left = DashboardParams::default();
        let right = DashboardParams {
            filters: FilterSet::default().exclude(Facet::Seniority, "Senior"),
            ..Default::default()
        };
        let cmp = compare(&base(), &left, &right);
        assert_eq!(cmp.delta.accounts, -1);
        assert_eq!(cmp.delta.profiles, -35);
        assert_eq!(cmp.delta.total_patents, None);
        assert_eq!(cmp.delta.tier_accounts[0], (Tier::T1, -1));
    }
}
