//! IP density: profiles per hundred employees.
//!
//! The stored metric keeps every company with a positive headcount. The
//! outlier cutoff only trims the per-tier display statistics.

use serde::Serialize;

use super::rollup::CompanyRollup;
use super::stats::{mean, median};
use crate::domain::Tier;

/// `profile_count / headcount × 100`, undefined without a positive headcount
pub fn density(profile_count: usize, headcount: Option<f64>) -> Option<f64> {
    match headcount {
        Some(h) if h > 0.0 => Some(profile_count as f64 / h * 100.0),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityPoint {
    pub company: String,
    pub tier: Option<Tier>,
    pub profile_count: usize,
    pub headcount: f64,
    pub density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierDensityStats {
    pub tier: Tier,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityReport {
    pub points: Vec<DensityPoint>,
    pub cutoff: f64,
    /// Points at or above the cutoff, left out of `by_tier` only
    pub outliers: usize,
    pub by_tier: Vec<TierDensityStats>,
}

/// Per-company density for every rollup with a usable headcount
pub fn density_points(rollups: &[CompanyRollup]) -> Vec<DensityPoint> {
    rollups
        .iter()
        .filter_map(|rollup| {
            let value = density(rollup.profile_count, rollup.headcount)?;
            Some(DensityPoint {
                company: rollup.name().to_string(),
                tier: rollup.custom_tier,
                profile_count: rollup.profile_count,
                headcount: rollup.headcount?,
                density: value,
            })
        })
        .collect()
}

pub fn density_report(rollups: &[CompanyRollup], cutoff: f64) -> DensityReport {
    let points = density_points(rollups);
    let kept: Vec<&DensityPoint> = points.iter().filter(|p| p.density < cutoff).collect();
    let outliers = points.len() - kept.len();

    let by_tier = Tier::ORDER
        .into_iter()
        .filter_map(|tier| {
            let values: Vec<f64> = kept
                .iter()
                .filter(|p| p.tier == Some(tier))
                .map(|p| p.density)
                .collect();
            Some(TierDensityStats {
                tier,
                count: values.len(),
                mean: mean(&values)?,
                median: median(&values)?,
                min: values.iter().copied().fold(f64::INFINITY, f64::min),
                max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            })
        })
        .collect();

    DensityReport {
        points,
        cutoff,
        outliers,
        by_tier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rollup(name: &str, profiles: usize, headcount: Option<f64>, tier: Tier) -> CompanyRollup {
        CompanyRollup {
            company: Some(name.to_string()),
            profile_count: profiles,
            tier: None,
            custom_tier: Some(tier),
            region: None,
            industry: None,
            company_size: None,
            workflow: None,
            persona: None,
            headcount,
            ip_team_size: None,
            patents_recent: None,
            patents_total: None,
        }
    }

    #[test]
    fn test_density_value() {
        assert_eq!(density(10, Some(200.0)), Some(5.0));
        assert_eq!(density(10, Some(0.0)), None);
        assert_eq!(density(10, None), None);
    }

    #[test]
    fn test_zero_headcount_never_reported() {
        let rollups = vec![
            rollup("Acme", 10, Some(200.0), Tier::T1),
            rollup("Void", 3, Some(0.0), Tier::T3),
            rollup("Blank", 3, None, Tier::T3),
        ];
        let points = density_points(&rollups);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].company, "Acme");
        assert_eq!(points[0].density, 5.0);
    }

    #[test]
    fn test_cutoff_trims_display_only() {
        let rollups = vec![
            rollup("Acme", 10, Some(200.0), Tier::T1),
            rollup("Globex", 2, Some(100.0), Tier::T1),
            rollup("Initech", 1, Some(1000.0), Tier::T1),
            rollup("Hooli", 4, Some(200.0), Tier::T2),
        ];
        let report = density_report(&rollups, 5.0);

        assert_eq!(report.points.len(), 4);
        assert_eq!(report.outliers, 1);
        assert_eq!(report.by_tier.len(), 2);

        let t1 = &report.by_tier[0];
        assert_eq!(t1.tier, Tier::T1);
        assert_eq!(t1.count, 2);
        assert!((t1.mean - 1.05).abs() < 1e-9);
        assert!((t1.min - 0.1).abs() < 1e-12);
        assert_eq!(t1.max, 2.0);
        assert_eq!(report.by_tier[1].median, 2.0);
    }
}
