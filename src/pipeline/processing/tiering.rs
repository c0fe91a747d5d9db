//! Tier classification.
//!
//! Two rules coexist. The fixed rule looks only at how many profiles a
//! company has. The configurable rule tests the company's IP-team size and
//! recent patent count against three user-supplied ranges, T1 first.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::constants::{FIXED_T1_MIN_EXCLUSIVE, FIXED_T2_MIN};
use crate::domain::{Column, Field, ProfileTable, Tier};

/// Fixed rule: more than 30 profiles is T1, 5 to 30 is T2, fewer than 5 is T3
pub fn classify_fixed(profile_count: usize) -> Tier {
    if profile_count > FIXED_T1_MIN_EXCLUSIVE {
        Tier::T1
    } else if profile_count >= FIXED_T2_MIN {
        Tier::T2
    } else {
        Tier::T3
    }
}

/// Inclusive bounds on both classification signals for one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRange {
    pub ip_min: u64,
    pub ip_max: u64,
    pub patents_min: u64,
    pub patents_max: u64,
}

impl TierRange {
    pub fn new(ip: (u64, u64), patents: (u64, u64)) -> Self {
        Self {
            ip_min: ip.0,
            ip_max: ip.1,
            patents_min: patents.0,
            patents_max: patents.1,
        }
    }

    /// Both signals must fall inside their bounds
    pub fn contains(&self, ip_count: f64, patents_recent: f64) -> bool {
        (self.ip_min as f64) <= ip_count
            && ip_count <= self.ip_max as f64
            && (self.patents_min as f64) <= patents_recent
            && patents_recent <= self.patents_max as f64
    }

    /// A range with min > max on either signal can never match
    pub fn is_inverted(&self) -> bool {
        self.ip_min > self.ip_max || self.patents_min > self.patents_max
    }
}

/// User-configurable ranges for the three tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub t1: TierRange,
    pub t2: TierRange,
    pub t3: TierRange,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            t1: TierRange::new((30, 9999), (0, 999_999)),
            t2: TierRange::new((5, 29), (0, 999_999)),
            t3: TierRange::new((0, 4), (0, 999_999)),
        }
    }
}

impl TierThresholds {
    /// Ranges in precedence order
    pub fn ranges(&self) -> [(Tier, &TierRange); 3] {
        [(Tier::T1, &self.t1), (Tier::T2, &self.t2), (Tier::T3, &self.t3)]
    }

    /// First tier whose range holds both signals; overlapping ranges resolve
    /// to the higher tier. A missing signal counts as zero.
    pub fn classify(&self, ip_count: Option<f64>, patents_recent: Option<f64>) -> Tier {
        let ip = ip_count.unwrap_or(0.0);
        let patents = patents_recent.unwrap_or(0.0);
        self.ranges()
            .into_iter()
            .find(|(_, range)| range.contains(ip, patents))
            .map(|(tier, _)| tier)
            .unwrap_or(Tier::Unclassified)
    }

    pub fn warn_on_inverted_ranges(&self) {
        for (tier, range) in self.ranges() {
            if range.is_inverted() {
                warn!(tier = tier.label(), ?range, "Tier range is inverted and will never match");
            }
        }
    }
}

/// Classification inputs of one company, taken from the table the tiers are computed on
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompanySignals {
    pub profile_count: usize,
    pub ip_team_size: Option<f64>,
    pub patents_recent: Option<f64>,
}

/// Per-employer signals; rows without an employer share the `None` key
pub fn company_signals(table: &ProfileTable) -> HashMap<Option<&str>, CompanySignals> {
    let mut signals: HashMap<Option<&str>, CompanySignals> = HashMap::new();
    for row in &table.rows {
        let entry = signals.entry(row.company.as_deref()).or_default();
        entry.profile_count += 1;
        if entry.ip_team_size.is_none() {
            entry.ip_team_size = row.ip_team_size;
        }
        if entry.patents_recent.is_none() {
            entry.patents_recent = row.patents_recent;
        }
    }
    signals
}

/// Signal the configurable rule reads as "IP count": the sheet's IP-team
/// size when the source has that column, the profile count otherwise
pub fn ip_signal(table: &ProfileTable, signals: &CompanySignals) -> Option<f64> {
    if table.has_field(Field::IpTeamSize) {
        signals.ip_team_size
    } else {
        Some(signals.profile_count as f64)
    }
}

/// Fresh copy of `table` with both tier columns recomputed.
///
/// Any `Tier` value carried by the source is overwritten.
pub fn annotate_tiers(table: &ProfileTable, thresholds: &TierThresholds) -> ProfileTable {
    let signals = company_signals(table);
    let has_company = table.has_field(Field::Company);

    let mut columns = table.columns.clone();
    if has_company && !table.has_field(Field::Tier) {
        columns.push(Column::Field(Field::Tier));
    }
    if !table.has_field(Field::CustomTier) {
        columns.push(Column::Field(Field::CustomTier));
    }

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let company = signals
                .get(&row.company.as_deref())
                .copied()
                .unwrap_or_default();
            let mut row = row.clone();
            row.tier = has_company.then(|| classify_fixed(company.profile_count));
            row.custom_tier = Some(thresholds.classify(
                ip_signal(table, &company),
                company.patents_recent,
            ));
            row
        })
        .collect();

    debug!(companies = signals.len(), "Annotated tiers");
    ProfileTable { columns, rows }
}
