//! Include/exclude facet filtering over the row-level table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::constants::UNKNOWN;
use crate::domain::{Field, ProfileTable, Seniority, Tier};
use crate::error::{DashboardError, Result};
use crate::metrics::RecomputeMetrics;

/// Categorical dimension available for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Tier,
    Region,
    Industry,
    CompanySize,
    Seniority,
    Persona,
}

impl Facet {
    pub const ALL: [Facet; 6] = [
        Facet::Tier,
        Facet::Region,
        Facet::Industry,
        Facet::CompanySize,
        Facet::Seniority,
        Facet::Persona,
    ];

    /// Row field the facet reads
    pub fn field(&self) -> Field {
        match self {
            Facet::Tier => Field::Tier,
            Facet::Region => Field::Region,
            Facet::Industry => Field::Industry,
            Facet::CompanySize => Field::CompanySize,
            Facet::Seniority => Field::Seniority,
            Facet::Persona => Field::Persona,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Facet::Tier => "tier",
            Facet::Region => "region",
            Facet::Industry => "industry",
            Facet::CompanySize => "company_size",
            Facet::Seniority => "seniority",
            Facet::Persona => "persona",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Facet::Tier => "Tier",
            Facet::Region => "Region",
            Facet::Industry => "Industry",
            Facet::CompanySize => "Company size",
            Facet::Seniority => "Seniority",
            Facet::Persona => "Persona",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Facet {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace(|c: char| c == '-' || c == ' ', "_");
        match key.as_str() {
            "tier" | "tiering" => Ok(Facet::Tier),
            "region" => Ok(Facet::Region),
            "industry" => Ok(Facet::Industry),
            "company_size" | "companysize" | "size" => Ok(Facet::CompanySize),
            "seniority" => Ok(Facet::Seniority),
            "persona" => Ok(Facet::Persona),
            _ => Err(DashboardError::UnknownFacet(s.to_string())),
        }
    }
}

/// Allowed and rejected values of one facet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacetSelection {
    pub include: BTreeSet<String>,
    pub exclude: BTreeSet<String>,
}

impl FacetSelection {
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// An empty include-set does not restrict; exclusion is checked last
    pub fn admits(&self, label: &str) -> bool {
        (self.include.is_empty() || self.include.contains(label)) && !self.exclude.contains(label)
    }
}

/// The active include/exclude selections, one per facet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSet {
    pub tier: FacetSelection,
    pub region: FacetSelection,
    pub industry: FacetSelection,
    pub company_size: FacetSelection,
    pub seniority: FacetSelection,
    pub persona: FacetSelection,
}

impl FilterSet {
    pub fn selection(&self, facet: Facet) -> &FacetSelection {
        match facet {
            Facet::Tier => &self.tier,
            Facet::Region => &self.region,
            Facet::Industry => &self.industry,
            Facet::CompanySize => &self.company_size,
            Facet::Seniority => &self.seniority,
            Facet::Persona => &self.persona,
        }
    }

    pub fn selection_mut(&mut self, facet: Facet) -> &mut FacetSelection {
        match facet {
            Facet::Tier => &mut self.tier,
            Facet::Region => &mut self.region,
            Facet::Industry => &mut self.industry,
            Facet::CompanySize => &mut self.company_size,
            Facet::Seniority => &mut self.seniority,
            Facet::Persona => &mut self.persona,
        }
    }

    pub fn is_empty(&self) -> bool {
        Facet::ALL.iter().all(|f| self.selection(*f).is_empty())
    }

    pub fn include(mut self, facet: Facet, value: &str) -> Self {
        self.selection_mut(facet).include.insert(canonical_value(facet, value));
        self
    }

    pub fn exclude(mut self, facet: Facet, value: &str) -> Self {
        self.selection_mut(facet).exclude.insert(canonical_value(facet, value));
        self
    }

    /// Add a `facet=value` expression to the include-set
    pub fn add_include_expr(&mut self, expr: &str) -> Result<()> {
        let (facet, value) = parse_filter_expr(expr)?;
        self.selection_mut(facet).include.insert(value);
        Ok(())
    }

    /// Add a `facet=value` expression to the exclude-set
    pub fn add_exclude_expr(&mut self, expr: &str) -> Result<()> {
        let (facet, value) = parse_filter_expr(expr)?;
        self.selection_mut(facet).exclude.insert(value);
        Ok(())
    }

    /// Rewrite hand-typed values into the labels rows carry ("Tier 1" → "T1", "eu" → "EU")
    pub fn canonicalized(&self) -> FilterSet {
        let mut out = FilterSet::default();
        for facet in Facet::ALL {
            let src = self.selection(facet);
            let dst = out.selection_mut(facet);
            dst.include = src.include.iter().map(|v| canonical_value(facet, v)).collect();
            dst.exclude = src.exclude.iter().map(|v| canonical_value(facet, v)).collect();
        }
        out
    }

    /// One line per active selection, for the sidebar summary
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for facet in Facet::ALL {
            let selection = self.selection(facet);
            if !selection.include.is_empty() {
                lines.push(describe_values('+', facet, &selection.include, "selected"));
            }
            if !selection.exclude.is_empty() {
                lines.push(describe_values('-', facet, &selection.exclude, "excluded"));
            }
        }
        lines
    }
}

fn describe_values(sign: char, facet: Facet, values: &BTreeSet<String>, verb: &str) -> String {
    // industries are too long to list inline
    if facet == Facet::Industry {
        format!("{} {}: {} {}", sign, facet.display_name(), values.len(), verb)
    } else {
        let joined = values.iter().cloned().collect::<Vec<_>>().join(", ");
        format!("{} {}: {}", sign, facet.display_name(), joined)
    }
}

fn canonical_value(facet: Facet, value: &str) -> String {
    let value = value.trim();
    match facet {
        Facet::Tier => Tier::normalize_label(value)
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| value.to_string()),
        Facet::Region => value.to_ascii_uppercase(),
        Facet::Seniority => Seniority::parse(value)
            .map(|s| s.label().to_string())
            .unwrap_or_else(|| value.to_string()),
        _ => value.to_string(),
    }
}

/// Split `facet=value` and canonicalize the value
pub fn parse_filter_expr(expr: &str) -> Result<(Facet, String)> {
    let (facet, value) = expr
        .split_once('=')
        .ok_or_else(|| DashboardError::InvalidFilter(format!("expected facet=value, got '{}'", expr)))?;
    let facet: Facet = facet.parse()?;
    let value = value.trim();
    if value.is_empty() {
        return Err(DashboardError::InvalidFilter(format!("empty value in '{}'", expr)));
    }
    Ok((facet, canonical_value(facet, value)))
}

/// Keep the rows every active facet admits, in their original order.
///
/// Facets whose column is absent from the table are skipped, not failed.
pub fn apply_filters(table: &ProfileTable, filters: &FilterSet) -> ProfileTable {
    let active: Vec<(Facet, &FacetSelection)> = Facet::ALL
        .into_iter()
        .map(|facet| (facet, filters.selection(facet)))
        .filter(|(_, selection)| !selection.is_empty())
        .filter(|(facet, _)| {
            let present = table.has_field(facet.field());
            if !present {
                warn!(facet = facet.name(), "Facet column missing; filter ignored");
                RecomputeMetrics::record_skipped_facet();
            }
            present
        })
        .collect();

    if active.is_empty() {
        return table.clone();
    }

    let rows: Vec<_> = table
        .rows
        .iter()
        .filter(|row| {
            active
                .iter()
                .all(|(facet, selection)| selection.admits(&row.label(facet.field())))
        })
        .cloned()
        .collect();

    for (facet, selection) in &active {
        debug!(
            facet = facet.name(),
            include = selection.include.len(),
            exclude = selection.exclude.len(),
            "Applied facet"
        );
    }
    info!(before = table.len(), after = rows.len(), "Filtered profiles");
    table.with_rows(rows)
}

/// Selectable values of a facet, or `None` when the facet must be hidden
pub fn facet_options(table: &ProfileTable, facet: Facet) -> Option<Vec<String>> {
    if !table.has_field(facet.field()) {
        return None;
    }
    let values: BTreeSet<String> = table
        .rows
        .iter()
        .map(|row| row.label(facet.field()))
        .filter(|label| label.as_ref() != UNKNOWN)
        .map(|label| label.into_owned())
        .collect();
    let mut values: Vec<String> = values.into_iter().collect();
    if facet == Facet::Seniority {
        values.sort_by_key(|v| Seniority::parse(v));
    }
    Some(values)
}
