use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::{debug, warn};

use crate::constants::UNKNOWN;
use crate::domain::{Field, ProfileRow, ProfileTable, Region, Tier};

/// One employer, aggregated over its rows in the current view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyRollup {
    /// `None` groups every row that has no employer
    pub company: Option<String>,
    pub profile_count: usize,
    pub tier: Option<Tier>,
    pub custom_tier: Option<Tier>,
    pub region: Option<Region>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub workflow: Option<String>,
    pub persona: Option<String>,
    pub headcount: Option<f64>,
    pub ip_team_size: Option<f64>,
    pub patents_recent: Option<f64>,
    pub patents_total: Option<f64>,
}

impl CompanyRollup {
    pub fn name(&self) -> &str {
        self.company.as_deref().unwrap_or(UNKNOWN)
    }

    /// Categorical attribute of the rollup, by row field
    pub fn text(&self, field: Field) -> Option<String> {
        match field {
            Field::Company => self.company.clone(),
            Field::Tier => self.tier.map(|t| t.label().to_string()),
            Field::CustomTier => self.custom_tier.map(|t| t.label().to_string()),
            Field::Region => self.region.map(|r| r.code().to_string()),
            Field::Industry => self.industry.clone(),
            Field::CompanySize => self.company_size.clone(),
            Field::Workflow => self.workflow.clone(),
            Field::Persona => self.persona.clone(),
            _ => None,
        }
    }
}

/// Most frequent present value; among tied values the one seen first wins
pub fn mode_first<T, I>(values: I) -> Option<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = Option<T>>,
{
    let mut seen: HashMap<T, (usize, usize)> = HashMap::new();
    for (position, value) in values.into_iter().flatten().enumerate() {
        seen.entry(value).or_insert((position, 0)).1 += 1;
    }
    seen.into_iter()
        .min_by(|(_, (pos_a, count_a)), (_, (pos_b, count_b))| {
            count_b.cmp(count_a).then(pos_a.cmp(pos_b))
        })
        .map(|(value, _)| value)
}

/// First present value in row order
pub fn first_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().next()
}

/// Group rows by employer, in order of first appearance
pub fn group_by_company(table: &ProfileTable) -> Vec<(Option<&str>, Vec<&ProfileRow>)> {
    let mut index: HashMap<Option<&str>, usize> = HashMap::new();
    let mut groups: Vec<(Option<&str>, Vec<&ProfileRow>)> = Vec::new();
    for row in &table.rows {
        let key = row.company.as_deref();
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }
    groups
}

/// Company-level table: one rollup per employer in the view.
///
/// Categorical columns take the mode, numeric ones the first present value
/// (they are company constants repeated on every profile row).
pub fn rollup_companies(table: &ProfileTable) -> Vec<CompanyRollup> {
    if !table.has_field(Field::Company) {
        warn!("No company column; company rollups unavailable");
        return Vec::new();
    }

    let rollups: Vec<CompanyRollup> = group_by_company(table)
        .into_iter()
        .map(|(company, rows)| {
            let text = |pick: fn(&ProfileRow) -> Option<&String>| {
                mode_first(rows.iter().map(|r| pick(r).cloned()))
            };
            let number = |pick: fn(&ProfileRow) -> Option<f64>| first_present(rows.iter().map(|r| pick(r)));
            CompanyRollup {
                company: company.map(str::to_string),
                profile_count: rows.len(),
                tier: mode_first(rows.iter().map(|r| r.tier)),
                custom_tier: mode_first(rows.iter().map(|r| r.custom_tier)),
                region: mode_first(rows.iter().map(|r| Some(r.region))),
                industry: text(|r| r.industry.as_ref()),
                company_size: text(|r| r.company_size.as_ref()),
                workflow: text(|r| r.workflow.as_ref()),
                persona: text(|r| r.persona.as_ref()),
                headcount: number(|r| r.headcount),
                ip_team_size: number(|r| r.ip_team_size),
                patents_recent: number(|r| r.patents_recent),
                patents_total: number(|r| r.patents_total),
            }
        })
        .collect();

    debug!(companies = rollups.len(), rows = table.len(), "Rolled up companies");
    rollups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Column;

    fn row(company: Option<&str>, industry: Option<&str>, patents: Option<f64>) -> ProfileRow {
        ProfileRow {
            company: company.map(str::to_string),
            industry: industry.map(str::to_string),
            patents_total: patents,
            ..Default::default()
        }
    }

    fn table(rows: Vec<ProfileRow>) -> ProfileTable {
        ProfileTable {
            columns: vec![
                Column::Field(Field::Company),
                Column::Field(Field::Industry),
                Column::Field(Field::PatentsTotal),
            ],
            rows,
        }
    }

    #[test]
    fn test_mode_tie_goes_to_first_seen() {
        assert_eq!(mode_first(vec![Some("A"), Some("B")]), Some("A"));
        assert_eq!(mode_first(vec![Some("B"), Some("A"), Some("A")]), Some("A"));
        assert_eq!(mode_first(vec![None, Some("B"), None, Some("C")]), Some("B"));
        assert_eq!(mode_first::<&str, _>(vec![None, None]), None);
    }

    #[test]
    fn test_first_present_skips_missing() {
        assert_eq!(first_present(vec![None, Some(3.0), Some(4.0)]), Some(3.0));
        assert_eq!(first_present(vec![None, None]), None);
    }

    #[test]
    fn test_rollup_counts_and_order() {
        let t = table(vec![
            row(Some("Globex"), Some("Software"), None),
            row(Some("Acme"), Some("Pharma"), Some(12.0)),
            row(None, None, None),
            row(Some("Globex"), Some("Pharma"), Some(40.0)),
            row(Some("Acme"), Some("Pharma"), Some(99.0)),
        ]);
        let rollups = rollup_companies(&t);

        let names: Vec<&str> = rollups.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Globex", "Acme", "Unknown"]);
        assert_eq!(rollups.iter().map(|r| r.profile_count).sum::<usize>(), t.len());

        let globex = &rollups[0];
        assert_eq!(globex.profile_count, 2);
        assert_eq!(globex.industry.as_deref(), Some("Software"));
        assert_eq!(globex.patents_total, Some(40.0));

        let acme = &rollups[1];
        assert_eq!(acme.industry.as_deref(), Some("Pharma"));
        assert_eq!(acme.patents_total, Some(12.0));
    }

    #[test]
    fn test_no_company_column_yields_no_rollups() {
        let t = ProfileTable {
            columns: vec![Column::Field(Field::Industry)],
            rows: vec![row(None, Some("Pharma"), None)],
        };
        assert!(rollup_companies(&t).is_empty());
    }
}
