//! Column normalization: canonical headers, typed cells, derived text columns.

pub mod categorical;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

use crate::constants::{RAW_COLUMN_RENAMES, UNKNOWN};
use crate::domain::{Column, Field, ProfileRow, ProfileTable, RawTable, Seniority, Tier};
use categorical::{extract_country, normalize_job_title, normalize_region};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Source columns the pipeline knows how to use. Any of them may be absent.
const SOURCE_FIELDS: [Field; 13] = [
    Field::Company,
    Field::JobTitle,
    Field::Seniority,
    Field::Persona,
    Field::Workflow,
    Field::Industry,
    Field::CompanySize,
    Field::Location,
    Field::Region,
    Field::Headcount,
    Field::PatentsRecent,
    Field::PatentsTotal,
    Field::IpTeamSize,
];

/// What the normalizer recovered from, for logging and the dashboard footer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationReport {
    pub rows: usize,
    /// Cells that could not be coerced to their field's type, now missing
    pub unparseable_cells: BTreeMap<Field, usize>,
    /// Known source columns absent from this dataset
    pub missing_columns: Vec<Field>,
    /// Headers that mapped onto an already-claimed field and were passed through
    pub duplicate_columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub table: ProfileTable,
    pub report: NormalizationReport,
}

/// Collapse embedded line breaks and whitespace runs, then trim
pub fn clean_header(raw: &str) -> String {
    WHITESPACE_RUN.replace_all(raw, " ").trim().to_string()
}

/// Canonical field for a cleaned header: the rename map first, then the
/// canonical names themselves so that exported files load back
pub fn canonical_field(cleaned: &str) -> Option<Field> {
    RAW_COLUMN_RENAMES
        .iter()
        .find(|(raw, _)| *raw == cleaned)
        .and_then(|(_, canonical)| Field::from_header(canonical))
        .or_else(|| Field::from_header(cleaned))
}

/// Trimmed text, with blanks and the `Unknown` sentinel read as missing
pub fn clean_text(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == UNKNOWN {
        None
    } else {
        Some(value.to_string())
    }
}

/// Outcome of coercing one numeric cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericCell {
    Value(f64),
    Missing,
    Unparseable,
}

pub fn parse_numeric(value: &str) -> NumericCell {
    let value = value.trim();
    if value.is_empty() {
        return NumericCell::Missing;
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => NumericCell::Value(v),
        _ => NumericCell::Unparseable,
    }
}

/// Turns a raw table into the typed profile table
#[derive(Debug, Default)]
pub struct ColumnNormalizer;

impl ColumnNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, raw: &RawTable) -> NormalizedTable {
        let mut report = NormalizationReport {
            rows: raw.records.len(),
            ..Default::default()
        };

        // Resolve the column layout once
        let mut columns = Vec::with_capacity(raw.headers.len() + 2);
        let mut field_source: HashMap<Field, usize> = HashMap::new();
        let mut extra_source: Vec<usize> = Vec::new();
        for (idx, header) in raw.headers.iter().enumerate() {
            let cleaned = clean_header(header);
            match canonical_field(&cleaned) {
                Some(field) if !field_source.contains_key(&field) => {
                    field_source.insert(field, idx);
                    columns.push(Column::Field(field));
                }
                other => {
                    if other.is_some() {
                        report.duplicate_columns.push(cleaned.clone());
                    }
                    columns.push(Column::Extra {
                        name: cleaned,
                        index: extra_source.len(),
                    });
                    extra_source.push(idx);
                }
            }
        }

        for field in SOURCE_FIELDS {
            if !field_source.contains_key(&field) {
                warn!(column = field.header(), "Optional column missing from source");
                report.missing_columns.push(field);
            }
        }

        let has = |field: Field| field_source.contains_key(&field);
        if has(Field::JobTitle) && !has(Field::JobTitleNormalized) {
            columns.push(Column::Field(Field::JobTitleNormalized));
        }
        if (has(Field::Location) || has(Field::Country)) && !has(Field::Country) {
            columns.push(Column::Field(Field::Country));
        }

        let rows = raw
            .records
            .iter()
            .map(|record| self.normalize_record(record, &field_source, &extra_source, &mut report))
            .collect();

        for (field, count) in &report.unparseable_cells {
            warn!(column = field.header(), count, "Coerced unparseable cells to missing");
        }
        info!(
            rows = report.rows,
            columns = columns.len(),
            "Normalized source columns"
        );

        NormalizedTable {
            table: ProfileTable { columns, rows },
            report,
        }
    }

    fn normalize_record(
        &self,
        record: &[String],
        field_source: &HashMap<Field, usize>,
        extra_source: &[usize],
        report: &mut NormalizationReport,
    ) -> ProfileRow {
        let cell = |field: Field| -> Option<&str> {
            field_source
                .get(&field)
                .and_then(|&idx| record.get(idx))
                .map(String::as_str)
        };
        let text = |field: Field| cell(field).and_then(clean_text);

        let mut number = |field: Field| -> Option<f64> {
            match cell(field).map(parse_numeric) {
                Some(NumericCell::Value(v)) => Some(v),
                Some(NumericCell::Unparseable) => {
                    *report.unparseable_cells.entry(field).or_insert(0) += 1;
                    None
                }
                Some(NumericCell::Missing) | None => None,
            }
        };
        let headcount = number(Field::Headcount);
        let patents_recent = number(Field::PatentsRecent);
        let patents_total = number(Field::PatentsTotal);
        let ip_team_size = number(Field::IpTeamSize);

        let seniority = match text(Field::Seniority) {
            Some(value) => {
                let parsed = Seniority::parse(&value);
                if parsed.is_none() {
                    debug!(value = %value, "Unrecognised seniority");
                    *report.unparseable_cells.entry(Field::Seniority).or_insert(0) += 1;
                }
                parsed
            }
            None => None,
        };

        let job_title = text(Field::JobTitle);
        let job_title_normalized = normalize_job_title(job_title.as_deref());

        let location = text(Field::Location);
        let country = if field_source.contains_key(&Field::Location) {
            extract_country(location.as_deref())
        } else {
            text(Field::Country)
        };

        ProfileRow {
            company: text(Field::Company),
            job_title,
            job_title_normalized,
            seniority,
            persona: text(Field::Persona),
            workflow: text(Field::Workflow),
            industry: text(Field::Industry),
            company_size: text(Field::CompanySize),
            location,
            country,
            region: normalize_region(cell(Field::Region)),
            headcount,
            patents_recent,
            patents_total,
            ip_team_size,
            // read back so a reloaded export matches; recomputed before use
            tier: text(Field::Tier).and_then(|v| Tier::normalize_label(&v)),
            custom_tier: text(Field::CustomTier).and_then(|v| Tier::normalize_label(&v)),
            extras: extra_source
                .iter()
                .map(|&idx| record.get(idx).cloned().unwrap_or_default())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Region;

    fn raw(headers: &[&str], records: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            records: records
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_headers_are_cleaned_and_renamed() {
        assert_eq!(
            clean_header("  Brevets des 3 dernières\nannées "),
            "Brevets des 3 dernières années"
        );
        assert_eq!(
            canonical_field("Brevets des 3 dernières années"),
            Some(Field::PatentsRecent)
        );
        assert_eq!(canonical_field("Entreprise"), Some(Field::Company));
        assert_eq!(canonical_field("Headcount"), Some(Field::Headcount));
        assert_eq!(canonical_field("LinkedIn URL"), None);
    }

    #[test]
    fn test_numeric_coercion_never_fails_the_row() {
        let table = raw(
            &["Entreprise", "Taille de l'entreprise", "Total Brevets"],
            &[&["Acme", "1200", "n/a"], &["Globex", "", "42"]],
        );
        let normalized = ColumnNormalizer::new().normalize(&table);

        assert_eq!(normalized.table.rows.len(), 2);
        assert_eq!(normalized.table.rows[0].headcount, Some(1200.0));
        assert_eq!(normalized.table.rows[0].patents_total, None);
        assert_eq!(normalized.table.rows[1].headcount, None);
        assert_eq!(normalized.table.rows[1].patents_total, Some(42.0));
        assert_eq!(
            normalized.report.unparseable_cells.get(&Field::PatentsTotal),
            Some(&1)
        );
        assert_eq!(normalized.report.unparseable_cells.get(&Field::Headcount), None);
    }

    #[test]
    fn test_missing_text_becomes_none() {
        let table = raw(
            &["Entreprise", "Secteurs d'activité", "Region (2)"],
            &[&["Acme", "Unknown", "Error processing request"], &["", " Biotech ", "EU"]],
        );
        let normalized = ColumnNormalizer::new().normalize(&table);
        let rows = &normalized.table.rows;

        assert_eq!(rows[0].industry, None);
        assert_eq!(rows[0].region, Region::NorthAmerica);
        assert_eq!(rows[1].company, None);
        assert_eq!(rows[1].industry.as_deref(), Some("Biotech"));
        assert_eq!(rows[1].region, Region::Europe);
    }

    #[test]
    fn test_unknown_columns_pass_through_in_place() {
        let table = raw(
            &["Notes", "Entreprise", "Lieu", "Titre"],
            &[&[" keep  as is ", "Acme", "Lyon, France", "patent agent"]],
        );
        let normalized = ColumnNormalizer::new().normalize(&table);

        assert_eq!(
            normalized.table.headers(),
            vec![
                "Notes",
                "Company",
                "Location",
                "JobTitle",
                "JobTitle_Normalized",
                "Country"
            ]
        );
        let row = &normalized.table.rows[0];
        assert_eq!(row.extras, vec![" keep  as is ".to_string()]);
        assert_eq!(row.country.as_deref(), Some("France"));
        assert_eq!(row.job_title_normalized.as_deref(), Some("Patent Agent"));
    }

    #[test]
    fn test_missing_optional_columns_are_reported() {
        let table = raw(&["Entreprise"], &[&["Acme"]]);
        let normalized = ColumnNormalizer::new().normalize(&table);

        assert!(normalized.report.missing_columns.contains(&Field::Region));
        assert!(normalized.report.missing_columns.contains(&Field::PatentsTotal));
        assert!(!normalized.table.has_field(Field::Country));
        assert_eq!(normalized.table.rows[0].region, Region::DEFAULT);
    }

    #[test]
    fn test_duplicate_canonical_headers_become_extras() {
        let table = raw(&["Titre", "JobTitle"], &[&["Patent Agent", "other"]]);
        let normalized = ColumnNormalizer::new().normalize(&table);

        assert_eq!(normalized.report.duplicate_columns, vec!["JobTitle".to_string()]);
        assert_eq!(normalized.table.rows[0].extras, vec!["other".to_string()]);
    }

    #[test]
    fn test_tier_labels_are_normalized() {
        let table = raw(&["Company", "Tier"], &[&["Acme", "Tier 1"], &["Globex", "Gold"]]);
        let normalized = ColumnNormalizer::new().normalize(&table);
        assert_eq!(normalized.table.rows[0].tier, Some(Tier::T1));
        assert_eq!(normalized.table.rows[1].tier, None);
    }
}
