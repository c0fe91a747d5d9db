//! Typed data model for the profile table.
//!
//! Missing values are `None` throughout. The `Unknown` sentinel and the empty
//! numeric cell only exist at the CSV boundary (see [`ProfileRow::cell`]).

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::constants::*;

/// Geographic region of a profile, restricted to a fixed set after normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "NA")]
    NorthAmerica,
    #[serde(rename = "EU")]
    Europe,
}

impl Region {
    /// Region assigned to empty, placeholder and out-of-set values
    pub const DEFAULT: Region = Region::NorthAmerica;
    pub const ALL: [Region; 2] = [Region::NorthAmerica, Region::Europe];

    pub fn code(&self) -> &'static str {
        match self {
            Region::NorthAmerica => "NA",
            Region::Europe => "EU",
        }
    }

    /// Exact (case-insensitive) code lookup; no defaulting here
    pub fn from_code(code: &str) -> Option<Region> {
        let code = code.trim();
        Region::ALL
            .into_iter()
            .find(|r| r.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Seniority level, ordered from Entry to Executive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Seniority {
    Entry,
    Junior,
    Mid,
    Senior,
    Executive,
}

impl Seniority {
    pub const ALL: [Seniority; 5] = [
        Seniority::Entry,
        Seniority::Junior,
        Seniority::Mid,
        Seniority::Senior,
        Seniority::Executive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Seniority::Entry => "Entry",
            Seniority::Junior => "Junior",
            Seniority::Mid => "Mid",
            Seniority::Senior => "Senior",
            Seniority::Executive => "Executive",
        }
    }

    pub fn parse(value: &str) -> Option<Seniority> {
        let value = value.trim();
        Seniority::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Company tier label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    T1,
    T2,
    T3,
    Unclassified,
}

impl Tier {
    /// Display order; also the precedence order of the configurable rule
    pub const ORDER: [Tier; 4] = [Tier::T1, Tier::T2, Tier::T3, Tier::Unclassified];

    pub fn label(&self) -> &'static str {
        match self {
            Tier::T1 => "T1",
            Tier::T2 => "T2",
            Tier::T3 => "T3",
            Tier::Unclassified => "Unclassified",
        }
    }

    /// Accepts the spellings found in hand-maintained sheets ("Tier 1", "Tier1", "T1", ...)
    pub fn normalize_label(value: &str) -> Option<Tier> {
        match value.trim() {
            "Tier 1" | "Tier1" | "T1" | "t1" => Some(Tier::T1),
            "Tier 2" | "Tier2" | "T2" | "t2" => Some(Tier::T2),
            "Tier 3" | "Tier3" | "T3" | "t3" => Some(Tier::T3),
            "Unclassified" | "unclassified" | "Non classé" => Some(Tier::Unclassified),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical fields of a profile row, source columns and derived ones alike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    Company,
    JobTitle,
    JobTitleNormalized,
    Seniority,
    Persona,
    Workflow,
    Industry,
    CompanySize,
    Location,
    Country,
    Region,
    Headcount,
    PatentsRecent,
    PatentsTotal,
    IpTeamSize,
    Tier,
    CustomTier,
}

impl Field {
    pub const ALL: [Field; 17] = [
        Field::Company,
        Field::JobTitle,
        Field::JobTitleNormalized,
        Field::Seniority,
        Field::Persona,
        Field::Workflow,
        Field::Industry,
        Field::CompanySize,
        Field::Location,
        Field::Country,
        Field::Region,
        Field::Headcount,
        Field::PatentsRecent,
        Field::PatentsTotal,
        Field::IpTeamSize,
        Field::Tier,
        Field::CustomTier,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Field::Company => COL_COMPANY,
            Field::JobTitle => COL_JOB_TITLE,
            Field::JobTitleNormalized => COL_JOB_TITLE_NORMALIZED,
            Field::Seniority => COL_SENIORITY,
            Field::Persona => COL_PERSONA,
            Field::Workflow => COL_WORKFLOW,
            Field::Industry => COL_INDUSTRY,
            Field::CompanySize => COL_COMPANY_SIZE,
            Field::Location => COL_LOCATION,
            Field::Country => COL_COUNTRY,
            Field::Region => COL_REGION,
            Field::Headcount => COL_HEADCOUNT,
            Field::PatentsRecent => COL_PATENTS_RECENT,
            Field::PatentsTotal => COL_PATENTS_TOTAL,
            Field::IpTeamSize => COL_IP_TEAM_SIZE,
            Field::Tier => COL_TIER,
            Field::CustomTier => COL_CUSTOM_TIER,
        }
    }

    pub fn from_header(header: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.header() == header)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Field::Headcount | Field::PatentsRecent | Field::PatentsTotal | Field::IpTeamSize
        )
    }
}

/// One column of a [`ProfileTable`], in source order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    Field(Field),
    /// Unrecognised source column, passed through untouched
    Extra { name: String, index: usize },
}

impl Column {
    pub fn header(&self) -> &str {
        match self {
            Column::Field(field) => field.header(),
            Column::Extra { name, .. } => name,
        }
    }
}

/// One IP professional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    /// Employer reference; rows are grouped into company rollups by this value
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub job_title_normalized: Option<String>,
    pub seniority: Option<Seniority>,
    pub persona: Option<String>,
    pub workflow: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub region: Region,
    pub headcount: Option<f64>,
    pub patents_recent: Option<f64>,
    pub patents_total: Option<f64>,
    pub ip_team_size: Option<f64>,
    /// Fixed-rule tier; derived, recomputed from the base table
    pub tier: Option<Tier>,
    /// Configurable-rule tier; derived, recomputed whenever thresholds change
    pub custom_tier: Option<Tier>,
    /// Values of the pass-through columns, indexed by `Column::Extra::index`
    pub extras: Vec<String>,
}

impl Default for ProfileRow {
    fn default() -> Self {
        Self {
            company: None,
            job_title: None,
            job_title_normalized: None,
            seniority: None,
            persona: None,
            workflow: None,
            industry: None,
            company_size: None,
            location: None,
            country: None,
            region: Region::DEFAULT,
            headcount: None,
            patents_recent: None,
            patents_total: None,
            ip_team_size: None,
            tier: None,
            custom_tier: None,
            extras: Vec::new(),
        }
    }
}

impl ProfileRow {
    /// Categorical value of a field, `None` when missing
    pub fn text(&self, field: Field) -> Option<Cow<'_, str>> {
        match field {
            Field::Company => self.company.as_deref().map(Cow::Borrowed),
            Field::JobTitle => self.job_title.as_deref().map(Cow::Borrowed),
            Field::JobTitleNormalized => self.job_title_normalized.as_deref().map(Cow::Borrowed),
            Field::Seniority => self.seniority.map(|s| Cow::Borrowed(s.label())),
            Field::Persona => self.persona.as_deref().map(Cow::Borrowed),
            Field::Workflow => self.workflow.as_deref().map(Cow::Borrowed),
            Field::Industry => self.industry.as_deref().map(Cow::Borrowed),
            Field::CompanySize => self.company_size.as_deref().map(Cow::Borrowed),
            Field::Location => self.location.as_deref().map(Cow::Borrowed),
            Field::Country => self.country.as_deref().map(Cow::Borrowed),
            Field::Region => Some(Cow::Borrowed(self.region.code())),
            Field::Tier => self.tier.map(|t| Cow::Borrowed(t.label())),
            Field::CustomTier => self.custom_tier.map(|t| Cow::Borrowed(t.label())),
            Field::Headcount | Field::PatentsRecent | Field::PatentsTotal | Field::IpTeamSize => {
                self.number(field).map(|v| Cow::Owned(format_number(v)))
            }
        }
    }

    /// Numeric value of a field, `None` when missing or not numeric
    pub fn number(&self, field: Field) -> Option<f64> {
        match field {
            Field::Headcount => self.headcount,
            Field::PatentsRecent => self.patents_recent,
            Field::PatentsTotal => self.patents_total,
            Field::IpTeamSize => self.ip_team_size,
            _ => None,
        }
    }

    /// Label used for facet matching and display; missing renders as `Unknown`
    pub fn label(&self, field: Field) -> Cow<'_, str> {
        self.text(field).unwrap_or(Cow::Borrowed(UNKNOWN))
    }

    /// Serialized cell for CSV export
    pub fn cell(&self, column: &Column) -> String {
        match column {
            Column::Field(field) if field.is_numeric() => {
                self.number(*field).map(format_number).unwrap_or_default()
            }
            Column::Field(field) => self.label(*field).into_owned(),
            Column::Extra { index, .. } => self.extras.get(*index).cloned().unwrap_or_default(),
        }
    }
}

/// Render a number the way it was most likely written in the sheet:
/// whole values without a trailing `.0`
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Parsed-but-untyped delimited table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}

/// Row-level profile table. Never mutated in place by the derivation steps;
/// each step returns a fresh table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileTable {
    pub columns: Vec<Column>,
    pub rows: Vec<ProfileRow>,
}

impl ProfileTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.columns.iter().any(|c| c == &Column::Field(field))
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.header().to_string()).collect()
    }

    /// Same column layout, different rows
    pub fn with_rows(&self, rows: Vec<ProfileRow>) -> ProfileTable {
        ProfileTable {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// The exact cells the export writes
    pub fn to_raw_table(&self) -> RawTable {
        RawTable {
            headers: self.headers(),
            records: self
                .rows
                .iter()
                .map(|row| self.columns.iter().map(|c| row.cell(c)).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_codes_are_case_insensitive() {
        assert_eq!(Region::from_code(" eu "), Some(Region::Europe));
        assert_eq!(Region::from_code("NA"), Some(Region::NorthAmerica));
        assert_eq!(Region::from_code("APAC"), None);
    }

    #[test]
    fn test_seniority_is_ordered() {
        assert!(Seniority::Entry < Seniority::Junior);
        assert!(Seniority::Senior < Seniority::Executive);
        assert_eq!(Seniority::parse("senior"), Some(Seniority::Senior));
        assert_eq!(Seniority::parse("Intern"), None);
    }

    #[test]
    fn test_tier_label_spellings() {
        assert_eq!(Tier::normalize_label("Tier 1"), Some(Tier::T1));
        assert_eq!(Tier::normalize_label("Tier2"), Some(Tier::T2));
        assert_eq!(Tier::normalize_label("T3"), Some(Tier::T3));
        assert_eq!(Tier::normalize_label("Non classé"), Some(Tier::Unclassified));
        assert_eq!(Tier::normalize_label("Gold"), None);
    }

    #[test]
    fn test_cells_render_sentinels() {
        let row = ProfileRow {
            headcount: Some(200.0),
            patents_total: Some(12.5),
            extras: vec!["kept".to_string()],
            ..Default::default()
        };

        assert_eq!(row.cell(&Column::Field(Field::Industry)), "Unknown");
        assert_eq!(row.cell(&Column::Field(Field::Region)), "NA");
        assert_eq!(row.cell(&Column::Field(Field::Headcount)), "200");
        assert_eq!(row.cell(&Column::Field(Field::PatentsTotal)), "12.5");
        assert_eq!(row.cell(&Column::Field(Field::PatentsRecent)), "");
        let extra = Column::Extra { name: "Notes".to_string(), index: 0 };
        assert_eq!(row.cell(&extra), "kept");
    }

    #[test]
    fn test_field_headers_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_header(field.header()), Some(field));
        }
    }
}
