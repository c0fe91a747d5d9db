/// Canonical column names and fixed labels shared across the pipeline.
/// These names are what the export writes and what a reload expects.

// Canonical column headers
pub const COL_COMPANY: &str = "Company";
pub const COL_JOB_TITLE: &str = "JobTitle";
pub const COL_JOB_TITLE_NORMALIZED: &str = "JobTitle_Normalized";
pub const COL_SENIORITY: &str = "Seniority";
pub const COL_PERSONA: &str = "Persona";
pub const COL_WORKFLOW: &str = "Workflow";
pub const COL_INDUSTRY: &str = "Industry";
pub const COL_COMPANY_SIZE: &str = "CompanySize";
pub const COL_LOCATION: &str = "Location";
pub const COL_COUNTRY: &str = "Country";
pub const COL_REGION: &str = "Region";
pub const COL_HEADCOUNT: &str = "Headcount";
pub const COL_PATENTS_RECENT: &str = "Patents_Recent";
pub const COL_PATENTS_TOTAL: &str = "Patents_Total";
pub const COL_IP_TEAM_SIZE: &str = "IP_Team_Size";
pub const COL_TIER: &str = "Tier";
pub const COL_CUSTOM_TIER: &str = "Custom_Tier";

/// Raw source header → canonical column name.
///
/// Headers are compared after whitespace cleanup (embedded line breaks
/// collapsed to a single space, then trimmed).
pub const RAW_COLUMN_RENAMES: &[(&str, &str)] = &[
    ("Entreprise", COL_COMPANY),
    ("Titre", COL_JOB_TITLE),
    ("Taille de l'entreprise", COL_HEADCOUNT),
    ("Size", COL_COMPANY_SIZE),
    ("Secteurs d'activité", COL_INDUSTRY),
    ("Lieu", COL_LOCATION),
    ("Region (2)", COL_REGION),
    ("Brevets des 3 dernières années", COL_PATENTS_RECENT),
    ("Total Brevets", COL_PATENTS_TOTAL),
    ("Nombre_IP_Pro", COL_IP_TEAM_SIZE),
];

/// Sentinel rendered for a missing categorical value
pub const UNKNOWN: &str = "Unknown";

/// Placeholder the region enrichment writes when its lookup failed
pub const REGION_ERROR_PLACEHOLDER: &str = "Error processing request";

// Fixed-rule tier boundaries (profile count per company)
pub const FIXED_T1_MIN_EXCLUSIVE: usize = 30;
pub const FIXED_T2_MIN: usize = 5;

/// Natural ordering used when displaying company size buckets
pub const COMPANY_SIZE_ORDER: &[&str] = &["Small", "Medium", "Large", "Enterprise"];

/// Default output file name for CSV exports
pub const EXPORT_FILE_NAME: &str = "tam_filtered_export.csv";

// Names of the cross-tabulations exposed to the rendering layer
pub const CROSSTAB_TIER_VS_WORKFLOW: &str = "tier_vs_workflow";
pub const CROSSTAB_TIER_VS_SENIORITY: &str = "tier_vs_seniority";
pub const CROSSTAB_PERSONA_VS_SENIORITY: &str = "persona_vs_seniority";

// Names of the distributions exposed to the rendering layer
pub const DIST_CUSTOM_TIER: &str = "custom_tier";
pub const DIST_REGION: &str = "region";
pub const DIST_INDUSTRY: &str = "industry";
pub const DIST_COMPANY_SIZE: &str = "company_size";
pub const DIST_WORKFLOW: &str = "workflow";
pub const DIST_PERSONA: &str = "persona";
pub const DIST_SENIORITY: &str = "seniority";
