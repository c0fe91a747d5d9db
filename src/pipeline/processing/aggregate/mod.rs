// Aggregation over the filtered view: company rollups, cross-tabs, density, rankings, summaries

pub mod crosstab;
pub mod density;
pub mod ranking;
pub mod rollup;
pub mod stats;

pub use crosstab::CrossTab;
pub use density::{density, density_report, DensityReport};
pub use rollup::{rollup_companies, CompanyRollup};
pub use stats::{distributions, summarize, Distribution, SummaryStats};
