// Pipeline processing: normalization, tiering, filtering, and aggregation

pub mod aggregate;
pub mod filter;
pub mod normalize;
pub mod tiering;

pub use filter::{apply_filters, Facet, FacetSelection, FilterSet};
pub use normalize::{ColumnNormalizer, NormalizationReport, NormalizedTable};
pub use tiering::{annotate_tiers, TierRange, TierThresholds};
