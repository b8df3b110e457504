//! Facet recommendations: the canonical record, ranking and the
//! normalization of raw generator rows.

pub mod facet;
pub mod normalize;

pub use facet::{rank, FacetDraft, Priority, RecommendedFacet};
pub use normalize::{normalize, normalize_all};
