//! Layout inference from an example diagram
//!
//! Scoring tells how well one compiled layout matches observed positions;
//! footprints give a canonical form for comparing what two programs claim;
//! the search enumerates candidate programs and keeps the simplest
//! confident one per footprint set.

pub mod config;
pub mod confidence;
pub mod diagram;
pub mod footprint;
pub mod search;

pub use confidence::{
    binary_confidence, compute_confidence, confidence_of_concrete, geometric_mean,
    score_concrete, unary_confidence, ScoreError,
};
pub use config::InferenceConfig;
pub use diagram::{AbstractDiagram, DiagramInputs, Position};
pub use footprint::{canonicalize, to_footprints, Footprint, FootprintKey};
pub use search::{gen_abstract_layouts, infer, InferredAbstractLayout};
