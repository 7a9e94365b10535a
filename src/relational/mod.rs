//! Relational models and instances
//!
//! A [`Model`] declares signatures and typed predicates; an [`Instance`]
//! populates it with atoms and ground facts. Both are plain values that the
//! compiler and the inference search only ever read.

pub mod error;
pub mod instance;
pub mod model;

pub use error::ModelError;
pub use instance::{Instance, InstanceAtom, InstanceFact};
pub use model::{Model, ModelPredicate};
