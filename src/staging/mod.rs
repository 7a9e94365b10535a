//! Staging: placing compiled layouts
//!
//! A [`Stager`] collects the output of the compiler and solves for one
//! coordinate pair per atom. Cyclic layouts sharing an id are classified
//! with [`CycleGraph`] and placed on a circle.

pub mod config;
pub mod cycle;
pub mod error;
pub mod solver;
pub mod stager;

pub use config::StageConfig;
pub use cycle::{circle_positions, CycleGraph, CycleShape};
pub use error::StageError;
pub use solver::{
    Axis, ConstraintSolver, ConstraintSource, Relation, Solution, SolverError, StageConstraint,
    StageVariable,
};
pub use stager::Stager;
