//! Error types for staging

use thiserror::Error;

use super::solver::SolverError;
use crate::language::UnboundLayout;

/// Errors that can occur while placing compiled layouts
#[derive(Debug, Error)]
pub enum StageError {
    /// A layout option with no placement rule
    #[error("cannot stage '{layout}'")]
    Unsupported { layout: String },

    /// Cycle edges that form neither a ring nor a simple path
    #[error("cycle '{cycle_id}' is not a single ring or line")]
    MalformedCycle { cycle_id: String },

    /// Constraint solver error
    #[error("constraint solver error: {0}")]
    Solver(#[from] SolverError),
}

impl StageError {
    pub fn unsupported(layout: &UnboundLayout) -> Self {
        Self::Unsupported {
            layout: layout.to_string(),
        }
    }

    pub fn malformed(cycle_id: impl Into<String>) -> Self {
        Self::MalformedCycle {
            cycle_id: cycle_id.into(),
        }
    }
}
