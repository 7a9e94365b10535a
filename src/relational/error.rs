//! Errors for instance validation

use thiserror::Error;

/// An instance that does not conform to its model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("atom '{atom}' is declared more than once")]
    DuplicateAtom { atom: String },

    #[error("atom '{atom}' has undeclared signature '{sig}'")]
    UnknownSignature { atom: String, sig: String },

    #[error("fact uses undeclared predicate '{predicate}'")]
    UnknownPredicate { predicate: String },

    #[error("predicate '{predicate}' expects {expected} arguments, but a fact has {found}")]
    ArityMismatch {
        predicate: String,
        expected: usize,
        found: usize,
    },

    #[error("fact of '{predicate}' references unknown atom '{atom}'")]
    UnknownAtom { predicate: String, atom: String },
}
