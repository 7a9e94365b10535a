//! Errors raised while compiling abstract layouts

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("selector '{pred}' expects {expected} arguments, but a fact has {found}")]
    ArityMismatch {
        pred: String,
        expected: usize,
        found: usize,
    },

    #[error("variable '{varname}' in '{layout}' is not bound by any selector")]
    UnboundVariable { varname: String, layout: String },
}

impl CompileError {
    pub fn arity(pred: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::ArityMismatch {
            pred: pred.into(),
            expected,
            found,
        }
    }

    pub fn unbound(varname: impl Into<String>, layout: impl Into<String>) -> Self {
        Self::UnboundVariable {
            varname: varname.into(),
            layout: layout.into(),
        }
    }
}
