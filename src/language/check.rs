//! Static checking of abstract layouts against a model

use std::collections::BTreeMap;

use thiserror::Error;

use super::abstract_layout::{AbstractLayout, Selector};
use super::concrete::{AtomRef, BoundLayout};
use crate::relational::Model;

/// Variable name to signature, as introduced by a selector chain
pub type TypeEnv = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("unknown signature '{sig}' for variable '{varname}'")]
    UnknownSignature { varname: String, sig: String },

    #[error("unknown predicate '{pred}'")]
    UnknownPredicate { pred: String },

    #[error("predicate '{pred}' takes {expected} arguments, selector gives {found}")]
    ArityMismatch {
        pred: String,
        expected: usize,
        found: usize,
    },

    #[error("variable '{varname}' is used as both '{first}' and '{second}'")]
    SignatureConflict {
        varname: String,
        first: String,
        second: String,
    },

    #[error("variable '{varname}' is not introduced by any selector")]
    UnboundVariable { varname: String },

    #[error("layout '{layout}' cannot be arranged")]
    Unsupported { layout: String },
}

impl CheckError {
    pub fn unbound(varname: impl Into<String>) -> Self {
        Self::UnboundVariable {
            varname: varname.into(),
        }
    }

    pub fn unsupported(layout: &BoundLayout) -> Self {
        Self::Unsupported {
            layout: layout.to_string(),
        }
    }
}

/// Record `varname : sig`, rejecting a second, different signature
fn bind(env: &mut TypeEnv, varname: &str, sig: &str) -> Result<(), CheckError> {
    match env.get(varname) {
        Some(existing) if existing != sig => Err(CheckError::SignatureConflict {
            varname: varname.to_string(),
            first: existing.clone(),
            second: sig.to_string(),
        }),
        Some(_) => Ok(()),
        None => {
            env.insert(varname.to_string(), sig.to_string());
            Ok(())
        }
    }
}

/// Extend `env` with the variables `selector` introduces
pub fn check_selector(selector: &Selector, model: &Model, env: &mut TypeEnv) -> Result<(), CheckError> {
    match selector {
        Selector::SigSelector(s) => {
            if !model.has_signature(&s.sig) {
                return Err(CheckError::UnknownSignature {
                    varname: s.varname.clone(),
                    sig: s.sig.clone(),
                });
            }
            bind(env, &s.varname, &s.sig)
        }
        Selector::PredSelector(p) => {
            let declared = model
                .predicate(&p.pred)
                .ok_or_else(|| CheckError::UnknownPredicate {
                    pred: p.pred.clone(),
                })?;
            if declared.arity() != p.args.len() {
                return Err(CheckError::ArityMismatch {
                    pred: p.pred.clone(),
                    expected: declared.arity(),
                    found: p.args.len(),
                });
            }
            for (arg, sig) in p.args.iter().zip(&declared.sigs) {
                bind(env, arg, sig)?;
            }
            Ok(())
        }
    }
}

fn check_terminal(terminal: &BoundLayout, env: &TypeEnv) -> Result<(), CheckError> {
    match terminal {
        BoundLayout::BinaryLayout(b) if !b.option.is_supported() => {
            return Err(CheckError::unsupported(terminal))
        }
        BoundLayout::GroupingLayout(_) => return Err(CheckError::unsupported(terminal)),
        _ => {}
    }
    for op in terminal.operands() {
        if !env.contains_key(op.name()) {
            return Err(CheckError::unbound(op.name()));
        }
    }
    Ok(())
}

/// Type-check `layout` and return the environment its chain builds
pub fn check_abstract_layout(layout: &AbstractLayout, model: &Model) -> Result<TypeEnv, CheckError> {
    let mut env = TypeEnv::new();
    for selector in layout.selectors() {
        check_selector(selector, model, &mut env)?;
    }
    check_terminal(layout.terminal(), &env)?;
    Ok(env)
}
