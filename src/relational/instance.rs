//! Ground facts over a model

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::ModelError;
use super::model::Model;

/// A named, typed individual
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceAtom {
    pub name: String,
    #[serde(rename = "type")]
    pub sig: String,
}

/// One ground tuple of a predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceFact {
    pub predicate_name: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instance {
    pub atoms: Vec<InstanceAtom>,
    pub predicates: Vec<InstanceFact>,
}

impl Instance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_atom(mut self, name: impl Into<String>, sig: impl Into<String>) -> Self {
        self.atoms.push(InstanceAtom {
            name: name.into(),
            sig: sig.into(),
        });
        self
    }

    pub fn with_fact(mut self, predicate: impl Into<String>, args: &[&str]) -> Self {
        self.predicates.push(InstanceFact {
            predicate_name: predicate.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        });
        self
    }

    /// Names of all atoms of the given signature, in declaration order
    pub fn atoms_of<'a>(&'a self, sig: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.atoms
            .iter()
            .filter(move |a| a.sig == sig)
            .map(|a| a.name.as_str())
    }

    /// All ground tuples of the given predicate, in declaration order
    pub fn facts_of<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a [String]> + 'a {
        self.predicates
            .iter()
            .filter(move |f| f.predicate_name == predicate)
            .map(|f| f.args.as_slice())
    }

    pub fn atom(&self, name: &str) -> Option<&InstanceAtom> {
        self.atoms.iter().find(|a| a.name == name)
    }

    /// Check that this instance is well-typed against `model`
    pub fn validate(&self, model: &Model) -> Result<(), ModelError> {
        let mut seen = HashSet::new();
        for atom in &self.atoms {
            if !seen.insert(atom.name.as_str()) {
                return Err(ModelError::DuplicateAtom {
                    atom: atom.name.clone(),
                });
            }
            if !model.has_signature(&atom.sig) {
                return Err(ModelError::UnknownSignature {
                    atom: atom.name.clone(),
                    sig: atom.sig.clone(),
                });
            }
        }

        for fact in &self.predicates {
            let declared =
                model
                    .predicate(&fact.predicate_name)
                    .ok_or_else(|| ModelError::UnknownPredicate {
                        predicate: fact.predicate_name.clone(),
                    })?;
            if declared.arity() != fact.args.len() {
                return Err(ModelError::ArityMismatch {
                    predicate: fact.predicate_name.clone(),
                    expected: declared.arity(),
                    found: fact.args.len(),
                });
            }
            if let Some(missing) = fact.args.iter().find(|a| !seen.contains(a.as_str())) {
                return Err(ModelError::UnknownAtom {
                    predicate: fact.predicate_name.clone(),
                    atom: missing.clone(),
                });
            }
        }
        Ok(())
    }
}
