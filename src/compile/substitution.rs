//! Selector evaluation: from a selector chain to variable bindings

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::trace;

use super::error::CompileError;
use crate::language::Selector;
use crate::relational::{Instance, Model};

/// One consistent assignment of selector variables to atom names
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Substitution(BTreeMap<String, String>);

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, varname: &str) -> Option<&str> {
        self.0.get(varname).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Substitution {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A tuple of variables and the atom tuples it may take
#[derive(Debug, Clone, PartialEq, Eq)]
struct Group {
    varnames: Vec<String>,
    candidates: Vec<Vec<String>>,
}

/// Candidate bindings collected from a selector chain, grouped by variable tuple
#[derive(Debug, Clone, Default)]
pub struct SelectorEnv {
    groups: Vec<Group>,
    index: HashMap<Vec<String>, usize>,
}

impl SelectorEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct variable tuples seen so far
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Register the candidate tuples for `varnames`.
    ///
    /// A repeated key keeps only the tuples both registrations allow.
    pub fn add_group(&mut self, varnames: Vec<String>, candidates: Vec<Vec<String>>) {
        let mut seen = HashSet::new();
        let candidates: Vec<Vec<String>> = candidates
            .into_iter()
            .filter(|c| seen.insert(c.clone()))
            .collect();

        match self.index.get(&varnames) {
            Some(&i) => {
                let allowed: HashSet<&Vec<String>> = candidates.iter().collect();
                self.groups[i].candidates.retain(|c| allowed.contains(c));
            }
            None => {
                self.index.insert(varnames.clone(), self.groups.len());
                self.groups.push(Group {
                    varnames,
                    candidates,
                });
            }
        }
    }

    /// Evaluate one selector against the instance and register its group
    pub fn add_selector(
        &mut self,
        selector: &Selector,
        model: &Model,
        instance: &Instance,
    ) -> Result<(), CompileError> {
        match selector {
            Selector::SigSelector(s) => {
                let candidates = instance
                    .atoms_of(&s.sig)
                    .map(|name| vec![name.to_string()])
                    .collect();
                self.add_group(vec![s.varname.clone()], candidates);
            }
            Selector::PredSelector(p) => {
                if let Some(declared) = model.predicate(&p.pred) {
                    if declared.arity() != p.args.len() {
                        return Err(CompileError::arity(&p.pred, p.args.len(), declared.arity()));
                    }
                }
                let mut candidates = Vec::new();
                for tuple in instance.facts_of(&p.pred) {
                    if tuple.len() != p.args.len() {
                        return Err(CompileError::arity(&p.pred, p.args.len(), tuple.len()));
                    }
                    candidates.push(tuple.to_vec());
                }
                self.add_group(p.args.clone(), candidates);
            }
        }
        Ok(())
    }

    /// Join all groups, dropping combinations that bind a variable twice
    /// to different atoms.
    pub fn to_substitutions(&self) -> Vec<Substitution> {
        let mut out = Vec::new();
        let mut current = BTreeMap::new();
        join(&self.groups, &mut current, &mut out);
        out
    }
}

fn join(groups: &[Group], current: &mut BTreeMap<String, String>, out: &mut Vec<Substitution>) {
    let Some((group, rest)) = groups.split_first() else {
        out.push(Substitution(current.clone()));
        return;
    };

    for tuple in &group.candidates {
        let mut added = Vec::new();
        let mut consistent = true;
        for (var, atom) in group.varnames.iter().zip(tuple) {
            match current.get(var) {
                Some(bound) if bound != atom => {
                    consistent = false;
                    break;
                }
                Some(_) => {}
                None => {
                    current.insert(var.clone(), atom.clone());
                    added.push(var);
                }
            }
        }
        if consistent {
            join(rest, current, out);
        }
        for var in added {
            current.remove(var);
        }
    }
}

/// All substitutions that satisfy every selector of the chain
pub fn selectors_to_substitutions(
    selectors: &[Selector],
    model: &Model,
    instance: &Instance,
) -> Result<Vec<Substitution>, CompileError> {
    let mut env = SelectorEnv::new();
    for selector in selectors {
        env.add_selector(selector, model, instance)?;
    }
    let substs = env.to_substitutions();
    trace!(
        groups = env.group_count(),
        substitutions = substs.len(),
        "evaluated selector chain"
    );
    Ok(substs)
}
