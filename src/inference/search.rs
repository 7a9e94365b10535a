//! Bounded search for abstract layouts that explain a diagram
//!
//! Selector chains are enumerated on an explicit worklist. A chain starts
//! with a signature selector, may alternate while it stays on signature
//! selectors, and only adds predicate selectors once it has taken one.
//! Every finished chain is paired with each unary and binary template over
//! its typed variables; templates whose compound confidence clears the
//! threshold survive. Survivors with identical footprints collapse onto the
//! simplest program.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::confidence::{geometric_mean, score_concrete, ScoreError};
use super::config::InferenceConfig;
use super::diagram::AbstractDiagram;
use super::footprint::{canonicalize, Footprint, FootprintKey};
use crate::compile::{apply_substitution, selectors_to_substitutions, CompileError, Substitution};
use crate::language::{
    AbstractLayout, BinaryOption, BoundLayout, PredSelector, SelectorVariable, SigSelector,
    Selector, TypeEnv, UnaryOption,
};
use crate::relational::{Instance, Model};

/// A generalized program together with the evidence for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredAbstractLayout {
    pub inferred: AbstractLayout,
    pub confidence: f64,
    pub footprints: Vec<Footprint>,
}

impl InferredAbstractLayout {
    pub fn key(&self) -> FootprintKey {
        FootprintKey::new(&self.footprints)
    }

    pub fn complexity(&self) -> usize {
        self.inferred.complexity()
    }
}

impl fmt::Display for InferredAbstractLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}; confidence = {}", self.inferred, self.confidence)
    }
}

// ============================================================================
// Search state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectorKind {
    Sig,
    Pred,
}

impl SelectorKind {
    fn successors(self) -> &'static [SelectorKind] {
        match self {
            SelectorKind::Sig => &[SelectorKind::Pred, SelectorKind::Sig],
            SelectorKind::Pred => &[SelectorKind::Pred],
        }
    }
}

#[derive(Debug, Clone)]
struct SearchState {
    sigs: Vec<SigSelector>,
    preds: Vec<PredSelector>,
    env: TypeEnv,
    remaining: usize,
    next: SelectorKind,
}

impl SearchState {
    fn root(len: usize) -> Self {
        Self {
            sigs: Vec::new(),
            preds: Vec::new(),
            env: TypeEnv::new(),
            remaining: len,
            next: SelectorKind::Sig,
        }
    }

    /// Signature selectors first, then predicate selectors
    fn chain(&self) -> Vec<Selector> {
        self.sigs
            .iter()
            .cloned()
            .map(Selector::SigSelector)
            .chain(self.preds.iter().cloned().map(Selector::PredSelector))
            .collect()
    }

    fn extend(&self, selector: &Selector, next: SelectorKind) -> Self {
        let mut child = self.clone();
        match selector {
            Selector::SigSelector(s) => {
                child.env.insert(s.varname.clone(), s.sig.clone());
                child.sigs.push(s.clone());
            }
            Selector::PredSelector(p) => child.preds.push(p.clone()),
        }
        child.remaining -= 1;
        child.next = next;
        child
    }
}

// ============================================================================
// Selector generation
// ============================================================================

fn varnames(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("v{}", i)).collect()
}

/// One selector per signature and untyped variable of the pool
fn gen_sig_selectors(model: &Model, env: &TypeEnv, pool: &[String]) -> Vec<SigSelector> {
    let mut out = Vec::new();
    for sig in &model.signatures {
        for varname in pool.iter().filter(|v| !env.contains_key(*v)) {
            out.push(SigSelector {
                varname: varname.clone(),
                sig: sig.clone(),
            });
        }
    }
    out
}

fn cartesian(lists: &[Vec<String>]) -> Vec<Vec<String>> {
    lists.iter().fold(vec![Vec::new()], |acc, list| {
        acc.iter()
            .flat_map(|prefix| {
                list.iter().map(move |item| {
                    let mut next = prefix.clone();
                    next.push(item.clone());
                    next
                })
            })
            .collect()
    })
}

/// Every predicate applied to every well-typed tuple of typed variables
fn gen_pred_selectors(model: &Model, env: &TypeEnv, existing: &[PredSelector]) -> Vec<PredSelector> {
    let mut by_sig: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (varname, sig) in env {
        by_sig.entry(sig.as_str()).or_default().push(varname.clone());
    }

    let mut out = Vec::new();
    for pred in &model.predicates {
        let lists: Vec<Vec<String>> = pred
            .sigs
            .iter()
            .map(|s| by_sig.get(s.as_str()).cloned().unwrap_or_default())
            .collect();
        for args in cartesian(&lists) {
            let selector = PredSelector {
                pred: pred.name.clone(),
                args,
            };
            if !existing.contains(&selector) {
                out.push(selector);
            }
        }
    }
    out
}

// ============================================================================
// Template evaluation
// ============================================================================

struct Search<'a> {
    model: &'a Model,
    instance: &'a Instance,
    diagram: &'a AbstractDiagram,
    threshold: f64,
}

/// A template that cleared the threshold
struct Accepted {
    template: BoundLayout,
    confidence: f64,
    footprints: Vec<Footprint>,
}

impl<'a> Search<'a> {
    /// Score `template` under every substitution.
    ///
    /// Templates without a confidence function are skipped outright.
    fn evaluate(
        &self,
        template: BoundLayout,
        substs: &[Substitution],
    ) -> Result<Option<Accepted>, CompileError> {
        let mut compiled = Vec::with_capacity(substs.len());
        let mut confidences = Vec::with_capacity(substs.len());
        for subst in substs {
            let layout = apply_substitution(&template, subst, "0")?;
            match score_concrete(&layout, self.diagram) {
                Ok(c) => confidences.push(c),
                Err(ScoreError::MissingPosition { .. }) => confidences.push(0.0),
                Err(ScoreError::Unsupported { .. }) => return Ok(None),
            }
            compiled.push(layout);
        }

        let confidence = geometric_mean(&confidences);
        if confidence > self.threshold {
            Ok(Some(Accepted {
                template,
                confidence,
                footprints: canonicalize(&compiled),
            }))
        } else {
            Ok(None)
        }
    }

    fn templates(env: &TypeEnv) -> Vec<BoundLayout> {
        let vars: Vec<&String> = env.keys().collect();
        let mut out = Vec::new();

        for option in UnaryOption::ALL {
            for v in &vars {
                out.push(BoundLayout::unary(option, SelectorVariable::new(v.as_str())));
            }
        }

        // `Above(v1, v0)` says the same as `Below(v0, v1)`; only the first is kept
        let mut considered: HashSet<(&str, BinaryOption, &str)> = HashSet::new();
        for option in BinaryOption::ALL {
            for v0 in &vars {
                for v1 in vars.iter().filter(|v1| *v1 != v0) {
                    let mirrored = option
                        .mirror()
                        .is_some_and(|m| considered.contains(&(v1.as_str(), m, v0.as_str())));
                    if !mirrored {
                        out.push(BoundLayout::binary(
                            option,
                            SelectorVariable::new(v0.as_str()),
                            SelectorVariable::new(v1.as_str()),
                        ));
                    }
                    considered.insert((v0.as_str(), option, v1.as_str()));
                }
            }
        }
        out
    }

    fn terminal(&self, state: &SearchState) -> Result<Vec<InferredAbstractLayout>, CompileError> {
        if state.env.is_empty() {
            return Ok(Vec::new());
        }
        let chain = state.chain();
        let substs = selectors_to_substitutions(&chain, self.model, self.instance)?;
        if substs.is_empty() {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        for template in Self::templates(&state.env) {
            let Some(accepted) = self.evaluate(template, &substs)? else {
                continue;
            };
            if let Some(inferred) = AbstractLayout::compose(chain.clone(), accepted.template) {
                out.push(InferredAbstractLayout {
                    inferred,
                    confidence: accepted.confidence,
                    footprints: accepted.footprints,
                });
            }
        }
        Ok(out)
    }

    /// Explore every chain of exactly `len` selectors
    fn run(
        &self,
        len: usize,
        results: &mut BTreeMap<FootprintKey, InferredAbstractLayout>,
    ) -> Result<(), CompileError> {
        let pool = varnames(len);
        let mut worklist = vec![SearchState::root(len)];

        while let Some(state) = worklist.pop() {
            if state.remaining == 0 {
                for candidate in self.terminal(&state)? {
                    record(results, candidate);
                }
                continue;
            }

            let selectors: Vec<Selector> = match state.next {
                SelectorKind::Sig => gen_sig_selectors(self.model, &state.env, &pool)
                    .into_iter()
                    .map(Selector::SigSelector)
                    .collect(),
                SelectorKind::Pred => gen_pred_selectors(self.model, &state.env, &state.preds)
                    .into_iter()
                    .map(Selector::PredSelector)
                    .collect(),
            };

            // The kind that follows the last selector does not matter
            let successors: &[SelectorKind] = if state.remaining == 1 {
                &[SelectorKind::Pred]
            } else {
                state.next.successors()
            };

            let mut children = Vec::new();
            for selector in &selectors {
                for next in successors {
                    children.push(state.extend(selector, *next));
                }
            }
            worklist.extend(children.into_iter().rev());
        }
        Ok(())
    }
}

/// Keep `candidate` unless a simpler program already has its footprint
fn record(results: &mut BTreeMap<FootprintKey, InferredAbstractLayout>, candidate: InferredAbstractLayout) {
    match results.entry(candidate.key()) {
        Entry::Vacant(slot) => {
            trace!(footprint = %slot.key(), layout = %candidate.inferred, "new footprint");
            slot.insert(candidate);
        }
        Entry::Occupied(mut slot) => {
            if candidate.complexity() < slot.get().complexity() {
                trace!(footprint = %slot.key(), layout = %candidate.inferred, "simpler layout replaces existing");
                slot.insert(candidate);
            }
        }
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Infer abstract layouts explaining `diagram`, one per distinct footprint set.
///
/// Results are ordered by footprint key.
pub fn infer(
    model: &Model,
    instance: &Instance,
    diagram: &AbstractDiagram,
    config: &InferenceConfig,
) -> Result<Vec<InferredAbstractLayout>, CompileError> {
    let search = Search {
        model,
        instance,
        diagram,
        threshold: config.threshold,
    };

    let mut results = BTreeMap::new();
    for len in 1..=config.bound {
        search.run(len, &mut results)?;
        debug!(chain_length = len, distinct = results.len(), "finished search pass");
    }
    Ok(results.into_values().collect())
}

/// [`infer`] with the default threshold and the given chain bound
pub fn gen_abstract_layouts(
    bound: usize,
    model: &Model,
    instance: &Instance,
    diagram: &AbstractDiagram,
) -> Result<Vec<InferredAbstractLayout>, CompileError> {
    infer(model, instance, diagram, &InferenceConfig::new().with_bound(bound))
}
