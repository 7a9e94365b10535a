//! Abstract layout compilation
//!
//! Each abstract layout is split into its selector chain and its terminal
//! template. The chain is evaluated against the instance into a set of
//! substitutions, and the template is instantiated once per substitution.

pub mod error;
pub mod substitution;

pub use error::CompileError;
pub use substitution::{selectors_to_substitutions, SelectorEnv, Substitution};

use tracing::debug;

use crate::language::{
    AbstractLayout, AtomHandle, BoundLayout, ConcreteLayout, CyclicLayout, GroupingLayout,
    SelectorVariable, UnaryLayout, UnboundLayout,
};
use crate::relational::{Instance, Model};

// ============================================================================
// Substitution application
// ============================================================================

fn resolve(
    var: &SelectorVariable,
    subst: &Substitution,
    template: &BoundLayout,
) -> Result<AtomHandle, CompileError> {
    subst
        .get(&var.name)
        .map(AtomHandle::new)
        .ok_or_else(|| CompileError::unbound(&var.name, template.to_string()))
}

/// Instantiate `layout` under `subst`.
///
/// Cyclic layouts are tagged `cycle-<id>` and grouping layouts `group-<id>`.
pub fn apply_substitution(
    layout: &BoundLayout,
    subst: &Substitution,
    id: &str,
) -> Result<UnboundLayout, CompileError> {
    let compiled = match layout {
        ConcreteLayout::UnaryLayout(l) => ConcreteLayout::UnaryLayout(UnaryLayout {
            option: l.option,
            separation: l.separation,
            op: resolve(&l.op, subst, layout)?,
        }),
        ConcreteLayout::BinaryLayout(l) => {
            ConcreteLayout::binary(
                l.option,
                resolve(&l.op0, subst, layout)?,
                resolve(&l.op1, subst, layout)?,
            )
            .with_separation(l.separation)
        }
        ConcreteLayout::CyclicLayout(l) => ConcreteLayout::CyclicLayout(CyclicLayout {
            option: l.option,
            op0: resolve(&l.op0, subst, layout)?,
            op1: resolve(&l.op1, subst, layout)?,
            cycle_id: format!("cycle-{}", id),
        }),
        ConcreteLayout::GroupingLayout(l) => ConcreteLayout::GroupingLayout(GroupingLayout {
            op: resolve(&l.op, subst, layout)?,
            group_id: format!("group-{}", id),
        }),
    };
    Ok(compiled)
}

// ============================================================================
// Compilation
// ============================================================================

/// Compile one abstract layout; `index` becomes its cycle/group id
pub fn compile_abstract_layout(
    layout: &AbstractLayout,
    index: usize,
    model: &Model,
    instance: &Instance,
) -> Result<Vec<UnboundLayout>, CompileError> {
    let selectors: Vec<_> = layout.selectors().into_iter().cloned().collect();
    let template = layout.terminal();
    let substs = selectors_to_substitutions(&selectors, model, instance)?;
    let id = index.to_string();

    let compiled = substs
        .iter()
        .map(|s| apply_substitution(template, s, &id))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        rule = index,
        instantiations = compiled.len(),
        "compiled abstract layout"
    );
    Ok(compiled)
}

/// Compile every layout in order, concatenating the results
pub fn compile_abstract_layouts(
    layouts: &[AbstractLayout],
    model: &Model,
    instance: &Instance,
) -> Result<Vec<UnboundLayout>, CompileError> {
    let mut out = Vec::new();
    for (i, layout) in layouts.iter().enumerate() {
        out.extend(compile_abstract_layout(layout, i, model, instance)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{BinaryOption, CyclicOption, Selector, Separation};
    use pretty_assertions::assert_eq;

    fn v(name: &str) -> SelectorVariable {
        SelectorVariable::new(name)
    }

    fn apples() -> (Model, Instance) {
        let model = Model::new().with_signature("Apple");
        let instance = Instance::new()
            .with_atom("a0", "Apple")
            .with_atom("a1", "Apple")
            .with_atom("a2", "Apple");
        (model, instance)
    }

    #[test]
    fn test_apply_keeps_separation() {
        let template = BoundLayout::binary(BinaryOption::Below, v("x"), v("y"))
            .with_separation(Separation::Exact { distance: 30.0 });
        let subst: Substitution = [("x", "p"), ("y", "q")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let compiled = apply_substitution(&template, &subst, "0").unwrap();
        assert_eq!(compiled.to_string(), "p Below q (separation exactly 30)");
    }

    #[test]
    fn test_apply_reports_unbound() {
        let template = BoundLayout::binary(BinaryOption::Below, v("x"), v("z"));
        let subst: Substitution = std::iter::once(("x".to_string(), "p".to_string())).collect();
        let err = apply_substitution(&template, &subst, "0").unwrap_err();
        assert!(matches!(err, CompileError::UnboundVariable { ref varname, .. } if varname == "z"));
    }

    #[test]
    fn test_compile_includes_self_pairs() {
        let (model, instance) = apples();
        let layout = AbstractLayout::compose(
            vec![Selector::sig("v0", "Apple"), Selector::sig("v1", "Apple")],
            BoundLayout::binary(BinaryOption::LeftOf, v("v0"), v("v1")),
        )
        .unwrap();
        let compiled = compile_abstract_layouts(&[layout], &model, &instance).unwrap();
        assert_eq!(compiled.len(), 9);
        assert!(compiled
            .iter()
            .any(|l| l.to_string() == "a1 LeftOf a1"));
    }

    #[test]
    fn test_compile_tags_cycles_per_rule() {
        let model = Model::new()
            .with_signature("Node")
            .with_predicate("succ", &["Node", "Node"]);
        let instance = Instance::new()
            .with_atom("n0", "Node")
            .with_atom("n1", "Node")
            .with_fact("succ", &["n0", "n1"])
            .with_fact("succ", &["n1", "n0"]);
        let rule = AbstractLayout::new(
            Selector::pred("succ", &["a", "b"]),
            BoundLayout::cyclic(CyclicOption::Clockwise, v("a"), v("b")),
        );
        let compiled =
            compile_abstract_layouts(&[rule.clone(), rule], &model, &instance).unwrap();
        let ids: Vec<_> = compiled
            .iter()
            .map(|l| match l {
                ConcreteLayout::CyclicLayout(c) => c.cycle_id.clone(),
                other => panic!("Expected cyclic layout, got {}", other),
            })
            .collect();
        assert_eq!(ids, vec!["cycle-0", "cycle-0", "cycle-1", "cycle-1"]);
    }

    #[test]
    fn test_compile_nothing_matches() {
        let (model, instance) = apples();
        let model = model.with_signature("Pear");
        let layout = AbstractLayout::new(
            Selector::sig("p", "Pear"),
            BoundLayout::grouping(v("p")),
        );
        assert!(compile_abstract_layouts(&[layout], &model, &instance)
            .unwrap()
            .is_empty());
    }
}
