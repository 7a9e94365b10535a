//! Property-based tests using proptest

use std::collections::BTreeSet;

use proptest::prelude::*;

use layout_synth::compile::selectors_to_substitutions;
use layout_synth::inference::{binary_confidence, canonicalize, geometric_mean, to_footprints};
use layout_synth::language::{
    AbstractLayout, AtomHandle, BinaryOption, BoundLayout, CyclicOption, PredSelector, Selector,
    SelectorVariable, Separation, UnaryOption, UnboundLayout,
};
use layout_synth::{parse_program, Instance, Model, Position};

// ============================================================================
// Strategies
// ============================================================================

/// Atoms `a0..` of sig A, `b0..` of sig B, and facts `r(a_i, b_j)`
fn typed_instance() -> impl Strategy<Value = (Instance, BTreeSet<(String, String)>)> {
    (1usize..5, 1usize..5).prop_flat_map(|(na, nb)| {
        prop::collection::vec((0..na, 0..nb), 0..10).prop_map(move |pairs| {
            let mut instance = Instance::new();
            for i in 0..na {
                instance = instance.with_atom(format!("a{}", i), "A");
            }
            for j in 0..nb {
                instance = instance.with_atom(format!("b{}", j), "B");
            }
            let mut facts = BTreeSet::new();
            for (i, j) in pairs {
                let (a, b) = (format!("a{}", i), format!("b{}", j));
                instance = instance.with_fact("r", &[a.as_str(), b.as_str()]);
                facts.insert((a, b));
            }
            (instance, facts)
        })
    })
}

fn binary_option() -> impl Strategy<Value = BinaryOption> {
    prop::sample::select(BinaryOption::ALL.to_vec())
}

fn atom_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["n0", "n1", "n2", "x$1", "y/z"]).prop_map(str::to_string)
}

/// Plain identifiers, keywords, numbers and arbitrary printable text
fn any_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z_][a-zA-Z0-9_$/]{0,6}",
        prop::sample::select(vec![
            "IF", "THEN", "Group", "Cycle", "at", "least", "exactly", "separation", "Above",
            "LeftOfCenter", "Clockwise", "12", "-3", "",
        ])
        .prop_map(str::to_string),
        "\\PC{0,6}",
    ]
}

fn separation() -> impl Strategy<Value = Separation> {
    prop_oneof![
        Just(Separation::NoneSpecified),
        (-1000.0f64..1000.0).prop_map(|distance| Separation::AtLeast { distance }),
        (-1000.0f64..1000.0).prop_map(|distance| Separation::Exact { distance }),
    ]
}

fn selector() -> impl Strategy<Value = Selector> {
    prop_oneof![
        (any_name(), any_name()).prop_map(|(v, sig)| Selector::sig(v, sig)),
        (any_name(), prop::collection::vec(any_name(), 0..3))
            .prop_map(|(pred, args)| Selector::PredSelector(PredSelector { pred, args })),
    ]
}

fn template() -> impl Strategy<Value = BoundLayout> {
    let var = || any_name().prop_map(SelectorVariable::new);
    prop_oneof![
        (prop::sample::select(UnaryOption::ALL.to_vec()), var(), separation())
            .prop_map(|(o, a, sep)| BoundLayout::unary(o, a).with_separation(sep)),
        (binary_option(), var(), var(), separation())
            .prop_map(|(o, a, b, sep)| BoundLayout::binary(o, a, b).with_separation(sep)),
        (
            prop::sample::select(vec![CyclicOption::Clockwise, CyclicOption::Counterclockwise]),
            var(),
            var()
        )
            .prop_map(|(o, a, b)| BoundLayout::cyclic(o, a, b)),
        var().prop_map(BoundLayout::grouping),
    ]
}

fn program() -> impl Strategy<Value = AbstractLayout> {
    (prop::collection::vec(selector(), 1..4), template())
        .prop_filter_map("empty chain", |(chain, t)| AbstractLayout::compose(chain, t))
}

fn model() -> Model {
    Model::new()
        .with_signature("A")
        .with_signature("B")
        .with_predicate("r", &["A", "B"])
}

// ============================================================================
// Substitution soundness
// ============================================================================

proptest! {
    #[test]
    fn test_substitutions_are_typed_and_supported((instance, facts) in typed_instance()) {
        let chain = vec![
            Selector::sig("x", "A"),
            Selector::sig("y", "B"),
            Selector::pred("r", &["x", "y"]),
        ];
        let substs = selectors_to_substitutions(&chain, &model(), &instance).unwrap();

        prop_assert_eq!(substs.len(), facts.len());
        let mut seen = BTreeSet::new();
        for s in &substs {
            prop_assert_eq!(s.len(), 2);
            let x = s.get("x").unwrap().to_string();
            let y = s.get("y").unwrap().to_string();
            prop_assert_eq!(&instance.atom(&x).unwrap().sig, "A");
            prop_assert_eq!(&instance.atom(&y).unwrap().sig, "B");
            prop_assert!(facts.contains(&(x.clone(), y.clone())));
            prop_assert!(seen.insert((x, y)), "duplicate substitution");
        }
    }

    #[test]
    fn test_sig_selectors_form_a_product((instance, _) in typed_instance()) {
        let chain = vec![Selector::sig("x", "A"), Selector::sig("y", "B")];
        let substs = selectors_to_substitutions(&chain, &model(), &instance).unwrap();
        let na = instance.atoms_of("A").count();
        let nb = instance.atoms_of("B").count();
        prop_assert_eq!(substs.len(), na * nb);
    }
}

// ============================================================================
// Text syntax
// ============================================================================

proptest! {
    #[test]
    fn test_display_parses_back(programs in prop::collection::vec(program(), 1..4)) {
        let text = programs
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let parsed = parse_program(&text);
        prop_assert!(parsed.is_ok(), "{}\n{:?}", text, parsed);
        prop_assert_eq!(parsed.unwrap(), programs);
    }
}

// ============================================================================
// Footprints and confidence
// ============================================================================

proptest! {
    #[test]
    fn test_footprints_are_idempotent(option in binary_option(), a in atom_name(), b in atom_name()) {
        let layout = UnboundLayout::binary(option, AtomHandle::new(a), AtomHandle::new(b));
        let once = to_footprints(&layout);
        prop_assert_eq!(canonicalize(&once), once);
    }

    #[test]
    fn test_mirrors_share_footprints(option in binary_option(), a in atom_name(), b in atom_name()) {
        if let Some(mirror) = option.mirror() {
            let l = UnboundLayout::binary(option, AtomHandle::new(a.clone()), AtomHandle::new(b.clone()));
            let m = UnboundLayout::binary(mirror, AtomHandle::new(b), AtomHandle::new(a));
            prop_assert_eq!(to_footprints(&l), to_footprints(&m));
        }
    }

    #[test]
    fn test_left_of_is_monotone(dx in -500.0f64..500.0, step in 0.0f64..200.0) {
        let c = |dx: f64| {
            binary_confidence(BinaryOption::LeftOf, Position::new(dx, 0.0), Position::ORIGIN).unwrap()
        };
        prop_assert!(c(dx) >= c(dx + step));
        prop_assert!((0.0..=1.0).contains(&c(dx)));
    }

    #[test]
    fn test_geometric_mean_is_bounded(values in prop::collection::vec(0.01f64..1.0, 1..8)) {
        let mean = geometric_mean(&values);
        let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(mean >= lo - 1e-12 && mean <= hi + 1e-12);
    }
}
