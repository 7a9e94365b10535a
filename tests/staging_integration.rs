//! Integration tests for staging compiled layouts into positions

use std::path::Path;

use layout_synth::load::program_from_str;
use layout_synth::staging::{CycleGraph, CycleShape};
use layout_synth::{
    arrange, compile, parse_program, Instance, Model, StageConfig, StageError, SynthConfig,
    SynthError,
};

const EPS: f64 = 1e-6;

fn ring() -> (Model, Instance) {
    let model: Model = serde_json::from_str(include_str!("fixtures/ring_model.json")).unwrap();
    let instance: Instance =
        serde_json::from_str(include_str!("fixtures/ring_instance.json")).unwrap();
    (model, instance)
}

fn apples() -> (Model, Instance) {
    let model: Model = serde_json::from_str(include_str!("fixtures/apples_model.json")).unwrap();
    let instance: Instance =
        serde_json::from_str(include_str!("fixtures/apples_instance.json")).unwrap();
    (model, instance)
}

#[test]
fn test_ring_fixture_is_a_ring() {
    let (model, instance) = ring();
    let program = program_from_str(
        include_str!("fixtures/ring_program.lay"),
        Path::new("ring_program.lay"),
    )
    .unwrap();
    let layouts = compile(&program, &model, &instance).unwrap();
    assert_eq!(layouts.len(), 3);

    let mut graph = CycleGraph::new();
    for layout in &layouts {
        if let layout_synth::ConcreteLayout::CyclicLayout(c) = layout {
            graph.add_layout(c);
        }
    }
    assert_eq!(graph.classify(), CycleShape::Ring);
    assert_eq!(graph.order().unwrap(), vec!["Node$1", "Node$2", "Node$0"]);
}

#[test]
fn test_ring_fixture_on_circle() {
    let (model, instance) = ring();
    let program = parse_program(include_str!("fixtures/ring_program.lay")).unwrap();
    let config = StageConfig::new().with_cycle_radius(80.0);
    let diagram = arrange(&program, &model, &instance, &config).unwrap();

    assert_eq!(diagram.len(), 3);
    for (atom, p) in diagram.iter() {
        assert!((p.x.hypot(p.y) - 80.0).abs() < EPS, "{} at {:?}", atom, p);
    }
    let first = diagram.position("Node$1").unwrap();
    assert!(first.x.abs() < EPS && (first.y - 80.0).abs() < EPS);
}

#[test]
fn test_open_chain_is_a_line() {
    let (model, _) = ring();
    let instance = Instance::new()
        .with_atom("Node$0", "this/Node")
        .with_atom("Node$1", "this/Node")
        .with_atom("Node$2", "this/Node")
        .with_fact("succ", &["Node$0", "Node$1"])
        .with_fact("succ", &["Node$1", "Node$2"]);
    let program = parse_program(include_str!("fixtures/ring_program.lay")).unwrap();
    let diagram = arrange(&program, &model, &instance, &StageConfig::default()).unwrap();
    let p0 = diagram.position("Node$0").unwrap();
    assert!(p0.x.abs() < EPS && (p0.y - 150.0).abs() < EPS);
}

#[test]
fn test_branching_cycle_is_rejected() {
    let (model, _) = ring();
    let instance = Instance::new()
        .with_atom("Node$0", "this/Node")
        .with_atom("Node$1", "this/Node")
        .with_atom("Node$2", "this/Node")
        .with_fact("succ", &["Node$0", "Node$1"])
        .with_fact("succ", &["Node$0", "Node$2"]);
    let program = parse_program(include_str!("fixtures/ring_program.lay")).unwrap();
    let err = arrange(&program, &model, &instance, &StageConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        SynthError::Stage(StageError::MalformedCycle { ref cycle_id }) if cycle_id == "cycle-0"
    ));
}

#[test]
fn test_chain_of_left_of() {
    let (model, instance) = apples();
    let program = parse_program(
        r#"
        IF redder(x, y) THEN x DirectlyLeftOf y (separation at least 60)
        IF a : Apple THEN a BelowCenter
        "#,
    )
    .unwrap();
    let diagram = arrange(&program, &model, &instance, &StageConfig::default()).unwrap();

    let a0 = diagram.position("a0").unwrap();
    let a1 = diagram.position("a1").unwrap();
    let a2 = diagram.position("a2").unwrap();
    assert!(a1.x - a0.x >= 60.0 - EPS);
    assert!(a2.x - a1.x >= 60.0 - EPS);
    assert!((a0.y - a1.y).abs() < EPS && (a1.y - a2.y).abs() < EPS);
    assert!(a0.y <= -100.0 + EPS);
}

#[test]
fn test_self_pairs_make_left_of_unsatisfiable() {
    let (model, instance) = apples();
    let program: Vec<_> =
        serde_json::from_str(include_str!("fixtures/apples_program.json")).unwrap();
    let err = arrange(&program, &model, &instance, &StageConfig::default()).unwrap_err();
    assert!(matches!(err, SynthError::Stage(StageError::Solver(_))));
}

#[test]
fn test_contains_is_unsupported() {
    let (model, instance) = apples();
    let program = parse_program("IF redder(x, y) THEN x Contains y").unwrap();
    let err = arrange(&program, &model, &instance, &StageConfig::default()).unwrap_err();
    assert!(matches!(err, SynthError::Stage(StageError::Unsupported { .. })));
}

#[test]
fn test_config_file_drives_staging() {
    let config = SynthConfig::from_str("[staging]\ndefault_separation = 35.0\n").unwrap();
    let (model, instance) = apples();
    let program = parse_program("IF redder(x, y) THEN y Above x").unwrap();
    let diagram = arrange(&program, &model, &instance, &config.staging).unwrap();
    let a0 = diagram.position("a0").unwrap();
    let a1 = diagram.position("a1").unwrap();
    assert!(a1.y - a0.y >= 35.0 - EPS);
}
