//! Layout Synth - relational-instance layout compiler and inference engine
//!
//! Abstract layouts are quantified rules (`IF v0 : Apple THEN v0 LeftOf v1`)
//! over a relational [`Model`]. This library compiles them against an
//! [`Instance`] into concrete per-atom layouts, scores how well an observed
//! diagram satisfies them, infers the rules that explain a diagram, and
//! stages compiled layouts into coordinates.
//!
//! # Example
//!
//! ```rust
//! use layout_synth::{compile, parse_program, Instance, Model};
//!
//! let model = Model::new().with_signature("Apple");
//! let instance = Instance::new()
//!     .with_atom("a0", "Apple")
//!     .with_atom("a1", "Apple");
//! let program = parse_program("IF v0 : Apple THEN IF v1 : Apple THEN v0 LeftOf v1").unwrap();
//!
//! let layouts = compile(&program, &model, &instance).unwrap();
//! assert_eq!(layouts.len(), 4);
//! ```

pub mod compile;
pub mod config;
pub mod error;
pub mod inference;
pub mod language;
pub mod load;
pub mod parser;
pub mod relational;
pub mod staging;

pub use compile::{compile_abstract_layouts, CompileError};
pub use config::SynthConfig;
pub use error::{LoadError, ParseError};
pub use inference::{
    compute_confidence, AbstractDiagram, DiagramInputs, InferenceConfig, InferredAbstractLayout,
    Position, ScoreError,
};
pub use language::{
    check_abstract_layout, AbstractLayout, BoundLayout, CheckError, ConcreteLayout, UnboundLayout,
};
pub use parser::parse_program;
pub use relational::{Instance, Model, ModelError};
pub use staging::{StageConfig, StageError, Stager};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// Errors that can occur anywhere in the pipeline
#[derive(Debug, Error)]
pub enum SynthError {
    #[error("invalid instance: {0}")]
    Model(#[from] ModelError),

    #[error("type error: {0}")]
    Check(#[from] CheckError),

    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("scoring error: {0}")]
    Score(#[from] ScoreError),

    #[error("staging error: {0}")]
    Stage(#[from] StageError),

    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    #[error(transparent)]
    Load(#[from] LoadError),
}

impl From<Vec<ParseError>> for SynthError {
    fn from(errors: Vec<ParseError>) -> Self {
        SynthError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate `instance` and compile every layout of `program` against it
pub fn compile(
    program: &[AbstractLayout],
    model: &Model,
    instance: &Instance,
) -> Result<Vec<UnboundLayout>, SynthError> {
    instance.validate(model)?;
    Ok(compile_abstract_layouts(program, model, instance)?)
}

/// Infer the abstract layouts that explain `diagram`
pub fn infer(
    model: &Model,
    instance: &Instance,
    diagram: &AbstractDiagram,
    config: &InferenceConfig,
) -> Result<Vec<InferredAbstractLayout>, SynthError> {
    instance.validate(model)?;
    Ok(inference::infer(model, instance, diagram, config)?)
}

/// Compile `program`, stage the result and solve for a diagram of `instance`
pub fn arrange(
    program: &[AbstractLayout],
    model: &Model,
    instance: &Instance,
    config: &StageConfig,
) -> Result<AbstractDiagram, SynthError> {
    let layouts = compile(program, model, instance)?;

    let mut stager = Stager::new(config.clone());
    stager.stage_all(&layouts)?;
    let solution = stager.arrange(instance)?;

    Ok(AbstractDiagram::from_inputs(instance, &solution)?)
}

/// Rules inferred from an example and the diagram they produce for a target
#[derive(Debug, Clone, Serialize)]
pub struct Synthesis {
    pub inferred: Vec<InferredAbstractLayout>,
    pub diagram: AbstractDiagram,
}

/// Infer rules from `example` drawn as `diagram`, then arrange `target` with them
pub fn synthesize(
    model: &Model,
    example: &Instance,
    diagram: &AbstractDiagram,
    target: &Instance,
    config: &SynthConfig,
) -> Result<Synthesis, SynthError> {
    let inferred = infer(model, example, diagram, &config.inference)?;
    let program: Vec<AbstractLayout> = inferred.iter().map(|i| i.inferred.clone()).collect();
    info!(rules = program.len(), "inferred program");

    let diagram = arrange(&program, model, target, &config.staging)?;
    Ok(Synthesis { inferred, diagram })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apples(n: usize) -> (Model, Instance) {
        let model = Model::new().with_signature("Apple");
        let instance = (0..n).fold(Instance::new(), |inst, i| {
            inst.with_atom(format!("a{}", i), "Apple")
        });
        (model, instance)
    }

    #[test]
    fn test_compile_rejects_invalid_instance() {
        let model = Model::new().with_signature("Apple");
        let instance = Instance::new().with_atom("p", "Pear");
        let program = parse_program("IF v0 : Apple THEN v0 LeftOfCenter").unwrap();
        let result = compile(&program, &model, &instance);
        assert!(matches!(result, Err(SynthError::Model(_))));
    }

    #[test]
    fn test_arrange_places_every_atom() {
        let (model, instance) = apples(3);
        let program = parse_program("IF v0 : Apple THEN v0 AboveCenter").unwrap();
        let diagram = arrange(&program, &model, &instance, &StageConfig::default()).unwrap();
        assert_eq!(diagram.len(), 3);
        for (_, p) in diagram.iter() {
            assert!(p.y >= 100.0 - 1e-6);
        }
    }

    #[test]
    fn test_arrange_rejects_grouping() {
        let (model, instance) = apples(1);
        let program = parse_program("IF v0 : Apple THEN Group v0").unwrap();
        let result = arrange(&program, &model, &instance, &StageConfig::default());
        assert!(matches!(
            result,
            Err(SynthError::Stage(StageError::Unsupported { .. }))
        ));
    }

    #[test]
    fn test_synthesize_transfers_rule() {
        let model = Model::new()
            .with_signature("Apple")
            .with_predicate("next", &["Apple", "Apple"]);
        let example = Instance::new()
            .with_atom("a0", "Apple")
            .with_atom("a1", "Apple")
            .with_fact("next", &["a0", "a1"]);
        let drawn = AbstractDiagram::new()
            .with_position("a0", 0.0, 0.0)
            .with_position("a1", 200.0, 0.0);

        let target = Instance::new()
            .with_atom("b0", "Apple")
            .with_atom("b1", "Apple")
            .with_atom("b2", "Apple")
            .with_fact("next", &["b0", "b1"])
            .with_fact("next", &["b1", "b2"]);

        let config = SynthConfig::new().with_inference(InferenceConfig::new().with_bound(3));
        let result = synthesize(&model, &example, &drawn, &target, &config).unwrap();
        assert!(result
            .inferred
            .iter()
            .any(|i| i.inferred.to_string().contains("LeftOf")));

        let b0 = result.diagram.position("b0").unwrap();
        let b1 = result.diagram.position("b1").unwrap();
        let b2 = result.diagram.position("b2").unwrap();
        assert!(b1.x - b0.x >= 100.0 - 1e-6);
        assert!(b2.x - b1.x >= 100.0 - 1e-6);
    }
}
