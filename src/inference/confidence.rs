//! Confidence that an observed diagram satisfies a layout
//!
//! Directional options are logistic curves over the coordinate difference,
//! aligned options are un-normalized Gaussians, and composite options are
//! products of their parts. Many instantiations of one abstract layout are
//! aggregated with the geometric mean.

use thiserror::Error;

use super::diagram::{AbstractDiagram, Position};
use crate::compile::{compile_abstract_layout, CompileError};
use crate::language::{AbstractLayout, AtomRef, BinaryOption, ConcreteLayout, UnaryOption};
use crate::relational::{Instance, Model};

/// Inflection of the left/right curves
const HORIZONTAL_OFFSET: f64 = 50.0;
/// Inflection of the above/below curves
const VERTICAL_OFFSET: f64 = 25.0;
const STEEPNESS: f64 = 0.1;
const ALIGNMENT_VARIANCE: f64 = 1600.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("no confidence function for '{layout}'")]
    Unsupported { layout: String },

    #[error("atom '{atom}' has no position in the diagram")]
    MissingPosition { atom: String },
}

impl ScoreError {
    pub fn missing(atom: impl Into<String>) -> Self {
        Self::MissingPosition { atom: atom.into() }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Logistic with inflection at `offset`, mirrored when `flip` is set
fn modified_sigmoid(x: f64, offset: f64, scale: f64, flip: bool) -> f64 {
    let t = scale * (x - offset);
    sigmoid(if flip { -t } else { t })
}

fn unnormalized_gaussian(x: f64, mean: f64, variance: f64) -> f64 {
    (-(x - mean) * (x - mean) / (2.0 * variance)).exp()
}

/// Confidence that `p0` stands in relation `option` to `p1`
pub fn binary_confidence(option: BinaryOption, p0: Position, p1: Position) -> Option<f64> {
    use BinaryOption::*;

    let dx = p0.x - p1.x;
    let dy = p0.y - p1.y;
    let c = match option {
        LeftOf => modified_sigmoid(dx, -HORIZONTAL_OFFSET, STEEPNESS, true),
        RightOf => modified_sigmoid(dx, HORIZONTAL_OFFSET, STEEPNESS, false),
        Above => modified_sigmoid(dy, VERTICAL_OFFSET, STEEPNESS, false),
        Below => modified_sigmoid(dy, -VERTICAL_OFFSET, STEEPNESS, true),
        HorizontallyAligned => unnormalized_gaussian(dy, 0.0, ALIGNMENT_VARIANCE),
        VerticallyAligned => unnormalized_gaussian(dx, 0.0, ALIGNMENT_VARIANCE),
        DirectlyLeftOf => {
            binary_confidence(LeftOf, p0, p1)? * binary_confidence(HorizontallyAligned, p0, p1)?
        }
        DirectlyRightOf => {
            binary_confidence(RightOf, p0, p1)? * binary_confidence(HorizontallyAligned, p0, p1)?
        }
        DirectlyAbove => {
            binary_confidence(Above, p0, p1)? * binary_confidence(VerticallyAligned, p0, p1)?
        }
        DirectlyBelow => {
            binary_confidence(Below, p0, p1)? * binary_confidence(VerticallyAligned, p0, p1)?
        }
        Contains | InsideRingOf | OutsideRingOf => return None,
    };
    Some(c)
}

/// Unary options compare against the origin
pub fn unary_confidence(option: UnaryOption, p: Position) -> f64 {
    let relation = match option {
        UnaryOption::LeftOfCenter => BinaryOption::LeftOf,
        UnaryOption::RightOfCenter => BinaryOption::RightOf,
        UnaryOption::AboveCenter => BinaryOption::Above,
        UnaryOption::BelowCenter => BinaryOption::Below,
    };
    binary_confidence(relation, p, Position::ORIGIN).unwrap_or(0.0)
}

fn position_of<A: AtomRef>(op: &A, diagram: &AbstractDiagram) -> Result<Position, ScoreError> {
    diagram
        .position(op.name())
        .ok_or_else(|| ScoreError::missing(op.name()))
}

/// Score one layout against the diagram. Separations are not consulted.
pub fn score_concrete<A: AtomRef>(
    layout: &ConcreteLayout<A>,
    diagram: &AbstractDiagram,
) -> Result<f64, ScoreError> {
    let unsupported = || ScoreError::Unsupported {
        layout: layout.to_string(),
    };
    match layout {
        ConcreteLayout::BinaryLayout(l) => {
            let p0 = position_of(&l.op0, diagram)?;
            let p1 = position_of(&l.op1, diagram)?;
            binary_confidence(l.option, p0, p1).ok_or_else(unsupported)
        }
        ConcreteLayout::UnaryLayout(l) => {
            let p = position_of(&l.op, diagram)?;
            Ok(unary_confidence(l.option, p))
        }
        ConcreteLayout::CyclicLayout(_) | ConcreteLayout::GroupingLayout(_) => Err(unsupported()),
    }
}

/// Like [`score_concrete`], with every failure scored as 0
pub fn confidence_of_concrete<A: AtomRef>(layout: &ConcreteLayout<A>, diagram: &AbstractDiagram) -> f64 {
    score_concrete(layout, diagram).unwrap_or(0.0)
}

/// `exp(mean(ln c))`, or 0 for no samples
pub fn geometric_mean(confidences: &[f64]) -> f64 {
    if confidences.is_empty() {
        return 0.0;
    }
    let sum: f64 = confidences.iter().map(|c| c.ln()).sum();
    (sum / confidences.len() as f64).exp()
}

/// Aggregate confidence of every instantiation of `layout` over `instance`
pub fn compute_confidence(
    layout: &AbstractLayout,
    instance: &Instance,
    model: &Model,
    diagram: &AbstractDiagram,
) -> Result<f64, CompileError> {
    let concretes = compile_abstract_layout(layout, 0, model, instance)?;
    let confidences: Vec<f64> = concretes
        .iter()
        .map(|c| confidence_of_concrete(c, diagram))
        .collect();
    Ok(geometric_mean(&confidences))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{AtomHandle, Selector, SelectorVariable, UnboundLayout};

    fn at(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    fn conf(option: BinaryOption, p0: Position, p1: Position) -> f64 {
        binary_confidence(option, p0, p1).unwrap()
    }

    #[test]
    fn test_left_of_inflection_and_limits() {
        assert!((conf(BinaryOption::LeftOf, at(0.0, 0.0), at(50.0, 0.0)) - 0.5).abs() < 1e-12);
        assert!(conf(BinaryOption::LeftOf, at(-1000.0, 0.0), at(0.0, 0.0)) > 0.999);
        assert!(conf(BinaryOption::LeftOf, at(1000.0, 0.0), at(0.0, 0.0)) < 0.001);
    }

    #[test]
    fn test_right_above_below() {
        assert!((conf(BinaryOption::RightOf, at(50.0, 0.0), at(0.0, 0.0)) - 0.5).abs() < 1e-12);
        assert!((conf(BinaryOption::Above, at(0.0, 25.0), at(0.0, 0.0)) - 0.5).abs() < 1e-12);
        assert!((conf(BinaryOption::Below, at(0.0, 0.0), at(0.0, 25.0)) - 0.5).abs() < 1e-12);
        assert!(conf(BinaryOption::Above, at(0.0, 200.0), at(0.0, 0.0)) > 0.99);
        assert!(conf(BinaryOption::Below, at(0.0, 200.0), at(0.0, 0.0)) < 0.01);
    }

    #[test]
    fn test_alignment_gaussian() {
        assert_eq!(conf(BinaryOption::HorizontallyAligned, at(0.0, 7.0), at(300.0, 7.0)), 1.0);
        let off = conf(BinaryOption::VerticallyAligned, at(40.0, 0.0), at(0.0, 99.0));
        assert!((off - (-0.5f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_directly_is_product() {
        let p0 = at(0.0, 10.0);
        let p1 = at(120.0, 0.0);
        let expected =
            conf(BinaryOption::LeftOf, p0, p1) * conf(BinaryOption::HorizontallyAligned, p0, p1);
        assert!((conf(BinaryOption::DirectlyLeftOf, p0, p1) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_unsupported_options() {
        assert_eq!(binary_confidence(BinaryOption::Contains, at(0.0, 0.0), at(1.0, 1.0)), None);

        let diagram = AbstractDiagram::new()
            .with_position("a", 0.0, 0.0)
            .with_position("b", 1.0, 1.0);
        let layout = UnboundLayout::binary(
            BinaryOption::InsideRingOf,
            AtomHandle::new("a"),
            AtomHandle::new("b"),
        );
        assert!(matches!(
            score_concrete(&layout, &diagram),
            Err(ScoreError::Unsupported { .. })
        ));
        assert_eq!(confidence_of_concrete(&layout, &diagram), 0.0);
    }

    #[test]
    fn test_missing_position() {
        let diagram = AbstractDiagram::new().with_position("a", 0.0, 0.0);
        let layout = UnboundLayout::binary(BinaryOption::LeftOf, AtomHandle::new("a"), AtomHandle::new("z"));
        assert_eq!(score_concrete(&layout, &diagram), Err(ScoreError::missing("z")));
        assert_eq!(confidence_of_concrete(&layout, &diagram), 0.0);
    }

    #[test]
    fn test_unary_against_origin() {
        let diagram = AbstractDiagram::new().with_position("a", 0.0, 25.0);
        let layout = UnboundLayout::unary(UnaryOption::AboveCenter, AtomHandle::new("a"));
        assert!((confidence_of_concrete(&layout, &diagram) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_geometric_mean() {
        assert!((geometric_mean(&[0.81, 1.0]) - 0.9).abs() < 1e-12);
        assert_eq!(geometric_mean(&[]), 0.0);
        assert_eq!(geometric_mean(&[0.5, 0.0]), 0.0);
    }

    #[test]
    fn test_compute_confidence_over_instance() {
        let model = Model::new()
            .with_signature("Node")
            .with_predicate("next", &["Node", "Node"]);
        let instance = Instance::new()
            .with_atom("n0", "Node")
            .with_atom("n1", "Node")
            .with_atom("n2", "Node")
            .with_fact("next", &["n0", "n1"])
            .with_fact("next", &["n1", "n2"]);
        let diagram = AbstractDiagram::new()
            .with_position("n0", 0.0, 0.0)
            .with_position("n1", 200.0, 0.0)
            .with_position("n2", 400.0, 0.0);
        let layout = AbstractLayout::new(
            Selector::pred("next", &["a", "b"]),
            ConcreteLayout::binary(
                BinaryOption::LeftOf,
                SelectorVariable::new("a"),
                SelectorVariable::new("b"),
            ),
        );
        let c = compute_confidence(&layout, &instance, &model, &diagram).unwrap();
        assert!(c > 0.99);

        let empty = Instance::new().with_atom("n0", "Node");
        assert_eq!(compute_confidence(&layout, &empty, &model, &diagram).unwrap(), 0.0);
    }
}
