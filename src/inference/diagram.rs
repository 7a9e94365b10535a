//! Observed atom placements

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::confidence::ScoreError;
use crate::relational::Instance;

/// A point in diagram space; y grows upward
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Named numeric inputs exposed by a converged renderer (`x_<atom>`, `y_<atom>`)
pub trait DiagramInputs {
    fn get_input(&self, name: &str) -> Option<f64>;
}

impl DiagramInputs for HashMap<String, f64> {
    fn get_input(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl DiagramInputs for BTreeMap<String, f64> {
    fn get_input(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

/// Input name of an atom's x coordinate
pub fn x_input(atom: &str) -> String {
    format!("x_{}", atom)
}

/// Input name of an atom's y coordinate
pub fn y_input(atom: &str) -> String {
    format!("y_{}", atom)
}

/// Atom name to position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbstractDiagram {
    positions: BTreeMap<String, Position>,
}

impl AbstractDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, atom: impl Into<String>, x: f64, y: f64) -> Self {
        self.insert(atom, Position::new(x, y));
        self
    }

    pub fn insert(&mut self, atom: impl Into<String>, pos: Position) {
        self.positions.insert(atom.into(), pos);
    }

    pub fn position(&self, atom: &str) -> Option<Position> {
        self.positions.get(atom).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Position)> {
        self.positions.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Read every atom of `instance` out of renderer inputs
    pub fn from_inputs(instance: &Instance, inputs: &impl DiagramInputs) -> Result<Self, ScoreError> {
        let mut diagram = AbstractDiagram::new();
        for atom in &instance.atoms {
            let x = inputs.get_input(&x_input(&atom.name));
            let y = inputs.get_input(&y_input(&atom.name));
            match (x, y) {
                (Some(x), Some(y)) => diagram.insert(atom.name.clone(), Position::new(x, y)),
                _ => return Err(ScoreError::missing(&atom.name)),
            }
        }
        Ok(diagram)
    }
}
