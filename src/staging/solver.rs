//! Constraint solver integration for staging
//!
//! This module wraps the kasuari Cassowary solver, translating staged
//! layout constraints over atom coordinates into the solver's format and
//! reading back a solution.

use std::collections::{HashMap, HashSet};

use kasuari::{
    Solver as KasuariSolver, Strength, Variable as KasuariVariable, WeightedRelation::*,
};
use thiserror::Error;

use crate::inference::DiagramInputs;

// ============================================================================
// Variables
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// One coordinate of one atom
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StageVariable {
    pub atom: String,
    pub axis: Axis,
}

impl StageVariable {
    pub fn new(atom: impl Into<String>, axis: Axis) -> Self {
        Self {
            atom: atom.into(),
            axis,
        }
    }

    pub fn x(atom: impl Into<String>) -> Self {
        Self::new(atom, Axis::X)
    }

    pub fn y(atom: impl Into<String>) -> Self {
        Self::new(atom, Axis::Y)
    }

    /// Renderer input name, `x_<atom>` or `y_<atom>`
    pub fn input_name(&self) -> String {
        match self.axis {
            Axis::X => format!("x_{}", self.atom),
            Axis::Y => format!("y_{}", self.atom),
        }
    }

    fn from_input_name(name: &str) -> Option<Self> {
        if let Some(atom) = name.strip_prefix("x_") {
            Some(Self::x(atom))
        } else {
            name.strip_prefix("y_").map(Self::y)
        }
    }
}

// ============================================================================
// Constraints
// ============================================================================

/// The layout a constraint was derived from (for error messages)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintSource {
    pub description: String,
}

impl ConstraintSource {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Ge,
    Le,
}

impl Relation {
    fn symbol(self) -> &'static str {
        match self {
            Relation::Eq => "=",
            Relation::Ge => ">=",
            Relation::Le => "<=",
        }
    }
}

/// A required linear constraint
#[derive(Debug, Clone)]
pub enum StageConstraint {
    /// variable REL value
    Fixed {
        variable: StageVariable,
        relation: Relation,
        value: f64,
        source: ConstraintSource,
    },

    /// left REL right + offset
    Offset {
        left: StageVariable,
        right: StageVariable,
        relation: Relation,
        offset: f64,
        source: ConstraintSource,
    },
}

impl StageConstraint {
    pub fn source(&self) -> &ConstraintSource {
        match self {
            StageConstraint::Fixed { source, .. } => source,
            StageConstraint::Offset { source, .. } => source,
        }
    }
}

/// Errors from the constraint solver
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Unsatisfiable constraints: {reason}")]
    Unsatisfiable {
        conflicting: Vec<ConstraintSource>,
        reason: String,
    },

    #[error("Internal solver error: {0}")]
    Internal(String),
}

// ============================================================================
// Solver
// ============================================================================

/// Wrapper around kasuari solver
pub struct ConstraintSolver {
    solver: KasuariSolver,
    /// Maps our variables to kasuari variables
    variables: HashMap<StageVariable, KasuariVariable>,
    /// Variables already registered for editing
    edits: HashSet<StageVariable>,
    /// Tracks constraint sources for error reporting
    sources: Vec<ConstraintSource>,
}

impl ConstraintSolver {
    pub fn new() -> Self {
        Self {
            solver: KasuariSolver::new(),
            variables: HashMap::new(),
            edits: HashSet::new(),
            sources: Vec::new(),
        }
    }

    /// Get or create the kasuari variable for `var`
    pub fn variable(&mut self, var: &StageVariable) -> KasuariVariable {
        if let Some(&kvar) = self.variables.get(var) {
            kvar
        } else {
            let kvar = KasuariVariable::new();
            self.variables.insert(var.clone(), kvar);
            kvar
        }
    }

    fn convert_kasuari_error(
        &self,
        e: kasuari::AddConstraintError,
        source: &ConstraintSource,
        constraint_desc: &str,
    ) -> SolverError {
        match e {
            kasuari::AddConstraintError::UnsatisfiableConstraint => {
                let mut conflicting = vec![source.clone()];
                conflicting.extend(self.sources.iter().cloned());
                SolverError::Unsatisfiable {
                    conflicting,
                    reason: format!(
                        "Cannot satisfy {} (from '{}'): conflicts with existing constraints",
                        constraint_desc, source.description
                    ),
                }
            }
            kasuari::AddConstraintError::DuplicateConstraint => {
                SolverError::Internal(format!("Duplicate constraint: {}", constraint_desc))
            }
            kasuari::AddConstraintError::InternalSolverError(msg) => {
                SolverError::Internal(format!("Internal solver error for {}: {}", constraint_desc, msg))
            }
        }
    }

    /// Add a required constraint
    pub fn add_constraint(&mut self, constraint: StageConstraint) -> Result<(), SolverError> {
        match &constraint {
            StageConstraint::Fixed {
                variable,
                relation,
                value,
                source,
            } => {
                let expr: kasuari::Expression = self.variable(variable).into();
                let desc = format!("{} {} {}", variable.input_name(), relation.symbol(), value);
                let built = match relation {
                    Relation::Eq => expr | EQ(Strength::REQUIRED) | *value,
                    Relation::Ge => expr | GE(Strength::REQUIRED) | *value,
                    Relation::Le => expr | LE(Strength::REQUIRED) | *value,
                };
                self.solver
                    .add_constraint(built)
                    .map_err(|e| self.convert_kasuari_error(e, source, &desc))?;
                self.sources.push(source.clone());
            }

            StageConstraint::Offset {
                left,
                right,
                relation,
                offset,
                source,
            } => {
                let left_expr: kasuari::Expression = self.variable(left).into();
                let right_expr: kasuari::Expression = self.variable(right).into();
                let desc = format!(
                    "{} {} {} + {}",
                    left.input_name(),
                    relation.symbol(),
                    right.input_name(),
                    offset
                );
                let built = match relation {
                    Relation::Eq => left_expr | EQ(Strength::REQUIRED) | right_expr + *offset,
                    Relation::Ge => left_expr | GE(Strength::REQUIRED) | right_expr + *offset,
                    Relation::Le => left_expr | LE(Strength::REQUIRED) | right_expr + *offset,
                };
                self.solver
                    .add_constraint(built)
                    .map_err(|e| self.convert_kasuari_error(e, source, &desc))?;
                self.sources.push(source.clone());
            }
        }
        Ok(())
    }

    /// Pull `var` towards `value` with the given strength.
    ///
    /// A variable is registered for editing once; later calls only update
    /// the suggestion.
    pub fn suggest_value(
        &mut self,
        var: &StageVariable,
        value: f64,
        strength: Strength,
    ) -> Result<(), SolverError> {
        let kvar = self.variable(var);
        if self.edits.insert(var.clone()) {
            self.solver
                .add_edit_variable(kvar, strength)
                .map_err(|e| SolverError::Internal(format!("Failed to add edit variable: {}", e)))?;
        }
        self.solver
            .suggest_value(kvar, value)
            .map_err(|e| SolverError::Internal(format!("Failed to suggest value: {}", e)))?;
        Ok(())
    }

    /// Solve the constraint system.
    ///
    /// Every registered variable appears in the solution; ones the solver
    /// never moved keep the value 0.
    pub fn solve(&mut self) -> Result<Solution, SolverError> {
        let changes = self.solver.fetch_changes();

        let mut values: HashMap<StageVariable, f64> =
            self.variables.keys().map(|v| (v.clone(), 0.0)).collect();
        for (kvar, value) in changes {
            for (our_var, &k) in &self.variables {
                if k == *kvar {
                    values.insert(our_var.clone(), *value);
                    break;
                }
            }
        }

        Ok(Solution { values })
    }
}

impl Default for ConstraintSolver {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Solution
// ============================================================================

/// Solved coordinates
#[derive(Debug, Clone, Default)]
pub struct Solution {
    pub values: HashMap<StageVariable, f64>,
}

impl Solution {
    pub fn get(&self, var: &StageVariable) -> Option<f64> {
        self.values.get(var).copied()
    }
}

impl DiagramInputs for Solution {
    fn get_input(&self, name: &str) -> Option<f64> {
        StageVariable::from_input_name(name).and_then(|var| self.get(&var))
    }
}
