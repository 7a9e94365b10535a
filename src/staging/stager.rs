//! Turning compiled layouts into atom coordinates
//!
//! The stager queues unary and binary layouts, collects cyclic edges per
//! cycle id, and on [`Stager::arrange`] builds one constraint system:
//!
//! - every atom gets `x`/`y` variables and a weak seed on a grid
//! - members of a cycle get strong suggestions on that cycle's circle
//! - each queued layout becomes one or more required linear constraints

use std::collections::{BTreeMap, HashMap, HashSet};

use kasuari::Strength;
use tracing::{debug, info};

use super::config::StageConfig;
use super::cycle::{circle_positions, CycleGraph};
use super::error::StageError;
use super::solver::{
    ConstraintSolver, ConstraintSource, Relation, Solution, StageConstraint, StageVariable,
};
use crate::inference::Position;
use crate::language::{
    AtomHandle, BinaryLayout, BinaryOption, ConcreteLayout, Separation, UnaryLayout, UnaryOption,
    UnboundLayout,
};
use crate::relational::Instance;

/// Accumulates compiled layouts and arranges them
#[derive(Debug, Clone, Default)]
pub struct Stager {
    config: StageConfig,
    layouts: Vec<UnboundLayout>,
    cycles: BTreeMap<String, CycleGraph>,
    /// Atoms mentioned by staged layouts, in first-mention order
    mentioned: Vec<String>,
}

impl Stager {
    pub fn new(config: StageConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Number of queued unary and binary layouts
    pub fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    fn mention(&mut self, atom: &AtomHandle) {
        if !self.mentioned.iter().any(|m| *m == atom.name) {
            self.mentioned.push(atom.name.clone());
        }
    }

    /// Queue one compiled layout
    pub fn stage(&mut self, layout: &UnboundLayout) -> Result<(), StageError> {
        match layout {
            ConcreteLayout::GroupingLayout(_) => return Err(StageError::unsupported(layout)),
            ConcreteLayout::BinaryLayout(l) if !l.option.is_supported() => {
                return Err(StageError::unsupported(layout))
            }
            ConcreteLayout::CyclicLayout(l) => {
                self.cycles
                    .entry(l.cycle_id.clone())
                    .or_default()
                    .add_layout(l);
            }
            ConcreteLayout::UnaryLayout(_) | ConcreteLayout::BinaryLayout(_) => {
                self.layouts.push(layout.clone());
            }
        }
        for op in layout.operands() {
            self.mention(op);
        }
        debug!(layout = %layout, "staged");
        Ok(())
    }

    /// Queue every layout, stopping at the first rejected one
    pub fn stage_all(&mut self, layouts: &[UnboundLayout]) -> Result<(), StageError> {
        for layout in layouts {
            self.stage(layout)?;
        }
        Ok(())
    }

    /// Solve for the coordinates of every atom of `instance` and every atom
    /// a staged layout mentions
    pub fn arrange(&self, instance: &Instance) -> Result<Solution, StageError> {
        let atoms = self.atoms(instance);
        let mut placement = self.seeds(&atoms);

        let mut on_circle = HashSet::new();
        for (k, (cycle_id, graph)) in self.cycles.iter().enumerate() {
            let order = graph
                .order()
                .ok_or_else(|| StageError::malformed(cycle_id))?;
            let center = Position::new(
                k as f64 * (2.0 * self.config.cycle_radius + self.config.cycle_spacing),
                0.0,
            );
            let points = circle_positions(order.len(), center, self.config.cycle_radius);
            for (atom, point) in order.into_iter().zip(points) {
                placement.insert(atom.clone(), point);
                on_circle.insert(atom);
            }
        }
        info!(
            atoms = atoms.len(),
            layouts = self.layouts.len(),
            cycles = self.cycles.len(),
            "arranging"
        );

        let mut solver = ConstraintSolver::new();
        for atom in &atoms {
            solver.variable(&StageVariable::x(atom.as_str()));
            solver.variable(&StageVariable::y(atom.as_str()));
        }

        for layout in &self.layouts {
            for constraint in self.constraints_for(layout, &placement)? {
                solver.add_constraint(constraint)?;
            }
        }

        for atom in &atoms {
            let point = placement.get(atom).copied().unwrap_or_default();
            let strength = if on_circle.contains(atom) {
                Strength::STRONG
            } else {
                Strength::WEAK
            };
            solver.suggest_value(&StageVariable::x(atom.as_str()), point.x, strength)?;
            solver.suggest_value(&StageVariable::y(atom.as_str()), point.y, strength)?;
        }

        Ok(solver.solve()?)
    }

    /// Instance atoms, then any other atom a staged layout mentions
    fn atoms(&self, instance: &Instance) -> Vec<String> {
        let mut atoms: Vec<String> = instance.atoms.iter().map(|a| a.name.clone()).collect();
        for name in &self.mentioned {
            if !atoms.contains(name) {
                atoms.push(name.clone());
            }
        }
        atoms
    }

    /// Row-major grid, `ceil(sqrt(n))` columns, rows growing downward
    fn seeds(&self, atoms: &[String]) -> HashMap<String, Position> {
        let cols = ((atoms.len() as f64).sqrt().ceil() as usize).max(1);
        let spacing = self.config.seed_spacing;
        atoms
            .iter()
            .enumerate()
            .map(|(i, atom)| {
                let x = (i % cols) as f64 * spacing;
                let y = -((i / cols) as f64) * spacing;
                (atom.clone(), Position::new(x, y))
            })
            .collect()
    }

    fn gap(&self, separation: Separation) -> (Relation, f64) {
        match separation {
            Separation::NoneSpecified => (Relation::Ge, self.config.default_separation),
            Separation::AtLeast { distance } => (Relation::Ge, distance),
            Separation::Exact { distance } => (Relation::Eq, distance),
        }
    }

    fn constraints_for(
        &self,
        layout: &UnboundLayout,
        placement: &HashMap<String, Position>,
    ) -> Result<Vec<StageConstraint>, StageError> {
        let source = ConstraintSource::new(layout.to_string());
        match layout {
            ConcreteLayout::UnaryLayout(l) => Ok(vec![self.unary(l, source)]),
            ConcreteLayout::BinaryLayout(l) => self
                .binary(l, placement, &source)
                .ok_or_else(|| StageError::unsupported(layout)),
            ConcreteLayout::CyclicLayout(_) | ConcreteLayout::GroupingLayout(_) => {
                Err(StageError::unsupported(layout))
            }
        }
    }

    fn unary(&self, l: &UnaryLayout<AtomHandle>, source: ConstraintSource) -> StageConstraint {
        let (relation, d) = self.gap(l.separation);
        let below = match relation {
            Relation::Ge => Relation::Le,
            other => other,
        };
        let atom = l.op.name.as_str();
        let (variable, relation, value) = match l.option {
            UnaryOption::LeftOfCenter => (StageVariable::x(atom), below, -d),
            UnaryOption::RightOfCenter => (StageVariable::x(atom), relation, d),
            UnaryOption::AboveCenter => (StageVariable::y(atom), relation, d),
            UnaryOption::BelowCenter => (StageVariable::y(atom), below, -d),
        };
        StageConstraint::Fixed {
            variable,
            relation,
            value,
            source,
        }
    }

    /// `None` for options with no placement rule
    fn binary(
        &self,
        l: &BinaryLayout<AtomHandle>,
        placement: &HashMap<String, Position>,
        source: &ConstraintSource,
    ) -> Option<Vec<StageConstraint>> {
        use BinaryOption::*;

        let (a, b) = (l.op0.name.as_str(), l.op1.name.as_str());
        let (relation, d) = self.gap(l.separation);
        let at = |atom: &str| placement.get(atom).copied().unwrap_or_default();

        let offset = |left: StageVariable, right: StageVariable, relation: Relation, by: f64| {
            StageConstraint::Offset {
                left,
                right,
                relation,
                offset: by,
                source: source.clone(),
            }
        };
        let left_of = |a: &str, b: &str| offset(StageVariable::x(b), StageVariable::x(a), relation, d);
        let above = |a: &str, b: &str| offset(StageVariable::y(a), StageVariable::y(b), relation, d);
        let same_y = |a: &str, b: &str| {
            (a != b).then(|| offset(StageVariable::y(a), StageVariable::y(b), Relation::Eq, 0.0))
        };
        let same_x = |a: &str, b: &str| {
            (a != b).then(|| offset(StageVariable::x(a), StageVariable::x(b), Relation::Eq, 0.0))
        };
        let spaced = l.separation != Separation::NoneSpecified;

        let constraints = match l.option {
            LeftOf => vec![left_of(a, b)],
            RightOf => vec![left_of(b, a)],
            Above => vec![above(a, b)],
            Below => vec![above(b, a)],
            HorizontallyAligned => {
                let mut cs: Vec<_> = same_y(a, b).into_iter().collect();
                if spaced {
                    cs.push(if at(a).x <= at(b).x {
                        left_of(a, b)
                    } else {
                        left_of(b, a)
                    });
                }
                cs
            }
            VerticallyAligned => {
                let mut cs: Vec<_> = same_x(a, b).into_iter().collect();
                if spaced {
                    cs.push(if at(a).y >= at(b).y {
                        above(a, b)
                    } else {
                        above(b, a)
                    });
                }
                cs
            }
            DirectlyLeftOf => std::iter::once(left_of(a, b)).chain(same_y(a, b)).collect(),
            DirectlyRightOf => std::iter::once(left_of(b, a)).chain(same_y(a, b)).collect(),
            DirectlyAbove => std::iter::once(above(a, b)).chain(same_x(a, b)).collect(),
            DirectlyBelow => std::iter::once(above(b, a)).chain(same_x(a, b)).collect(),
            Contains | InsideRingOf | OutsideRingOf => return None,
        };
        Some(constraints)
    }
}
