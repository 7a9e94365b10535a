//! Canonical footprints of compiled layouts
//!
//! Two candidate programs explain a diagram the same way when they produce
//! the same set of footprints. Canonicalization rewrites each layout into
//! atomic layouts with a single orientation per relation.

use std::fmt;

use crate::language::{AtomHandle, BinaryLayout, BinaryOption, ConcreteLayout, Separation, UnboundLayout};

/// A canonical atomic layout used only as a comparison key
pub type Footprint = UnboundLayout;

fn binary(option: BinaryOption, sep: Separation, op0: &AtomHandle, op1: &AtomHandle) -> Footprint {
    ConcreteLayout::BinaryLayout(BinaryLayout {
        option,
        separation: sep,
        op0: op0.clone(),
        op1: op1.clone(),
    })
}

/// Symmetric relations list their operands in name order
fn aligned(option: BinaryOption, sep: Separation, a: &AtomHandle, b: &AtomHandle) -> Footprint {
    if a.name <= b.name {
        binary(option, sep, a, b)
    } else {
        binary(option, sep, b, a)
    }
}

/// Canonicalize one compiled layout
pub fn to_footprints(layout: &UnboundLayout) -> Vec<Footprint> {
    use BinaryOption::*;

    let ConcreteLayout::BinaryLayout(l) = layout else {
        return vec![layout.clone()];
    };
    let (a, b, sep) = (&l.op0, &l.op1, l.separation);
    match l.option {
        LeftOf => vec![binary(LeftOf, sep, a, b)],
        RightOf => vec![binary(LeftOf, sep, b, a)],
        Above => vec![binary(Above, sep, a, b)],
        Below => vec![binary(Above, sep, b, a)],
        HorizontallyAligned => vec![aligned(HorizontallyAligned, sep, a, b)],
        VerticallyAligned => vec![aligned(VerticallyAligned, sep, a, b)],
        DirectlyLeftOf => vec![
            binary(LeftOf, sep, a, b),
            aligned(HorizontallyAligned, sep, a, b),
        ],
        DirectlyRightOf => vec![
            binary(LeftOf, sep, b, a),
            aligned(HorizontallyAligned, sep, a, b),
        ],
        DirectlyAbove => vec![
            binary(Above, sep, a, b),
            aligned(VerticallyAligned, sep, a, b),
        ],
        DirectlyBelow => vec![
            binary(Above, sep, b, a),
            aligned(VerticallyAligned, sep, a, b),
        ],
        Contains | InsideRingOf | OutsideRingOf => vec![layout.clone()],
    }
}

/// Canonicalize a batch of layouts
pub fn canonicalize(layouts: &[UnboundLayout]) -> Vec<Footprint> {
    layouts.iter().flat_map(to_footprints).collect()
}

/// Sorted, duplicate-free rendering of a footprint set
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FootprintKey(Vec<String>);

impl FootprintKey {
    pub fn new(footprints: &[Footprint]) -> Self {
        let mut parts: Vec<String> = footprints.iter().map(|f| f.to_string()).collect();
        parts.sort();
        parts.dedup();
        Self(parts)
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FootprintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}
