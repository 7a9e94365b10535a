//! Concrete layout vocabulary
//!
//! A [`ConcreteLayout`] is one geometric constraint over one or two atoms.
//! It is generic over its operand type: inside an abstract layout the
//! operands are [`SelectorVariable`]s, after compilation they are
//! [`AtomHandle`]s. The operand type also fixes whether cyclic and grouping
//! layouts carry an id, so a template can never hold one and a compiled
//! layout can never lack one.

use std::fmt;

use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::parser::lexer::Name;

// ============================================================================
// Operands
// ============================================================================

/// Id slot of cyclic and grouping layouts
pub trait GroupTag: Clone + fmt::Debug + PartialEq {
    /// The id, if this phase carries one
    fn id(&self) -> Option<&str>;

    fn is_absent(&self) -> bool {
        self.id().is_none()
    }
}

/// The id slot of a template: always empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Untagged;

impl GroupTag for Untagged {
    fn id(&self) -> Option<&str> {
        None
    }
}

// Accepts a missing or null field so templates read back without an id.
impl<'de> Deserialize<'de> for Untagged {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<IgnoredAny>::deserialize(deserializer).map(|_| Untagged)
    }
}

impl GroupTag for String {
    fn id(&self) -> Option<&str> {
        Some(self)
    }
}

/// An operand of a concrete layout
pub trait AtomRef: Clone + fmt::Debug + PartialEq {
    /// What cyclic and grouping layouts store as their id in this phase
    type Tag: GroupTag;

    fn name(&self) -> &str;
}

/// A variable introduced by a selector, used inside layout templates
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "tag", rename = "BoundAtom")]
pub struct SelectorVariable {
    pub name: String,
}

impl SelectorVariable {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl AtomRef for SelectorVariable {
    type Tag = Untagged;

    fn name(&self) -> &str {
        &self.name
    }
}

/// A concrete atom of an instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "tag", rename = "UnboundAtom")]
pub struct AtomHandle {
    pub name: String,
}

impl AtomHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl AtomRef for AtomHandle {
    type Tag = String;

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Options
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnaryOption {
    LeftOfCenter,
    RightOfCenter,
    AboveCenter,
    BelowCenter,
}

impl UnaryOption {
    pub const ALL: [UnaryOption; 4] = [
        Self::LeftOfCenter,
        Self::RightOfCenter,
        Self::AboveCenter,
        Self::BelowCenter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LeftOfCenter => "LeftOfCenter",
            Self::RightOfCenter => "RightOfCenter",
            Self::AboveCenter => "AboveCenter",
            Self::BelowCenter => "BelowCenter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BinaryOption {
    LeftOf,
    RightOf,
    Above,
    Below,
    DirectlyLeftOf,
    DirectlyRightOf,
    DirectlyAbove,
    DirectlyBelow,
    HorizontallyAligned,
    VerticallyAligned,
    OutsideRingOf,
    InsideRingOf,
    Contains,
}

impl BinaryOption {
    pub const ALL: [BinaryOption; 13] = [
        Self::LeftOf,
        Self::RightOf,
        Self::Above,
        Self::Below,
        Self::DirectlyLeftOf,
        Self::DirectlyRightOf,
        Self::DirectlyAbove,
        Self::DirectlyBelow,
        Self::HorizontallyAligned,
        Self::VerticallyAligned,
        Self::OutsideRingOf,
        Self::InsideRingOf,
        Self::Contains,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LeftOf => "LeftOf",
            Self::RightOf => "RightOf",
            Self::Above => "Above",
            Self::Below => "Below",
            Self::DirectlyLeftOf => "DirectlyLeftOf",
            Self::DirectlyRightOf => "DirectlyRightOf",
            Self::DirectlyAbove => "DirectlyAbove",
            Self::DirectlyBelow => "DirectlyBelow",
            Self::HorizontallyAligned => "HorizontallyAligned",
            Self::VerticallyAligned => "VerticallyAligned",
            Self::OutsideRingOf => "OutsideRingOf",
            Self::InsideRingOf => "InsideRingOf",
            Self::Contains => "Contains",
        }
    }

    /// The option that says the same thing with operands swapped.
    ///
    /// `Above(a, b)` mirrors `Below(b, a)`; aligned options mirror themselves.
    /// Containment and ring options have no mirror.
    pub fn mirror(self) -> Option<BinaryOption> {
        match self {
            Self::LeftOf => Some(Self::RightOf),
            Self::RightOf => Some(Self::LeftOf),
            Self::Above => Some(Self::Below),
            Self::Below => Some(Self::Above),
            Self::DirectlyLeftOf => Some(Self::DirectlyRightOf),
            Self::DirectlyRightOf => Some(Self::DirectlyLeftOf),
            Self::DirectlyAbove => Some(Self::DirectlyBelow),
            Self::DirectlyBelow => Some(Self::DirectlyAbove),
            Self::HorizontallyAligned => Some(Self::HorizontallyAligned),
            Self::VerticallyAligned => Some(Self::VerticallyAligned),
            Self::OutsideRingOf | Self::InsideRingOf | Self::Contains => None,
        }
    }

    /// Options that neither scoring nor staging can evaluate yet
    pub fn is_supported(self) -> bool {
        !matches!(
            self,
            Self::OutsideRingOf | Self::InsideRingOf | Self::Contains
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CyclicOption {
    Clockwise,
    Counterclockwise,
}

impl CyclicOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clockwise => "Clockwise",
            Self::Counterclockwise => "Counterclockwise",
        }
    }
}

/// Required distance qualifier on unary and binary layouts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag")]
pub enum Separation {
    #[default]
    NoneSpecified,
    AtLeast {
        distance: f64,
    },
    Exact {
        distance: f64,
    },
}

impl fmt::Display for Separation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Separation::NoneSpecified => Ok(()),
            Separation::AtLeast { distance } => write!(f, " (separation at least {})", distance),
            Separation::Exact { distance } => write!(f, " (separation exactly {})", distance),
        }
    }
}

// ============================================================================
// Layouts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "A: Serialize", deserialize = "A: Deserialize<'de>"))]
pub struct UnaryLayout<A: AtomRef> {
    pub option: UnaryOption,
    #[serde(default)]
    pub separation: Separation,
    pub op: A,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "A: Serialize", deserialize = "A: Deserialize<'de>"))]
pub struct BinaryLayout<A: AtomRef> {
    pub option: BinaryOption,
    #[serde(default)]
    pub separation: Separation,
    pub op0: A,
    pub op1: A,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "A: Serialize, A::Tag: Serialize",
    deserialize = "A: Deserialize<'de>, A::Tag: Deserialize<'de>"
))]
pub struct CyclicLayout<A: AtomRef> {
    pub option: CyclicOption,
    pub op0: A,
    pub op1: A,
    #[serde(rename = "cycleId", skip_serializing_if = "GroupTag::is_absent")]
    pub cycle_id: A::Tag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "A: Serialize, A::Tag: Serialize",
    deserialize = "A: Deserialize<'de>, A::Tag: Deserialize<'de>"
))]
pub struct GroupingLayout<A: AtomRef> {
    pub op: A,
    #[serde(rename = "groupId", skip_serializing_if = "GroupTag::is_absent")]
    pub group_id: A::Tag,
}

/// One geometric layout constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag")]
#[serde(bound(
    serialize = "A: Serialize, A::Tag: Serialize",
    deserialize = "A: Deserialize<'de>, A::Tag: Deserialize<'de>"
))]
pub enum ConcreteLayout<A: AtomRef> {
    UnaryLayout(UnaryLayout<A>),
    BinaryLayout(BinaryLayout<A>),
    CyclicLayout(CyclicLayout<A>),
    GroupingLayout(GroupingLayout<A>),
}

/// A layout template over selector variables
pub type BoundLayout = ConcreteLayout<SelectorVariable>;

/// A compiled layout over instance atoms
pub type UnboundLayout = ConcreteLayout<AtomHandle>;

impl<A: AtomRef> ConcreteLayout<A> {
    pub fn unary(option: UnaryOption, op: A) -> Self {
        Self::UnaryLayout(UnaryLayout {
            option,
            separation: Separation::NoneSpecified,
            op,
        })
    }

    pub fn binary(option: BinaryOption, op0: A, op1: A) -> Self {
        Self::BinaryLayout(BinaryLayout {
            option,
            separation: Separation::NoneSpecified,
            op0,
            op1,
        })
    }

    /// Replace the separation of a unary or binary layout; other kinds are unchanged
    pub fn with_separation(mut self, sep: Separation) -> Self {
        match &mut self {
            Self::UnaryLayout(l) => l.separation = sep,
            Self::BinaryLayout(l) => l.separation = sep,
            Self::CyclicLayout(_) | Self::GroupingLayout(_) => {}
        }
        self
    }

    /// Operands in positional order
    pub fn operands(&self) -> Vec<&A> {
        match self {
            Self::UnaryLayout(l) => vec![&l.op],
            Self::BinaryLayout(l) => vec![&l.op0, &l.op1],
            Self::CyclicLayout(l) => vec![&l.op0, &l.op1],
            Self::GroupingLayout(l) => vec![&l.op],
        }
    }
}

impl ConcreteLayout<SelectorVariable> {
    pub fn cyclic(option: CyclicOption, op0: SelectorVariable, op1: SelectorVariable) -> Self {
        Self::CyclicLayout(CyclicLayout {
            option,
            op0,
            op1,
            cycle_id: Untagged,
        })
    }

    pub fn grouping(op: SelectorVariable) -> Self {
        Self::GroupingLayout(GroupingLayout {
            op,
            group_id: Untagged,
        })
    }
}

impl<A: AtomRef> fmt::Display for ConcreteLayout<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BinaryLayout(l) => write!(
                f,
                "{} {} {}{}",
                Name(l.op0.name()),
                l.option.as_str(),
                Name(l.op1.name()),
                l.separation
            ),
            Self::UnaryLayout(l) => {
                write!(f, "{} {}{}", Name(l.op.name()), l.option.as_str(), l.separation)
            }
            Self::CyclicLayout(l) => {
                write!(
                    f,
                    "Cycle {} {} {}",
                    Name(l.op0.name()),
                    l.option.as_str(),
                    Name(l.op1.name())
                )?;
                match l.cycle_id.id() {
                    Some(id) => write!(f, " (id {})", id),
                    None => Ok(()),
                }
            }
            Self::GroupingLayout(l) => {
                write!(f, "Group {}", Name(l.op.name()))?;
                match l.group_id.id() {
                    Some(id) => write!(f, " (id {})", id),
                    None => Ok(()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(name: &str) -> SelectorVariable {
        SelectorVariable::new(name)
    }

    fn a(name: &str) -> AtomHandle {
        AtomHandle::new(name)
    }

    #[test]
    fn test_pretty_binary_with_separation() {
        let l = BoundLayout::binary(BinaryOption::LeftOf, v("v0"), v("v1"))
            .with_separation(Separation::AtLeast { distance: 50.0 });
        assert_eq!(l.to_string(), "v0 LeftOf v1 (separation at least 50)");

        let l = UnboundLayout::binary(BinaryOption::Above, a("n0"), a("n1"))
            .with_separation(Separation::Exact { distance: 12.5 });
        assert_eq!(l.to_string(), "n0 Above n1 (separation exactly 12.5)");
    }

    #[test]
    fn test_pretty_unary_and_cycle() {
        let l = BoundLayout::unary(UnaryOption::AboveCenter, v("v0"));
        assert_eq!(l.to_string(), "v0 AboveCenter");

        let bound = BoundLayout::cyclic(CyclicOption::Clockwise, v("n0"), v("n1"));
        assert_eq!(bound.to_string(), "Cycle n0 Clockwise n1");

        let unbound = UnboundLayout::CyclicLayout(CyclicLayout {
            option: CyclicOption::Counterclockwise,
            op0: a("x"),
            op1: a("y"),
            cycle_id: "cycle-3".to_string(),
        });
        assert_eq!(unbound.to_string(), "Cycle x Counterclockwise y (id cycle-3)");
    }

    #[test]
    fn test_mirror_is_involution() {
        for option in BinaryOption::ALL {
            if let Some(m) = option.mirror() {
                assert_eq!(m.mirror(), Some(option));
            }
        }
    }

    #[test]
    fn test_bound_cycle_json_omits_id() {
        let l = BoundLayout::cyclic(CyclicOption::Clockwise, v("n0"), v("n1"));
        let value = serde_json::to_value(&l).unwrap();
        assert_eq!(value["tag"], "CyclicLayout");
        assert_eq!(value["op0"]["tag"], "BoundAtom");
        assert!(value.get("cycleId").is_none());

        let back: BoundLayout = serde_json::from_value(value).unwrap();
        assert_eq!(back, l);
    }

    #[test]
    fn test_unbound_cycle_requires_id() {
        let json = r#"{
            "tag": "CyclicLayout",
            "option": "Clockwise",
            "op0": { "tag": "UnboundAtom", "name": "a" },
            "op1": { "tag": "UnboundAtom", "name": "b" }
        }"#;
        assert!(serde_json::from_str::<UnboundLayout>(json).is_err());

        let with_id = json.replace(r#""option""#, r#""cycleId": "cycle-0", "option""#);
        let parsed: UnboundLayout = serde_json::from_str(&with_id).unwrap();
        match parsed {
            ConcreteLayout::CyclicLayout(c) => assert_eq!(c.cycle_id, "cycle-0"),
            other => panic!("Expected cyclic layout, got {:?}", other),
        }
    }

    #[test]
    fn test_separation_json_shape() {
        let l = UnboundLayout::binary(BinaryOption::Below, a("a"), a("b"))
            .with_separation(Separation::Exact { distance: 90.0 });
        let value = serde_json::to_value(&l).unwrap();
        assert_eq!(value["separation"]["tag"], "Exact");
        assert_eq!(value["separation"]["distance"], 90.0);
        let back: UnboundLayout = serde_json::from_value(value).unwrap();
        assert_eq!(back, l);
    }
}
