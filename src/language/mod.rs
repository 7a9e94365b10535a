//! The layout language: concrete primitives, selector chains and checking
//!
//! Concrete layouts are parameterized by their operand type so the same
//! vocabulary serves templates (over [`SelectorVariable`]) and compiled
//! output (over [`AtomHandle`]).

pub mod abstract_layout;
pub mod check;
pub mod concrete;

pub use abstract_layout::{AbstractLayout, LayoutBody, PredSelector, SigSelector, Selector};
pub use check::{check_abstract_layout, check_selector, CheckError, TypeEnv};
pub use concrete::{
    AtomHandle, AtomRef, BinaryLayout, BinaryOption, BoundLayout, ConcreteLayout, CyclicLayout,
    CyclicOption, GroupTag, GroupingLayout, SelectorVariable, Separation, UnaryLayout,
    UnaryOption, UnboundLayout, Untagged,
};
