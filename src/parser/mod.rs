//! Text syntax for layout programs

mod grammar;
pub mod lexer;

pub use grammar::parse_program;
