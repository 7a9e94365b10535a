//! Reading inputs from disk
//!
//! Models, instances and diagrams are JSON. Layout programs are either a
//! JSON array of abstract layouts or the text syntax of [`parse_program`].

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::LoadError;
use crate::language::AbstractLayout;
use crate::parser::parse_program;

/// Read a whole file
pub fn read_source(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))
}

/// Deserialize JSON read from `path`
pub fn json_from_str<T: DeserializeOwned>(source: &str, path: &Path) -> Result<T, LoadError> {
    serde_json::from_str(source).map_err(|e| LoadError::json(path, e))
}

/// A program is JSON when its first non-blank character is `[`
pub fn program_from_str(source: &str, path: &Path) -> Result<Vec<AbstractLayout>, LoadError> {
    if source.trim_start().starts_with('[') {
        json_from_str(source, path)
    } else {
        parse_program(source).map_err(|errors| LoadError::Program {
            path: path.to_path_buf(),
            errors,
        })
    }
}
