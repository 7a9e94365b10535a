//! Typed schema: signatures and predicate declarations

use serde::{Deserialize, Serialize};

/// A predicate declaration with its ordered argument signatures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPredicate {
    pub name: String,
    pub sigs: Vec<String>,
}

impl ModelPredicate {
    pub fn new(name: impl Into<String>, sigs: &[&str]) -> Self {
        Self {
            name: name.into(),
            sigs: sigs.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.sigs.len()
    }
}

/// The type system that layouts quantify over
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Model {
    pub signatures: Vec<String>,
    pub predicates: Vec<ModelPredicate>,
    /// `(sub, super)` pairs; carried through for tooling, not consulted by selectors
    pub sig_hierarchy: Vec<(String, String)>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signature(mut self, sig: impl Into<String>) -> Self {
        self.signatures.push(sig.into());
        self
    }

    pub fn with_predicate(mut self, name: impl Into<String>, sigs: &[&str]) -> Self {
        self.predicates.push(ModelPredicate::new(name, sigs));
        self
    }

    pub fn has_signature(&self, sig: &str) -> bool {
        self.signatures.iter().any(|s| s == sig)
    }

    pub fn predicate(&self, name: &str) -> Option<&ModelPredicate> {
        self.predicates.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_lookup() {
        let model = Model::new()
            .with_signature("Apple")
            .with_predicate("redder", &["Apple", "Apple"]);
        assert!(model.has_signature("Apple"));
        assert!(!model.has_signature("Banana"));
        assert_eq!(model.predicate("redder").map(|p| p.arity()), Some(2));
        assert!(model.predicate("greener").is_none());
    }

    #[test]
    fn test_model_json_shape() {
        let json = r#"{
            "signatures": ["Node"],
            "predicates": [{ "name": "succ", "sigs": ["Node", "Node"] }],
            "sigHierarchy": []
        }"#;
        let model: Model = serde_json::from_str(json).unwrap();
        assert_eq!(model.signatures, vec!["Node".to_string()]);
        assert_eq!(model.predicates[0].name, "succ");

        let back = serde_json::to_value(&model).unwrap();
        assert!(back.get("sigHierarchy").is_some());
    }

    #[test]
    fn test_model_missing_hierarchy_defaults() {
        let model: Model = serde_json::from_str(r#"{ "signatures": ["A"] }"#).unwrap();
        assert!(model.sig_hierarchy.is_empty());
        assert!(model.predicates.is_empty());
    }
}
