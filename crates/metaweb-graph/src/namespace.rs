//! Namespace helpers for abbreviated IRIs

use oxrdf::NamedNode;

use crate::error::GraphError;
use crate::Result;

/// An IRI prefix such as `http://xmlns.com/foaf/0.1/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    /// Term for a local name under this namespace.
    pub fn get(&self, local: &str) -> Result<NamedNode> {
        NamedNode::new(format!("{}{local}", self.0)).map_err(GraphError::from)
    }

    pub fn iri(&self) -> &str {
        &self.0
    }
}

/// The FOAF vocabulary.
pub fn foaf() -> Namespace {
    Namespace::new("http://xmlns.com/foaf/0.1/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_appends_local_name() {
        let ns = foaf();
        let term = ns.get("knows").unwrap();
        assert_eq!(term.as_str(), "http://xmlns.com/foaf/0.1/knows");
    }

    #[test]
    fn test_invalid_iri_is_rejected() {
        let ns = Namespace::new("not an iri ");
        assert!(ns.get("x").is_err());
    }
}
