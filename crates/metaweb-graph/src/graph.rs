//! In-memory RDF document graph

use std::collections::BTreeMap;

use oxrdf::{Graph, NamedNode, Term, Triple};
use oxrdfio::{RdfFormat, RdfParser};

use crate::error::GraphError;
use crate::namespace::Namespace;
use crate::query::{Bindings, BasicGraphProcessor, PatternTerm, QueryProcessor, TriplePattern};
use crate::Result;

/// An in-memory triple store fed from RDF documents, with namespace
/// bindings and an injected query processor.
pub struct DocumentGraph<P = BasicGraphProcessor> {
    graph: Graph,
    processor: P,
    namespaces: BTreeMap<String, Namespace>,
}

impl DocumentGraph<BasicGraphProcessor> {
    pub fn new() -> Self {
        Self::with_processor(BasicGraphProcessor)
    }
}

impl Default for DocumentGraph<BasicGraphProcessor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: QueryProcessor> DocumentGraph<P> {
    /// The query capability is a constructor parameter; there is no global
    /// processor registry to mutate.
    pub fn with_processor(processor: P) -> Self {
        Self {
            graph: Graph::new(),
            processor,
            namespaces: BTreeMap::new(),
        }
    }

    /// Bind `prefix` so patterns can use `prefix:local` names.
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: Namespace) {
        self.namespaces.insert(prefix.into(), namespace);
    }

    /// Fetch an RDF document over HTTP and parse it into the graph. The
    /// parser format follows the response content type, falling back to
    /// RDF/XML. Returns the number of triples added.
    pub fn load_url(&mut self, url: &str) -> Result<usize> {
        tracing::debug!(url = %url, "loading RDF document");
        let response = reqwest::blocking::get(url)?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes()?;
        let format = content_type
            .as_deref()
            .and_then(RdfFormat::from_media_type)
            .unwrap_or(RdfFormat::RdfXml);
        self.load_slice(&body, format)
    }

    /// Parse in-memory RDF data into the graph. Returns the number of
    /// triples added (duplicates are not counted).
    pub fn load_slice(&mut self, data: &[u8], format: RdfFormat) -> Result<usize> {
        let mut added = 0;
        for quad in RdfParser::from_format(format).for_slice(data) {
            let quad = quad.map_err(oxrdfio::RdfParseError::from)?;
            let triple = Triple::new(quad.subject, quad.predicate, quad.object);
            if self.graph.insert(&triple) {
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn insert(&mut self, triple: &Triple) -> bool {
        self.graph.insert(triple)
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Triples matching the given parts, `None` standing for a wildcard.
    pub fn triples_matching(
        &self,
        subject: Option<&Term>,
        predicate: Option<&NamedNode>,
        object: Option<&Term>,
    ) -> Vec<Triple> {
        self.graph
            .iter()
            .filter(|triple| {
                subject.map_or(true, |s| Term::from(triple.subject.into_owned()) == *s)
                    && predicate.map_or(true, |p| triple.predicate == p.as_ref())
                    && object.map_or(true, |o| triple.object.into_owned() == *o)
            })
            .map(|triple| triple.into_owned())
            .collect()
    }

    /// Run a declarative pattern query through the injected processor.
    /// `prefix:local` names in the patterns are expanded against the bound
    /// namespaces first.
    pub fn query(&self, patterns: &[TriplePattern]) -> Result<Vec<Bindings>> {
        let resolved = patterns
            .iter()
            .map(|pattern| self.resolve(pattern))
            .collect::<Result<Vec<_>>>()?;
        self.processor.evaluate(&self.graph, &resolved)
    }

    fn resolve(&self, pattern: &TriplePattern) -> Result<TriplePattern> {
        Ok(TriplePattern {
            subject: self.resolve_term(&pattern.subject)?,
            predicate: self.resolve_term(&pattern.predicate)?,
            object: self.resolve_term(&pattern.object)?,
        })
    }

    fn resolve_term(&self, term: &PatternTerm) -> Result<PatternTerm> {
        match term {
            PatternTerm::Prefixed(name) => {
                let (prefix, local) = name
                    .split_once(':')
                    .ok_or_else(|| GraphError::UnresolvedName(name.clone()))?;
                let namespace = self
                    .namespaces
                    .get(prefix)
                    .ok_or_else(|| GraphError::UnknownPrefix(prefix.to_string()))?;
                Ok(PatternTerm::Term(Term::NamedNode(namespace.get(local)?)))
            }
            other => Ok(other.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::foaf;
    use oxrdf::Literal;

    const FOAF_TTL: &[u8] = br#"
        @prefix foaf: <http://xmlns.com/foaf/0.1/> .
        <http://example.com/alice> foaf:name "Alice" ;
            foaf:knows <http://example.com/bob> .
        <http://example.com/bob> foaf:member_name "Bob" .
    "#;

    fn loaded() -> DocumentGraph {
        let mut graph = DocumentGraph::new();
        graph.load_slice(FOAF_TTL, RdfFormat::Turtle).unwrap();
        graph.bind("foaf", foaf());
        graph
    }

    #[test]
    fn test_load_slice_counts_new_triples() {
        let mut graph = DocumentGraph::new();
        assert_eq!(graph.load_slice(FOAF_TTL, RdfFormat::Turtle).unwrap(), 3);
        // loading the same document again adds nothing
        assert_eq!(graph.load_slice(FOAF_TTL, RdfFormat::Turtle).unwrap(), 0);
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_query_with_prefixed_names() {
        let graph = loaded();
        let rows = graph
            .query(&[TriplePattern::new("?a", "foaf:knows", "?b")])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0]["b"],
            Term::NamedNode(NamedNode::new("http://example.com/bob").unwrap())
        );
    }

    #[test]
    fn test_unknown_prefix_is_an_error() {
        let graph = loaded();
        let err = graph
            .query(&[TriplePattern::new("?a", "dc:title", "?t")])
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownPrefix(prefix) if prefix == "dc"));
    }

    #[test]
    fn test_copy_member_names_to_names() {
        // Mirror member_name values into foaf:name so one query covers both
        let mut graph = loaded();
        let member_name = foaf().get("member_name").unwrap();
        let name = foaf().get("name").unwrap();

        for triple in graph.triples_matching(None, Some(&member_name), None) {
            graph.insert(&Triple::new(triple.subject, name.clone(), triple.object));
        }

        let rows = graph
            .query(&[
                TriplePattern::new("?a", "foaf:knows", "?b"),
                TriplePattern::new("?a", "foaf:name", "?aname"),
                TriplePattern::new("?b", "foaf:name", "?bname"),
            ])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0]["aname"],
            Term::Literal(Literal::new_simple_literal("Alice"))
        );
        assert_eq!(
            rows[0]["bname"],
            Term::Literal(Literal::new_simple_literal("Bob"))
        );
    }

    #[test]
    fn test_triples_matching_wildcards() {
        let graph = loaded();
        assert_eq!(graph.triples_matching(None, None, None).len(), 3);

        let alice = Term::NamedNode(NamedNode::new("http://example.com/alice").unwrap());
        assert_eq!(graph.triples_matching(Some(&alice), None, None).len(), 2);
    }
}
