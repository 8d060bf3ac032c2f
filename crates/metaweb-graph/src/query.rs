//! Declarative triple-pattern queries

use std::collections::BTreeMap;

use oxrdf::{Graph, Literal, NamedNode, Term, TripleRef};

use crate::error::GraphError;
use crate::Result;

/// One position of a triple pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternTerm {
    /// A variable, bound by matching.
    Variable(String),
    /// A concrete term that must match exactly.
    Term(Term),
    /// A `prefix:local` name, expanded against the graph's namespace
    /// bindings before the query runs.
    Prefixed(String),
}

impl PatternTerm {
    pub fn var(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.strip_prefix('?') {
            Some(stripped) => PatternTerm::Variable(stripped.to_string()),
            None => PatternTerm::Variable(name),
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        PatternTerm::Term(Term::Literal(Literal::new_simple_literal(value)))
    }
}

impl From<&str> for PatternTerm {
    /// `?name` becomes a variable; anything else is taken as a
    /// `prefix:local` name to expand later.
    fn from(s: &str) -> Self {
        match s.strip_prefix('?') {
            Some(name) => PatternTerm::Variable(name.to_string()),
            None => PatternTerm::Prefixed(s.to_string()),
        }
    }
}

impl From<NamedNode> for PatternTerm {
    fn from(node: NamedNode) -> Self {
        PatternTerm::Term(Term::NamedNode(node))
    }
}

impl From<Term> for PatternTerm {
    fn from(term: Term) -> Self {
        PatternTerm::Term(term)
    }
}

/// A single subject/predicate/object pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct TriplePattern {
    pub subject: PatternTerm,
    pub predicate: PatternTerm,
    pub object: PatternTerm,
}

impl TriplePattern {
    pub fn new(
        subject: impl Into<PatternTerm>,
        predicate: impl Into<PatternTerm>,
        object: impl Into<PatternTerm>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// Variable name → matched term.
pub type Bindings = BTreeMap<String, Term>;

/// Evaluates a set of triple patterns against a graph.
///
/// A processor is handed to [`DocumentGraph`](crate::DocumentGraph) as a
/// constructor parameter, so each instance chooses its engine without any
/// shared registry. Patterns arrive with all prefixed names expanded.
pub trait QueryProcessor {
    fn evaluate(&self, graph: &Graph, patterns: &[TriplePattern]) -> Result<Vec<Bindings>>;
}

/// Nested-loop join over the patterns, one at a time.
pub struct BasicGraphProcessor;

impl QueryProcessor for BasicGraphProcessor {
    fn evaluate(&self, graph: &Graph, patterns: &[TriplePattern]) -> Result<Vec<Bindings>> {
        let mut rows = vec![Bindings::new()];
        for pattern in patterns {
            let mut extended = Vec::new();
            for row in &rows {
                for triple in graph.iter() {
                    if let Some(next) = match_triple(row, pattern, triple)? {
                        extended.push(next);
                    }
                }
            }
            rows = extended;
        }
        Ok(rows)
    }
}

fn match_triple(
    row: &Bindings,
    pattern: &TriplePattern,
    triple: TripleRef<'_>,
) -> Result<Option<Bindings>> {
    let mut row = row.clone();
    let parts = [
        (&pattern.subject, Term::from(triple.subject.into_owned())),
        (
            &pattern.predicate,
            Term::NamedNode(triple.predicate.into_owned()),
        ),
        (&pattern.object, triple.object.into_owned()),
    ];
    for (pattern_term, term) in parts {
        match pattern_term {
            PatternTerm::Term(expected) => {
                if *expected != term {
                    return Ok(None);
                }
            }
            PatternTerm::Variable(name) => match row.get(name) {
                Some(bound) if *bound != term => return Ok(None),
                Some(_) => {}
                None => {
                    row.insert(name.clone(), term);
                }
            },
            PatternTerm::Prefixed(name) => {
                return Err(GraphError::UnresolvedName(name.clone()));
            }
        }
    }
    Ok(Some(row))
}
