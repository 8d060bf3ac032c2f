//! RDF document graphs with FOAF-style pattern queries
//!
//! [`DocumentGraph`] loads RDF documents (local bytes or fetched over
//! HTTP) into an in-memory triple store and evaluates declarative
//! triple-pattern queries through an injected [`QueryProcessor`].
//! Namespace bindings let patterns abbreviate IRIs as `prefix:local`.

mod error;
mod graph;
mod namespace;
mod query;

pub use error::GraphError;
pub use graph::DocumentGraph;
pub use namespace::{foaf, Namespace};
pub use query::{Bindings, BasicGraphProcessor, PatternTerm, QueryProcessor, TriplePattern};

// Callers build patterns and inspect results with these
pub use oxrdf::{Literal, NamedNode, Term, Triple};
pub use oxrdfio::RdfFormat;

pub type Result<T> = std::result::Result<T, GraphError>;
