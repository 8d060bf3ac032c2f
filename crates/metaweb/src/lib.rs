//! Metaweb client toolkit
//!
//! Ties the workspace together:
//! - `metaweb-client`: blocking HTTP session for a Metaweb database
//! - `metaweb-graph`: RDF document graph with pattern queries

mod config;
mod error;

pub use config::Config;
pub use error::MetawebError;

pub use metaweb_client::{
    ClientError, Cursor, ErrorEnvelope, Message, Options, ResponseEnvelope, ResultIter, Session,
    DEFAULT_HOST, STATUS_OK,
};
pub use metaweb_graph::{
    foaf, BasicGraphProcessor, Bindings, DocumentGraph, GraphError, Literal, NamedNode, Namespace,
    PatternTerm, QueryProcessor, RdfFormat, Term, Triple, TriplePattern,
};

pub type Result<T> = std::result::Result<T, MetawebError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
