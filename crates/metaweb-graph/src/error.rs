//! Graph error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RDF parse error: {0}")]
    Parse(#[from] oxrdfio::RdfParseError),

    #[error("Invalid IRI: {0}")]
    Iri(#[from] oxrdf::IriParseError),

    #[error("Unknown namespace prefix: {0}")]
    UnknownPrefix(String),

    #[error("Unresolved name in pattern: {0}")]
    UnresolvedName(String),
}
