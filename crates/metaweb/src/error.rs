//! Combined error type

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetawebError {
    #[error("Client error: {0}")]
    Client(#[from] metaweb_client::ClientError),

    #[error("Graph error: {0}")]
    Graph(#[from] metaweb_graph::GraphError),
}
