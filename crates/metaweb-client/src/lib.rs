//! Blocking client for Metaweb metadata services
//!
//! A [`Session`] wraps one Metaweb host and exposes its JSON services
//! (read, search, write) and binary trans services (download, blurb,
//! thumbnail), handling envelope construction, cursor pagination, cookies,
//! and the service error taxonomy.
//!
//! ```no_run
//! use metaweb_client::{Options, Session};
//! use serde_json::json;
//!
//! let session = Session::new("sandbox-freebase.com")?;
//! let query = json!([{ "type": "/music/album", "artist": "Bob Dylan", "name": null }]);
//! let albums = session.read_one(&query, &Options::new())?;
//!
//! for album in session.results(&query, &Options::new()) {
//!     println!("{}", album?["name"]);
//! }
//! # Ok::<(), metaweb_client::ClientError>(())
//! ```

pub mod endpoints;
mod envelope;
mod error;
mod options;
mod results;
mod session;

pub use envelope::{Cursor, ErrorEnvelope, Message, ResponseEnvelope, STATUS_OK};
pub use error::ClientError;
pub use options::{
    Options, BLURB_OPTIONS, READ_OPTIONS, SEARCH_OPTIONS, THUMBNAIL_OPTIONS, WRITE_OPTIONS,
};
pub use results::ResultIter;
pub use session::{Session, DEFAULT_HOST};

pub type Result<T> = std::result::Result<T, ClientError>;
