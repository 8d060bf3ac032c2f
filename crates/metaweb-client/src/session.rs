//! Blocking session against a Metaweb database

use std::collections::BTreeMap;

use parking_lot::RwLock;
use reqwest::blocking::Client;
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::endpoints;
use crate::envelope::{Cursor, ResponseEnvelope};
use crate::error::ClientError;
use crate::options::{
    self, Options, BLURB_OPTIONS, READ_OPTIONS, SEARCH_OPTIONS, THUMBNAIL_OPTIONS, WRITE_OPTIONS,
};
use crate::results::ResultIter;
use crate::Result;

/// Host used when none is configured. The sandbox is wiped and refreshed
/// from the production graph every week, which makes it a safe place to
/// experiment with writes.
pub const DEFAULT_HOST: &str = "sandbox-freebase.com";

type HttpResponse = (reqwest::StatusCode, Option<String>, Vec<u8>);

/// A connection to one Metaweb host.
///
/// Holds the cookie jar (authentication and cache-control tokens set by the
/// server are replayed on every later request) and the session's default
/// options. One round trip per call, no retries: a failed request surfaces
/// immediately and the caller owns the retry decision.
pub struct Session {
    host: String,
    client: Client,
    options: Options,
    /// URL of the most recent request, exposed through [`Session::last_url`]
    /// as a caller-facing diagnostic. Two threads interleaving requests on
    /// one session would see each other's URLs here, so a session belongs
    /// to a single caller.
    last_url: RwLock<Option<String>>,
}

impl Session {
    pub fn new(host: impl Into<String>) -> Result<Self> {
        Self::with_options(host, Options::new())
    }

    pub fn with_options(host: impl Into<String>, options: Options) -> Result<Self> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            host: host.into(),
            client,
            options,
            last_url: RwLock::new(None),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// URL of the most recent request issued by this session, if any.
    pub fn last_url(&self) -> Option<String> {
        self.last_url.read().clone()
    }

    /// Submit a single mqlread query and return its unwrapped `result`.
    pub fn read_one(&self, query: &Value, options: &Options) -> Result<Value> {
        let mut results = self.read_many(std::slice::from_ref(query), options)?;
        // read_many returns exactly one result per query
        Ok(results.remove(0))
    }

    /// Submit several mqlread queries in one batched envelope.
    ///
    /// Results come back in input order regardless of how the server orders
    /// the envelope keys. Any failing slot raises with that slot's own
    /// failure envelope.
    pub fn read_many(&self, queries: &[Value], options: &Options) -> Result<Vec<Value>> {
        let opts = self.options.merged(READ_OPTIONS, options);
        let outer = build_read_envelope(queries, &opts);
        let payload = serde_json::to_string(&outer)?;
        let url = self.service_url(endpoints::READ, &[("queries", payload.as_str())]);

        let (body, response) = self.fetch_envelope(&url)?;
        let response = check_envelope(&url, response)?;
        unpack_batch(&url, &body, &response, queries.len())
    }

    /// Stream the results of one query, fetching further pages on demand
    /// through the envelope cursor. See [`ResultIter`] for the single-pass
    /// semantics.
    pub fn results<'a>(
        &'a self,
        query: &Value,
        options: &Options,
    ) -> ResultIter<impl FnMut(&Map<String, Value>) -> Result<(Vec<Value>, Cursor)> + 'a> {
        let opts = self.options.merged(READ_OPTIONS, options);
        let envelope = build_stream_envelope(query, &opts);
        ResultIter::new(envelope, move |envelope| self.read_page(envelope))
    }

    /// Invoke the search service. A trailing `*` turns the query into a
    /// prefix search: the marker is stripped and the remainder is sent as
    /// the `prefix` parameter instead of `query`.
    pub fn search(&self, query: &str, options: &Options) -> Result<Value> {
        let opts = self.options.merged(SEARCH_OPTIONS, options);
        let params = build_search_params(query, opts);
        let pairs: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.clone(), options::param_str(v)))
            .collect();
        let borrowed: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let url = self.service_url(endpoints::SEARCH, &borrowed);

        let (_body, response) = self.fetch_envelope(&url)?;
        let response = check_envelope(&url, response)?;
        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Retrieve the raw bytes and content type of the content object `id`.
    pub fn download(&self, id: &str) -> Result<(Vec<u8>, String)> {
        self.trans(&self.content_url(id))
    }

    /// Retrieve a blurb of the document `id`. Length and paragraph breaks
    /// follow the `maxlength` / `break_paragraphs` options.
    pub fn blurb(&self, id: &str, options: &Options) -> Result<(Vec<u8>, String)> {
        self.trans(&self.blurb_url(id, options))
    }

    /// Retrieve a thumbnail of the image `id`. Dimensions follow the
    /// `maxwidth` / `maxheight` options.
    pub fn thumbnail(&self, id: &str, options: &Options) -> Result<(Vec<u8>, String)> {
        self.trans(&self.thumbnail_url(id, options))
    }

    /// URL of the raw content download for `id`.
    pub fn content_url(&self, id: &str) -> String {
        self.trans_url(id, endpoints::DOWNLOAD, &[], &Options::new())
    }

    /// URL of a blurb of the document `id`.
    pub fn blurb_url(&self, id: &str, options: &Options) -> String {
        self.trans_url(id, endpoints::BLURB, BLURB_OPTIONS, options)
    }

    /// URL of a thumbnail of the image `id`.
    pub fn thumbnail_url(&self, id: &str, options: &Options) -> String {
        self.trans_url(id, endpoints::THUMBNAIL, THUMBNAIL_OPTIONS, options)
    }

    /// Establish write credentials. The server answers with authentication
    /// cookies that the session jar replays on subsequent requests.
    pub fn login(&self, username: &str, password: &str) -> Result<()> {
        let url = self.service_url(endpoints::LOGIN, &[]);
        let (_, _, body) =
            self.http_post_form(&url, &[("username", username), ("password", password)])?;
        let response = self.parse_envelope(&url, &body)?;
        check_envelope(&url, response)?;
        tracing::debug!(username = %username, "logged in");
        Ok(())
    }

    /// Submit an mqlwrite query. Requires a prior [`Session::login`].
    pub fn write(&self, query: &Value, options: &Options) -> Result<Value> {
        let opts = self.options.merged(WRITE_OPTIONS, options);
        let envelope = build_stream_envelope(query, &opts);
        let payload = serde_json::to_string(&Value::Object(envelope))?;
        let url = self.service_url(endpoints::WRITE, &[]);

        let (_, _, body) = self.http_post_form(&url, &[("query", payload.as_str())])?;
        let response = self.parse_envelope(&url, &body)?;
        let response = check_envelope(&url, response)?;
        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Upload raw content; the service answers with an envelope describing
    /// the created content object. Options become URL parameters.
    pub fn upload(
        &self,
        content: Vec<u8>,
        content_type: &str,
        options: &Options,
    ) -> Result<Value> {
        let opts = self.options.merged(&[], options);
        let pairs: Vec<(String, String)> = opts
            .iter()
            .map(|(k, v)| (k.clone(), options::param_str(v)))
            .collect();
        let borrowed: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let url = self.service_url(endpoints::UPLOAD, &borrowed);

        let (_, _, body) = self.http_post_body(&url, content, content_type)?;
        let response = self.parse_envelope(&url, &body)?;
        let response = check_envelope(&url, response)?;
        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Fetch a fresh cache-control cookie so that subsequent reads observe
    /// recent writes.
    pub fn touch(&self) -> Result<()> {
        let url = self.service_url(endpoints::TOUCH, &[]);
        let (_, response) = self.fetch_envelope(&url)?;
        check_envelope(&url, response)?;
        Ok(())
    }

    /// One page of a cursor read: the page's result items plus the cursor
    /// for the next page.
    fn read_page(&self, envelope: &Map<String, Value>) -> Result<(Vec<Value>, Cursor)> {
        let payload = serde_json::to_string(envelope)?;
        let url = self.service_url(endpoints::READ, &[("query", payload.as_str())]);
        let (_body, response) = self.fetch_envelope(&url)?;
        let response = check_envelope(&url, response)?;
        let items = match response.result {
            Some(Value::Array(items)) => items,
            Some(other) => vec![other],
            None => Vec::new(),
        };
        Ok((items, response.cursor))
    }

    /// GET a JSON service and parse the body as a response envelope. The
    /// parsed-from text is returned alongside for error reporting.
    fn fetch_envelope(&self, url: &str) -> Result<(String, ResponseEnvelope)> {
        let (_, _, body) = self.http_get(url)?;
        let text = String::from_utf8_lossy(&body).into_owned();
        let envelope = self.parse_envelope(url, &body)?;
        Ok((text, envelope))
    }

    /// Parse a response body as a JSON envelope. Metaweb returns envelopes
    /// even on HTTP error statuses; a body that is not JSON is a contract
    /// violation and surfaces as `ClientError::Internal`.
    fn parse_envelope(&self, url: &str, body: &[u8]) -> Result<ResponseEnvelope> {
        serde_json::from_slice(body).map_err(|_| ClientError::Internal {
            url: url.to_string(),
            body: String::from_utf8_lossy(body).into_owned(),
        })
    }

    /// Raw fetch for the trans services, which return bytes rather than a
    /// JSON envelope.
    fn trans(&self, url: &str) -> Result<(Vec<u8>, String)> {
        let response = self.http_get(url)?;
        unpack_content(url, response)
    }

    /// URL for a trans service: host + service path + content id, plus any
    /// allow-listed options as query parameters.
    fn trans_url(&self, id: &str, service: &str, keys: &[&str], options: &Options) -> String {
        let mut url = format!("http://{}{}{}", self.host, service, id);
        let opts = self.options.merged(keys, options);
        if !opts.is_empty() {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            for (key, value) in &opts {
                serializer.append_pair(key, &options::param_str(value));
            }
            url.push('?');
            url.push_str(&serializer.finish());
        }
        url
    }

    fn service_url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("http://{}{}", self.host, path);
        if !params.is_empty() {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            serializer.extend_pairs(params.iter().copied());
            url.push('?');
            url.push_str(&serializer.finish());
        }
        url
    }

    // The only methods that touch the network. Transport errors propagate
    // as `ClientError::Http` without classification.

    fn http_get(&self, url: &str) -> Result<HttpResponse> {
        *self.last_url.write() = Some(url.to_string());
        tracing::debug!(url = %url, "GET");
        let response = self.client.get(url).send()?;
        read_response(response)
    }

    fn http_post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<HttpResponse> {
        *self.last_url.write() = Some(url.to_string());
        tracing::debug!(url = %url, "POST");
        let response = self.client.post(url).form(&fields).send()?;
        read_response(response)
    }

    fn http_post_body(&self, url: &str, body: Vec<u8>, content_type: &str) -> Result<HttpResponse> {
        *self.last_url.write() = Some(url.to_string());
        tracing::debug!(url = %url, content_type = %content_type, "POST");
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()?;
        read_response(response)
    }
}

fn read_response(response: reqwest::blocking::Response) -> Result<HttpResponse> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.bytes()?.to_vec();
    Ok((status, content_type, body))
}

/// Dispatch on a trans service response. A 200 carries the content itself,
/// passed through with its content type untouched; any other status carries
/// an error envelope in place of the content, or is a contract violation
/// when that body is not JSON.
fn unpack_content(url: &str, response: HttpResponse) -> Result<(Vec<u8>, String)> {
    let (status, content_type, body) = response;
    if status == reqwest::StatusCode::OK {
        let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());
        return Ok((body, content_type));
    }
    let text = String::from_utf8_lossy(&body).into_owned();
    let details = serde_json::from_str(&text).map_err(|_| ClientError::Internal {
        url: url.to_string(),
        body: text.clone(),
    })?;
    Err(ClientError::Service {
        url: url.to_string(),
        details,
    })
}

/// Raise `Service` unless the envelope carries the success code.
fn check_envelope(url: &str, envelope: ResponseEnvelope) -> Result<ResponseEnvelope> {
    if envelope.is_ok() {
        Ok(envelope)
    } else {
        Err(ClientError::Service {
            url: url.to_string(),
            details: envelope.error_envelope(),
        })
    }
}

/// Pull the per-slot results out of a checked batch envelope, in input
/// order regardless of how the server ordered the keys. A missing or
/// malformed slot is a contract violation; a failing slot raises with that
/// slot's own envelope.
fn unpack_batch(
    url: &str,
    body: &str,
    response: &ResponseEnvelope,
    n: usize,
) -> Result<Vec<Value>> {
    let mut results = Vec::with_capacity(n);
    for i in 0..n {
        let slot = response.slot(i).ok_or_else(|| ClientError::Internal {
            url: url.to_string(),
            body: body.to_string(),
        })?;
        let slot = check_envelope(url, slot)?;
        results.push(slot.result.unwrap_or(Value::Null));
    }
    Ok(results)
}

/// Outer read envelope: one `{"query": ...}` inner envelope per slot, each
/// carrying the merged options.
fn build_read_envelope(queries: &[Value], opts: &BTreeMap<String, Value>) -> Map<String, Value> {
    let mut outer = Map::new();
    for (i, query) in queries.iter().enumerate() {
        outer.insert(format!("q{i}"), Value::Object(build_stream_envelope(query, opts)));
    }
    outer
}

/// Single-query envelope used by streaming reads and writes.
fn build_stream_envelope(query: &Value, opts: &BTreeMap<String, Value>) -> Map<String, Value> {
    let mut envelope = Map::new();
    envelope.insert("query".to_string(), query.clone());
    for (key, value) in opts {
        envelope.insert(key.clone(), value.clone());
    }
    envelope
}

/// Search parameters: a trailing `*` selects a prefix search.
fn build_search_params(query: &str, mut opts: BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    match query.strip_suffix('*') {
        Some(prefix) => opts.insert("prefix".to_string(), Value::String(prefix.to_string())),
        None => opts.insert("query".to_string(), Value::String(query.to_string())),
    };
    opts
}
