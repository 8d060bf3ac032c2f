//! Lazy, cursor-driven result streaming

use std::collections::VecDeque;

use serde_json::{Map, Value};

use crate::envelope::Cursor;
use crate::Result;

/// Iterator over the results of a single streaming read.
///
/// Whenever the buffered page runs out, the iterator reissues the same
/// query envelope with the most recent cursor token (the first request
/// sends the start marker). It ends exactly when the server returns a falsy
/// cursor.
///
/// The stream is forward-only and cannot be restarted. A failing page fetch
/// yields the error once and ends the stream; items already yielded stand.
pub struct ResultIter<F> {
    fetch: F,
    envelope: Map<String, Value>,
    cursor: Cursor,
    buffer: VecDeque<Value>,
    failed: bool,
}

impl<F> ResultIter<F>
where
    F: FnMut(&Map<String, Value>) -> Result<(Vec<Value>, Cursor)>,
{
    pub(crate) fn new(envelope: Map<String, Value>, fetch: F) -> Self {
        Self {
            fetch,
            envelope,
            cursor: Cursor::Start,
            buffer: VecDeque::new(),
            failed: false,
        }
    }

    /// Whether the stream may still produce items: either buffered results
    /// remain or the server has not yet closed the cursor.
    pub fn has_more(&self) -> bool {
        !self.failed && (!self.buffer.is_empty() || self.cursor.has_more())
    }

    fn fetch_page(&mut self) -> Result<()> {
        self.envelope
            .insert("cursor".to_string(), self.cursor.to_value());
        let (items, cursor) = (self.fetch)(&self.envelope)?;
        self.cursor = cursor;
        self.buffer.extend(items);
        Ok(())
    }
}

impl<F> Iterator for ResultIter<F>
where
    F: FnMut(&Map<String, Value>) -> Result<(Vec<Value>, Cursor)>,
{
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.failed || !self.cursor.has_more() {
                return None;
            }
            if let Err(err) = self.fetch_page() {
                self.failed = true;
                self.cursor = Cursor::Done;
                return Some(Err(err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::envelope::ErrorEnvelope;
    use serde_json::json;

    fn paged(pages: Vec<(Vec<Value>, Cursor)>) -> ResultIter<impl FnMut(&Map<String, Value>) -> Result<(Vec<Value>, Cursor)>> {
        let mut pages = VecDeque::from(pages);
        ResultIter::new(Map::new(), move |_envelope| {
            Ok(pages.pop_front().unwrap_or_else(|| (Vec::new(), Cursor::Done)))
        })
    }

    #[test]
    fn test_yields_all_pages_in_order() {
        let iter = paged(vec![
            (vec![json!("a"), json!("b")], Cursor::Token("t1".to_string())),
            (vec![json!("c")], Cursor::Done),
        ]);

        let items: Vec<Value> = iter.map(|r| r.unwrap()).collect();
        assert_eq!(items, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn test_terminates_on_falsy_cursor() {
        let mut iter = paged(vec![(vec![json!(1)], Cursor::Done)]);
        assert_eq!(iter.next().unwrap().unwrap(), json!(1));
        assert!(iter.next().is_none());
        assert!(!iter.has_more());
        // stays terminated
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_empty_pages_are_skipped() {
        let iter = paged(vec![
            (Vec::new(), Cursor::Token("t1".to_string())),
            (vec![json!("x")], Cursor::Done),
        ]);
        let items: Vec<Value> = iter.map(|r| r.unwrap()).collect();
        assert_eq!(items, vec![json!("x")]);
    }

    #[test]
    fn test_cursor_token_is_sent_back() {
        let mut sent = Vec::new();
        let mut page = 0;
        let iter = ResultIter::new(Map::new(), move |envelope: &Map<String, Value>| {
            sent.push(envelope.get("cursor").cloned());
            page += 1;
            if page == 1 {
                Ok((vec![json!("a")], Cursor::Token("next".to_string())))
            } else {
                assert_eq!(sent[0], Some(json!(true)));
                assert_eq!(sent[1], Some(json!("next")));
                Ok((Vec::new(), Cursor::Done))
            }
        });
        assert_eq!(iter.count(), 1);
    }

    #[test]
    fn test_error_ends_stream_after_partial_results() {
        let mut page = 0;
        let mut iter = ResultIter::new(Map::new(), move |_envelope: &Map<String, Value>| {
            page += 1;
            if page == 1 {
                Ok((vec![json!("a")], Cursor::Token("t".to_string())))
            } else {
                Err(ClientError::Service {
                    url: "http://h/api/service/mqlread".to_string(),
                    details: ErrorEnvelope {
                        code: "/api/status/error".to_string(),
                        messages: Vec::new(),
                    },
                })
            }
        });

        assert_eq!(iter.next().unwrap().unwrap(), json!("a"));
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
        assert!(!iter.has_more());
    }
}
