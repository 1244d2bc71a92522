use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use hyper::{body::Bytes, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::watch;

/// An in-memory stand-in for a server response.
///
/// Accumulates every written chunk into a buffer and records status and
/// headers, so a test can run a handler against it and then assert on what
/// was written. The handle is cheaply cloneable; all clones share the same
/// state, letting the test keep one end while the handler writes through
/// another.
///
/// Header names are stored case-sensitively, exactly as supplied, with one
/// value per name (last write wins).
///
/// ```
/// use mock_http_pair::MockServerResponse;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let res = MockServerResponse::new();
/// res.write_head(200, &[("Content-Type", "text/plain")]);
/// res.write("hello ");
/// res.end_with("world");
///
/// assert!(res.ok());
/// assert_eq!(res.status_text().as_deref(), Some("OK"));
/// assert_eq!(res.text().await, "hello world");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockServerResponse {
    state: Arc<Mutex<State>>,
    finished_tx: Arc<watch::Sender<bool>>,
    finished_rx: watch::Receiver<bool>,
}

#[derive(Debug, Default)]
struct State {
    chunks: Vec<Bytes>,
    len: usize,
    status: Option<u16>,
    status_text: Option<String>,
    headers: HashMap<String, String>,
    // Set exactly once, by end(). Writes arriving later are dropped so the
    // settled accumulate() result cannot change.
    collected: Option<Bytes>,
}

impl MockServerResponse {
    pub fn new() -> Self {
        let (finished_tx, finished_rx) = watch::channel(false);
        Self {
            state: Arc::new(Mutex::new(State::default())),
            finished_tx: Arc::new(finished_tx),
            finished_rx,
        }
    }

    /// Appends a chunk to the response buffer.
    pub fn write(&self, chunk: impl Into<Bytes>) {
        let chunk = chunk.into();
        let mut state = self.state.lock().expect("lock poisoned");
        if state.collected.is_some() {
            return;
        }
        state.len += chunk.len();
        state.chunks.push(chunk);
    }

    /// Sets the status code and merges `headers` into the header map. The
    /// status text defaults to the standard reason phrase for the code, if
    /// it has one.
    pub fn write_head(&self, status: u16, headers: &[(&str, &str)]) {
        let reason = StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .map(str::to_owned);
        self.write_head_inner(status, reason, headers);
    }

    /// Like [write_head](Self::write_head), but with an explicit status text.
    pub fn write_head_with_reason(&self, status: u16, reason: &str, headers: &[(&str, &str)]) {
        self.write_head_inner(status, Some(reason.to_owned()), headers);
    }

    fn write_head_inner(&self, status: u16, reason: Option<String>, headers: &[(&str, &str)]) {
        let mut state = self.state.lock().expect("lock poisoned");
        state.status = Some(status);
        state.status_text = reason;
        for (name, value) in headers {
            state
                .headers
                .insert((*name).to_owned(), (*value).to_owned());
        }
    }

    pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
        let mut state = self.state.lock().expect("lock poisoned");
        state.headers.insert(name.into(), value.into());
    }

    pub fn get_header(&self, name: &str) -> Option<String> {
        let state = self.state.lock().expect("lock poisoned");
        state.headers.get(name).cloned()
    }

    /// Finalizes the response. The buffered chunks are frozen into the
    /// result [accumulate](Self::accumulate) resolves with; calling `end`
    /// again has no effect.
    pub fn end(&self) {
        let mut state = self.state.lock().expect("lock poisoned");
        if state.collected.is_some() {
            return;
        }

        let mut buf = Vec::with_capacity(state.len);
        for chunk in &state.chunks {
            buf.extend_from_slice(chunk);
        }
        state.collected = Some(Bytes::from(buf));
        drop(state);

        let _ = self.finished_tx.send(true);
    }

    /// Writes a final chunk, then finalizes the response.
    pub fn end_with(&self, chunk: impl Into<Bytes>) {
        self.write(chunk);
        self.end();
    }

    /// Whether the status code is in the 2xx range.
    pub fn ok(&self) -> bool {
        self.status()
            .is_some_and(|status| (200..300).contains(&status))
    }

    pub fn status(&self) -> Option<u16> {
        self.state.lock().expect("lock poisoned").status
    }

    pub fn status_text(&self) -> Option<String> {
        self.state.lock().expect("lock poisoned").status_text.clone()
    }

    /// A snapshot of the header map, not a live view.
    pub fn headers(&self) -> HashMap<String, String> {
        self.state.lock().expect("lock poisoned").headers.clone()
    }

    /// Byte count written so far. Readable before finalization for partial
    /// inspection.
    pub fn len(&self) -> usize {
        self.state.lock().expect("lock poisoned").len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves with the full written body once the response is finalized.
    /// May be called any number of times, before or after
    /// [end](Self::end); every call observes the same frozen bytes.
    pub async fn accumulate(&self) -> Bytes {
        let mut finished_rx = self.finished_rx.clone();
        finished_rx
            .wait_for(|finished| *finished)
            .await
            .expect("finished channel closed");
        self.state
            .lock()
            .expect("lock poisoned")
            .collected
            .clone()
            .expect("finalized response has no body")
    }

    /// Awaits [accumulate](Self::accumulate) and parses the body as JSON.
    /// A parse failure is returned as an error, never swallowed.
    pub async fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let buf = self.accumulate().await;
        serde_json::from_slice(&buf)
    }

    /// Awaits [accumulate](Self::accumulate) and decodes the body as UTF-8
    /// text, replacing invalid sequences.
    pub async fn text(&self) -> String {
        let buf = self.accumulate().await;
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Default for MockServerResponse {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use serde_json::{json, Value};

    use super::*;

    #[tokio::test]
    async fn accumulate_concatenates_writes_in_order() {
        let res = MockServerResponse::new();
        res.write("one ");
        res.write("two ");
        assert_eq!(res.len(), 8);
        res.write("three");
        res.end();

        assert_eq!(res.accumulate().await.as_ref(), b"one two three");
        assert_eq!(res.len(), 13);
    }

    #[tokio::test]
    async fn accumulate_resolves_once_finalized() {
        let res = MockServerResponse::new();
        let pending = {
            let res = res.clone();
            tokio::spawn(async move { res.accumulate().await })
        };

        res.write("hello ");
        res.end_with("world");

        assert_eq!(pending.await.unwrap().as_ref(), b"hello world");
        // A later call observes the same frozen bytes.
        assert_eq!(res.accumulate().await.as_ref(), b"hello world");
    }

    #[tokio::test]
    async fn writes_after_end_are_dropped() {
        let res = MockServerResponse::new();
        res.write("kept");
        res.end();
        res.write("lost");
        res.end();

        assert_eq!(res.accumulate().await.as_ref(), b"kept");
        assert_eq!(res.len(), 4);
    }

    #[test]
    fn write_head_defaults_the_reason_phrase() {
        let res = MockServerResponse::new();
        assert_eq!(res.status(), None);
        assert!(!res.ok());

        res.write_head(200, &[("Content-Type", "text/plain")]);
        assert_eq!(res.status(), Some(200));
        assert_eq!(res.status_text().as_deref(), Some("OK"));
        assert!(res.ok());

        res.write_head(404, &[]);
        assert_eq!(res.status_text().as_deref(), Some("Not Found"));
        assert!(!res.ok());
    }

    #[test]
    fn write_head_with_reason_overrides_the_phrase() {
        let res = MockServerResponse::new();
        res.write_head_with_reason(200, "Alright", &[]);
        assert_eq!(res.status_text().as_deref(), Some("Alright"));
    }

    #[test]
    fn headers_are_last_write_wins() {
        let res = MockServerResponse::new();
        res.set_header("X-Test", "one");
        res.write_head(200, &[("X-Test", "two"), ("X-Other", "kept")]);
        res.set_header("X-Test", "three");

        assert_eq!(res.get_header("X-Test").as_deref(), Some("three"));
        assert_eq!(res.get_header("X-Other").as_deref(), Some("kept"));
        // Names are case-sensitive and a snapshot, not a live view.
        assert_eq!(res.get_header("x-test"), None);
        let snapshot = res.headers();
        res.set_header("X-Test", "four");
        assert_eq!(snapshot["X-Test"], "three");
    }

    #[tokio::test]
    async fn json_and_text_decode_the_body() {
        let res = MockServerResponse::new();
        res.end_with(r#"{ "testing": true }"#);

        let value: Value = res.json().await.expect("parse body");
        assert_eq!(value, json!({ "testing": true }));
        assert_eq!(res.text().await, r#"{ "testing": true }"#);
    }

    #[tokio::test]
    async fn json_surfaces_parse_failures() {
        let res = MockServerResponse::new();
        res.end_with("not json");
        assert!(res.json::<Value>().await.is_err());
    }
}
