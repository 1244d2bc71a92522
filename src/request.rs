use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
};

use http_body_util::BodyExt;
use hyper::body::{Body, Bytes, Frame, SizeHint};

/// Number of bytes served per frame. Small enough that any non-trivial body
/// spans several reads, which is what consumers under test should handle.
const READ_CHUNK_SIZE: usize = 16;

/// An in-memory stand-in for an incoming HTTP request.
///
/// Holds a fixed body and serves it through the [Body](hyper::body::Body)
/// trait in [READ_CHUNK_SIZE]-byte frames, so anything that reads a real
/// request body can read this instead. `method` and `url` are plain mutable
/// fields with no validation; the method defaults to `GET` and the url to the
/// empty string.
///
/// ```
/// use mock_http_pair::MockIncomingMessage;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let mut req = MockIncomingMessage::new("hello world");
/// req.set_method("POST");
/// req.set_url("/upload");
///
/// assert_eq!(req.accumulate().await.as_ref(), b"hello world");
/// # });
/// ```
#[derive(Debug)]
pub struct MockIncomingMessage {
    method: String,
    url: String,
    body: Bytes,
    pos: usize,
    collected: Option<Bytes>,
}

impl MockIncomingMessage {
    pub fn new(content: impl Into<Bytes>) -> Self {
        Self {
            method: "GET".to_owned(),
            url: String::new(),
            body: content.into(),
            pos: 0,
            collected: None,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn set_method(&mut self, method: impl Into<String>) {
        self.method = method.into();
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Drains the remaining body frames and returns them as one contiguous
    /// [Bytes]. The first call caches its result, so repeated calls return
    /// the same bytes rather than an empty tail.
    ///
    /// The mock body cannot fail (its error type is
    /// [Infallible](std::convert::Infallible)); for sources that can, see
    /// [buffer](crate::buffer) and [BodyBytes](crate::BodyBytes).
    pub async fn accumulate(&mut self) -> Bytes {
        if let Some(collected) = &self.collected {
            return collected.clone();
        }

        let mut buf = Vec::with_capacity(self.body.len() - self.pos);
        while let Some(frame) = self.frame().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(never) => match never {},
            };
            if let Ok(data) = frame.into_data() {
                buf.extend_from_slice(&data);
            }
        }

        let collected = Bytes::from(buf);
        self.collected = Some(collected.clone());
        collected
    }
}

impl Default for MockIncomingMessage {
    fn default() -> Self {
        Self::new(Bytes::new())
    }
}

impl Body for MockIncomingMessage {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        if self.pos >= self.body.len() {
            return Poll::Ready(None);
        }

        let start = self.pos;
        let end = (start + READ_CHUNK_SIZE).min(self.body.len());
        self.pos = end;
        Poll::Ready(Some(Ok(Frame::data(self.body.slice(start..end)))))
    }

    fn is_end_stream(&self) -> bool {
        self.pos >= self.body.len()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact((self.body.len() - self.pos) as u64)
    }
}
