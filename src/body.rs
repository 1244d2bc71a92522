use std::fmt::Display;

use async_trait::async_trait;
use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use serde_json::Value;

use crate::RequestError;

/// Default cap on buffered request bodies, in bytes.
pub const DEFAULT_BODY_LIMIT: usize = 100_000;

/// Collects a request body and parses it as JSON, refusing bodies larger
/// than `limit` bytes.
///
/// Every failure mode is a 400: the body outgrowing the limit, the source
/// reporting a read error, or the collected bytes not being valid JSON.
///
/// ```
/// use mock_http_pair::{buffer, MockIncomingMessage, DEFAULT_BODY_LIMIT};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let req = MockIncomingMessage::new(r#"{ "name": "mug" }"#);
/// let payload = buffer(req, DEFAULT_BODY_LIMIT).await.expect("valid body");
/// assert_eq!(payload["name"], "mug");
/// # });
/// ```
pub async fn buffer<B>(body: B, limit: usize) -> Result<Value, RequestError>
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: Display,
{
    let mut body = body;
    let mut buf = Vec::new();
    while let Some(frame) = body.frame().await {
        let frame = frame
            .map_err(|err| RequestError::new(400, format!("failed to read request body: {err}")))?;
        if let Ok(data) = frame.into_data() {
            buf.extend_from_slice(&data);
            if buf.len() > limit {
                return Err(RequestError::new(
                    400,
                    format!("body limit of {limit} bytes exceeded"),
                ));
            }
        }
    }

    serde_json::from_slice(&buf).map_err(|_| RequestError::new(400, "JSON parsing error"))
}

/// A handy extension to [Body](hyper::body::Body) that allows for easily
/// reading a whole body as a single `Bytes` object.
#[async_trait]
pub trait BodyBytes {
    async fn body_bytes(self) -> Result<Bytes, RequestError>;
}

#[async_trait]
impl<B> BodyBytes for B
where
    B: Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Display,
{
    async fn body_bytes(self) -> Result<Bytes, RequestError> {
        self.collect()
            .await
            .map(|collected| collected.to_bytes())
            .map_err(|err| RequestError::new(400, format!("failed to read request body: {err}")))
    }
}

#[cfg(test)]
mod test {
    use std::{
        pin::Pin,
        task::{Context, Poll},
    };

    use hyper::body::Frame;
    use serde_json::json;

    use crate::MockIncomingMessage;

    use super::*;

    /// A body that yields one chunk and then fails.
    struct FailingBody {
        sent: bool,
    }

    impl Body for FailingBody {
        type Data = Bytes;
        type Error = &'static str;

        fn poll_frame(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
            if self.sent {
                return Poll::Ready(Some(Err("connection reset")));
            }
            self.sent = true;
            Poll::Ready(Some(Ok(Frame::data(Bytes::from_static(b"{ \"par")))))
        }
    }

    #[tokio::test]
    async fn valid_json_resolves_with_the_parsed_value() {
        let req = MockIncomingMessage::new(r#"{ "name": "mug", "count": 3 }"#);
        let payload = buffer(req, DEFAULT_BODY_LIMIT).await.expect("valid body");
        assert_eq!(payload, json!({ "name": "mug", "count": 3 }));
    }

    #[tokio::test]
    async fn oversized_bodies_are_refused() {
        let req = MockIncomingMessage::new(vec![b'x'; 100]);
        let err = buffer(req, 5).await.expect_err("over the limit");
        assert_eq!(err.status_code, 400);
        assert!(err.message.contains("body limit of 5 bytes"), "{err}");
    }

    #[tokio::test]
    async fn a_body_exactly_at_the_limit_is_accepted() {
        let body = r#"{ "n": 12 }"#;
        let req = MockIncomingMessage::new(body);
        let payload = buffer(req, body.len()).await.expect("at the limit");
        assert_eq!(payload, json!({ "n": 12 }));
    }

    #[tokio::test]
    async fn invalid_json_is_a_parse_error() {
        let req = MockIncomingMessage::new("definitely not json");
        let err = buffer(req, DEFAULT_BODY_LIMIT).await.expect_err("not json");
        assert_eq!(err.status_code, 400);
        assert_eq!(err.message, "JSON parsing error");
    }

    #[tokio::test]
    async fn stream_errors_are_reported() {
        let err = buffer(FailingBody { sent: false }, DEFAULT_BODY_LIMIT)
            .await
            .expect_err("stream failure");
        assert_eq!(err.status_code, 400);
        assert!(err.message.contains("connection reset"), "{err}");
    }

    #[tokio::test]
    async fn body_bytes_collects_the_whole_body() {
        let req = MockIncomingMessage::new("a body well past one read chunk in size");
        let bytes = req.body_bytes().await.expect("collect body");
        assert_eq!(bytes.as_ref(), b"a body well past one read chunk in size");
    }

    #[tokio::test]
    async fn body_bytes_reports_stream_errors() {
        let err = FailingBody { sent: false }
            .body_bytes()
            .await
            .expect_err("stream failure");
        assert_eq!(err.status_code, 400);
    }
}
