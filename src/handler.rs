use std::{convert::Infallible, future::Future, pin::Pin};

use async_trait::async_trait;
use hyper::body::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::{MockIncomingMessage, MockServerResponse, RequestError};

/// What a handler produced, chosen explicitly rather than sniffed from a
/// runtime type.
#[derive(Debug)]
pub enum HandlerOutput {
    /// Raw bytes; written with `Content-Type: application/octet-stream`
    /// unless the handler already set one.
    Bytes(Bytes),
    /// A structured value; written as pretty-printed JSON.
    Json(Value),
    /// The handler wrote (or chose not to write) the response itself.
    Empty,
}

/// A request handler runnable through [run_handler]. Any failure it returns
/// is converted into a JSON error body; see [RequestError].
#[async_trait]
pub trait Handler {
    type Error: Into<RequestError> + Send;
    async fn handle(
        self,
        req: MockIncomingMessage,
        res: MockServerResponse,
    ) -> Result<HandlerOutput, Self::Error>;
}

impl<F, Fut, E> Handler for F
where
    F: FnOnce(MockIncomingMessage, MockServerResponse) -> Fut,
    Fut: Future<Output = Result<HandlerOutput, E>> + Send + 'static,
    E: Into<RequestError> + Send,
{
    type Error = E;

    fn handle<'async_trait>(
        self,
        req: MockIncomingMessage,
        res: MockServerResponse,
    ) -> Pin<Box<dyn Future<Output = Result<HandlerOutput, Self::Error>> + Send + 'async_trait>>
    {
        Box::pin(self(req, res))
    }
}

/// Converts a value into a [Result](Result)<T, [Infallible](Infallible)> so it
/// can be used as the return type for a Handler.
///
/// Useful for closures where you can't specify the return type and you don't
/// need to return an error.
pub fn handle_ok<T>(val: T) -> Result<T, Infallible> {
    Ok(val)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    status_code: u16,
    status_text: &'a str,
    message: &'a str,
}

/// Invokes `handler` with the request/response pair, serializes its output
/// onto the response, and converts any failure into a JSON error body. No
/// failure escapes to the caller.
///
/// - [HandlerOutput::Bytes] is written with a 200 status, a `Content-Length`
///   header, and `Content-Type: application/octet-stream` if the handler did
///   not set a content type itself.
/// - [HandlerOutput::Json] is written with a 200 status as pretty-printed
///   (2-space indented) JSON; a value that cannot be serialized becomes a
///   400 "unparseable JSON payload" error.
/// - [HandlerOutput::Empty] leaves the response exactly as the handler left
///   it.
/// - A failure becomes a `{ "statusCode", "statusText", "message" }` JSON
///   body with the failure's status code and its standard reason phrase.
pub async fn run_handler<H: Handler>(
    handler: H,
    req: MockIncomingMessage,
    res: MockServerResponse,
) {
    let err = match handler.handle(req, res.clone()).await {
        Ok(HandlerOutput::Bytes(bytes)) => {
            write_bytes(&res, bytes);
            return;
        }
        Ok(HandlerOutput::Json(value)) => match serde_json::to_vec_pretty(&value) {
            Ok(body) => {
                write_json(&res, body);
                return;
            }
            Err(_) => RequestError::new(400, "unparseable JSON payload"),
        },
        Ok(HandlerOutput::Empty) => return,
        Err(err) => err.into(),
    };

    write_error(&res, &err);
}

/// Returns a reusable adapter that runs the handler through [run_handler] on
/// every call. Requires a `Clone` handler, like spawning one per request.
pub fn wrap<H>(
    handler: H,
) -> impl Fn(MockIncomingMessage, MockServerResponse) -> Pin<Box<dyn Future<Output = ()> + Send>>
where
    H: Handler + Clone + Send + Sync + 'static,
{
    move |req, res| {
        let handler = handler.clone();
        Box::pin(run_handler(handler, req, res))
    }
}

fn write_bytes(res: &MockServerResponse, bytes: Bytes) {
    if res.get_header("Content-Type").is_none() {
        res.set_header("Content-Type", "application/octet-stream");
    }
    let len = bytes.len().to_string();
    res.write_head(200, &[("Content-Length", len.as_str())]);
    res.end_with(bytes);
}

fn write_json(res: &MockServerResponse, body: Vec<u8>) {
    let len = body.len().to_string();
    res.write_head(
        200,
        &[
            ("Content-Type", "application/json"),
            ("Content-Length", len.as_str()),
        ],
    );
    res.end_with(body);
}

fn write_error(res: &MockServerResponse, err: &RequestError) {
    let body = serde_json::to_vec_pretty(&ErrorBody {
        status_code: err.status_code,
        status_text: err.status_text(),
        message: &err.message,
    })
    .expect("serialize error body");
    res.write_head(err.status_code, &[("Content-Type", "application/json")]);
    res.end_with(body);
}
