//! In-memory stand-ins for an HTTP request and response pair, for unit
//! testing request-handler functions without opening a socket.
//!
//! A [MockIncomingMessage] is a readable request body (served through the
//! [hyper::body::Body] trait) with mutable `method`/`url` fields; a
//! [MockServerResponse] is a writable response that accumulates every chunk,
//! header, and status written to it. [run_handler] wraps an async handler,
//! serializing its return value onto the response (raw bytes as an
//! octet-stream, structured values as pretty-printed JSON) and converting
//! every failure into a `{ "statusCode", "statusText", "message" }` JSON
//! body. [buffer] reads a request body into parsed JSON with a size limit.
//!
//! This is not a mock HTTP *server*: nothing here binds a port or parses
//! wire bytes. Only the in-process read/write contracts a handler expects
//! are provided.
//!
//! ## Example
//!
//! ```
//! # // Please keep this example up-to-date with README.md, but remove all
//! # // lines starting with `#` and their contents.
//! use mock_http_pair::{
//!     buffer, run_handler, HandlerOutput, MockIncomingMessage, MockServerResponse,
//!     RequestError, DEFAULT_BODY_LIMIT,
//! };
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! async fn echo_json(
//!     req: MockIncomingMessage,
//!     _res: MockServerResponse,
//! ) -> Result<HandlerOutput, RequestError> {
//!     let payload = buffer(req, DEFAULT_BODY_LIMIT).await?;
//!     Ok(HandlerOutput::Json(payload))
//! }
//!
//! let req = MockIncomingMessage::new(r#"{ "testing": true }"#);
//! let res = MockServerResponse::new();
//! run_handler(echo_json, req, res.clone()).await;
//!
//! assert!(res.ok());
//! assert_eq!(res.status(), Some(200));
//! assert_eq!(
//!     res.get_header("Content-Type").as_deref(),
//!     Some("application/json"),
//! );
//! let body: serde_json::Value = res.json().await.expect("parse response body");
//! assert_eq!(body["testing"], true);
//! # });
//! ```
//!
//! There are also more examples as tests.

mod body;
mod error;
mod handler;
pub mod render;
mod request;
mod response;

pub use body::*;
pub use error::*;
pub use handler::*;
pub use request::*;
pub use response::*;

pub use hyper;
