//! Placeholder rendering handlers.
//!
//! These exist so tests exercising handler plumbing have named endpoints to
//! point at; none of them render anything yet. Run through
//! [run_handler](crate::run_handler), each produces a well-formed 501 JSON
//! error body.

use crate::{HandlerOutput, MockIncomingMessage, MockServerResponse, RequestError};

pub async fn render_pdf(
    _req: MockIncomingMessage,
    _res: MockServerResponse,
) -> Result<HandlerOutput, RequestError> {
    Err(RequestError::new(501, "PDF rendering is not implemented"))
}

pub async fn render_image(
    _req: MockIncomingMessage,
    _res: MockServerResponse,
) -> Result<HandlerOutput, RequestError> {
    Err(RequestError::new(501, "image rendering is not implemented"))
}

pub async fn render_markup(
    _req: MockIncomingMessage,
    _res: MockServerResponse,
) -> Result<HandlerOutput, RequestError> {
    Err(RequestError::new(501, "markup rendering is not implemented"))
}

#[cfg(test)]
mod test {
    use serde_json::{json, Value};

    use crate::{run_handler, MockServerResponse};

    use super::*;

    #[tokio::test]
    async fn stubs_produce_501_bodies() {
        let res = MockServerResponse::new();
        run_handler(render_pdf, MockIncomingMessage::default(), res.clone()).await;

        assert_eq!(res.status(), Some(501));
        let body: Value = res.json().await.expect("parse error body");
        assert_eq!(
            body,
            json!({
                "statusCode": 501,
                "statusText": "Not Implemented",
                "message": "PDF rendering is not implemented",
            })
        );
    }
}
