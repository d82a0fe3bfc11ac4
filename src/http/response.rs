//! Webhook responses.
//!
//! Every webhook reply, success or failure, is an XML envelope around one of
//! the fixed user messages. Failures only change the status code.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::webhook::envelope;
use crate::webhook::WebhookError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlReply {
    pub status: StatusCode,
    pub text: String,
}

impl XmlReply {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            text: text.into(),
        }
    }
}

impl From<WebhookError> for XmlReply {
    fn from(err: WebhookError) -> Self {
        let status = match err {
            WebhookError::MissingEmail => StatusCode::BAD_REQUEST,
            WebhookError::Validation(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            text: err.user_message().to_string(),
        }
    }
}

impl IntoResponse for XmlReply {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, envelope::CONTENT_TYPE)],
            envelope::render(&self.text),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::CallError;

    #[test]
    fn test_error_status_codes() {
        let reply = XmlReply::from(WebhookError::MissingEmail);
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.text, "Please provide an email");

        let reply = XmlReply::from(WebhookError::Validation(CallError::ProviderServer { status: 500 }));
        assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
        assert_eq!(reply.text, "Could not validate email");
    }

    #[test]
    fn test_reply_is_xml() {
        let response = XmlReply::ok("hi").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/xml");
    }
}
