use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use webhook_auth::error::{Error as WebhookAuthError, ErrorKind};

#[derive(Debug)]
pub struct Error(WebhookAuthError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// Configuration faults are ours (500); webhook faults are the sender's (400).
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self.0.error_kind {
            ErrorKind::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Webhook(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.0.reason()).into_response()
    }
}

impl From<WebhookAuthError> for Error {
    fn from(err: WebhookAuthError) -> Self {
        Self(err)
    }
}
