pub mod stripe_event;

use axum::http::StatusCode;

type RejectionType = (StatusCode, String);
