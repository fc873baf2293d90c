//! Response mapping.
//!
//! # Responsibilities
//! - Map pipeline rejections to status codes and `{"detail": ...}` bodies
//!
//! # Design Decisions
//! - Every rejection kind has a fixed status; details are human-readable
//! - Rejections never carry partial generation output

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::gateway::GatewayError;

/// Error body returned for every rejection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
