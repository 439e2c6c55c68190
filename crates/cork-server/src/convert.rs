use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use cork_types::CorkError;

pub fn cork_to_status(err: &CorkError) -> StatusCode {
    match err {
        CorkError::FileNotFound(_) | CorkError::NoLine(_) => StatusCode::NOT_FOUND,
        CorkError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        CorkError::UnhashableSeed(_) | CorkError::MalformedInput(_) => StatusCode::BAD_REQUEST,
        CorkError::Stopped => StatusCode::SERVICE_UNAVAILABLE,
        CorkError::Client(_) => StatusCode::BAD_GATEWAY,
    }
}

/// `CorkError` carried to the HTTP boundary.
#[derive(Debug)]
pub struct ApiError(pub CorkError);

impl From<CorkError> for ApiError {
    fn from(err: CorkError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = cork_to_status(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, %status, "request rejected");
        }
        (status, self.0.to_string()).into_response()
    }
}
