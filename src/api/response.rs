// API response utility functions module

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::logger;

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return ApiError::Internal("response serialization failed".to_string()).into_response();
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            Response::new(Full::new(Bytes::from("Error")))
        })
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

/// Failures a router reports to the client as `{"detail": "..."}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    /// Collaborator not initialized (testing mode)
    Unavailable(&'static str),
    Internal(String),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::BadRequest(m) | Self::NotFound(m) | Self::Internal(m) => m.clone(),
            Self::Unavailable(service) => format!("{service} service is not available"),
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        let detail = self.detail();
        // Serializing a single string field cannot fail
        let body = serde_json::to_vec(&ErrorBody { detail: &detail }).unwrap_or_default();

        Response::builder()
            .status(self.status())
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .unwrap_or_else(|e| {
                logger::log_error(&format!("Failed to build error response: {e}"));
                Response::new(Full::new(Bytes::new()))
            })
    }
}

/// JSON 404 for API paths no router claims
pub fn not_found() -> Response<Full<Bytes>> {
    ApiError::NotFound("Not Found".to_string()).into_response()
}
