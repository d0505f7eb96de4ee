use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use tracing::error;

/// JSON error envelope returned by every handler.
///
/// This is the single place where service error kinds become HTTP
/// status codes.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: &str, detail: Option<String>) -> Self {
        Self { status, message: message.to_string(), detail }
    }

    pub fn bad_request(detail: String) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(detail))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.message,
            "detail": self.detail,
        }));
        (self.status, body).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => {
                Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg))
            }
            ServiceError::NotFound(msg) => {
                Self::new(StatusCode::NOT_FOUND, "Not Found", Some(msg))
            }
            ServiceError::Db(msg) => {
                error!(err = %msg, "database failure surfaced to api boundary");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error", None)
            }
        }
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_expected_statuses() {
        let e = JsonApiError::from(ServiceError::Validation("bad".into()));
        assert_eq!(e.status, StatusCode::BAD_REQUEST);

        let e = JsonApiError::from(ServiceError::NotFound("gone".into()));
        assert_eq!(e.status, StatusCode::NOT_FOUND);

        let e = JsonApiError::from(ServiceError::Db("boom".into()));
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        // Store details never leak to clients
        assert!(e.detail.is_none());
    }
}
