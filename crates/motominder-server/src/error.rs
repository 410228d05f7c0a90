//! Error responses

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use motominder_core::api::ApiResponse;
use motominder_core::{Error, ErrorKind};

/// Full text of an internal error, carried on the response so the
/// development layer can reveal it
#[derive(Debug, Clone)]
pub struct InternalDetail(pub String);

/// Handler error
#[derive(Debug)]
pub enum ApiError {
    /// Failure reported by the core library
    Core(Error),
    /// Request that could not be decoded
    BadRequest(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Core(err) => match err.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Core(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            ApiError::Core(err) if err.kind() == ErrorKind::Internal => {
                tracing::error!(
                    error_code = err.code(),
                    status_code = status.as_u16(),
                    error = %err,
                    "Request failed"
                );
                let mut response =
                    (status, Json(ApiResponse::from_error(&err, false))).into_response();
                response
                    .extensions_mut()
                    .insert(InternalDetail(err.to_string()));
                response
            }
            ApiError::Core(err) => {
                tracing::warn!(
                    error_code = err.code(),
                    status_code = status.as_u16(),
                    message = %err,
                    "Request rejected"
                );
                (status, Json(ApiResponse::from_error(&err, false))).into_response()
            }
            ApiError::BadRequest(message) => {
                tracing::warn!(status_code = status.as_u16(), message = %message, "Bad request");
                (status, Json(ApiResponse::failure(message))).into_response()
            }
        }
    }
}

/// Replace the generic body of an internal failure with its full text
pub async fn reveal_internal_errors(mut response: Response) -> Response {
    match response.extensions_mut().remove::<InternalDetail>() {
        Some(InternalDetail(detail)) => {
            (response.status(), Json(ApiResponse::failure(detail))).into_response()
        }
        None => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::invalid("Tag name is required"), StatusCode::BAD_REQUEST),
            (Error::GarageNotFound(1), StatusCode::NOT_FOUND),
            (Error::AssignmentNotFound, StatusCode::NOT_FOUND),
            (Error::DuplicateTagName("x".into()), StatusCode::CONFLICT),
            (Error::DuplicateAssignment, StatusCode::CONFLICT),
            (
                Error::DatabaseError(sqlx::Error::PoolClosed),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_internal_error_carries_detail() {
        let response = ApiError::from(Error::DatabaseError(sqlx::Error::PoolClosed)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<InternalDetail>().is_some());

        let response = ApiError::from(Error::TagNotFound(1)).into_response();
        assert!(response.extensions().get::<InternalDetail>().is_none());
    }
}
