use application::ApplicationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// 传输层错误。业务结果（用户名占用、未连接）不走这里，而是作为正常应答返回。
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidArgument { field, reason } => ApiError::new(
                StatusCode::BAD_REQUEST,
                "INVALID_ARGUMENT",
                format!("{}: {}", field, reason),
            ),
            // 业务结果由分发器作为应答值返回，走到这里说明调用链有缺陷
            other => {
                tracing::error!(error = %other, "业务错误未被转换为应答");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "internal server error",
                )
            }
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        match error {
            ApplicationError::Domain(err) => err.into(),
            ApplicationError::Repository(err) => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "STORAGE_UNAVAILABLE",
                format!("storage error: {}", err),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use domain::RepositoryError;

    use super::*;

    #[test]
    fn invalid_argument_is_a_bad_request() {
        let error = ApiError::from(DomainError::invalid_argument("username", "too long"));
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.body.code, "INVALID_ARGUMENT");
        assert_eq!(error.body.message, "username: too long");
    }

    #[test]
    fn storage_failure_is_service_unavailable() {
        let error = ApiError::from(ApplicationError::from(RepositoryError::storage("down")));
        assert_eq!(error.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(error.body.code, "STORAGE_UNAVAILABLE");
    }

    #[test]
    fn business_outcomes_are_never_client_facing_conflicts() {
        for error in [
            DomainError::name_taken("alice"),
            DomainError::not_connected("alice"),
        ] {
            let error = ApiError::from(ApplicationError::from(error));
            assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
