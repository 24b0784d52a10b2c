use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use techdispatch_core::errors::DispatchError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("未找到资源")]
    NotFound,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Dispatch(error) => match error {
                DispatchError::TaskNotFound { .. } => StatusCode::NOT_FOUND,
                DispatchError::InvalidLocation { .. } => StatusCode::BAD_REQUEST,
                DispatchError::NoCandidates | DispatchError::ResolutionExhausted { .. } => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                DispatchError::DeadlineExceeded { .. } => StatusCode::GATEWAY_TIMEOUT,
                DispatchError::Persistence(_)
                | DispatchError::Directory(_)
                | DispatchError::Configuration(_)
                | DispatchError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Dispatch(error) => error.code(),
            ApiError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("请求处理失败: {}", self);
            "系统内部错误".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": message,
            },
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
