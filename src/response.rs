use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::progress::engine::EngineError;
use crate::recognition::RecognitionError;
use crate::services::gateway::GatewayError;
use crate::store::StoreError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub is_operational: bool,
}

impl AppError {
    fn operational(status: StatusCode, code: &str, message: &str) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn bad_request(code: &str, message: &str) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::operational(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn bad_gateway(message: &str) -> Self {
        Self::operational(StatusCode::BAD_GATEWAY, "GATEWAY_ERROR", message)
    }

    pub fn gateway_timeout(message: &str) -> Self {
        Self::operational(StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT", message)
    }

    pub fn service_unavailable(code: &str, message: &str) -> Self {
        Self::operational(StatusCode::SERVICE_UNAVAILABLE, code, message)
    }

    pub fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.to_string(),
            is_operational: false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let exposed_message = if self.is_operational {
            self.message.clone()
        } else {
            "Internal server error".to_string()
        };

        if self.is_operational {
            tracing::warn!(status = %self.status, code = %self.code, error = %self.message, "API error");
        } else {
            tracing::error!(status = %self.status, code = %self.code, error = %self.message, "Internal API error");
        }

        (
            self.status,
            Json(ErrorBody {
                success: false,
                code: self.code,
                message: exposed_message,
                trace_id: None,
            }),
        )
            .into_response()
    }
}

// StoreError 映射：
// - Validation -> 400（用户输入问题，消息可暴露）
// - Serialization -> 409 STORE_CORRUPT（存储内容无法解析，拒绝覆盖）
// - 其他 -> 500（消息在 IntoResponse 中替换为通用文案）
impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        match &value {
            StoreError::Validation(msg) => AppError::bad_request("VALIDATION_ERROR", msg),
            StoreError::NotFound { entity, key } => AppError::not_found(&format!("{entity} '{key}' not found")),
            StoreError::Serialization(_) => AppError::operational(
                StatusCode::CONFLICT,
                "STORE_CORRUPT",
                "Stored data could not be read and was left untouched",
            ),
            _ => AppError::internal(&value.to_string()),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(value: GatewayError) -> Self {
        match &value {
            e if e.is_timeout() => AppError::gateway_timeout(&value.to_string()),
            GatewayError::Disabled => AppError::service_unavailable("GATEWAY_DISABLED", &value.to_string()),
            GatewayError::Unsupported(_) => AppError::bad_request("UNSUPPORTED_COLLECTION", &value.to_string()),
            _ => AppError::bad_gateway(&value.to_string()),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(value: EngineError) -> Self {
        match value {
            EngineError::Store(e) => e.into(),
            EngineError::Gateway(e) => e.into(),
            EngineError::ItemNotFound { .. } => AppError::not_found(&value.to_string()),
            EngineError::NotRefreshable(_) => AppError::bad_request("NOT_REFRESHABLE", &value.to_string()),
        }
    }
}

impl From<RecognitionError> for AppError {
    fn from(value: RecognitionError) -> Self {
        match value {
            RecognitionError::EmptyDrawing => AppError::bad_request("EMPTY_DRAWING", &value.to_string()),
            RecognitionError::Gateway(e) => e.into(),
        }
    }
}

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}
