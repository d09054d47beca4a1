// Mapping of use-case errors onto HTTP responses
use crate::application::aggregate_service::AggregateError;
use crate::application::config_service::ConfigEditError;
use crate::application::gateway::GatewayError;
use crate::application::script_service::ScriptServiceError;
use crate::domain::script::ScriptError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "error": self.message });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(error: GatewayError) -> Self {
        let status = match &error {
            GatewayError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::InvalidPort(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unreachable(_) | GatewayError::Status { .. } | GatewayError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        Self::new(status, error.to_string())
    }
}

impl From<AggregateError> for ApiError {
    fn from(error: AggregateError) -> Self {
        match error {
            AggregateError::InvalidKey(e) => Self::new(StatusCode::BAD_REQUEST, e.to_string()),
            AggregateError::Gateway(e) => e.into(),
        }
    }
}

impl From<ScriptServiceError> for ApiError {
    fn from(error: ScriptServiceError) -> Self {
        match error {
            ScriptServiceError::Invalid(e @ ScriptError::NotFound(_)) => {
                Self::new(StatusCode::NOT_FOUND, e.to_string())
            }
            ScriptServiceError::Invalid(e) => Self::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ScriptServiceError::Gateway(e) => e.into(),
        }
    }
}

impl From<ConfigEditError> for ApiError {
    fn from(error: ConfigEditError) -> Self {
        match error {
            ConfigEditError::Invalid(diagnostics) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "configuration is not valid JSON")
                    .with_details(json!(diagnostics))
            }
            ConfigEditError::Unchanged => Self::new(StatusCode::CONFLICT, "configuration is unchanged"),
            ConfigEditError::Gateway(e) => e.into(),
        }
    }
}
