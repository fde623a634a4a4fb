use crate::config::ConfigError;
use crate::isolation::{IsolationError, PoolError};
use crate::suite::SeedError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Isolation(IsolationError),
    Pool(PoolError),
    Seed(SeedError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Isolation(err) => write!(f, "{}", err),
            AppError::Pool(err) => write!(f, "connection pool error: {}", err),
            AppError::Seed(err) => write!(f, "seed error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Isolation(err) => Some(err),
            AppError::Pool(err) => Some(err),
            AppError::Seed(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Isolation(err) | AppError::Seed(SeedError::Isolation(err)) => match err {
                IsolationError::Auth(_) => StatusCode::UNAUTHORIZED,
                IsolationError::TenantMismatch { .. } => StatusCode::FORBIDDEN,
                IsolationError::NotFoundOrForbidden { .. } => StatusCode::NOT_FOUND,
                IsolationError::Conflict { .. } => StatusCode::CONFLICT,
                IsolationError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Pool(PoolError::Exhausted { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Seed(SeedError::EmptyRoster(_) | SeedError::DateOutOfRange { .. }) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Pool(PoolError::Poisoned)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::NOT_FOUND {
            "record not found".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<IsolationError> for AppError {
    fn from(value: IsolationError) -> Self {
        Self::Isolation(value)
    }
}

impl From<PoolError> for AppError {
    fn from(value: PoolError) -> Self {
        Self::Pool(value)
    }
}

impl From<SeedError> for AppError {
    fn from(value: SeedError) -> Self {
        Self::Seed(value)
    }
}
