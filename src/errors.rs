use crate::email::DeliveryError;
use crate::storage::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

/// Application-wide error types with user-friendly messages
#[derive(Debug)]
pub enum AppError {
    // Validation Errors
    InvalidInput { field: String, message: String },
    DuplicateResource { resource: String },
    ResourceNotFound { resource: String },
    NothingToSend,

    // Storage Errors
    StorageError { operation: String, cause: String },

    // External Service Errors
    EmailDelivery { reason: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidInput { field, message } => {
                write!(f, "Invalid {}: {}", field, message)
            }
            AppError::DuplicateResource { resource } => write!(f, "{} already exists", resource),
            AppError::ResourceNotFound { resource } => write!(f, "{} not found", resource),
            AppError::NothingToSend => write!(f, "No scheduled articles to send"),

            AppError::StorageError { operation, .. } => write!(f, "Failed to {}", operation),

            AppError::EmailDelivery { reason } => write!(f, "{}", reason),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput { .. }
            | AppError::DuplicateResource { .. }
            | AppError::NothingToSend => StatusCode::BAD_REQUEST,
            AppError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::StorageError { .. }
            | AppError::EmailDelivery { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput { .. } => "INVALID_INPUT",
            AppError::DuplicateResource { .. } => "DUPLICATE_RESOURCE",
            AppError::ResourceNotFound { .. } => "RESOURCE_NOT_FOUND",
            AppError::NothingToSend => "NOTHING_TO_SEND",
            AppError::StorageError { .. } => "STORAGE_ERROR",
            AppError::EmailDelivery { .. } => "EMAIL_DELIVERY_FAILED",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();

        if status.is_server_error() {
            log::error!("Server error: {:?}", self);
        } else {
            log::info!("Client error: {:?}", self);
        }

        HttpResponse::build(status).json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string()
            }
        }))
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn invalid_input(field: &str, message: &str) -> Self {
        AppError::InvalidInput {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn duplicate_resource(resource: &str) -> Self {
        AppError::DuplicateResource {
            resource: resource.to_string(),
        }
    }

    pub fn resource_not_found(resource: &str) -> Self {
        AppError::ResourceNotFound {
            resource: resource.to_string(),
        }
    }
}

/// The backend cause stays out of the response but is logged with it
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::StorageError {
            operation: err.operation.to_string(),
            cause: err.source.to_string(),
        }
    }
}

impl From<DeliveryError> for AppError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::NoArticles => AppError::NothingToSend,
            other => AppError::EmailDelivery {
                reason: other.to_string(),
            },
        }
    }
}
