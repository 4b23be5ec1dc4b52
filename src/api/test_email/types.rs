use crate::email::DeliveryError;
use crate::errors::AppError;
use crate::storage::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestEmailRequest {
    pub user_email: Option<String>,
    pub test_user_id: Option<String>,
}

impl TestEmailRequest {
    /// An empty or unreadable body is the same as `{}`.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    pub fn recipient(&self) -> Option<&str> {
        self.user_email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }

    pub fn user_id(&self) -> Option<&str> {
        self.test_user_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestEmailDetails {
    pub recipient: String,
    pub article_count: usize,
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    pub provider: &'static str,
    pub domain: String,
}

#[derive(Debug, Serialize)]
pub struct TestEmailResponse {
    pub success: bool,
    pub message: &'static str,
    pub details: TestEmailDetails,
}

/// Failures of the test-email endpoint. Unlike `AppError` these render as a
/// flat `{ "error": ... }` body.
#[derive(Debug)]
pub enum TestEmailError {
    MissingEmail,
    InvalidEmail,
    SendFailed(DeliveryError),
    Internal(String),
}

impl fmt::Display for TestEmailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestEmailError::MissingEmail => write!(f, "User email is required"),
            TestEmailError::InvalidEmail => write!(f, "Invalid email address"),
            TestEmailError::SendFailed(err) => write!(f, "Failed to send test email: {}", err),
            TestEmailError::Internal(_) => write!(f, "Internal server error"),
        }
    }
}

impl From<StoreError> for TestEmailError {
    fn from(err: StoreError) -> Self {
        TestEmailError::Internal(AppError::from(err).to_string())
    }
}

impl ResponseError for TestEmailError {
    fn status_code(&self) -> StatusCode {
        match self {
            TestEmailError::MissingEmail | TestEmailError::InvalidEmail => StatusCode::BAD_REQUEST,
            TestEmailError::SendFailed(_) | TestEmailError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            TestEmailError::Internal(details) => {
                log::error!("Error sending test email: {}", details);
                json!({ "error": self.to_string(), "details": details })
            }
            TestEmailError::SendFailed(err) => {
                log::error!("Test email was not sent: {}", err);
                json!({ "error": self.to_string() })
            }
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
