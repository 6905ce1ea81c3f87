// ============================================================================
// ERRORS - Client error taxonomy
// ============================================================================
// Nothing here is fatal: the worst outcome is a return to the login view.
// ============================================================================

use std::fmt;
use thiserror::Error;
use validator::ValidationErrors;

/// One rejected form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Client-side input shape rejected before any network call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormError {
    pub fields: Vec<FieldError>,
}

impl FormError {
    pub fn single(field: &str, message: &str) -> Self {
        Self {
            fields: vec![FieldError {
                field: field.to_string(),
                message: message.to_string(),
            }],
        }
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.fields.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First message for a given field, for inline display next to the input
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.message.as_str())
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.fields.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for FormError {}

impl From<ValidationErrors> for FormError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", field)),
                })
            })
            .collect();
        // field_errors() is a HashMap: sort so messages render in a stable order
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        Self { fields }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// Bad login/register input, user-correctable
    #[error("{0}")]
    InvalidCredentials(String),

    /// Stored token rejected by the server
    #[error("session validation failed: {0}")]
    ValidationFailed(String),

    /// Authorization rejected (HTTP 401). Global state is already cleared
    /// by the time a caller sees this.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("network error: {0}")]
    NetworkFailure(String),

    /// Non-2xx, non-401 response, an undecodable body, or `success: false`
    #[error("server error: {message}")]
    ServerError { status: Option<u16>, message: String },

    #[error("{0}")]
    FormValidation(#[from] FormError),

    /// The session changed while the request was in flight; the response was dropped
    #[error("response discarded: session changed while the request was in flight")]
    Superseded,
}

impl ClientError {
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Message shown inline next to a form or in a banner
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials(message) => message.clone(),
            Self::ValidationFailed(_) | Self::Unauthorized(_) => {
                "Your session has expired. Please sign in again.".to_string()
            }
            Self::NetworkFailure(_) => {
                "Unable to reach the server. Check your connection and try again.".to_string()
            }
            Self::ServerError { message, .. } if !message.is_empty() => message.clone(),
            Self::ServerError { .. } => "Something went wrong. Please try again.".to_string(),
            Self::FormValidation(form) => form.to_string(),
            Self::Superseded => "Your session changed. Please try again.".to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
