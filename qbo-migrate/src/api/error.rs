//! Errors surfaced by the tenant API

use super::models::EntityType;

/// QuickBooks fault code for "Object Not Found"
const OBJECT_NOT_FOUND_CODE: &str = "610";

/// Error returned by a tenant API call
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The requested record does not exist in the tenant
    NotFound { entity: EntityType, id: String },
    /// Structured rejection from the vendor API
    Fault {
        status: Option<u16>,
        message: String,
        error_code: Option<String>,
        detail: Option<String>,
        intuit_tid: Option<String>,
    },
    /// Network or protocol failure before a response was read
    Transport(String),
    /// Response body could not be interpreted
    Decode(String),
    /// Missing or rejected credentials
    Auth(String),
}

impl ApiError {
    /// Build a fault from its parts
    pub fn fault(
        message: impl Into<String>,
        error_code: Option<String>,
        detail: Option<String>,
    ) -> Self {
        ApiError::Fault {
            status: None,
            message: message.into(),
            error_code,
            detail,
            intuit_tid: None,
        }
    }

    /// Parse a QuickBooks `Fault` body, falling back to the raw text
    ///
    /// Code 610 on a read is reported as `NotFound` by the caller via
    /// [`ApiError::into_not_found`].
    pub fn from_response(status: u16, body: &str, intuit_tid: Option<String>) -> Self {
        let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
        let first_error = parsed.as_ref().and_then(|json| {
            json.get("Fault")
                .or_else(|| json.get("fault"))
                .and_then(|fault| fault.get("Error").or_else(|| fault.get("error")))
                .and_then(|errors| errors.as_array())
                .and_then(|errors| errors.first())
                .cloned()
        });

        if status == 401 {
            return ApiError::Auth(format!("Unauthorized (401): {}", body.trim()));
        }

        match first_error {
            Some(error) => {
                let text = |key: &str| {
                    error
                        .get(key)
                        .and_then(|v| v.as_str())
                        .map(|s| s.to_string())
                };
                ApiError::Fault {
                    status: Some(status),
                    message: text("Message")
                        .or_else(|| text("message"))
                        .unwrap_or_else(|| format!("HTTP {}", status)),
                    error_code: text("code"),
                    detail: text("Detail").or_else(|| text("detail")),
                    intuit_tid,
                }
            }
            None => ApiError::Fault {
                status: Some(status),
                message: format!("HTTP {}", status),
                error_code: None,
                detail: Some(body.trim().to_string()).filter(|s| !s.is_empty()),
                intuit_tid,
            },
        }
    }

    /// Convert an "Object Not Found" fault into `NotFound` for a read
    pub fn into_not_found(self, entity: EntityType, id: &str) -> Self {
        match &self {
            ApiError::Fault {
                status, error_code, ..
            } if *status == Some(404)
                || error_code.as_deref() == Some(OBJECT_NOT_FOUND_CODE) =>
            {
                ApiError::NotFound {
                    entity,
                    id: id.to_string(),
                }
            }
            _ => self,
        }
    }

    /// Vendor error code, when this is a structured fault
    pub fn error_code(&self) -> Option<&str> {
        match self {
            ApiError::Fault { error_code, .. } => error_code.as_deref(),
            _ => None,
        }
    }

    /// Vendor error detail, when this is a structured fault
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Fault { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Log a rejection with all structured parts, one line each
    pub fn log_rejection(&self, subject: &str) {
        match self {
            ApiError::Fault {
                message,
                error_code,
                detail,
                intuit_tid,
                ..
            } => {
                log::error!("QuickBooks API error for {}:", subject);
                log::error!("  Message: {}", message);
                log::error!(
                    "  Error Code: {}",
                    error_code.as_deref().unwrap_or("Unknown")
                );
                log::error!("  Detail: {}", detail.as_deref().unwrap_or(""));
                if let Some(tid) = intuit_tid {
                    log::error!("  Intuit TID: {}", tid);
                }
            }
            other => log::error!("Unexpected error for {}: {}", subject, other),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound { entity, id } => {
                write!(f, "{} with id '{}' not found", entity, id)
            }
            ApiError::Fault {
                message,
                error_code,
                detail,
                ..
            } => {
                write!(f, "{}", message)?;
                if let Some(code) = error_code {
                    write!(f, " (code {})", code)?;
                }
                if let Some(detail) = detail {
                    write!(f, ": {}", detail)?;
                }
                Ok(())
            }
            ApiError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ApiError::Decode(msg) => write!(f, "Failed to decode response: {}", msg),
            ApiError::Auth(msg) => write!(f, "Authentication error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
