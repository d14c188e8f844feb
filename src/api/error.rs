use thiserror::Error;

/// Failure of a backend call, classified by how the client must react
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the bearer credential (HTTP 401)
    #[error("authentication rejected by the server")]
    Unauthorized,

    /// Any other non-success status; `message` is the backend's own text if it sent one
    #[error("request failed with status {status}{}", message_suffix(.message))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// The request never produced an HTTP response
    #[error("network error: {0}")]
    Network(String),

    /// A response arrived but its body was not what the caller expected
    #[error("could not decode response: {0}")]
    Decode(String),
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Text to show the user. Backend-provided messages win over `fallback`.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            ApiError::Rejected {
                message: Some(m), ..
            } if !m.trim().is_empty() => m.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_message_prefers_backend_text() {
        let err = ApiError::Rejected {
            status: 409,
            message: Some("You already applied to this job".to_string()),
        };
        assert_eq!(err.display_message("Failed"), "You already applied to this job");
    }

    #[test]
    fn test_display_message_fallbacks() {
        let blank = ApiError::Rejected {
            status: 500,
            message: Some("  ".to_string()),
        };
        assert_eq!(blank.display_message("Failed to post job"), "Failed to post job");
        let net = ApiError::Network("connection refused".to_string());
        assert_eq!(net.display_message("Failed to post job"), "Failed to post job");
        assert!(ApiError::Unauthorized.display_message("x").contains("log in"));
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Rejected {
            status: 400,
            message: Some("bad".to_string()),
        };
        assert_eq!(err.to_string(), "request failed with status 400: bad");
        let err = ApiError::Rejected {
            status: 502,
            message: None,
        };
        assert_eq!(err.to_string(), "request failed with status 502");
    }
}
