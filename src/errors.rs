use serde::Serialize;

/// Where the UI should send the user after an authentication failure.
///
/// 401 means the session is missing or expired and the user must log in
/// again; 403 means the session is valid but lacks privileges, so the user
/// is sent back to a non-privileged page instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthRedirect {
    Login,
    Home,
}

/// Error taxonomy for the storefront client.
///
/// Every failure a store operation can hit maps onto exactly one variant,
/// and `user_message` is the single source of truth for what the UI shows.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    /// Session cookie missing or expired (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Session valid but not allowed to perform the operation (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Non-2xx response carrying the server's own message.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Rejected locally before any request was issued.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Payment step failed after the order was created. The order persists
    /// server-side in an unpaid state; only the payment step is retryable.
    #[error("payment failed: {0}")]
    PaymentFailed(String),

    #[error("unexpected response shape: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::Validation(first_validation_message(&err))
    }
}

/// Pulls the first human-readable message out of a set of validation
/// failures, for the single-line form banner.
pub fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(_, errs)| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| "Invalid input".to_string())
}

impl ClientError {
    /// Redirect target for auth failures; `None` for everything else.
    pub fn auth_redirect(&self) -> Option<AuthRedirect> {
        match self {
            Self::Unauthorized => Some(AuthRedirect::Login),
            Self::Forbidden => Some(AuthRedirect::Home),
            _ => None,
        }
    }

    /// The message shown in the UI banner for this error.
    ///
    /// Transport-level failures get a generic retry prompt; server
    /// rejections surface the server's message verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) | Self::Timeout => "Network error. Please try again.".to_string(),
            Self::Unauthorized => "Please log in to continue.".to_string(),
            Self::Forbidden => "You do not have access to this page.".to_string(),
            Self::Serialization(_) => "Unexpected server response. Please try again.".to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::Validation(msg) | Self::InvalidOperation(msg) | Self::PaymentFailed(msg) => {
                msg.clone()
            }
        }
    }
}
