use thiserror::Error;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Token missing from response")]
    MalformedResponse,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Callback error: {0}")]
    Callback(String),

    #[error("A token exchange is already running")]
    ExchangeInProgress,
}

impl OAuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            OAuthError::MissingField(_) => "Fill in every required field and try again.",
            OAuthError::Http { status: 400, .. } => {
                "Shopify rejected the code. It may be expired or already used."
            }
            OAuthError::Http { status: 401 | 403, .. } => {
                "Shopify rejected the credentials. Check the client ID and secret."
            }
            OAuthError::Http { .. } => "Shopify returned an error. Check the details and retry.",
            OAuthError::MalformedResponse => "Shopify answered without an access token.",
            OAuthError::Network(_) => "Network error. Check your connection.",
            OAuthError::InvalidUrl(_) => "The shop domain does not form a valid URL.",
            OAuthError::Callback(_) => "Could not receive the redirect. Paste the code instead.",
            OAuthError::ExchangeInProgress => "Wait for the running exchange to finish.",
        }
    }
}

pub type OAuthResult<T> = Result<T, OAuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_keeps_status_and_body_in_display() {
        let err = OAuthError::Http {
            status: 401,
            body: "invalid_client".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401: invalid_client");
        assert!(err.user_message().contains("credentials"));
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = OAuthError::MissingField("client_id");
        assert_eq!(err.to_string(), "Missing required field: client_id");
    }
}
