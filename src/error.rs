// src/error.rs

/// Errors surfaced by the classifier and conversation clients.
#[derive(Debug, thiserror::Error)]
pub enum NlcError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Watson API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NlcError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// HTTP status of a rejected request, if the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type NlcResult<T> = Result<T, NlcError>;

/// Turn a non-2xx reply into `NlcError::Api`, otherwise decode the JSON body.
pub(crate) async fn json_or_api_error(response: reqwest::Response) -> NlcResult<serde_json::Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(NlcError::Api {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(serde_json::Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_keeps_body() {
        let err = NlcError::Api {
            status: 404,
            body: r#"{"error":"Not found"}"#.to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("Not found"));
    }

    #[test]
    fn test_non_http_errors_have_no_status() {
        assert_eq!(NlcError::invalid_argument("x").status(), None);
        assert_eq!(NlcError::format("x").status(), None);
    }
}
