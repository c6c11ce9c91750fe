use thiserror::Error;

/// Substrings the generation service puts in overload, rate-limit and deadline failures.
const TRANSIENT_MARKERS: &[&str] = &[
    "503",
    "429",
    "504",
    "overloaded",
    "unavailable",
    "resource_exhausted",
    "deadline_exceeded",
    "deadline exceeded",
    "rate limit",
    "quota",
];

#[derive(Debug, Error)]
pub enum RevealError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InputError(String),

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("Service returned {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("No image was produced by the model")]
    NoImageProduced,

    #[error("{0}")]
    OperationFailed(String),

    #[error("Video generation timed out, please try again")]
    Timeout,

    #[error("Transcode error: {0}")]
    TranscodeError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl RevealError {
    /// Whether the failure looks like temporary remote unavailability
    /// (overload, rate limiting, deadline exceeded).
    pub fn is_transient(&self) -> bool {
        match self {
            RevealError::HttpStatus { status, body } => {
                matches!(status, 429 | 503 | 504) || contains_transient_marker(body)
            }
            RevealError::RequestError(msg)
            | RevealError::ResponseError(msg)
            | RevealError::OperationFailed(msg)
            | RevealError::InternalError(msg) => contains_transient_marker(msg),
            _ => false,
        }
    }
}

fn contains_transient_marker(description: &str) -> bool {
    let lowered = description.to_ascii_lowercase();
    TRANSIENT_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

impl From<reqwest::Error> for RevealError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the credential as a query parameter.
        let err = err.without_url();
        if let Some(status) = err.status() {
            return RevealError::HttpStatus {
                status: status.as_u16(),
                body: err.to_string(),
            };
        }
        if err.is_timeout() {
            return RevealError::RequestError(format!("deadline exceeded: {}", err));
        }
        RevealError::RequestError(err.to_string())
    }
}

impl From<image::ImageError> for RevealError {
    fn from(err: image::ImageError) -> Self {
        RevealError::TranscodeError(err.to_string())
    }
}

impl From<gif::EncodingError> for RevealError {
    fn from(err: gif::EncodingError) -> Self {
        RevealError::TranscodeError(format!("GIF encoding failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, RevealError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overload_statuses_are_transient() {
        for status in [429, 503, 504] {
            let err = RevealError::HttpStatus {
                status,
                body: String::new(),
            };
            assert!(err.is_transient(), "status {} should be transient", status);
        }
    }

    #[test]
    fn transient_markers_match_case_insensitively() {
        let err = RevealError::RequestError("The model is OVERLOADED right now".into());
        assert!(err.is_transient());

        let err = RevealError::OperationFailed("RESOURCE_EXHAUSTED: quota hit".into());
        assert!(err.is_transient());
    }

    #[test]
    fn permanent_failures_are_not_transient() {
        let err = RevealError::HttpStatus {
            status: 400,
            body: "INVALID_ARGUMENT: prompt blocked".into(),
        };
        assert!(!err.is_transient());
        assert!(!RevealError::NoImageProduced.is_transient());
        assert!(!RevealError::Timeout.is_transient());
        assert!(!RevealError::InputError("503 in user text".into()).is_transient());
    }

    #[test]
    fn timeout_message_asks_to_retry() {
        assert!(RevealError::Timeout.to_string().contains("try again"));
    }
}
