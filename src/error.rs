use thiserror::Error;

/// Generic texts used when the service gives us nothing better to show.
pub const GENERIC_UPLOAD_FAILURE: &str = "Upload failed";
pub const GENERIC_TRANSPORT_FAILURE: &str = "Upload failed: analysis service unreachable";

/// Failures of a single submission. All of them are recoverable by retrying.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("could not read video {path}: {source}")]
    VideoUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service rejected upload (HTTP {status}): {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    #[error("malformed service response: {0}")]
    Malformed(String),
}

impl AnalysisError {
    /// Text stored as the session's `last_error`.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::VideoUnreadable { path, .. } => {
                format!("{GENERIC_UPLOAD_FAILURE}: could not read {path}")
            }
            AnalysisError::Transport(_) => GENERIC_TRANSPORT_FAILURE.to_string(),
            AnalysisError::Rejected {
                message: Some(m), ..
            } => m.clone(),
            AnalysisError::Rejected { message: None, .. } | AnalysisError::Malformed(_) => {
                GENERIC_UPLOAD_FAILURE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_prefers_service_message() {
        let err = AnalysisError::Rejected {
            status: 422,
            message: Some("bad codec".into()),
        };
        assert_eq!(err.user_message(), "bad codec");
    }

    #[test]
    fn malformed_falls_back_to_generic_text() {
        let err = AnalysisError::Malformed("not json".into());
        assert_eq!(err.user_message(), GENERIC_UPLOAD_FAILURE);
        let err = AnalysisError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(), GENERIC_UPLOAD_FAILURE);
    }
}
