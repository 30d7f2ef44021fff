use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Resolved service/client configuration, built once from CLI arguments.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

/// A locally selected video: the opaque reference plus the name shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedVideo {
    pub path: PathBuf,
    pub display_name: String,
}

impl SelectedVideo {
    pub fn new(path: impl Into<PathBuf>, display_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            display_name: display_name.into(),
        }
    }

    /// Media type declared for the multipart part, inferred from the extension.
    pub fn media_type(&self) -> &'static str {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("mp4") => "video/mp4",
            Some("m4v") => "video/x-m4v",
            Some("mov") | Some("qt") => "video/quicktime",
            Some("webm") => "video/webm",
            Some("mkv") => "video/x-matroska",
            Some("avi") => "video/x-msvideo",
            Some("3gp") => "video/3gpp",
            _ => "video/*",
        }
    }
}

/// One named landmark of a sampled frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub visibility: f64,
}

pub type KeypointFrame = Vec<Landmark>;
pub type KeypointTimeline = Vec<KeypointFrame>;

/// Raw `POST /upload` response body. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub annotated: Option<String>,
    #[serde(default)]
    pub keypoints: Option<KeypointTimeline>,
}

/// Normalized outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub source_filename: String,
    pub status_message: String,
    pub annotated_video_reference: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// AnalysisResult and its timeline always travel together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedAnalysis {
    pub result: AnalysisResult,
    pub keypoints: KeypointTimeline,
}

/// Tags an in-flight request with the selection it was issued against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    pub id: u64,
    pub video: SelectedVideo,
}

/// Snapshot-based events emitted by the controller for presentation layers.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Updated {
        // Box to keep SessionEvent small; the session carries the whole timeline.
        session: Box<crate::orchestrator::Session>,
    },
    Info(InfoEvent),
}

/// Structured info events consumed by UI/CLI layers.
#[derive(Debug, Clone)]
pub enum InfoEvent {
    Message(String),
    RequestIssued { ticket: u64, video: String },
    StaleDiscarded { ticket: u64 },
    SubmitIgnored,
}

impl InfoEvent {
    /// Render a human-readable message for UI/CLI layers.
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::Message(msg) => msg.clone(),
            InfoEvent::RequestIssued { ticket, video } => {
                format!("Uploading {} (request #{})", video, ticket)
            }
            InfoEvent::StaleDiscarded { ticket } => {
                format!("Discarded late response for abandoned request #{}", ticket)
            }
            InfoEvent::SubmitIgnored => {
                "Nothing to submit: select a video or wait for the running upload".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_follows_extension() {
        assert_eq!(SelectedVideo::new("a/clip.MOV", "clip.MOV").media_type(), "video/quicktime");
        assert_eq!(SelectedVideo::new("clip.mp4", "clip.mp4").media_type(), "video/mp4");
        assert_eq!(SelectedVideo::new("clip", "clip").media_type(), "video/*");
    }

    #[test]
    fn upload_response_tolerates_missing_fields() {
        let parsed: UploadResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, UploadResponse::default());
    }
}
