//! Text and JSON summaries for non-interactive output.

use crate::format::landmark_line;
use crate::metrics::{PERFORMANCE_METRICS, RECOMMENDATIONS};
use crate::model::{AnalysisResult, KeypointTimeline};
use crate::orchestrator::Session;
use serde::Serialize;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Build a text summary of a finished session.
pub(crate) fn build_text_summary(session: &Session) -> TextSummary {
    let mut lines = Vec::new();

    if let Some(video) = session.selected_video() {
        lines.push(format!("Video: {}", video.display_name));
    }
    lines.push(format!("Status: {}", session.status_message()));
    if let Some(err) = session.last_error() {
        lines.push(format!("Error: {err}"));
    }

    let Some(result) = session.result() else {
        return TextSummary { lines };
    };

    lines.push(format!("Stored as: {}", result.source_filename));
    match result.annotated_video_reference.as_deref() {
        Some(uri) => lines.push(format!("Annotated video: {uri}")),
        None => lines.push("Annotated video: not available".to_string()),
    }

    let frames = session.keypoints();
    lines.push(format!("Keypoint frames: {}", frames.len()));
    let preview = session.keypoint_preview();
    if !preview.is_empty() {
        let total = frames.first().map(Vec::len).unwrap_or(0);
        lines.push(format!(
            "Frame 1 ({} of {} landmarks):",
            preview.len(),
            total
        ));
        lines.extend(preview.iter().map(|l| format!("  {}", landmark_line(l))));
    }

    lines.push("Performance:".to_string());
    for m in PERFORMANCE_METRICS {
        lines.push(format!("  {:<16} {:>3}%", m.label, m.percent));
    }
    lines.push("Recommendations:".to_string());
    lines.extend(RECOMMENDATIONS.iter().map(|r| format!("  - {r}")));

    TextSummary { lines }
}

/// Serializable view of a session for `--json`.
#[derive(Debug, Serialize)]
pub(crate) struct JsonReport<'a> {
    pub video: Option<&'a str>,
    pub status: &'a str,
    pub last_error: Option<&'a str>,
    pub result: Option<&'a AnalysisResult>,
    pub keypoints: KeypointTimeline,
}

impl<'a> JsonReport<'a> {
    pub fn from_session(session: &'a Session) -> Self {
        Self {
            video: session.selected_video().map(|v| v.display_name.as_str()),
            status: session.status_message(),
            last_error: session.last_error(),
            result: session.result(),
            keypoints: session.timeline(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::response::interpret_reply;
    use crate::model::SelectedVideo;

    fn finished(status: u16, body: &str) -> Session {
        let mut s = Session::new();
        s.select_file(Some(SelectedVideo::new("/v/clip.mov", "clip.mov")));
        let t = s.submit().unwrap();
        s.complete(&t, interpret_reply(status, body), "http://host:8000");
        s
    }

    #[test]
    fn success_summary_lists_keypoints_and_metrics() {
        let s = finished(
            200,
            r#"{"filename":"clip.mov","message":"ok","annotated":"out.mp4",
                "keypoints":[[{"name":"left_knee","x":0.4,"y":0.6,"visibility":0.92}]]}"#,
        );
        let lines = build_text_summary(&s).lines;
        assert!(lines.contains(&"Annotated video: http://host:8000/uploads/out.mp4".to_string()));
        assert!(lines.iter().any(|l| l.contains("left knee") && l.contains("92%")));
        assert!(lines.iter().any(|l| l.contains("Balance")));
    }

    #[test]
    fn failure_summary_shows_error_only() {
        let s = finished(400, r#"{"message":"bad codec"}"#);
        let lines = build_text_summary(&s).lines;
        assert!(lines.contains(&"Error: bad codec".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("Performance")));
    }

    #[test]
    fn json_report_keeps_full_timeline() {
        let s = finished(
            200,
            r#"{"keypoints":[[{"name":"NOSE","x":0.5,"y":0.1,"visibility":1.0}],[]]}"#,
        );
        let v = serde_json::to_value(JsonReport::from_session(&s)).unwrap();
        assert_eq!(v["keypoints"].as_array().unwrap().len(), 2);
        assert_eq!(v["result"]["source_filename"], "unknown");
        assert_eq!(v["video"], "clip.mov");
    }
}
