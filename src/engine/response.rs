//! Response interpretation and normalization.
//!
//! Everything here is pure: the same status/body always yields the same outcome.

use crate::error::AnalysisError;
use crate::model::{AnalysisResult, CompletedAnalysis, UploadResponse};
use serde_json::Value;

pub const UNKNOWN_FILENAME: &str = "unknown";
pub const GENERIC_SUCCESS_MESSAGE: &str = "Upload succeeded";
const UPLOADS_SEGMENT: &str = "/uploads/";

/// Strip exactly one trailing slash from the configured base URL.
pub fn normalize_base_url(base: &str) -> &str {
    base.strip_suffix('/').unwrap_or(base)
}

/// Display reference for an annotated asset: `{base}/uploads/{id}`.
pub fn annotated_reference(base: &str, annotated: &str) -> String {
    format!("{}{}{}", normalize_base_url(base), UPLOADS_SEGMENT, annotated)
}

/// Map an HTTP status and raw body onto a parsed response or a typed failure.
pub fn interpret_reply(status: u16, body: &str) -> Result<UploadResponse, AnalysisError> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        return Err(AnalysisError::Rejected {
            status,
            message: parsed.as_ref().and_then(error_message),
        });
    }

    let value = parsed.ok_or_else(|| AnalysisError::Malformed("body is not JSON".into()))?;
    if !value.is_object() {
        return Err(AnalysisError::Malformed("body is not a JSON object".into()));
    }
    serde_json::from_value(value).map_err(|e| AnalysisError::Malformed(e.to_string()))
}

/// Prefer `message`; FastAPI-style errors carry a string `detail` instead.
fn error_message(body: &Value) -> Option<String> {
    ["message", "detail"]
        .iter()
        .filter_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_string)
}

/// Turn a successful response into the result/timeline pair shown to the user.
pub fn normalize(resp: &UploadResponse, base_url: &str) -> CompletedAnalysis {
    let message = resp
        .message
        .clone()
        .unwrap_or_else(|| GENERIC_SUCCESS_MESSAGE.to_string());
    let annotated_video_reference = resp
        .annotated
        .as_deref()
        .filter(|a| !a.is_empty())
        .map(|a| annotated_reference(base_url, a));

    let availability = if annotated_video_reference.is_some() {
        "annotated video available"
    } else {
        "no annotated video"
    };

    CompletedAnalysis {
        result: AnalysisResult {
            source_filename: resp
                .filename
                .clone()
                .unwrap_or_else(|| UNKNOWN_FILENAME.to_string()),
            status_message: format!("{message} ({availability})"),
            annotated_video_reference,
            completed_at: None,
        },
        keypoints: resp.keypoints.clone().unwrap_or_default(),
    }
}
