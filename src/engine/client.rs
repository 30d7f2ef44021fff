use super::response::{interpret_reply, normalize_base_url};
use super::AnalysisService;
use crate::error::AnalysisError;
use crate::model::{SelectedVideo, ServiceConfig, UploadResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};

/// HTTP client for the analysis backend.
#[derive(Clone)]
pub struct AnalysisClient {
    pub http: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(cfg: &ServiceConfig) -> Result<Self> {
        // No overall request timeout: analysis can take as long as the video is long.
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(cfg.connect_timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.clone(),
        })
    }

    pub fn upload_url(&self) -> String {
        format!("{}/upload", normalize_base_url(&self.base_url))
    }

    async fn build_form(video: &SelectedVideo) -> Result<Form, AnalysisError> {
        let bytes = tokio::fs::read(&video.path)
            .await
            .map_err(|source| AnalysisError::VideoUnreadable {
                path: video.path.display().to_string(),
                source,
            })?;
        debug!(bytes = bytes.len(), media_type = video.media_type(), "read video for upload");

        let part = Part::bytes(bytes)
            .file_name(video.display_name.clone())
            .mime_str(video.media_type())?;
        Ok(Form::new().part("file", part))
    }
}

#[async_trait]
impl AnalysisService for AnalysisClient {
    async fn upload(&self, video: &SelectedVideo) -> Result<UploadResponse, AnalysisError> {
        let form = Self::build_form(video).await?;
        let url = self.upload_url();
        info!(%url, video = %video.display_name, "submitting video");

        // `multipart` sets the content-type including the boundary; do not override it.
        let resp = self.http.post(&url).multipart(form).send().await.map_err(|e| {
            warn!(error = %e, "upload request failed");
            AnalysisError::Transport(e)
        })?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        debug!(status, body_len = body.len(), "upload response received");
        interpret_reply(status, &body)
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GENERIC_TRANSPORT_FAILURE;
    use crate::orchestrator::{run_single_submission, SessionPhase};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn cfg(base: &str) -> ServiceConfig {
        ServiceConfig {
            base_url: base.to_string(),
            connect_timeout: Duration::from_secs(1),
            user_agent: "test".into(),
        }
    }

    #[test]
    fn upload_url_strips_trailing_slash() {
        let client = AnalysisClient::new(&cfg("http://host:8000/")).unwrap();
        assert_eq!(client.upload_url(), "http://host:8000/upload");
        let client = AnalysisClient::new(&cfg("http://host:8000")).unwrap();
        assert_eq!(client.upload_url(), "http://host:8000/upload");
    }

    #[tokio::test]
    async fn unreadable_video_is_reported_before_any_request() {
        let client = AnalysisClient::new(&cfg("http://127.0.0.1:9")).unwrap();
        let video = SelectedVideo::new("/definitely/not/here.mp4", "here.mp4");
        let err = client.upload(&video).await.unwrap_err();
        assert!(matches!(err, AnalysisError::VideoUnreadable { .. }));
    }

    fn header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    fn request_complete(buf: &[u8]) -> bool {
        let Some(end) = header_end(buf) else {
            return false;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        if head.contains("transfer-encoding: chunked") {
            return buf.ends_with(b"0\r\n\r\n");
        }
        let len = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        buf.len() >= end + 4 + len
    }

    /// Accept one connection, answer it with `status` and `body`, and hand back the raw request.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            while !request_complete(&buf) {
                let n = sock.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let reply = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(reply.as_bytes()).await.unwrap();
            let _ = sock.shutdown().await;
            String::from_utf8_lossy(&buf).into_owned()
        });
        (base, handle)
    }

    fn clip_on_disk(dir: &tempfile::TempDir) -> SelectedVideo {
        let path = dir.path().join("clip.xyz");
        std::fs::write(&path, b"not really a video").unwrap();
        SelectedVideo::new(path, "clip.xyz")
    }

    #[tokio::test]
    async fn upload_posts_file_part_and_completes_session() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"filename":"clip.xyz","message":"ok","annotated":"out.mp4","keypoints":[[{"name":"LEFT_KNEE","x":0.4,"y":0.7,"visibility":0.92}]]}"#,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let client = AnalysisClient::new(&cfg(&format!("{base}/"))).unwrap();

        let session = run_single_submission(&client, clip_on_disk(&dir)).await;
        let request = server.await.unwrap();
        let lower = request.to_ascii_lowercase();

        assert!(request.starts_with("POST /upload HTTP/1.1\r\n"), "{request}");
        assert!(lower.contains("content-type: multipart/form-data; boundary="));
        assert!(lower.contains(r#"content-disposition: form-data; name="file"; filename="clip.xyz""#));
        assert!(lower.contains("content-type: video/*"));
        assert!(request.contains("not really a video"));

        assert_eq!(session.phase(), SessionPhase::Done);
        let result = session.result().unwrap();
        assert_eq!(
            result.annotated_video_reference.as_deref(),
            Some(format!("{base}/uploads/out.mp4").as_str())
        );
        assert_eq!(session.keypoints().len(), 1);
    }

    #[tokio::test]
    async fn service_detail_becomes_last_error() {
        let (base, server) =
            serve_once("500 Internal Server Error", r#"{"detail":"analysis failed"}"#).await;
        let dir = tempfile::tempdir().unwrap();
        let client = AnalysisClient::new(&cfg(&base)).unwrap();

        let session = run_single_submission(&client, clip_on_disk(&dir)).await;
        server.await.unwrap();

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.last_error(), Some("analysis failed"));
        assert!(session.selected_video().is_some());
    }

    #[tokio::test]
    async fn refused_connection_reports_generic_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let dir = tempfile::tempdir().unwrap();
        let client = AnalysisClient::new(&cfg(&base)).unwrap();

        let session = run_single_submission(&client, clip_on_disk(&dir)).await;

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.last_error(), Some(GENERIC_TRANSPORT_FAILURE));
        assert!(session.can_submit());
    }
}
