mod client;
pub(crate) mod response;

use crate::error::AnalysisError;
use crate::model::{SelectedVideo, UploadResponse};
use async_trait::async_trait;

pub use client::AnalysisClient;
pub use response::normalize;

/// The remote analysis service, as seen by the orchestrator.
///
/// One call is one `POST /upload`. Implementations map every failure onto
/// [`AnalysisError`]; they never retry.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn upload(&self, video: &SelectedVideo) -> Result<UploadResponse, AnalysisError>;

    /// Base URL the service was configured with, used to build asset references.
    fn base_url(&self) -> &str;
}
