use crate::{
    error::Result,
    models::{GenerateContentRequest, GenerateContentResponse, PredictVideoRequest, VideoOperation},
};
use async_trait::async_trait;

/// The four remote calls the pipeline makes. Each call is a single attempt;
/// retry and polling policy live in the callers.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;

    async fn submit_video(
        &self,
        model: &str,
        request: &PredictVideoRequest,
    ) -> Result<VideoOperation>;

    async fn operation_status(&self, operation: &VideoOperation) -> Result<VideoOperation>;

    async fn download(&self, locator: &str) -> Result<Vec<u8>>;
}
