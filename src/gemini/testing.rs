//! Scripted in-memory backend for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::{
    error::{RevealError, Result},
    gemini::backend::GenerationBackend,
    models::{
        Candidate, Content, GenerateContentRequest, GenerateContentResponse, Part,
        PredictVideoRequest, VideoOperation,
    },
};
use async_trait::async_trait;

#[derive(Default)]
pub(crate) struct ScriptedBackend {
    content: Mutex<VecDeque<Result<GenerateContentResponse>>>,
    submissions: Mutex<VecDeque<Result<VideoOperation>>>,
    statuses: Mutex<VecDeque<Result<VideoOperation>>>,
    downloads: Mutex<VecDeque<Result<Vec<u8>>>>,
    pub content_requests: Mutex<Vec<(String, GenerateContentRequest)>>,
    pub video_requests: Mutex<Vec<PredictVideoRequest>>,
    pub downloaded: Mutex<Vec<String>>,
    status_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_content(&self, response: Result<GenerateContentResponse>) -> &Self {
        self.content.lock().unwrap().push_back(response);
        self
    }

    pub fn push_submission(&self, response: Result<VideoOperation>) -> &Self {
        self.submissions.lock().unwrap().push_back(response);
        self
    }

    pub fn push_status(&self, response: Result<VideoOperation>) -> &Self {
        self.statuses.lock().unwrap().push_back(response);
        self
    }

    pub fn push_download(&self, response: Result<Vec<u8>>) -> &Self {
        self.downloads.lock().unwrap().push_back(response);
        self
    }

    pub fn content_calls(&self) -> usize {
        self.content_requests.lock().unwrap().len()
    }

    pub fn submission_calls(&self) -> usize {
        self.video_requests.lock().unwrap().len()
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.downloaded.lock().unwrap().len()
    }

    pub fn total_calls(&self) -> usize {
        self.content_calls() + self.submission_calls() + self.status_calls() + self.download_calls()
    }
}

fn unscripted(call: &str) -> RevealError {
    RevealError::InternalError(format!("no scripted response for {}", call))
}

pub(crate) fn image_response(bytes: &[u8], mime_type: Option<&str>) -> GenerateContentResponse {
    let mut part = Part::inline(bytes, mime_type.unwrap_or("image/png"));
    if mime_type.is_none() {
        if let Some(inline) = part.inline_data.as_mut() {
            inline.mime_type = None;
        }
    }
    parts_response(vec![Part::text("Here is your scene."), part])
}

pub(crate) fn text_response(text: &str) -> GenerateContentResponse {
    parts_response(vec![Part::text(text)])
}

pub(crate) fn parts_response(parts: Vec<Part>) -> GenerateContentResponse {
    GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(Content { role: None, parts }),
        }],
    }
}

pub(crate) fn overloaded() -> RevealError {
    RevealError::HttpStatus {
        status: 503,
        body: "The model is overloaded. Please try again later.".into(),
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        self.content_requests
            .lock()
            .unwrap()
            .push((model.to_string(), request.clone()));
        self.content
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("generate_content")))
    }

    async fn submit_video(
        &self,
        _model: &str,
        request: &PredictVideoRequest,
    ) -> Result<VideoOperation> {
        self.video_requests.lock().unwrap().push(request.clone());
        self.submissions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("submit_video")))
    }

    /// Unscripted status checks report the job as still running.
    async fn operation_status(&self, operation: &VideoOperation) -> Result<VideoOperation> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(VideoOperation::pending(operation.name.clone())))
    }

    async fn download(&self, locator: &str) -> Result<Vec<u8>> {
        self.downloaded.lock().unwrap().push(locator.to_string());
        self.downloads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("download")))
    }
}
