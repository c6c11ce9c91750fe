use std::sync::Arc;

use crate::{
    config::RevealConfig,
    error::{RevealError, Result},
    gemini::backend::GenerationBackend,
    models::{
        GenerateContentRequest, GenerateContentResponse, OperationResponse, PredictVideoRequest,
        VideoOperation,
    },
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

const ERROR_BODY_LIMIT: usize = 512;

/// REST transport for the generation service.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    config: Arc<RevealConfig>,
}

impl HttpBackend {
    pub fn new(config: Arc<RevealConfig>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RevealError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Attaches the credential as it is right now; an absent key is sent as-is
    /// and the service's rejection surfaces to the caller.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.api_key() {
            Some(key) => request.query(&[("key", key)]),
            None => {
                log::debug!("No API key in environment, sending unauthenticated request");
                request
            }
        }
    }

    async fn send_json<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R> {
        let response = self.authorize(request).send().await?;
        let response = ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            RevealError::ResponseError(format!(
                "unexpected response payload: {} ({})",
                e,
                truncate(&body, ERROR_BODY_LIMIT)
            ))
        })
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RevealError::HttpStatus {
        status: status.as_u16(),
        body: truncate(&body, ERROR_BODY_LIMIT),
    })
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(&format!("models/{}:generateContent", model));
        log::debug!("POST generateContent on model {}", model);
        self.send_json(self.client.post(&url).json(request)).await
    }

    async fn submit_video(
        &self,
        model: &str,
        request: &PredictVideoRequest,
    ) -> Result<VideoOperation> {
        let url = self.endpoint(&format!("models/{}:predictLongRunning", model));
        log::debug!("POST predictLongRunning on model {}", model);
        let response: OperationResponse =
            self.send_json(self.client.post(&url).json(request)).await?;
        if response.name.is_empty() {
            return Err(RevealError::ResponseError(
                "video submission returned no operation name".into(),
            ));
        }
        Ok(response.into())
    }

    async fn operation_status(&self, operation: &VideoOperation) -> Result<VideoOperation> {
        let url = self.endpoint(&operation.name);
        let response: OperationResponse = self.send_json(self.client.get(&url)).await?;
        let mut next = VideoOperation::from(response);
        if next.name.is_empty() {
            next.name = operation.name.clone();
        }
        Ok(next)
    }

    async fn download(&self, locator: &str) -> Result<Vec<u8>> {
        let response = self.authorize(self.client.get(locator)).send().await?;
        let response = ensure_success(response).await.map_err(|err| match err {
            RevealError::HttpStatus { status, body } => RevealError::HttpStatus {
                status,
                body: format!("failed to download generated video: {}", body),
            },
            other => other,
        })?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Content, EncodedImage, Part, VideoInstance, VideoParameters};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Each test owns its credential variable so parallel tests do not race.
    fn backend_for(server_uri: &str, key_var: &str, key: &str) -> HttpBackend {
        std::env::set_var(key_var, key);
        let config = RevealConfig::new()
            .with_api_base_url(server_uri)
            .with_api_key_var(key_var);
        HttpBackend::new(Arc::new(config)).unwrap()
    }

    fn video_request() -> PredictVideoRequest {
        PredictVideoRequest {
            instances: vec![VideoInstance {
                prompt: "HELLO materializes".into(),
                image: EncodedImage::from_bytes(&[0], "image/png"),
                last_frame: None,
            }],
            parameters: VideoParameters {
                sample_count: 1,
                resolution: "720p".into(),
                aspect_ratio: "16:9".into(),
            },
        }
    }

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let config = RevealConfig::new().with_api_base_url("http://localhost:8080/v1beta/");
        let backend = HttpBackend::new(Arc::new(config)).unwrap();
        assert_eq!(
            backend.endpoint("/models/veo:predictLongRunning"),
            "http://localhost:8080/v1beta/models/veo:predictLongRunning"
        );
        assert_eq!(
            backend.endpoint("models/veo/operations/42"),
            "http://localhost:8080/v1beta/models/veo/operations/42"
        );
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(ERROR_BODY_LIMIT + 10);
        let truncated = truncate(&body, ERROR_BODY_LIMIT);
        assert_eq!(truncated.chars().count(), ERROR_BODY_LIMIT + 1);
        assert!(truncated.ends_with('…'));
    }

    #[tokio::test]
    async fn generate_content_sends_key_as_query_param() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(query_param("key", "content-key"))
            .and(body_partial_json(json!({
                "contents": [{"parts": [{"text": "HELLO"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Neon Noir"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server.uri(), "REVEAL_HTTP_TEST_CONTENT_KEY", "content-key");
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![Part::text("HELLO")],
            }],
            generation_config: None,
        };

        let response = backend
            .generate_content("gemini-test", &request)
            .await
            .unwrap();
        assert_eq!(response.first_text(), Some("Neon Noir"));
    }

    #[tokio::test]
    async fn error_status_keeps_code_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .respond_with(
                ResponseTemplate::new(503).set_body_string(r#"{"error":{"status":"UNAVAILABLE"}}"#),
            )
            .mount(&server)
            .await;

        let backend = backend_for(&server.uri(), "REVEAL_HTTP_TEST_STATUS_KEY", "status-key");
        let request = GenerateContentRequest {
            contents: vec![],
            generation_config: None,
        };

        let err = backend
            .generate_content("gemini-test", &request)
            .await
            .unwrap_err();
        match &err {
            RevealError::HttpStatus { status, body } => {
                assert_eq!(*status, 503);
                assert!(body.contains("UNAVAILABLE"));
            }
            other => panic!("expected HttpStatus, got {:?}", other),
        }
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn submission_without_operation_name_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/veo-test:predictLongRunning"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": false})))
            .mount(&server)
            .await;

        let backend = backend_for(&server.uri(), "REVEAL_HTTP_TEST_SUBMIT_KEY", "submit-key");
        let err = backend
            .submit_video("veo-test", &video_request())
            .await
            .unwrap_err();

        assert!(matches!(err, RevealError::ResponseError(ref m) if m.contains("no operation name")));
    }

    #[tokio::test]
    async fn submission_returns_pending_operation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/veo-test:predictLongRunning"))
            .and(query_param("key", "submit-ok-key"))
            .and(body_partial_json(json!({
                "instances": [{"prompt": "HELLO materializes"}],
                "parameters": {"sampleCount": 1, "resolution": "720p"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "models/veo-test/operations/abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server.uri(), "REVEAL_HTTP_TEST_SUBMIT_OK_KEY", "submit-ok-key");
        let operation = backend
            .submit_video("veo-test", &video_request())
            .await
            .unwrap();

        assert_eq!(operation, VideoOperation::pending("models/veo-test/operations/abc"));
    }

    #[tokio::test]
    async fn status_decodes_video_uri_and_keeps_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models/veo-test/operations/abc"))
            .and(query_param("key", "status-ok-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "done": true,
                "response": {
                    "generateVideoResponse": {
                        "generatedSamples": [{"video": {"uri": "https://files.test/v.mp4"}}]
                    }
                }
            })))
            .mount(&server)
            .await;

        let backend = backend_for(&server.uri(), "REVEAL_HTTP_TEST_STATUS_OK_KEY", "status-ok-key");
        let operation = backend
            .operation_status(&VideoOperation::pending("models/veo-test/operations/abc"))
            .await
            .unwrap();

        assert_eq!(
            operation,
            VideoOperation::succeeded("models/veo-test/operations/abc", "https://files.test/v.mp4")
        );
    }

    #[tokio::test]
    async fn download_appends_key_and_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/v.mp4"))
            .and(query_param("key", "download-key"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp4-bytes".to_vec()))
            .mount(&server)
            .await;

        let backend = backend_for(&server.uri(), "REVEAL_HTTP_TEST_DOWNLOAD_KEY", "download-key");
        let bytes = backend
            .download(&format!("{}/files/v.mp4", server.uri()))
            .await
            .unwrap();

        assert_eq!(bytes, b"mp4-bytes");
    }

    #[tokio::test]
    async fn failed_download_is_described() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/gone.mp4"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let backend = backend_for(&server.uri(), "REVEAL_HTTP_TEST_GONE_KEY", "gone-key");
        let err = backend
            .download(&format!("{}/files/gone.mp4", server.uri()))
            .await
            .unwrap_err();

        match err {
            RevealError::HttpStatus { status, body } => {
                assert_eq!(status, 404);
                assert!(body.starts_with("failed to download generated video"));
                assert!(body.contains("not found"));
            }
            other => panic!("expected HttpStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_the_key() {
        // Nothing listens on port 1.
        let backend = backend_for("http://127.0.0.1:1", "REVEAL_HTTP_TEST_LEAK_KEY", "leak-canary");
        let err = backend
            .operation_status(&VideoOperation::pending("operations/x"))
            .await
            .unwrap_err();

        assert!(!err.to_string().contains("leak-canary"));
        assert!(!format!("{:?}", err).contains("leak-canary"));
    }
}
