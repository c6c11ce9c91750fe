use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_KEY_VAR: &str = "API_KEY";
/// Consulted when the configured credential variable is unset.
pub const FALLBACK_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Exponential backoff settings for one remote call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(3000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Used for the final asset download, where failures are rarely model overload.
    pub fn download() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(2000),
        }
    }

    /// Wait before retry number `attempt + 1` (attempt is zero based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .checked_mul(2u32.saturating_pow(attempt))
            .unwrap_or(Duration::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub ceiling: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            interval: Duration::from_secs(10),
            ceiling: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeConfig {
    pub target_width: u32,
    pub frames_per_second: u32,
    pub seek_timeout: Duration,
    /// Upper bound on decoding one frame after a seek.
    pub decode_timeout: Duration,
    pub max_colors: usize,
    /// NeuQuant sampling factor, 1 is slowest and best, 30 is fastest.
    pub sample_factor: i32,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        TranscodeConfig {
            target_width: 400,
            frames_per_second: 10,
            seek_timeout: Duration::from_secs(1),
            decode_timeout: Duration::from_secs(3),
            max_colors: 256,
            sample_factor: 10,
        }
    }
}

impl TranscodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_width(mut self, width: u32) -> Self {
        self.target_width = width;
        self
    }

    pub fn with_frames_per_second(mut self, fps: u32) -> Self {
        self.frames_per_second = fps;
        self
    }

    pub fn with_seek_timeout(mut self, timeout: Duration) -> Self {
        self.seek_timeout = timeout;
        self
    }

    pub fn with_decode_timeout(mut self, timeout: Duration) -> Self {
        self.decode_timeout = timeout;
        self
    }

    /// Per-frame display delay in GIF centiseconds.
    pub fn frame_delay_centis(&self) -> u16 {
        if self.frames_per_second == 0 {
            return 0;
        }
        (100 / self.frames_per_second).clamp(1, u16::MAX as u32) as u16
    }
}

#[derive(Debug, Clone)]
pub struct RevealConfig {
    pub api_base_url: String,
    pub image_model: String,
    pub video_model: String,
    pub text_model: String,
    /// Environment variable holding the access credential, read on every call.
    pub api_key_var: String,
    pub media_dir: PathBuf,
    pub request_timeout: Option<Duration>,
    pub retry: RetryPolicy,
    pub download_retry: RetryPolicy,
    pub poll: PollPolicy,
    pub transcode: TranscodeConfig,
}

impl Default for RevealConfig {
    fn default() -> Self {
        RevealConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            api_key_var: DEFAULT_API_KEY_VAR.to_string(),
            media_dir: env::temp_dir().join("revealgen"),
            request_timeout: Some(Duration::from_secs(120)),
            retry: RetryPolicy::default(),
            download_retry: RetryPolicy::download(),
            poll: PollPolicy::default(),
            transcode: TranscodeConfig::default(),
        }
    }
}

impl RevealConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("REVEAL_API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Ok(model) = env::var("REVEAL_IMAGE_MODEL") {
            config.image_model = model;
        }
        if let Ok(model) = env::var("REVEAL_VIDEO_MODEL") {
            config.video_model = model;
        }
        if let Ok(model) = env::var("REVEAL_TEXT_MODEL") {
            config.text_model = model;
        }
        if let Ok(var) = env::var("REVEAL_API_KEY_VAR") {
            config.api_key_var = var;
        }
        if let Ok(dir) = env::var("REVEAL_MEDIA_DIR") {
            config.media_dir = PathBuf::from(dir);
        }

        config
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_models(
        mut self,
        image_model: impl Into<String>,
        video_model: impl Into<String>,
        text_model: impl Into<String>,
    ) -> Self {
        self.image_model = image_model.into();
        self.video_model = video_model.into();
        self.text_model = text_model.into();
        self
    }

    pub fn with_api_key_var(mut self, var: impl Into<String>) -> Self {
        self.api_key_var = var.into();
        self
    }

    pub fn with_media_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.media_dir = dir.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_download_retry(mut self, retry: RetryPolicy) -> Self {
        self.download_retry = retry;
        self
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_transcode(mut self, transcode: TranscodeConfig) -> Self {
        self.transcode = transcode;
        self
    }

    /// Current credential, looked up fresh so a rotated key applies without restart.
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_var)
            .ok()
            .or_else(|| env::var(FALLBACK_API_KEY_VAR).ok())
            .filter(|key| !key.trim().is_empty())
    }
}
