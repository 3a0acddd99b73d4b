use crate::{
    capture::CapturedImage,
    messages::{AnalysisRequest, AnalysisResponse},
    prompt::hat_fit_prompt,
};
use base64::prelude::{BASE64_STANDARD, Engine as _};
use image::{ExtendedColorType, ImageEncoder, codecs::png::PngEncoder};
use reqwest::{StatusCode, blocking::Client};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llava:latest";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Returned when the server answers 200 without a `response` field.
pub const NO_RESPONSE: &str = "No response received";

const TAGS_PATH: &str = "/api/tags";
const GENERATE_PATH: &str = "/api/generate";

/// Trait for services that can critique a hat from one or two photos.
///
/// The session controller only talks to this trait, so the real HTTP client can be
/// swapped out in tests.
pub trait HatAnalyzer {
    /// Lightweight pre-flight check that the backing service is up.
    fn is_service_reachable(&self) -> bool;

    /// Name of the model answering the requests.
    fn model(&self) -> &str;

    /// Runs one evaluation. Never fails: problems come back as readable text.
    fn analyze(&self, front: &CapturedImage, back: Option<&CapturedImage>) -> String;
}

/// Failures of a single analysis request.
///
/// The `Display` output of each variant is what the user gets to read in place of a
/// model answer.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Error: Received status code {0}")]
    Status(u16),

    #[error(
        "⚠️ Request timed out after {0:?}. The model might be taking too long. Try again or use a smaller image."
    )]
    Timeout(Duration),

    #[error("Error during analysis: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Error during analysis: {0}")]
    Transport(reqwest::Error),
}

/// Where the Ollama service lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Scheme, host and port, e.g. `http://localhost:11434`.
    pub base_url: String,
    pub model: String,
    /// Upper bound for a generate call.
    pub timeout: Duration,
    /// Upper bound for the health probe.
    pub probe_timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

/// Blocking client for a local Ollama server.
pub struct OllamaClient {
    config: OllamaConfig,
    http: Client,
}

impl OllamaClient {
    /// Creates a client for the given service.
    ///
    /// No request is issued here; call [`HatAnalyzer::is_service_reachable`] to probe.
    pub fn new(config: OllamaConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().build()?;
        Ok(Self { config, http })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn transport_error(&self, error: reqwest::Error) -> AnalysisError {
        if error.is_timeout() {
            AnalysisError::Timeout(self.config.timeout)
        } else {
            AnalysisError::Transport(error)
        }
    }

    /// Runs one evaluation and reports failures as [`AnalysisError`].
    pub fn try_analyze(
        &self,
        front: &CapturedImage,
        back: Option<&CapturedImage>,
    ) -> Result<String, AnalysisError> {
        let mut images = vec![encode_png_base64(front)?];
        if let Some(back) = back {
            images.push(encode_png_base64(back)?);
        }

        let request = AnalysisRequest {
            model: self.config.model.clone(),
            prompt: hat_fit_prompt(back.is_some()),
            images,
            stream: false,
        };

        log::debug!(
            "Sending {} image(s) to {} ({} base64 bytes)",
            request.images.len(),
            self.config.model,
            request.images.iter().map(String::len).sum::<usize>()
        );

        let response = self
            .http
            .post(self.endpoint(GENERATE_PATH))
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            log::warn!("Generate request failed with status {status}");
            return Err(AnalysisError::Status(status.as_u16()));
        }

        let body: AnalysisResponse = response.json().map_err(|e| self.transport_error(e))?;
        Ok(body.response.unwrap_or_else(|| NO_RESPONSE.to_string()))
    }
}

impl HatAnalyzer for OllamaClient {
    fn is_service_reachable(&self) -> bool {
        let url = self.endpoint(TAGS_PATH);
        match self
            .http
            .get(&url)
            .timeout(self.config.probe_timeout)
            .send()
        {
            Ok(response) => {
                log::debug!("Health probe {url} returned {}", response.status());
                response.status() == StatusCode::OK
            }
            Err(e) => {
                log::debug!("Health probe {url} failed: {e}");
                false
            }
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn analyze(&self, front: &CapturedImage, back: Option<&CapturedImage>) -> String {
        match self.try_analyze(front, back) {
            Ok(text) => text,
            Err(e) => {
                log::error!("Analysis failed: {e}");
                e.to_string()
            }
        }
    }
}

/// Encodes an image as PNG and returns it as standard base64 text.
pub fn encode_png_base64(image: &CapturedImage) -> Result<String, image::ImageError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        image.as_slice(),
        image.width() as u32,
        image.height() as u32,
        ExtendedColorType::Rgb8,
    )?;
    Ok(BASE64_STANDARD.encode(png))
}
