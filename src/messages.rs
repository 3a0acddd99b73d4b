use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisRequest {
    pub model: String,
    pub prompt: String,
    /// Base64 encoded PNG images, front view first.
    pub images: Vec<String>,
    pub stream: bool,
}

/// The part of the `/api/generate` reply we care about.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub response: Option<String>,
}
