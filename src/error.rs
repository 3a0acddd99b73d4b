/// Failures that end the whole run.
///
/// Per-request problems never show up here; the analyzer turns them into text.
#[derive(Debug, thiserror::Error)]
pub enum HatCheckError {
    #[error(
        "Ollama is not running!\n\
         Please install and start Ollama:\n\
         1. Download from: https://ollama.ai/download\n\
         2. Install Ollama\n\
         3. Run: ollama pull llava\n\
         4. Ollama will start automatically"
    )]
    ServiceUnreachable,

    #[error("{0}")]
    Capture(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to set up HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
