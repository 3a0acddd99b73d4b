use argh::FromArgs;
use hat_checker::{
    HatCheckError, OllamaClient, OllamaConfig, SessionController, WebcamCapture,
    client::{DEFAULT_MODEL, DEFAULT_TIMEOUT},
};
use std::{io, path::PathBuf, time::Duration};

// defaults for the local Ollama service
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 11434;
const DEFAULT_TIMEOUT_SECS: u64 = DEFAULT_TIMEOUT.as_secs();
const DEFAULT_CAMERA: i32 = 0;

#[derive(FromArgs)]
/// Hat Checker asks a local vision model whether your hat suits you.
struct HatCheckerArgs {
    /// the host Ollama is running on
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port Ollama is listening on
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,

    /// the vision model to use
    #[argh(option, short = 'm', default = "DEFAULT_MODEL.to_string()")]
    model: String,

    /// the camera device index
    #[argh(option, short = 'c', default = "DEFAULT_CAMERA")]
    camera: i32,

    /// seconds to wait for the model to answer
    #[argh(option, short = 't', default = "DEFAULT_TIMEOUT_SECS")]
    timeout: u64,

    /// directory to save analyses into
    #[argh(option, short = 'o', default = "PathBuf::from(\".\")")]
    output_dir: PathBuf,
}

fn print_welcome() {
    let rule = "=".repeat(60);
    println!("\n🎩 Welcome to Hat Checker (Ollama Edition)!");
    println!("\n{rule}");
    println!("100% FREE - Runs completely on your computer!");
    println!("{rule}");
    println!("\nSetup Instructions:");
    println!("1. Install Ollama from: https://ollama.ai/download");
    println!("2. Run: ollama pull llava");
    println!("3. Run this program!");
    println!("\nOllama will use your CPU/GPU to run the AI model locally.");
    println!("No internet required after initial model download!\n");
}

fn print_troubleshooting(error: &HatCheckError, port: u16) {
    println!("\n❌ Error: {error}");
    println!("\nTroubleshooting:");
    println!("1. Make sure Ollama is installed and running");
    println!("2. Run: ollama pull llava");
    println!("3. Check that port {port} is not blocked");
    println!("4. Verify your webcam is working");
}

fn run(args: HatCheckerArgs) -> Result<(), HatCheckError> {
    let config = OllamaConfig {
        base_url: format!("http://{}:{}", args.host, args.port),
        model: args.model,
        timeout: Duration::from_secs(args.timeout),
        ..OllamaConfig::default()
    };
    log::info!("Using {} at {}", config.model, config.base_url);

    let client = OllamaClient::new(config)?;
    let stdin = io::stdin();
    let mut controller = SessionController::new(
        WebcamCapture::new(args.camera),
        client,
        stdin.lock(),
        io::stdout(),
    )
    .with_output_dir(args.output_dir);

    controller.run()
}

fn main() {
    env_logger::init();
    let args: HatCheckerArgs = argh::from_env();

    print_welcome();

    let port = args.port;

    // setup failures are reported but do not change the exit status
    match run(args) {
        Ok(()) => println!("\n👋 Thanks for using Hat Checker!"),
        Err(e) => print_troubleshooting(&e, port),
    }
}
