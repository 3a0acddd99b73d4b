use crate::{
    capture::{CapturedImage, FrameCapture},
    client::HatAnalyzer,
    error::HatCheckError,
};
use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

pub const FRONT_LABEL: &str = "FRONT VIEW - Press SPACE to capture";
pub const BACK_LABEL: &str = "BACK VIEW - Press SPACE to capture";

const SAVE_HEADER: &str = "HAT FIT ANALYSIS";
const BANNER_WIDTH: usize = 60;

/// Where the controller currently is within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    AwaitFront,
    AwaitBackDecision,
    AwaitBack,
    Analyzing,
    Presenting,
    AwaitSaveDecision,
    AwaitRepeatDecision,
    Terminal,
}

impl SessionState {
    /// Returns the state as a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::AwaitFront => "await-front",
            SessionState::AwaitBackDecision => "await-back-decision",
            SessionState::AwaitBack => "await-back",
            SessionState::Analyzing => "analyzing",
            SessionState::Presenting => "presenting",
            SessionState::AwaitSaveDecision => "await-save-decision",
            SessionState::AwaitRepeatDecision => "await-repeat-decision",
            SessionState::Terminal => "terminal",
        }
    }
}

/// Drives capture, analysis, presentation and saving over a line based console.
///
/// Each session owns its captured images and the analysis text; nothing carries over
/// into the next one.
pub struct SessionController<C, A, R, W> {
    camera: C,
    analyzer: A,
    input: R,
    output: W,
    output_dir: PathBuf,
    state: SessionState,
}

impl<C, A, R, W> SessionController<C, A, R, W>
where
    C: FrameCapture,
    A: HatAnalyzer,
    R: BufRead,
    W: Write,
{
    /// Creates a controller that saves analyses into the working directory.
    pub fn new(camera: C, analyzer: A, input: R, output: W) -> Self {
        Self {
            camera,
            analyzer,
            input,
            output,
            output_dir: PathBuf::from("."),
            state: SessionState::AwaitFront,
        }
    }

    /// Sets the directory saved analyses are written to.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Probes the analyzer once, then runs sessions until the user stops asking for
    /// another one or cancels a front capture.
    ///
    /// # Errors
    /// * `ServiceUnreachable` - The probe failed; nothing else was attempted
    /// * `Capture` - The camera could not be used
    /// * `Io` - Console or file I/O failed
    pub fn run(&mut self) -> Result<(), HatCheckError> {
        if !self.analyzer.is_service_reachable() {
            log::error!("Inference service is not reachable");
            self.transition(SessionState::Terminal);
            return Err(HatCheckError::ServiceUnreachable);
        }
        writeln!(self.output, "✓ Ollama connected successfully!")?;
        writeln!(
            self.output,
            "✓ Using model: {} (runs locally)",
            self.analyzer.model()
        )?;

        let outcome = loop {
            match self.run_session() {
                Ok(true) => continue,
                other => break other,
            }
        };

        self.transition(SessionState::Terminal);
        outcome.map(|_| ())
    }

    /// Runs one session and returns whether the user asked for another.
    fn run_session(&mut self) -> Result<bool, HatCheckError> {
        self.transition(SessionState::AwaitFront);
        self.banner("🎩 HAT CHECKER - AI-Powered Hat Fit Analysis")?;
        writeln!(self.output, "\nThis app runs 100% locally on your computer!")?;
        writeln!(self.output, "No API keys, no cloud, completely FREE!")?;
        writeln!(self.output, "\n[Step 1] Let's capture the FRONT view")?;
        writeln!(
            self.output,
            "         Position yourself facing the camera with the hat on"
        )?;

        let Some(front) = self.capture(FRONT_LABEL)? else {
            writeln!(self.output, "\n❌ Session cancelled.")?;
            return Ok(false);
        };

        self.transition(SessionState::AwaitBackDecision);
        writeln!(
            self.output,
            "\n[Step 2] Do you want to capture a BACK view? (recommended)"
        )?;
        let back = if self.confirm("         Enter 'y' for yes, any other key to skip: ")? {
            self.transition(SessionState::AwaitBack);
            writeln!(
                self.output,
                "\n         Great! Please turn around and face away from camera"
            )?;
            self.ask("         Press ENTER when ready...")?;
            self.capture(BACK_LABEL)?
        } else {
            None
        };

        self.transition(SessionState::Analyzing);
        writeln!(self.output, "\n🤔 Analyzing hat fit with AI (running locally)...")?;
        writeln!(
            self.output,
            "   (This may take 10-30 seconds depending on your computer)"
        )?;
        self.output.flush()?;
        let result = self.analyzer.analyze(&front, back.as_ref());

        self.transition(SessionState::Presenting);
        self.banner("📊 HAT FIT ANALYSIS RESULTS")?;
        writeln!(self.output, "{result}")?;
        writeln!(self.output, "{}", "=".repeat(BANNER_WIDTH))?;

        self.transition(SessionState::AwaitSaveDecision);
        if self.confirm("\nWould you like to save the analysis to a file? (y/n): ")? {
            let path = save_analysis(&self.output_dir, &result)?;
            log::info!("Saved analysis to {}", path.display());
            writeln!(self.output, "✓ Analysis saved to: {}", path.display())?;
        }

        self.transition(SessionState::AwaitRepeatDecision);
        Ok(self.confirm("\nWant to check another hat? (y/n): ")?)
    }

    fn transition(&mut self, next: SessionState) {
        log::debug!("{} -> {}", self.state.as_str(), next.as_str());
        self.state = next;
    }

    fn capture(&mut self, label: &str) -> Result<Option<CapturedImage>, HatCheckError> {
        self.camera
            .capture(label)
            .map_err(|e| HatCheckError::Capture(Box::new(e)))
    }

    fn banner(&mut self, title: &str) -> io::Result<()> {
        let rule = "=".repeat(BANNER_WIDTH);
        writeln!(self.output, "\n{rule}\n{title}\n{rule}")
    }

    /// Prints `question` and reads one line; `None` on end of input.
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        Ok(self.ask(question)?.is_some_and(|answer| is_yes(&answer)))
    }
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Writes `result` to `hat_analysis_<unix-seconds>.txt` inside `dir`.
pub fn save_analysis(dir: &Path, result: &str) -> io::Result<PathBuf> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let path = dir.join(format!("hat_analysis_{timestamp}.txt"));

    fs::write(
        &path,
        format!("{SAVE_HEADER}\n{}\n{result}", "=".repeat(BANNER_WIDTH)),
    )?;
    Ok(path)
}
