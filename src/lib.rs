//! Webcam hat fit checker backed by a local vision-language model.
//!
//! A session captures a front view (and optionally a back view) through a
//! [`FrameCapture`], hands the stills to a [`HatAnalyzer`] such as [`OllamaClient`],
//! prints the critique and optionally saves it to disk.

#[cfg(feature = "camera")]
pub mod camera;
pub mod capture;
pub mod client;
pub mod error;
pub mod messages;
pub mod prompt;
pub mod session;

#[cfg(feature = "camera")]
pub use camera::{CameraError, WebcamCapture};
pub use capture::{CapturedImage, FrameCapture, PreviewKey, image_from_rgb};
pub use client::{AnalysisError, HatAnalyzer, OllamaClient, OllamaConfig};
pub use error::HatCheckError;
pub use session::{SessionController, SessionState, save_analysis};
