//! OpenCV backed webcam capture with a live preview window.

use crate::capture::{CapturedImage, FrameCapture, PreviewKey, image_from_rgb};
use kornia_image::ImageError;
use opencv::{
    core::{Mat, Point, Scalar},
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};

const OVERLAY_TEXT: &str = "Press SPACE to capture, ESC to exit";

#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("Could not open webcam (device {0})")]
    DeviceUnavailable(i32),

    #[error(transparent)]
    OpenCv(#[from] opencv::Error),

    #[error("captured frame is not a valid RGB image: {0}")]
    Image(#[from] ImageError),
}

/// Keeps the video handle and the preview window alive for one capture call.
///
/// Dropping it releases the device and closes the window.
struct PreviewSession {
    capture: VideoCapture,
}

impl PreviewSession {
    fn open(device_id: i32, window: &str) -> Result<Self, CameraError> {
        let capture = VideoCapture::new(device_id, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(CameraError::DeviceUnavailable(device_id));
        }

        let session = Self { capture };
        highgui::named_window(window, highgui::WINDOW_AUTOSIZE)?;
        Ok(session)
    }

    fn read_frame(&mut self) -> Result<Option<Mat>, CameraError> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}

impl Drop for PreviewSession {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            log::warn!("Failed to release camera: {e}");
        }
        if let Err(e) = highgui::destroy_all_windows() {
            log::warn!("Failed to close preview window: {e}");
        }
    }
}

/// Captures stills from a local webcam, previewing frames until SPACE or ESC.
pub struct WebcamCapture {
    device_id: i32,
}

impl WebcamCapture {
    pub fn new(device_id: i32) -> Self {
        Self { device_id }
    }
}

impl Default for WebcamCapture {
    fn default() -> Self {
        Self::new(0)
    }
}

impl FrameCapture for WebcamCapture {
    type Error = CameraError;

    fn capture(&mut self, label: &str) -> Result<Option<CapturedImage>, Self::Error> {
        let mut session = PreviewSession::open(self.device_id, label)?;
        log::debug!("Opened camera {} for '{}'", self.device_id, label);

        println!("\n📸 {label}");
        println!("   Press SPACE to capture");
        println!("   Press ESC to exit");

        loop {
            let Some(frame) = session.read_frame()? else {
                log::warn!("Camera {} stopped delivering frames", self.device_id);
                return Ok(None);
            };

            let mut display = frame.try_clone()?;
            imgproc::put_text(
                &mut display,
                OVERLAY_TEXT,
                Point::new(10, 30),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.7,
                Scalar::new(0.0, 255.0, 0.0, 0.0),
                2,
                imgproc::LINE_8,
                false,
            )?;
            highgui::imshow(label, &display)?;

            match PreviewKey::from_key_code(highgui::wait_key(1)?) {
                PreviewKey::Accept => {
                    println!("   ✓ Image captured!");
                    return to_rgb_image(&frame).map(Some);
                }
                PreviewKey::Cancel => {
                    println!("   ✗ Capture cancelled");
                    return Ok(None);
                }
                PreviewKey::Ignore => {}
            }
        }
    }
}

// OpenCV delivers BGR; everything downstream expects RGB.
fn to_rgb_image(frame: &Mat) -> Result<CapturedImage, CameraError> {
    let mut rgb = Mat::default();
    imgproc::cvt_color_def(frame, &mut rgb, imgproc::COLOR_BGR2RGB)?;

    let width = rgb.cols() as usize;
    let height = rgb.rows() as usize;
    let data = rgb.data_bytes()?.to_vec();

    Ok(image_from_rgb(width, height, data)?)
}
