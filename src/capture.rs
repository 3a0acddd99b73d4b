use kornia_image::{Image, ImageError, ImageSize, allocator::CpuAllocator};

/// A single RGB still frame taken from the camera.
pub type CapturedImage = Image<u8, 3, CpuAllocator>;

/// Trait for sources that can hand back a still frame on user request.
///
/// Implementors own whatever device or window they need for the duration of a
/// single call and must release it before returning, on every path.
pub trait FrameCapture {
    /// The error type returned when the source cannot be used at all.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Shows a preview labelled with `label` and blocks until the user accepts or
    /// cancels.
    ///
    /// # Returns
    /// * `Ok(Some(image))` - The user accepted a frame
    /// * `Ok(None)` - The user cancelled or the device stopped delivering frames
    /// * `Err(_)` - The device could not be opened or failed mid-preview
    fn capture(&mut self, label: &str) -> Result<Option<CapturedImage>, Self::Error>;
}

/// What a key pressed in the preview window asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewKey {
    /// SPACE: keep the current frame.
    Accept,
    /// ESC: leave without a frame.
    Cancel,
    /// Anything else, including "no key pressed".
    Ignore,
}

impl PreviewKey {
    const SPACE: i32 = 32;
    const ESC: i32 = 27;

    /// Maps a raw key code as returned by a GUI key poll (`-1` when idle).
    pub fn from_key_code(code: i32) -> Self {
        match code & 0xFF {
            Self::SPACE => PreviewKey::Accept,
            Self::ESC => PreviewKey::Cancel,
            _ => PreviewKey::Ignore,
        }
    }
}

/// Wraps a tightly packed RGB8 buffer into a [`CapturedImage`].
pub fn image_from_rgb(
    width: usize,
    height: usize,
    data: Vec<u8>,
) -> Result<CapturedImage, ImageError> {
    Image::new(ImageSize { width, height }, data, CpuAllocator)
}
