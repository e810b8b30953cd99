//! Camera frames and the cat classifier that inspects them.

mod classifier;

pub use classifier::{CAT_CONFIDENCE_THRESHOLD, FakeImageClassifier, ImageClassifier};

use crate::error::{Result, SecurityError};
use rand::Rng;

/// A captured camera frame.
///
/// The monitor never decodes pixels; a snapshot is handed to the
/// [`ImageClassifier`] as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Snapshot {
    /// Wrap raw frame data. Zero-sized frames are rejected.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SecurityError::InvalidArgument(format!(
                "snapshot dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Random greyscale frame, used by the simulation.
    pub fn noise(width: u32, height: u32, rng: &mut impl Rng) -> Result<Self> {
        let len = usize::try_from(u64::from(width) * u64::from(height))
            .map_err(|_| SecurityError::InvalidArgument("snapshot too large".to_string()))?;
        let mut pixels = vec![0u8; len];
        rng.fill(pixels.as_mut_slice());
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}
