//! Image classification seam.

use super::Snapshot;
use crate::error::{Result, SecurityError};
use log::debug;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Confidence threshold passed to the classifier for every frame.
pub const CAT_CONFIDENCE_THRESHOLD: f32 = 50.0;

/// Answers whether a frame contains a cat.
///
/// Implementations are opaque to the monitor; a remote service should apply
/// its own timeout and retry policy before returning.
pub trait ImageClassifier: Send + Sync {
    fn contains_cat(&self, image: &Snapshot, confidence_threshold: f32) -> Result<bool>;
}

/// Classifier that answers at random.
///
/// Stands in for a real vision model during development and simulation.
pub struct FakeImageClassifier {
    cat_probability: f64,
    rng: Mutex<StdRng>,
}

impl FakeImageClassifier {
    /// Create a classifier that reports a cat with the given probability.
    pub fn new(cat_probability: f64) -> Result<Self> {
        Self::build(cat_probability, StdRng::from_entropy())
    }

    /// Same as [`new`](Self::new) but reproducible.
    pub fn with_seed(cat_probability: f64, seed: u64) -> Result<Self> {
        Self::build(cat_probability, StdRng::seed_from_u64(seed))
    }

    fn build(cat_probability: f64, rng: StdRng) -> Result<Self> {
        if !(0.0..=1.0).contains(&cat_probability) {
            return Err(SecurityError::InvalidArgument(format!(
                "cat probability must be within 0.0..=1.0, got {}",
                cat_probability
            )));
        }
        Ok(Self {
            cat_probability,
            rng: Mutex::new(rng),
        })
    }
}

impl ImageClassifier for FakeImageClassifier {
    fn contains_cat(&self, image: &Snapshot, confidence_threshold: f32) -> Result<bool> {
        let verdict = self.rng.lock().gen_bool(self.cat_probability);
        debug!(
            "[Classifier] {}x{} frame at threshold {}: cat={}",
            image.width(),
            image.height(),
            confidence_threshold,
            verdict
        );
        Ok(verdict)
    }
}
