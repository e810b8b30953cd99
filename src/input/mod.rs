//! Input sources feeding the security service.
//!
//! - `camera`: frames and the cat classifier
//! - `simulation`: synthetic sensor and camera activity for development

pub mod camera;
pub mod simulation;

pub use camera::{FakeImageClassifier, ImageClassifier, Snapshot};
