use crate::sensors::SensorType;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum SecurityError {
    #[error("Sensor not registered: {name} ({sensor_type})")]
    UnknownSensor {
        name: String,
        sensor_type: SensorType,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Image classifier failed: {0}")]
    Classifier(String),

    #[error("State repository failed: {0}")]
    Repository(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SecurityError>;
