//! Error types.

use serde::Serialize;
use thiserror::Error;

/// A single speed measurement could not be derived.
///
/// These errors are scoped to one identity; the pipeline records them and
/// keeps processing the remaining identities.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeasurementError {
    /// The right crossing happened at or before the left crossing.
    #[error("track {track_id}: frame_count must be > 0, got {}", *right_frame as i64 - *left_frame as i64)]
    InvalidWindow {
        track_id: u64,
        left_frame: u64,
        right_frame: u64,
    },
    /// The derived elapsed time is not positive (non-positive fps).
    #[error("track {track_id}: time_seconds must be > 0, got {time_seconds}")]
    NonPositiveTime { track_id: u64, time_seconds: f64 },
    /// The identity has not crossed both reference lines.
    #[error("track {track_id} has not crossed both reference lines")]
    Incomplete { track_id: u64 },
}

/// Configuration rejected by validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {}", problems.join("; "))]
    Invalid { problems: Vec<String> },
}

/// Errors raised at the pipeline boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("frame {received} received after frame {previous}; frames must be strictly increasing")]
    OutOfOrderFrame { previous: u64, received: u64 },
    #[error("No vehicle detected")]
    NoObjectDetected,
    #[error("Vehicle detected but did not cross both measurement lines (tracks: {track_ids:?})")]
    NoCompletedCrossing { track_ids: Vec<u64> },
}

/// Error from a pipeline that also runs the detector.
#[derive(Debug, Error)]
pub enum ProcessError<E>
where
    E: std::error::Error + 'static,
{
    #[error("detection failed")]
    Detection(#[source] E),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_window_message() {
        let err = MeasurementError::InvalidWindow {
            track_id: 3,
            left_frame: 30,
            right_frame: 0,
        };
        assert_eq!(
            err.to_string(),
            "track 3: frame_count must be > 0, got -30"
        );
    }

    #[test]
    fn test_config_error_joins_problems() {
        let err = ConfigError::Invalid {
            problems: vec!["fps must be > 0".into(), "distance must be > 0".into()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration: fps must be > 0; distance must be > 0"
        );
    }
}
