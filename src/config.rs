//! Measurement configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Calibration of the two vertical reference lines.
///
/// Coordinates are pixel x positions in the same pixel space as the
/// detections fed to the pipeline. `distance_cm` is the real-world
/// separation between the two lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub left_coordinate: i32,
    pub right_coordinate: i32,
    #[serde(alias = "distance")]
    pub distance_cm: f64,
    pub fps: f64,
    #[serde(default, alias = "downsize_video")]
    pub downsize_width: Option<u32>,
}

impl Configuration {
    /// Create a validated configuration.
    pub fn new(
        left_coordinate: i32,
        right_coordinate: i32,
        distance_cm: f64,
        fps: f64,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            left_coordinate,
            right_coordinate,
            distance_cm,
            fps,
            downsize_width: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the target frame width used by a downsizing frame source.
    pub fn with_downsize_width(mut self, width: u32) -> Result<Self, ConfigError> {
        self.downsize_width = Some(width);
        self.validate()?;
        Ok(self)
    }

    /// Check every rule and report all violations at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.left_coordinate < 0 {
            problems.push("left_coordinate must be >= 0".to_string());
        }
        if self.right_coordinate <= self.left_coordinate {
            problems.push(format!(
                "right_coordinate ({}) must be > left_coordinate ({})",
                self.right_coordinate, self.left_coordinate
            ));
        }
        // Negated comparisons so that NaN is rejected too.
        if !(self.distance_cm > 0.0) {
            problems.push("distance must be > 0".to_string());
        }
        if !(self.fps > 0.0) {
            problems.push("fps must be > 0".to_string());
        }
        if self.downsize_width == Some(0) {
            problems.push("downsize_width must be > 0 if specified".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid { problems })
        }
    }

    #[inline]
    pub fn distance_meters(&self) -> f64 {
        self.distance_cm / 100.0
    }

    /// Rescale the reference lines for a frame source that resizes frames
    /// from `original_width` to `downsize_width`.
    ///
    /// Scaled coordinates are truncated toward zero. Distance and fps are
    /// unaffected. Without a downsize width, or when the widths already
    /// agree, the configuration is returned unchanged.
    ///
    /// The scaled configuration is validated again: truncation can collapse
    /// the two lines onto the same column.
    pub fn scaled_to_width(&self, original_width: u32) -> Result<Configuration, ConfigError> {
        let scaled = match self.downsize_width {
            Some(target) if original_width > 0 && target != original_width => {
                let factor = target as f64 / original_width as f64;
                Configuration {
                    left_coordinate: (self.left_coordinate as f64 * factor) as i32,
                    right_coordinate: (self.right_coordinate as f64 * factor) as i32,
                    ..self.clone()
                }
            }
            _ => self.clone(),
        };
        scaled.validate()?;
        Ok(scaled)
    }
}
