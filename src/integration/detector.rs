//! Trait for object detection inference backends.

use crate::tracker::Detection;

/// Trait for object detection inference backends.
///
/// Implementations are expected to return only detections of the vehicle
/// classes of interest, already filtered by confidence. The pipeline does no
/// further filtering.
///
/// # Example
///
/// ```ignore
/// use speedtrap_rs::{Detection, DetectionSource};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(
///         &mut self,
///         frame_number: u64,
///         input: &[u8],
///         width: u32,
///         height: u32,
///     ) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return detections stamped with `frame_number`
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error: std::error::Error + 'static;

    /// Run inference on raw image data and return detections.
    ///
    /// # Arguments
    /// * `frame_number` - Frame index to stamp on every returned detection
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    fn detect(
        &mut self,
        frame_number: u64,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}
