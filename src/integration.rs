//! Integration module for connecting detection backends with the tracker
//! and measurement stages.
//!
//! Frame decoding, resizing and model inference live outside this crate;
//! a [`DetectionSource`] is the seam where they plug in.

mod builder;
mod detector;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::DetectionSource;
pub use pipeline::{MeasurementFailure, Outcome, PipelineReport, SpeedPipeline, TrackerPipeline};
