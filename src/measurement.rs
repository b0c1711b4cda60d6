mod crossing;
mod speed;

pub use crossing::{CrossingDetector, CrossingEvent, LineSide};
pub use speed::{SpeedCalculator, SpeedMeasurement};
