mod iou_tracker;
mod matching;
mod rect;
mod track_state;
mod tracked_object;

pub use iou_tracker::{IouTracker, TrackerConfig};
pub use matching::{AssignmentResult, Detection, greedy_assignment};
pub use rect::{BoundingBox, iou_batch};
pub use track_state::CrossingPhase;
pub use tracked_object::TrackedObject;
