use serde::{Deserialize, Serialize};

/// Where a tracked object is relative to the two reference lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrossingPhase {
    /// Left line not crossed yet
    #[default]
    Approaching,
    /// Left line crossed, right line not yet
    BetweenLines,
    /// Both lines crossed
    Complete,
}
