use serde::{Deserialize, Serialize};

/// Lower and upper tick of a concentrated liquidity position.
///
/// Passed through to the position manager without interpretation, so an
/// inverted or out-of-bounds range is the position manager's call to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickRange {
    pub lower: i32,
    pub upper: i32,
}

impl TickRange {
    pub fn new(lower: i32, upper: i32) -> Self {
        Self { lower, upper }
    }
}
