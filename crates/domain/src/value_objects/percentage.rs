use serde::{Deserialize, Serialize};
use std::fmt;

/// Whole-number fee percentage applied to each deposit.
///
/// The expected domain is 0 to 100 but no bound is enforced here; the owner
/// is trusted to pick a sensible value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeePercent(u32);

impl FeePercent {
    pub const fn new(percent: u32) -> Self {
        Self(percent)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for FeePercent {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl fmt::Display for FeePercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
