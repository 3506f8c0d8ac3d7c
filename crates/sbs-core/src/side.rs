//! The two columns of the view

use serde::{Deserialize, Serialize};

/// Which pane a line, chunk or event belongs to.
///
/// `A` is the base (old) revision on the left, `B` the revision under
/// review on the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DisplaySide {
    #[serde(alias = "a", alias = "PARENT", alias = "parent")]
    A,
    #[serde(alias = "b", alias = "REVISION", alias = "revision")]
    B,
}

impl DisplaySide {
    /// The opposite pane
    pub fn other(self) -> Self {
        match self {
            DisplaySide::A => DisplaySide::B,
            DisplaySide::B => DisplaySide::A,
        }
    }

    /// Index for `[T; 2]` per-side storage
    pub fn index(self) -> usize {
        match self {
            DisplaySide::A => 0,
            DisplaySide::B => 1,
        }
    }

    pub const BOTH: [DisplaySide; 2] = [DisplaySide::A, DisplaySide::B];
}
