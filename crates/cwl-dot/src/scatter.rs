//! Scatter depth, drawn as extra node outlines.

use crate::Step;
use std::fmt;

/// Stacked-outline depth of a node: one plus the number of scattered steps
/// enclosing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Repetition(u32);

impl Repetition {
    pub const ROOT: Self = Self(1);

    pub fn count(self) -> u32 {
        self.0
    }

    /// Depth used for everything drawn on behalf of `step`.
    pub fn for_step(self, step: &Step) -> Self {
        if step.is_scattered() {
            Self(self.0 + 1)
        } else {
            self
        }
    }
}

impl Default for Repetition {
    fn default() -> Self {
        Self::ROOT
    }
}

impl fmt::Display for Repetition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
