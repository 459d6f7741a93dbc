// Shared Resource Model Types
use serde::{Deserialize, Serialize};
use std::fmt;

/// Count of resource instances. Unsigned, so every vector entry is `>= 0`.
pub type Units = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub usize);

impl ProcessId {
    pub fn new(index: usize) -> Self {
        ProcessId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for ProcessId {
    fn from(index: usize) -> Self {
        ProcessId(index)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Formats a process sequence as `<P1, P3, P0>`.
pub fn format_sequence(order: &[ProcessId]) -> String {
    let items: Vec<String> = order.iter().map(|p| p.to_string()).collect();
    format!("<{}>", items.join(", "))
}

/// Element-wise `lhs <= rhs`. Both slices have the same length.
pub(crate) fn fits_within(lhs: &[Units], rhs: &[Units]) -> bool {
    lhs.iter().zip(rhs).all(|(a, b)| a <= b)
}
