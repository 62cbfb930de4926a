use serde::{Deserialize, Serialize};

/// Physical frame identifier
pub type FrameId = usize;

/// Virtual page number
pub type PageNumber = usize;

/// Process identifier, assigned at creation in increasing order and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessId(pub usize);

impl ProcessId {
    /// Get the raw index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
