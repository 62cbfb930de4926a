use super::types::PageNumber;
use serde::{Deserialize, Serialize};

/// Kind of memory access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Read,
    Write,
}

impl Operation {
    /// Parse the single-character trace symbol (`r` or `w`)
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_lowercase() {
            'r' => Some(Operation::Read),
            'w' => Some(Operation::Write),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Operation::Read => 'r',
            Operation::Write => 'w',
        }
    }
}

/// One access event of a process trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryReference {
    page: PageNumber,
    offset: usize,
    operation: Operation,
}

impl MemoryReference {
    pub fn new(page: PageNumber, offset: usize, operation: Operation) -> Self {
        Self {
            page,
            offset,
            operation,
        }
    }

    /// Virtual page number touched by this access
    pub fn page(&self) -> PageNumber {
        self.page
    }

    /// Byte offset inside the page
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }
}

impl std::fmt::Display for MemoryReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.page, self.offset, self.operation.symbol())
    }
}
