pub mod core;
pub mod generator;

// Re-export commonly used types
pub use crate::core::errors::SimError;
pub use crate::core::simulator::Simulator;
pub use crate::core::types::ProcessId;
