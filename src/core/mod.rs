pub mod config;
pub mod errors;
pub mod observer;
pub mod process;
pub mod reference;
pub mod simulator;
pub mod stats;
pub mod trace;
pub mod types;

// Re-export commonly used types
pub use config::SimulationConfig;
pub use errors::SimError;
pub use observer::{FaultResolution, LoggingObserver, SimulationObserver, TurnOutcome};
pub use process::Process;
pub use reference::{MemoryReference, Operation};
pub use simulator::Simulator;
pub use stats::{ProcessStats, SimulationReport};
pub use trace::{load_trace, parse_trace, Trace, TraceMetadata};
pub use types::{FrameId, PageNumber, ProcessId};

#[cfg(test)]
mod tests;
