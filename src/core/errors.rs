use super::types::{FrameId, PageNumber, ProcessId};

/// Errors raised by the simulator, the trace reader and the trace generator
///
/// Input problems (`InvalidConfig`, `Io`, `Parse`) are recoverable per file.
/// The remaining variants are scheduling invariant violations and indicate a bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// Configuration values that cannot drive a simulation
    InvalidConfig(String),
    /// Failure reading or writing a file
    Io(String),
    /// Malformed configuration or trace content
    Parse(String),
    /// A process was asked for a reference past the end of its trace
    TraceExhausted(ProcessId),
    /// A replacement was needed but the process has no occupied frame
    NoVictimFrame(ProcessId),
    /// A page was loaded into a frame the process does not own
    FrameNotOwned { process: ProcessId, frame: FrameId },
    /// A page was loaded into a frame that still holds another page
    FrameOccupied { process: ProcessId, frame: FrameId },
    /// A non-resident page was touched
    PageNotResident { process: ProcessId, page: PageNumber },
    /// Lookup of a process that does not exist
    UnknownProcess(ProcessId),
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            SimError::Io(msg) => write!(f, "I/O error: {}", msg),
            SimError::Parse(msg) => write!(f, "Parse error: {}", msg),
            SimError::TraceExhausted(pid) => {
                write!(f, "Process {} has no references left", pid)
            }
            SimError::NoVictimFrame(pid) => {
                write!(f, "Process {} has no occupied frame to evict", pid)
            }
            SimError::FrameNotOwned { process, frame } => {
                write!(f, "Process {} does not own frame {}", process, frame)
            }
            SimError::FrameOccupied { process, frame } => {
                write!(f, "Frame {} of process {} is already occupied", frame, process)
            }
            SimError::PageNotResident { process, page } => {
                write!(f, "Page {} of process {} is not resident", page, process)
            }
            SimError::UnknownProcess(pid) => write!(f, "Unknown process {}", pid),
        }
    }
}

impl std::error::Error for SimError {}
