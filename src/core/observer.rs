use super::process::Process;
use super::types::{FrameId, PageNumber, ProcessId};
use log::{debug, info};

/// How a page fault was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultResolution {
    /// The page went into an unoccupied owned frame
    FreeFrame { frame: FrameId },
    /// The LRU frame was evicted and reused
    Replacement {
        frame: FrameId,
        evicted_page: PageNumber,
    },
}

impl FaultResolution {
    pub fn frame(&self) -> FrameId {
        match self {
            FaultResolution::FreeFrame { frame } => *frame,
            FaultResolution::Replacement { frame, .. } => *frame,
        }
    }

    /// Backing-store accesses charged for this resolution
    pub fn swap_accesses(&self) -> usize {
        match self {
            FaultResolution::FreeFrame { .. } => 1,
            FaultResolution::Replacement { .. } => 2,
        }
    }
}

/// Result of one scheduling turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Page resident on first attempt
    Hit,
    /// Page resident on the retry of a reference that faulted
    Retry,
    /// Page fault; the reference will be retried next turn
    Fault(FaultResolution),
}

/// Observer trait for simulation events
///
/// Every method has an empty default body so implementors only override what
/// they need. Callbacks fire after the simulator state has been updated.
pub trait SimulationObserver {
    /// Called once per process after initial frame distribution
    fn on_frames_assigned(&mut self, _process: &Process, _frames: &[FrameId]) {}

    /// Called after a process serviced one reference attempt
    fn on_turn(&mut self, _turn: u64, _process: &Process, _index: usize, _outcome: TurnOutcome) {}

    /// Called when a terminating process hands its frames over (`to` is `None`
    /// when no process is left to receive them)
    fn on_frames_transferred(
        &mut self,
        _from: ProcessId,
        _to: Option<&Process>,
        _frames: &[FrameId],
    ) {
    }

    /// Called when a process leaves the ready queue for good
    fn on_terminated(&mut self, _process: &Process) {}
}

/// Observer that reports simulation progress through the `log` facade
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl SimulationObserver for LoggingObserver {
    fn on_frames_assigned(&mut self, process: &Process, frames: &[FrameId]) {
        for frame in frames {
            info!("Process {}: receives frame {}", process.id(), frame);
        }
    }

    fn on_turn(&mut self, turn: u64, process: &Process, index: usize, outcome: TurnOutcome) {
        debug!("Turn {}: process {} analyzing reference {}", turn, process.id(), index);
        match outcome {
            TurnOutcome::Hit => debug!("PROC {} hits: {}", process.id(), process.hits()),
            TurnOutcome::Retry => debug!("PROC {} retried reference {}", process.id(), index),
            TurnOutcome::Fault(FaultResolution::FreeFrame { frame }) => {
                debug!("PROC {} page fault, loaded into free frame {}", process.id(), frame)
            }
            TurnOutcome::Fault(FaultResolution::Replacement {
                frame,
                evicted_page,
            }) => debug!(
                "PROC {} page fault, evicted page {} from frame {}",
                process.id(),
                evicted_page,
                frame
            ),
        }
    }

    fn on_frames_transferred(&mut self, from: ProcessId, to: Option<&Process>, frames: &[FrameId]) {
        for frame in frames {
            match to {
                Some(recipient) => info!(
                    "PROC {} releasing frame {} to process {}",
                    from,
                    frame,
                    recipient.id()
                ),
                None => info!("PROC {} releasing frame {}", from, frame),
            }
        }
    }

    fn on_terminated(&mut self, process: &Process) {
        info!(
            "Process {} finished: {} faults, {} hits",
            process.id(),
            process.faults(),
            process.hits()
        );
    }
}
