use super::config::SimulationConfig;
use super::errors::SimError;
use super::observer::{FaultResolution, SimulationObserver, TurnOutcome};
use super::process::Process;
use super::reference::MemoryReference;
use super::stats::SimulationReport;
use super::trace::load_trace;
use super::types::{FrameId, PageNumber, ProcessId};
use log::{debug, error, info};
use std::collections::VecDeque;

/// Round-robin demand-paging simulator
///
/// Processes are owned by `processes` and addressed by index; the ready queue
/// only holds those indices. Each turn services exactly one reference attempt
/// of the process at the head of the queue.
pub struct Simulator {
    config: SimulationConfig,
    processes: Vec<Process>,
    ready_queue: VecDeque<usize>,
    current_turn: u64,
    frames_distributed: bool,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl Simulator {
    /// Create an empty simulator for a validated configuration
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            config,
            processes: Vec::new(),
            ready_queue: VecDeque::new(),
            current_turn: 0,
            frames_distributed: false,
            observers: Vec::new(),
        })
    }

    /// Create a simulator and load every process trace named by the configuration
    pub fn load(config: SimulationConfig) -> Result<Self, SimError> {
        let mut simulator = Self::new(config)?;
        simulator.load_traces()?;
        Ok(simulator)
    }

    /// Create a simulator from in-memory traces, one process per trace
    pub fn from_traces(
        total_frames: usize,
        traces: Vec<Vec<MemoryReference>>,
    ) -> Result<Self, SimError> {
        let mut simulator = Self::new(SimulationConfig::new(total_frames, traces.len()))?;
        for trace in traces {
            simulator.spawn(trace);
        }
        Ok(simulator)
    }

    /// Read `proc<i>.txt` for every process
    ///
    /// A trace that cannot be read is reported and its process runs with an
    /// empty trace.
    pub fn load_traces(&mut self) -> Result<(), SimError> {
        if !self.processes.is_empty() {
            return Err(SimError::InvalidConfig(
                "process traces are already loaded".to_string(),
            ));
        }

        for index in 0..self.config.process_count {
            let path = self.config.trace_path(index);
            info!("PROC {} == reading trace {} ==", index, path.display());

            let references = match load_trace(&path) {
                Ok(trace) => {
                    let meta = &trace.metadata;
                    debug!(
                        "PROC {} TP={:?} NF={:?} NC={:?} NR={:?} NP={:?}",
                        index,
                        meta.page_size,
                        meta.rows,
                        meta.cols,
                        meta.reference_count,
                        meta.page_count
                    );
                    trace.references
                }
                Err(e) => {
                    error!("Error loading references of process {}: {}", index, e);
                    Vec::new()
                }
            };

            let id = self.spawn(references);
            info!(
                "PROC {} == finished reading trace ({} references) ==",
                id,
                self.processes[id.index()].trace().len()
            );
        }
        Ok(())
    }

    fn spawn(&mut self, trace: Vec<MemoryReference>) -> ProcessId {
        let id = ProcessId(self.processes.len());
        self.processes.push(Process::new(id, trace));
        self.ready_queue.push_back(id.index());
        id
    }

    /// Register an observer notified of frame moves, turns and terminations
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    /// Give each process `total_frames / process_count` contiguous frames, in id order
    ///
    /// Remainder frames are never assigned. Does nothing once frames are out.
    pub fn distribute_frames(&mut self) -> Result<(), SimError> {
        if self.frames_distributed {
            return Ok(());
        }
        if self.processes.len() != self.config.process_count {
            return Err(SimError::InvalidConfig(format!(
                "expected {} processes, found {}",
                self.config.process_count,
                self.processes.len()
            )));
        }

        let per_process = self.config.frames_per_process();
        for (index, process) in self.processes.iter_mut().enumerate() {
            let frames: Vec<FrameId> = (index * per_process..(index + 1) * per_process).collect();
            process.grant_frames(frames.iter().copied());
            for observer in &mut self.observers {
                observer.on_frames_assigned(process, &frames);
            }
        }

        self.frames_distributed = true;
        Ok(())
    }

    /// Run one scheduling iteration, returns true while processes remain queued
    ///
    /// A dequeued process with nothing left to service is terminated without
    /// consuming a turn.
    pub fn step(&mut self) -> Result<bool, SimError> {
        self.distribute_frames()?;

        let index = match self.ready_queue.pop_front() {
            Some(index) => index,
            None => return Ok(false),
        };

        if !self.processes[index].has_more() {
            self.terminate(index);
            return Ok(!self.ready_queue.is_empty());
        }

        self.current_turn += 1;
        let turn = self.current_turn;

        let (position, outcome) = service_reference(&mut self.processes[index])?;
        for observer in &mut self.observers {
            observer.on_turn(turn, &self.processes[index], position, outcome);
        }

        if self.processes[index].has_more() {
            self.ready_queue.push_back(index);
        } else {
            self.terminate(index);
        }

        Ok(!self.ready_queue.is_empty())
    }

    /// Run until every process has terminated
    pub fn run(&mut self) -> Result<SimulationReport, SimError> {
        self.distribute_frames()?;
        while self.step()? {}
        info!("Simulation finished after {} turns", self.current_turn);
        Ok(self.report())
    }

    /// Hand the frames of a finished process to the queued process with the most faults
    fn terminate(&mut self, index: usize) {
        let from = self.processes[index].id();
        for observer in &mut self.observers {
            observer.on_terminated(&self.processes[index]);
        }

        let frames = self.processes[index].release_frames();
        let recipient = self.most_faulting_queued();
        if let Some(recipient) = recipient {
            self.processes[recipient].grant_frames(frames.iter().copied());
        }

        for observer in &mut self.observers {
            observer.on_frames_transferred(from, recipient.map(|r| &self.processes[r]), &frames);
        }
    }

    /// Queued process with strictly the most faults; the earliest in queue order wins ties
    fn most_faulting_queued(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for &candidate in &self.ready_queue {
            match best {
                Some(current)
                    if self.processes[candidate].faults() <= self.processes[current].faults() => {}
                _ => best = Some(candidate),
            }
        }
        best
    }

    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            processes: self.processes.iter().map(Process::stats).collect(),
            turns: self.current_turn,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn process(&self, id: ProcessId) -> Result<&Process, SimError> {
        self.processes
            .get(id.index())
            .ok_or(SimError::UnknownProcess(id))
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Ids of the queued processes, head first
    pub fn queued(&self) -> Vec<ProcessId> {
        self.ready_queue
            .iter()
            .map(|&index| self.processes[index].id())
            .collect()
    }

    /// Turns executed so far
    pub fn current_turn(&self) -> u64 {
        self.current_turn
    }

    pub fn is_finished(&self) -> bool {
        self.frames_distributed && self.ready_queue.is_empty()
    }
}

/// Service the reference at the cursor of `process`
///
/// Returns the trace index that was attempted and what happened. A fault loads
/// the page and rewinds the cursor so the same reference is retried next turn;
/// the retry is not counted as a hit.
fn service_reference(process: &mut Process) -> Result<(usize, TurnOutcome), SimError> {
    let index = process.cursor();
    let reference = process
        .next_reference()
        .ok_or(SimError::TraceExhausted(process.id()))?;
    let page = reference.page();
    process.record_turn();

    if process.is_page_resident(page) {
        let outcome = if process.already_faulted(index) {
            TurnOutcome::Retry
        } else {
            process.record_hit();
            TurnOutcome::Hit
        };
        process.touch_page(page)?;
        process.record_processed();
        return Ok((index, outcome));
    }

    process.record_fault(index);
    let resolution = resolve_fault(process, page)?;
    process.rewind_one();
    Ok((index, TurnOutcome::Fault(resolution)))
}

fn resolve_fault(process: &mut Process, page: PageNumber) -> Result<FaultResolution, SimError> {
    if let Some(frame) = process.free_frame() {
        process.load_page(page, frame)?;
        process.record_swap();
        return Ok(FaultResolution::FreeFrame { frame });
    }

    let frame = process
        .pick_victim_frame()
        .ok_or(SimError::NoVictimFrame(process.id()))?;
    let evicted_page = process
        .evict(frame)
        .ok_or(SimError::NoVictimFrame(process.id()))?;
    process.load_page(page, frame)?;
    // write-out of the victim, read-in of the new page
    process.record_swap();
    process.record_swap();
    Ok(FaultResolution::Replacement {
        frame,
        evicted_page,
    })
}
