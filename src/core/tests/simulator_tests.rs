use crate::core::errors::SimError;
use crate::core::observer::{FaultResolution, SimulationObserver, TurnOutcome};
use crate::core::process::Process;
use crate::core::reference::{MemoryReference, Operation};
use crate::core::simulator::Simulator;
use crate::core::trace::parse_trace;
use crate::core::types::{FrameId, ProcessId};
use crate::generator::{GeneratorConfig, MatrixDims, TraceGenerator};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;

fn reads(pages: &[usize]) -> Vec<MemoryReference> {
    pages
        .iter()
        .map(|&page| MemoryReference::new(page, 0, Operation::Read))
        .collect()
}

fn frames(list: &[FrameId]) -> BTreeSet<FrameId> {
    list.iter().copied().collect()
}

fn owned(sim: &Simulator, pid: usize) -> BTreeSet<FrameId> {
    sim.process(ProcessId(pid)).unwrap().owned_frames().clone()
}

#[derive(Debug, Clone, PartialEq)]
enum Recorded {
    Turn(ProcessId, usize, TurnOutcome),
    Transfer(ProcessId, Option<ProcessId>, Vec<FrameId>),
    Terminated(ProcessId),
}

/// Test observer collecting every callback into a shared log
struct Recorder {
    log: Rc<RefCell<Vec<Recorded>>>,
}

impl Recorder {
    fn attach(sim: &mut Simulator) -> Rc<RefCell<Vec<Recorded>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        sim.add_observer(Box::new(Recorder { log: log.clone() }));
        log
    }
}

impl SimulationObserver for Recorder {
    fn on_turn(&mut self, _turn: u64, process: &Process, index: usize, outcome: TurnOutcome) {
        self.log
            .borrow_mut()
            .push(Recorded::Turn(process.id(), index, outcome));
    }

    fn on_frames_transferred(
        &mut self,
        from: ProcessId,
        to: Option<&Process>,
        frames: &[FrameId],
    ) {
        self.log
            .borrow_mut()
            .push(Recorded::Transfer(from, to.map(Process::id), frames.to_vec()));
    }

    fn on_terminated(&mut self, process: &Process) {
        self.log.borrow_mut().push(Recorded::Terminated(process.id()));
    }
}

fn matrix_trace(page_size: usize, dims: MatrixDims) -> Vec<MemoryReference> {
    let generator = TraceGenerator::new(GeneratorConfig {
        page_size,
        process_count: 1,
        matrix_sizes: vec![dims],
    });
    parse_trace(&generator.render(dims)).references
}

#[test]
fn test_initial_distribution_drops_remainder() {
    let mut sim = Simulator::from_traces(10, vec![reads(&[0]), reads(&[0]), reads(&[0])]).unwrap();
    sim.distribute_frames().unwrap();

    assert_eq!(owned(&sim, 0), frames(&[0, 1, 2]));
    assert_eq!(owned(&sim, 1), frames(&[3, 4, 5]));
    assert_eq!(owned(&sim, 2), frames(&[6, 7, 8]));
    assert!(sim.processes().iter().all(|p| !p.owns_frame(9)));
}

#[test]
fn test_distribution_happens_once() {
    let mut sim = Simulator::from_traces(4, vec![reads(&[0]), reads(&[0])]).unwrap();
    sim.distribute_frames().unwrap();
    sim.distribute_frames().unwrap();
    assert_eq!(owned(&sim, 0), frames(&[0, 1]));
    assert_eq!(owned(&sim, 1), frames(&[2, 3]));
}

#[test]
fn test_too_few_frames_rejected() {
    let result = Simulator::from_traces(2, vec![reads(&[0]), reads(&[0]), reads(&[0])]);
    assert!(matches!(result, Err(SimError::InvalidConfig(_))));
}

#[test]
fn test_retry_after_fault_is_not_a_hit() {
    let mut sim = Simulator::from_traces(2, vec![reads(&[0, 0, 1, 0])]).unwrap();
    let log = Recorder::attach(&mut sim);

    let report = sim.run().unwrap();
    let stats = &report.processes[0];

    assert_eq!(stats.faults, 2);
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.swap_accesses, 2);
    assert_eq!(stats.turns, 6);
    assert_eq!(report.turns, 6);

    let turns: Vec<(usize, TurnOutcome)> = log
        .borrow()
        .iter()
        .filter_map(|event| match event {
            Recorded::Turn(_, index, outcome) => Some((*index, *outcome)),
            _ => None,
        })
        .collect();
    assert_eq!(
        turns,
        vec![
            (0, TurnOutcome::Fault(FaultResolution::FreeFrame { frame: 0 })),
            (0, TurnOutcome::Retry),
            (1, TurnOutcome::Hit),
            (2, TurnOutcome::Fault(FaultResolution::FreeFrame { frame: 1 })),
            (2, TurnOutcome::Retry),
            (3, TurnOutcome::Hit),
        ]
    );
}

#[test]
fn test_lru_replacement_choice() {
    let mut sim = Simulator::from_traces(2, vec![reads(&[0, 1, 0, 2, 1])]).unwrap();
    let log = Recorder::attach(&mut sim);

    let report = sim.run().unwrap();
    let stats = &report.processes[0];
    assert_eq!(stats.faults, 4);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.swap_accesses, 6);

    let replacements: Vec<FaultResolution> = log
        .borrow()
        .iter()
        .filter_map(|event| match event {
            Recorded::Turn(_, _, TurnOutcome::Fault(r @ FaultResolution::Replacement { .. })) => {
                Some(*r)
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        replacements,
        vec![
            FaultResolution::Replacement {
                frame: 1,
                evicted_page: 1
            },
            FaultResolution::Replacement {
                frame: 0,
                evicted_page: 0
            },
        ]
    );
}

#[test]
fn test_single_frame_matrix_sum_faults_everywhere() {
    let trace = matrix_trace(4, MatrixDims::new(2, 2));
    assert_eq!(trace.len(), 12);
    let distinct: HashSet<usize> = trace.iter().map(|r| r.page()).collect();

    let mut sim = Simulator::from_traces(1, vec![trace]).unwrap();
    let report = sim.run().unwrap();
    let stats = &report.processes[0];

    assert_eq!(stats.faults, distinct.len());
    assert_eq!(stats.hits, 0);
    assert!(stats.swap_accesses >= 2 * (distinct.len() - 1) + 1);
    assert_eq!(stats.swap_accesses, 23);
    assert_eq!(stats.turns, 24);
}

#[test]
fn test_terminated_frames_go_to_most_faulting_process() {
    let a = reads(&[0, 1, 0, 0, 0, 0, 0, 0]);
    let b = reads(&[10, 11, 12, 13, 14, 15]);
    let mut sim = Simulator::from_traces(4, vec![a, b]).unwrap();
    let log = Recorder::attach(&mut sim);
    sim.distribute_frames().unwrap();

    while !owned(&sim, 0).is_empty() {
        assert!(sim.step().unwrap());
    }

    let a = sim.process(ProcessId(0)).unwrap();
    let b = sim.process(ProcessId(1)).unwrap();
    assert_eq!(a.faults(), 2);
    assert_eq!(b.faults(), 5);
    assert!(a.owned_frames().is_empty());
    assert_eq!(b.owned_frames(), &frames(&[0, 1, 2, 3]));
    assert_eq!(sim.queued(), vec![ProcessId(1)]);
    assert!(log.borrow().contains(&Recorded::Transfer(
        ProcessId(0),
        Some(ProcessId(1)),
        vec![0, 1]
    )));

    // the transferred frames are free for B's next fault
    let report = sim.run().unwrap();
    let b = report.get(ProcessId(1)).unwrap();
    assert_eq!(b.faults, 6);
    assert_eq!(b.swap_accesses, 9);
    assert!(log.borrow().contains(&Recorded::Turn(
        ProcessId(1),
        5,
        TurnOutcome::Fault(FaultResolution::FreeFrame { frame: 0 })
    )));
}

#[test]
fn test_redistribution_prefers_strictly_more_faults() {
    let p0 = reads(&[0, 0, 0, 0]);
    let p1 = reads(&[0, 0, 0, 0, 0]);
    let p2 = reads(&[0, 1, 2, 3]);
    let mut sim = Simulator::from_traces(3, vec![p0, p1, p2]).unwrap();
    sim.distribute_frames().unwrap();

    while !owned(&sim, 0).is_empty() {
        sim.step().unwrap();
    }

    assert_eq!(sim.process(ProcessId(1)).unwrap().faults(), 1);
    assert_eq!(sim.process(ProcessId(2)).unwrap().faults(), 2);
    assert_eq!(owned(&sim, 1), frames(&[1]));
    assert_eq!(owned(&sim, 2), frames(&[0, 2]));
}

#[test]
fn test_redistribution_tie_goes_to_queue_head() {
    let mut sim = Simulator::from_traces(3, vec![vec![], reads(&[0]), reads(&[0])]).unwrap();

    // the empty process terminates without consuming a turn
    assert!(sim.step().unwrap());
    assert_eq!(sim.current_turn(), 0);

    assert!(owned(&sim, 0).is_empty());
    assert_eq!(owned(&sim, 1), frames(&[0, 1]));
    assert_eq!(owned(&sim, 2), frames(&[2]));
    assert_eq!(sim.queued(), vec![ProcessId(1), ProcessId(2)]);
}

#[test]
fn test_last_process_releases_frames_to_nobody() {
    let mut sim = Simulator::from_traces(2, vec![reads(&[0]), reads(&[0, 1, 2])]).unwrap();
    let log = Recorder::attach(&mut sim);

    sim.run().unwrap();

    assert!(sim.is_finished());
    assert!(sim.queued().is_empty());
    assert!(owned(&sim, 0).is_empty());
    assert!(owned(&sim, 1).is_empty());

    let log = log.borrow();
    let last = log.len() - 1;
    assert_eq!(log[last], Recorded::Transfer(ProcessId(1), None, vec![0, 1]));
    assert_eq!(log[last - 1], Recorded::Terminated(ProcessId(1)));
    assert_eq!(sim.step(), Ok(false));
}

#[test]
fn test_invariants_hold_every_turn() {
    let traces = vec![
        matrix_trace(8, MatrixDims::new(3, 3)),
        matrix_trace(16, MatrixDims::new(4, 2)),
        matrix_trace(4, MatrixDims::new(2, 3)),
    ];
    let mut sim = Simulator::from_traces(7, traces).unwrap();
    let log = Recorder::attach(&mut sim);
    sim.distribute_frames().unwrap();

    loop {
        // expected LRU victim of the process about to run
        let head = sim.queued()[0];
        let process = sim.process(head).unwrap();
        let expected_victim = process
            .owned_frames()
            .iter()
            .filter_map(|&frame| process.last_used(frame).map(|stamp| (stamp, frame)))
            .min()
            .map(|(_, frame)| frame);
        let seen = log.borrow().len();

        let more = sim.step().unwrap();

        for event in log.borrow()[seen..].iter() {
            if let Recorded::Turn(_, _, TurnOutcome::Fault(resolution)) = event {
                if let FaultResolution::Replacement { frame, .. } = resolution {
                    assert_eq!(Some(*frame), expected_victim);
                }
            }
        }

        let mut all_frames = HashSet::new();
        for process in sim.processes() {
            assert!(process.resident_pages() <= process.owned_frames().len());
            for &frame in process.owned_frames() {
                assert!(frame < 7);
                assert!(all_frames.insert(frame), "frame {} owned twice", frame);
            }
        }

        if !more {
            break;
        }
    }

    let mut free_loads = vec![0usize; 3];
    let mut replacements = vec![0usize; 3];
    let mut faulted: Vec<HashSet<usize>> = vec![HashSet::new(); 3];
    for event in log.borrow().iter() {
        if let Recorded::Turn(pid, index, outcome) = event {
            match outcome {
                TurnOutcome::Fault(FaultResolution::FreeFrame { .. }) => {
                    free_loads[pid.index()] += 1;
                    faulted[pid.index()].insert(*index);
                }
                TurnOutcome::Fault(FaultResolution::Replacement { .. }) => {
                    replacements[pid.index()] += 1;
                    faulted[pid.index()].insert(*index);
                }
                TurnOutcome::Hit => assert!(!faulted[pid.index()].contains(index)),
                TurnOutcome::Retry => assert!(faulted[pid.index()].contains(index)),
            }
        }
    }

    for process in sim.processes() {
        let stats = process.stats();
        let i = process.id().index();
        assert_eq!(stats.hits + stats.faults, stats.total);
        assert_eq!(process.references_processed(), stats.total);
        assert_eq!(stats.turns, stats.total + stats.faults);
        assert_eq!(stats.swap_accesses, free_loads[i] + 2 * replacements[i]);
    }
}
