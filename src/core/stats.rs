use super::types::ProcessId;
use serde::{Deserialize, Serialize};

/// Final counters of one process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStats {
    pub process: ProcessId,
    /// Number of references in the trace
    pub total: usize,
    pub faults: usize,
    pub hits: usize,
    /// Backing-store reads plus write-outs
    pub swap_accesses: usize,
    /// Scheduling turns consumed, retries included
    pub turns: usize,
}

impl ProcessStats {
    /// Faults per reference, 0.0 for an empty trace
    pub fn fault_rate(&self) -> f64 {
        ratio(self.faults, self.total)
    }

    /// Hits per reference, 0.0 for an empty trace
    pub fn hit_rate(&self) -> f64 {
        ratio(self.hits, self.total)
    }
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

impl std::fmt::Display for ProcessStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Process: {}", self.process)?;
        writeln!(f, "- References: {}", self.total)?;
        writeln!(f, "- Faults: {}", self.faults)?;
        writeln!(f, "- Hits: {}", self.hits)?;
        writeln!(f, "- Swap accesses: {}", self.swap_accesses)?;
        writeln!(f, "- Fault rate: {:.4}", self.fault_rate())?;
        write!(f, "- Hit rate: {:.4}", self.hit_rate())
    }
}

/// Statistics of a finished run, one entry per process in creation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub processes: Vec<ProcessStats>,
    /// Scheduling turns executed across all processes
    pub turns: u64,
}

impl SimulationReport {
    pub fn total_faults(&self) -> usize {
        self.processes.iter().map(|p| p.faults).sum()
    }

    pub fn total_hits(&self) -> usize {
        self.processes.iter().map(|p| p.hits).sum()
    }

    pub fn total_swap_accesses(&self) -> usize {
        self.processes.iter().map(|p| p.swap_accesses).sum()
    }

    pub fn get(&self, process: ProcessId) -> Option<&ProcessStats> {
        self.processes.iter().find(|p| p.process == process)
    }
}

impl std::fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Simulation Results ===")?;
        for stats in &self.processes {
            writeln!(f, "{}", stats)?;
            writeln!(f)?;
        }
        writeln!(f, "Turns: {}", self.turns)?;
        writeln!(f, "Total faults: {}", self.total_faults())?;
        writeln!(f, "Total hits: {}", self.total_hits())?;
        write!(f, "Total swap accesses: {}", self.total_swap_accesses())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(process: usize, total: usize, faults: usize) -> ProcessStats {
        ProcessStats {
            process: ProcessId(process),
            total,
            faults,
            hits: total - faults,
            swap_accesses: faults * 2,
            turns: total + faults,
        }
    }

    #[test]
    fn test_rates() {
        let stats = sample(0, 8, 2);
        assert_eq!(stats.fault_rate(), 0.25);
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_rates_of_empty_trace() {
        let stats = sample(0, 0, 0);
        assert_eq!(stats.fault_rate(), 0.0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_display_formats_rates() {
        let text = sample(1, 3, 1).to_string();
        assert!(text.starts_with("Process: 1\n"));
        assert!(text.contains("- Fault rate: 0.3333"));
        assert!(text.contains("- Hit rate: 0.6667"));
    }

    #[test]
    fn test_report_totals() {
        let report = SimulationReport {
            processes: vec![sample(0, 12, 4), sample(1, 6, 6)],
            turns: 28,
        };
        assert_eq!(report.total_faults(), 10);
        assert_eq!(report.total_hits(), 8);
        assert_eq!(report.total_swap_accesses(), 20);
        assert_eq!(report.get(ProcessId(1)).map(|p| p.total), Some(6));
        assert!(report.get(ProcessId(2)).is_none());
    }
}
