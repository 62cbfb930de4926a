//! Reader for per-process trace files
//!
//! A trace file starts with `KEY=value` metadata lines (`TP`, `NF`, `NC`, `NR`,
//! `NP`) followed by one reference line per access:
//! `<label>:[<i>-<j>],<page>,<offset>,<r|w>`.

use super::errors::SimError;
use super::reference::{MemoryReference, Operation};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Header values of a trace file; absent keys stay `None`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceMetadata {
    /// Page size in bytes (`TP`)
    pub page_size: Option<usize>,
    /// Matrix rows (`NF`)
    pub rows: Option<usize>,
    /// Matrix columns (`NC`)
    pub cols: Option<usize>,
    /// Declared number of references (`NR`)
    pub reference_count: Option<usize>,
    /// Declared number of virtual pages (`NP`)
    pub page_count: Option<usize>,
}

/// A parsed trace: header plus the references in service order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub metadata: TraceMetadata,
    pub references: Vec<MemoryReference>,
}

impl Trace {
    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

/// Read and parse the trace file at `path`
pub fn load_trace<P: AsRef<Path>>(path: P) -> Result<Trace, SimError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| SimError::Io(format!("failed to read {}: {}", path.display(), e)))?;
    Ok(parse_trace(&content))
}

/// Parse trace file content
///
/// Lines before the first bracketed reference line are scanned for metadata;
/// anything else there is ignored. After that, every non-blank line must be a
/// reference line. Malformed lines of either kind are skipped with a warning.
pub fn parse_trace(content: &str) -> Trace {
    let mut trace = Trace::default();
    let mut lines = content.lines().enumerate();

    for (number, line) in lines.by_ref() {
        let line = line.trim();
        if line.contains('[') {
            push_reference(&mut trace, number, line);
            break;
        }
        if let Some((key, value)) = line.split_once('=') {
            if let Err(e) = apply_metadata(&mut trace.metadata, key.trim(), value.trim()) {
                warn!("Ignoring trace line {}: {}", number + 1, e);
            }
        }
    }

    for (number, line) in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        push_reference(&mut trace, number, line);
    }

    if let Some(declared) = trace.metadata.reference_count {
        if declared != trace.references.len() {
            warn!(
                "Trace declares NR={} but contains {} references",
                declared,
                trace.references.len()
            );
        }
    }

    trace
}

fn push_reference(trace: &mut Trace, number: usize, line: &str) {
    match parse_reference_line(line) {
        Ok(reference) => trace.references.push(reference),
        Err(e) => warn!("Skipping trace line {}: {}", number + 1, e),
    }
}

/// Parse one `<label>,<page>,<offset>,<op>` line
pub fn parse_reference_line(line: &str) -> Result<MemoryReference, SimError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 4 {
        return Err(SimError::Parse(format!(
            "expected 4 comma-separated fields, got {} in '{}'",
            fields.len(),
            line
        )));
    }

    let page: usize = fields[1]
        .parse()
        .map_err(|_| SimError::Parse(format!("invalid virtual page: {}", fields[1])))?;
    let offset: usize = fields[2]
        .parse()
        .map_err(|_| SimError::Parse(format!("invalid offset: {}", fields[2])))?;
    let operation = fields[3]
        .chars()
        .next()
        .and_then(Operation::from_symbol)
        .ok_or_else(|| SimError::Parse(format!("invalid operation: '{}'", fields[3])))?;

    Ok(MemoryReference::new(page, offset, operation))
}

fn apply_metadata(metadata: &mut TraceMetadata, key: &str, value: &str) -> Result<(), SimError> {
    let slot = match key {
        "TP" => &mut metadata.page_size,
        "NF" => &mut metadata.rows,
        "NC" => &mut metadata.cols,
        "NR" => &mut metadata.reference_count,
        "NP" => &mut metadata.page_count,
        _ => return Ok(()),
    };
    let parsed: usize = value
        .parse()
        .map_err(|_| SimError::Parse(format!("invalid value for {}: {}", key, value)))?;
    *slot = Some(parsed);
    Ok(())
}
