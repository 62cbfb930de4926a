//! Reference-trace generator
//!
//! Produces one trace file per process describing the memory accesses of an
//! elementwise sum of two matrices into a third one (`M3 = M1 + M2`), with the
//! three matrices laid out back to back in the process address space.

pub mod config;

pub use config::{GeneratorConfig, MatrixDims};

use crate::core::errors::SimError;
use crate::core::reference::Operation;
use log::{error, info};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Size in bytes of one matrix element
pub const ELEMENT_SIZE: usize = 4;

/// Number of matrices touched per element: two operands and the result
pub const MATRICES: usize = 3;

pub struct TraceGenerator {
    config: GeneratorConfig,
    trace_prefix: String,
}

impl TraceGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            trace_prefix: crate::core::config::DEFAULT_TRACE_PREFIX.to_string(),
        }
    }

    pub fn with_trace_prefix(mut self, prefix: &str) -> Self {
        self.trace_prefix = prefix.to_string();
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Render the complete trace file for a process summing `dims` matrices
    pub fn render(&self, dims: MatrixDims) -> String {
        let page_size = self.config.page_size;
        let reference_count = MATRICES * dims.elements();
        let matrix_bytes = dims.elements() * ELEMENT_SIZE;
        let page_count = (MATRICES * matrix_bytes).div_ceil(page_size);

        let mut out = format!(
            "TP={}\nNF={}\nNC={}\nNR={}\nNP={}\n",
            page_size, dims.rows, dims.cols, reference_count, page_count
        );

        let accesses = [
            ("M1", Operation::Read),
            ("M2", Operation::Read),
            ("M3", Operation::Write),
        ];
        for i in 0..dims.rows {
            for j in 0..dims.cols {
                let element = (i * dims.cols + j) * ELEMENT_SIZE;
                for (matrix, (label, operation)) in accesses.iter().enumerate() {
                    let position = matrix * matrix_bytes + element;
                    out.push_str(&format!(
                        "{}:[{}-{}],{},{},{}\n",
                        label,
                        i,
                        j,
                        position / page_size,
                        position % page_size,
                        operation.symbol()
                    ));
                }
            }
        }
        out
    }

    /// Path of the trace file for process `index` inside `out_dir`
    pub fn trace_path(&self, out_dir: &Path, index: usize) -> PathBuf {
        out_dir.join(format!("{}{}.txt", self.trace_prefix, index))
    }

    /// Write the trace file of every configured process into `out_dir`
    ///
    /// Files are rendered and written in parallel. A process without a matrix
    /// size, or whose file cannot be written, is reported and skipped; the
    /// returned paths are the files actually written, in process order.
    pub fn generate<P: AsRef<Path>>(&self, out_dir: P) -> Result<Vec<PathBuf>, SimError> {
        let out_dir = out_dir.as_ref();
        self.config.validate()?;

        let results: Vec<Result<PathBuf, SimError>> = (0..self.config.process_count)
            .into_par_iter()
            .map(|index| self.generate_one(out_dir, index))
            .collect();

        let mut written = Vec::new();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(path) => written.push(path),
                Err(e) => error!("Skipping trace of process {}: {}", index, e),
            }
        }
        Ok(written)
    }

    fn generate_one(&self, out_dir: &Path, index: usize) -> Result<PathBuf, SimError> {
        let dims = self.config.matrix_for(index).ok_or_else(|| {
            SimError::InvalidConfig(format!("no matrix size listed for process {}", index))
        })?;
        let path = self.trace_path(out_dir, index);
        fs::write(&path, self.render(dims))
            .map_err(|e| SimError::Io(format!("failed to write {}: {}", path.display(), e)))?;
        info!("Wrote trace for process {} ({}) to {}", index, dims, path.display());
        Ok(path)
    }
}
