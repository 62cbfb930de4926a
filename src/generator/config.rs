use super::{ELEMENT_SIZE, MATRICES};
use crate::core::errors::SimError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Dimensions of the matrices summed by one process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixDims {
    pub rows: usize,
    pub cols: usize,
}

impl MatrixDims {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Parse `<rows>x<cols>`, e.g. `4x4`
    ///
    /// Sizes whose three matrices would not fit in the address space are rejected.
    pub fn parse(text: &str) -> Result<Self, SimError> {
        let (rows, cols) = text
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| SimError::Parse(format!("invalid matrix size: {}", text)))?;
        let rows: usize = rows
            .trim()
            .parse()
            .map_err(|_| SimError::Parse(format!("invalid row count in: {}", text)))?;
        let cols: usize = cols
            .trim()
            .parse()
            .map_err(|_| SimError::Parse(format!("invalid column count in: {}", text)))?;

        let dims = Self { rows, cols };
        if dims.address_space_bytes().is_none() {
            return Err(SimError::InvalidConfig(format!(
                "matrix size {} is too large",
                dims
            )));
        }
        Ok(dims)
    }

    pub fn elements(&self) -> usize {
        self.rows * self.cols
    }

    /// Bytes spanned by the three matrices, `None` on overflow
    pub fn address_space_bytes(&self) -> Option<usize> {
        self.rows
            .checked_mul(self.cols)?
            .checked_mul(ELEMENT_SIZE)?
            .checked_mul(MATRICES)
    }
}

impl std::fmt::Display for MatrixDims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Trace generator settings read from a `KEY=value` file:
///
/// ```text
/// TP=<pageSize>
/// NPROC=<processCount>
/// TAMS=<rows>x<cols>,<rows>x<cols>,...
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Page size in bytes
    pub page_size: usize,
    pub process_count: usize,
    /// Matrix size of each process, by process index
    pub matrix_sizes: Vec<MatrixDims>,
}

impl GeneratorConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SimError::Io(format!("failed to read config {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse configuration content; unknown keys are ignored
    pub fn parse(content: &str) -> Result<Self, SimError> {
        let mut page_size = None;
        let mut process_count = None;
        let mut matrix_sizes = Vec::new();

        for line in content.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "TP" => page_size = Some(parse_number("TP", value)?),
                "NPROC" => process_count = Some(parse_number("NPROC", value)?),
                "TAMS" => {
                    matrix_sizes = value
                        .split(',')
                        .filter(|size| !size.trim().is_empty())
                        .map(MatrixDims::parse)
                        .collect::<Result<Vec<_>, _>>()?;
                }
                _ => {}
            }
        }

        let config = Self {
            page_size: page_size
                .ok_or_else(|| SimError::Parse("missing TP entry".to_string()))?,
            process_count: process_count
                .ok_or_else(|| SimError::Parse("missing NPROC entry".to_string()))?,
            matrix_sizes,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.page_size == 0 {
            return Err(SimError::InvalidConfig(
                "page size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Matrix size of process `index`, if the config lists one
    pub fn matrix_for(&self, index: usize) -> Option<MatrixDims> {
        self.matrix_sizes.get(index).copied()
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize, SimError> {
    value
        .parse()
        .map_err(|_| SimError::Parse(format!("invalid value for {}: {}", key, value)))
}
