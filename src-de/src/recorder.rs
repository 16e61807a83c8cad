//! Per-generation fitness logging.
//!
//! The engine appends one record per generation: the fitness of every member
//! of the (sorted) population. Records are plain CSV lines, e.g.
//! `1.5,2.25,0.75`.

use std::fs::{File, OpenOptions, create_dir_all};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Destination for per-generation fitness records
pub trait FitnessLog {
    /// Append one record
    fn append_record(&mut self, values: &[f64]) -> Result<()>;
}

impl<T: FitnessLog + ?Sized> FitnessLog for &mut T {
    fn append_record(&mut self, values: &[f64]) -> Result<()> {
        (**self).append_record(values)
    }
}

impl<T: FitnessLog + ?Sized> FitnessLog for Box<T> {
    fn append_record(&mut self, values: &[f64]) -> Result<()> {
        (**self).append_record(values)
    }
}

/// Create a fresh, empty file at `path`.
///
/// If `path` already exists, a counter is inserted before the extension
/// (`run.csv`, `run1.csv`, `run2.csv`, ...) until a free name is found.
/// Missing parent directories are created.
pub fn create_log_file(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());

    let mut candidate = path.to_path_buf();
    let mut counter = 1usize;
    loop {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let name = match &ext {
                    Some(ext) => format!("{}{}.{}", stem, counter, ext),
                    None => format!("{}{}", stem, counter),
                };
                candidate = path.with_file_name(name);
                counter += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Appends records to a CSV file created by [`create_log_file`]
#[derive(Debug)]
pub struct CsvFitnessLog {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvFitnessLog {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = create_log_file(path)?;
        let file = OpenOptions::new().append(true).open(&path)?;
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);
        Ok(Self { path, writer })
    }

    /// Path actually used (after name disambiguation)
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FitnessLog for CsvFitnessLog {
    fn append_record(&mut self, values: &[f64]) -> Result<()> {
        self.writer.write_record(values.iter().map(|v| v.to_string()))?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps every record in memory
#[derive(Debug, Clone, Default)]
pub struct FitnessHistory {
    records: Vec<Vec<f64>>,
}

impl FitnessHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Vec<f64>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Best (lowest) value of each record
    pub fn best_per_record(&self) -> Vec<f64> {
        self.records
            .iter()
            .map(|r| r.iter().copied().fold(f64::INFINITY, f64::min))
            .collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl FitnessLog for FitnessHistory {
    fn append_record(&mut self, values: &[f64]) -> Result<()> {
        self.records.push(values.to_vec());
        Ok(())
    }
}
