use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod pandoc;
pub mod registry;

pub use pandoc::PandocEngine;
pub use registry::BuiltinRegistry;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("pandoc not found. Please install pandoc and ensure it's in your PATH.")]
    ConverterNotFound,
    #[error("converter failed to start: {0}")]
    Spawn(String),
    #[error("invalid source file: {0}")]
    InvalidSource(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of one (file, format) conversion. Created once by the engine
/// (or synthesized by the worker on an engine error), never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub success: bool,
    pub source_path: PathBuf,
    pub target_path: Option<PathBuf>,
    pub error: Option<String>,
}

impl ConversionResult {
    pub fn success(source_path: PathBuf, target_path: PathBuf) -> Self {
        Self {
            success: true,
            source_path,
            target_path: Some(target_path),
            error: None,
        }
    }

    pub fn failure(source_path: PathBuf, error: String) -> Self {
        Self {
            success: false,
            source_path,
            target_path: None,
            error: Some(error),
        }
    }
}

/// Partial configuration applied to the engine before a run. Unset fields
/// leave the engine's current setting untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub output_dir: Option<PathBuf>,
    pub overwrite: Option<bool>,
    pub keep_intermediate: Option<bool>,
}

/// Conversion backend. The worker owns the engine for the duration of one
/// run and hands it back when the run finishes.
#[cfg_attr(test, mockall::automock)]
pub trait Engine: Send {
    /// Convert one file to one target format. A failed conversion that the
    /// engine itself diagnosed comes back as `Ok` with `success == false`;
    /// `Err` is reserved for the engine blowing up (converter missing,
    /// process spawn failure). Callers must survive both.
    fn convert(&mut self, file: &Path, target_format: &str) -> Result<ConversionResult, EngineError>;

    fn override_config(&mut self, overrides: &ConfigOverrides);
}

/// Reports which conversions the installed converter stack supports,
/// queried once at startup.
#[cfg_attr(test, mockall::automock)]
pub trait FormatRegistry {
    fn list_supported_formats(&self) -> HashMap<String, HashSet<String>>;
}
