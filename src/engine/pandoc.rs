use crate::engine::{ConfigOverrides, ConversionResult, Engine, EngineError};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Engine that shells out to the `pandoc` binary. The target format is
/// selected by the output file's extension, which pandoc maps to the
/// matching writer.
pub struct PandocEngine {
    output_dir: Option<PathBuf>,
    overwrite: bool,
    keep_intermediate: bool,
}

impl PandocEngine {
    /// Probes the converter binary up front so a missing installation is a
    /// startup failure, not a mid-batch surprise.
    pub fn new() -> Result<Self, EngineError> {
        let version = pandoc_version()?;
        tracing::info!("using {}", version);

        Ok(Self {
            output_dir: None,
            overwrite: false,
            keep_intermediate: false,
        })
    }

    /// Where the converted file for `(file, format)` will land given the
    /// current output directory setting.
    pub fn planned_target(file: &Path, format: &str, output_dir: Option<&Path>) -> PathBuf {
        let stem = file.file_stem().unwrap_or_default().to_string_lossy();
        let dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => file.parent().unwrap_or_else(|| Path::new(".")).to_path_buf(),
        };
        dir.join(format!("{}.{}", stem, format))
    }

    fn run_pandoc(&self, file: &Path, scratch_out: &Path) -> Result<std::process::Output, EngineError> {
        Command::new("pandoc")
            .arg(file)
            .arg("--standalone")
            .arg("-o")
            .arg(scratch_out)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EngineError::ConverterNotFound
                } else {
                    EngineError::Spawn(e.to_string())
                }
            })
    }
}

impl Engine for PandocEngine {
    fn convert(&mut self, file: &Path, target_format: &str) -> Result<ConversionResult, EngineError> {
        if !file.exists() {
            return Err(EngineError::InvalidSource(format!(
                "{} does not exist",
                file.display()
            )));
        }

        let target = Self::planned_target(file, target_format, self.output_dir.as_deref());
        if target.exists() && !self.overwrite {
            return Ok(ConversionResult::failure(
                file.to_path_buf(),
                format!("{} already exists (overwrite disabled)", target.display()),
            ));
        }

        // Convert into a scratch directory first so a failed run never
        // leaves a truncated file at the target path.
        let scratch = tempfile::Builder::new().prefix("convertext-").tempdir()?;
        let scratch_out = scratch.path().join(
            target
                .file_name()
                .ok_or_else(|| EngineError::InvalidSource(format!("{}", file.display())))?,
        );

        let output = self.run_pandoc(file, &scratch_out)?;
        if !output.status.success() {
            let mut error_msg = String::new();
            for line in output.stderr.as_slice().lines().take(5).flatten() {
                error_msg.push_str(&line);
                error_msg.push('\n');
            }
            if error_msg.is_empty() {
                error_msg = format!("pandoc exited with {}", output.status);
            }
            return Ok(ConversionResult::failure(
                file.to_path_buf(),
                error_msg.trim_end().to_string(),
            ));
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&scratch_out, &target)?;

        if self.keep_intermediate {
            let kept = scratch.into_path();
            tracing::debug!("intermediate files kept in {}", kept.display());
        }

        Ok(ConversionResult::success(file.to_path_buf(), target))
    }

    fn override_config(&mut self, overrides: &ConfigOverrides) {
        if let Some(dir) = &overrides.output_dir {
            self.output_dir = Some(dir.clone());
        }
        if let Some(overwrite) = overrides.overwrite {
            self.overwrite = overwrite;
        }
        if let Some(keep) = overrides.keep_intermediate {
            self.keep_intermediate = keep;
        }
    }
}

pub fn pandoc_version() -> Result<String, EngineError> {
    let output = Command::new("pandoc")
        .arg("--version")
        .output()
        .map_err(|_| EngineError::ConverterNotFound)?;

    if !output.status.success() {
        return Err(EngineError::ConverterNotFound);
    }

    let version_info = String::from_utf8_lossy(&output.stdout);
    version_info
        .lines()
        .next()
        .map(|line| line.to_string())
        .ok_or(EngineError::ConverterNotFound)
}
