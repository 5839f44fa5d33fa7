use crate::engine::{ConfigOverrides, ConversionResult, Engine};
use crate::files::display_name;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Snapshot of one conversion batch, taken when the user hits Convert.
/// Owned exclusively by the worker until the run finishes.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub id: Uuid,
    pub files: Vec<PathBuf>,
    pub formats: Vec<String>,
    /// `None` means "same directory as each source file".
    pub output_dir: Option<PathBuf>,
    pub overwrite: bool,
    pub keep_intermediate: bool,
}

impl JobSpec {
    pub fn new(
        files: Vec<PathBuf>,
        formats: Vec<String>,
        output_dir: Option<PathBuf>,
        overwrite: bool,
        keep_intermediate: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            files,
            formats,
            output_dir,
            overwrite,
            keep_intermediate,
        }
    }

    pub fn total_pairs(&self) -> usize {
        self.files.len() * self.formats.len()
    }
}

/// One progress message from the worker to the UI. `result` is set on the
/// per-pair updates and `None` on the terminal update.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub percentage: f32,
    pub status: String,
    pub result: Option<ConversionResult>,
}

impl ProgressUpdate {
    pub fn is_terminal(&self) -> bool {
        self.percentage >= 100.0 && self.result.is_none()
    }
}

/// Executes a JobSpec to completion. `run` is synchronous so tests can
/// drive it on the calling thread; `spawn` moves it onto a background
/// thread with an mpsc channel as the progress callback.
pub struct ConversionWorker {
    engine: Box<dyn Engine>,
    spec: JobSpec,
    results: Vec<ConversionResult>,
}

impl ConversionWorker {
    pub fn new(engine: Box<dyn Engine>, spec: JobSpec) -> Self {
        Self {
            engine,
            spec,
            results: Vec::new(),
        }
    }

    /// Every result recorded so far, in (file-major) execution order.
    pub fn results(&self) -> &[ConversionResult] {
        &self.results
    }

    pub fn spec(&self) -> &JobSpec {
        &self.spec
    }

    /// Hands the engine back to the shell once the run is over, along with
    /// the retained results.
    pub fn into_parts(self) -> (Box<dyn Engine>, Vec<ConversionResult>) {
        (self.engine, self.results)
    }

    /// Runs the whole batch, invoking `callback` once per (file, format)
    /// pair and once more with the terminal update. One failed conversion
    /// never aborts the batch.
    pub fn run<F>(&mut self, mut callback: F)
    where
        F: FnMut(ProgressUpdate),
    {
        let total = self.spec.total_pairs();
        let mut completed = 0usize;

        tracing::info!(
            job = %self.spec.id,
            "starting conversion: {} files, {} formats",
            self.spec.files.len(),
            self.spec.formats.len()
        );

        let mut overrides = ConfigOverrides::default();
        if let Some(dir) = &self.spec.output_dir {
            overrides.output_dir = Some(dir.clone());
            tracing::debug!("output directory: {}", dir.display());
        }
        if self.spec.overwrite {
            overrides.overwrite = Some(true);
            tracing::debug!("overwrite enabled");
        }
        if self.spec.keep_intermediate {
            overrides.keep_intermediate = Some(true);
            tracing::debug!("keep intermediate files enabled");
        }
        if overrides != ConfigOverrides::default() {
            self.engine.override_config(&overrides);
        }

        let started = Instant::now();

        for file in &self.spec.files {
            let name = display_name(file);
            for format in &self.spec.formats {
                tracing::info!("converting {} to {}", name, format);

                let result = match self.engine.convert(file, format) {
                    Ok(result) => result,
                    Err(err) => {
                        tracing::error!("conversion failed for {} to {}: {}", name, format, err);
                        ConversionResult::failure(file.clone(), err.to_string())
                    }
                };

                if result.success {
                    match &result.target_path {
                        Some(target) => {
                            tracing::info!("✓ {} -> {}", name, display_name(target))
                        }
                        None => tracing::info!("✓ {}", name),
                    }
                } else {
                    tracing::error!(
                        "✗ {}: {}",
                        name,
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                }

                self.results.push(result.clone());
                completed += 1;

                let percentage = completed as f32 / total as f32 * 100.0;
                let mut status = format!("Converting {} to {}...", name, format.to_uppercase());
                if let Some(eta) = estimate_remaining(started.elapsed(), completed, total) {
                    status.push_str(&format!(" (ETA {})", format_eta(eta)));
                }

                callback(ProgressUpdate {
                    percentage,
                    status,
                    result: Some(result),
                });
            }
        }

        let successful = self.results.iter().filter(|r| r.success).count();
        tracing::info!(
            job = %self.spec.id,
            "conversion complete: {}/{} successful",
            successful,
            self.results.len()
        );

        callback(ProgressUpdate {
            percentage: 100.0,
            status: "Conversion complete!".to_string(),
            result: None,
        });
    }

    /// Starts the run on a fresh background thread. The returned receiver
    /// carries every progress update; joining the handle yields the worker
    /// back for engine recovery and result introspection.
    pub fn spawn(mut self) -> (Receiver<ProgressUpdate>, JoinHandle<ConversionWorker>) {
        let (tx, rx) = mpsc::channel();
        let handle = std::thread::spawn(move || {
            self.run(|update| {
                // The receiver only disappears if the UI is gone; nothing
                // left to notify then.
                let _ = tx.send(update);
            });
            self
        });
        (rx, handle)
    }
}

/// `(elapsed / completed) * (total - completed)`, defined once at least one
/// pair has finished and work remains.
fn estimate_remaining(elapsed: Duration, completed: usize, total: usize) -> Option<Duration> {
    if completed == 0 || completed >= total {
        return None;
    }
    Some(elapsed.mul_f64((total - completed) as f64 / completed as f64))
}

fn format_eta(eta: Duration) -> String {
    let total_seconds = eta.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
