use crate::config::AppConfig;
use crate::constants::DOCUMENT_EXTENSIONS;
use crate::engine::{BuiltinRegistry, Engine, PandocEngine};
use crate::files::{display_name, looks_like_document, FileCollection};
use crate::formats::FormatSelection;
use crate::logging::{LogBuffer, LoggingHandle};
use crate::worker::{ConversionWorker, JobSpec, ProgressUpdate};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread::JoinHandle;

pub struct ResultLine {
    pub text: String,
    pub success: bool,
}

pub struct ErrorDialog {
    pub title: String,
    pub message: String,
}

pub struct CompletionDialog {
    pub files_converted: usize,
    pub successes: usize,
    pub total: usize,
    pub open_dir: Option<PathBuf>,
}

struct ActiveRun {
    rx: Receiver<ProgressUpdate>,
    handle: JoinHandle<ConversionWorker>,
}

pub struct ConvertextApp {
    pub files: FileCollection,
    pub formats: FormatSelection,
    pub output_dir_text: String,
    pub overwrite: bool,
    pub debug_mode: bool,
    pub keep_intermediate: bool,
    pub is_converting: bool,
    pub progress: f32,
    pub status: String,
    pub result_line: Option<ResultLine>,
    pub startup_error: Option<String>,
    pub error_dialog: Option<ErrorDialog>,
    pub completion: Option<CompletionDialog>,
    pub show_debug_console: bool,
    pub show_about: bool,
    pub hovering_files: bool,
    pub config: AppConfig,
    pub log_dir: PathBuf,
    pub log_buffer: LogBuffer,
    engine: Option<Box<dyn Engine>>,
    run: Option<ActiveRun>,
    _logging: Option<LoggingHandle>,
}

impl ConvertextApp {
    pub fn new(logging: LoggingHandle) -> Self {
        let config = AppConfig::load();

        let registry = BuiltinRegistry::new();
        let formats = FormatSelection::from_registry(&registry);

        let (engine, startup_error) = match PandocEngine::new() {
            Ok(engine) => (Some(Box::new(engine) as Box<dyn Engine>), None),
            Err(e) => {
                tracing::error!("conversion engine unavailable: {}", e);
                (None, Some(e.to_string()))
            }
        };

        let output_dir_text = dirs::home_dir()
            .map(|home| home.display().to_string())
            .unwrap_or_default();

        Self {
            files: FileCollection::new(),
            formats,
            output_dir_text,
            overwrite: config.overwrite,
            debug_mode: false,
            keep_intermediate: config.keep_intermediate,
            is_converting: false,
            progress: 0.0,
            status: String::new(),
            result_line: None,
            startup_error,
            error_dialog: None,
            completion: None,
            show_debug_console: false,
            show_about: false,
            hovering_files: false,
            log_dir: logging.log_dir.clone(),
            log_buffer: logging.buffer.clone(),
            config,
            engine,
            run: None,
            _logging: Some(logging),
        }
    }

    pub fn add_files(&mut self, paths: Vec<PathBuf>) {
        for path in &paths {
            if !looks_like_document(path) {
                tracing::warn!("{} does not look like a supported document", path.display());
            }
        }

        let added = self.files.add(paths);
        if added > 0 {
            tracing::debug!("{} file(s) added", added);
        }
        self.update_output_from_files();
    }

    pub fn remove_file(&mut self, path: &Path) {
        self.files.remove(path);
    }

    pub fn clear_files(&mut self) {
        self.files.clear();
        self.update_output_from_files();
    }

    /// Default the output field to the first file's directory, clearing it
    /// when the list empties.
    fn update_output_from_files(&mut self) {
        match self.files.first().and_then(|f| f.parent()) {
            Some(parent) => self.output_dir_text = parent.display().to_string(),
            None => {
                if self.files.is_empty() {
                    self.output_dir_text.clear();
                }
            }
        }
    }

    pub fn select_files(&mut self) {
        let mut dialog = rfd::FileDialog::new()
            .add_filter("All Supported", DOCUMENT_EXTENSIONS)
            .add_filter("PDF", &["pdf"])
            .add_filter("Word", &["docx", "doc"])
            .add_filter("Text", &["txt"])
            .add_filter("Markdown", &["md"])
            .add_filter("HTML", &["html", "htm"])
            .add_filter("EPUB", &["epub"])
            .add_filter("RTF", &["rtf"])
            .add_filter("ODT", &["odt"]);

        if let Some(dir) = &self.config.last_input_folder {
            dialog = dialog.set_directory(dir);
        }

        if let Some(files) = dialog.pick_files() {
            if let Some(parent) = files.first().and_then(|f| f.parent()) {
                self.config.update_input_folder(Some(parent.to_path_buf()));
            }
            self.add_files(files);
        }
    }

    pub fn browse_output(&mut self) {
        let mut dialog = rfd::FileDialog::new();

        let current = PathBuf::from(self.output_dir_text.trim());
        if current.is_dir() {
            dialog = dialog.set_directory(&current);
        } else if let Some(dir) = &self.config.last_output_folder {
            dialog = dialog.set_directory(dir);
        }

        if let Some(dir) = dialog.pick_folder() {
            self.output_dir_text = dir.display().to_string();
            self.config.update_output_folder(Some(dir));
        }
    }

    /// Writes the checkbox-backed settings through to the persisted config.
    pub fn persist_flags(&mut self) {
        self.config.overwrite = self.overwrite;
        self.config.keep_intermediate = self.keep_intermediate;
        self.config.save();
    }

    pub fn apply_debug_mode(&mut self) {
        self.show_debug_console = self.debug_mode;
        tracing::info!(
            "debug mode {}",
            if self.debug_mode { "enabled" } else { "disabled" }
        );
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.error_dialog = Some(ErrorDialog {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn output_dir(&self) -> Option<PathBuf> {
        let trimmed = self.output_dir_text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }

    pub fn start_conversion(&mut self) {
        // Overlapping runs are rejected here, not just by the disabled
        // button state.
        if self.is_converting {
            return;
        }

        if let Some(err) = self.startup_error.clone() {
            self.show_error("Engine unavailable", &err);
            return;
        }

        if self.files.is_empty() {
            self.show_error("No files selected", "Please add files to convert.");
            return;
        }

        let formats = self.formats.selected();
        if formats.is_empty() {
            self.show_error(
                "No formats selected",
                "Please select at least one output format.",
            );
            return;
        }

        let Some(engine) = self.engine.take() else {
            self.show_error(
                "Engine unavailable",
                "The conversion engine was lost after a failed run. Please restart the application.",
            );
            return;
        };

        let spec = JobSpec::new(
            self.files.to_vec(),
            formats,
            self.output_dir(),
            self.overwrite,
            self.keep_intermediate,
        );
        tracing::info!(
            "starting conversion: {} files to {:?}",
            spec.files.len(),
            spec.formats
        );

        let (rx, handle) = ConversionWorker::new(engine, spec).spawn();
        self.run = Some(ActiveRun { rx, handle });
        self.is_converting = true;
        self.progress = 0.0;
        self.status.clear();
        self.result_line = None;
    }

    /// Drains every queued progress update without blocking. Called once
    /// per UI frame.
    pub fn poll_progress(&mut self) {
        let mut drained = Vec::new();
        let mut disconnected = false;

        if let Some(run) = &mut self.run {
            loop {
                match run.rx.try_recv() {
                    Ok(update) => drained.push(update),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }

        for update in drained {
            self.apply_update(update);
        }

        if disconnected && self.is_converting {
            tracing::error!("conversion thread ended without a terminal update");
            self.abort_run();
        }
    }

    fn apply_update(&mut self, update: ProgressUpdate) {
        let terminal = update.is_terminal();

        self.progress = update.percentage;
        self.status = update.status;

        if let Some(result) = update.result {
            self.result_line = Some(if result.success {
                let target = result
                    .target_path
                    .as_deref()
                    .map(display_name)
                    .unwrap_or_default();
                ResultLine {
                    text: format!("✓ {} -> {}", display_name(&result.source_path), target),
                    success: true,
                }
            } else {
                ResultLine {
                    text: format!(
                        "✗ {}: {}",
                        display_name(&result.source_path),
                        result.error.as_deref().unwrap_or("unknown error")
                    ),
                    success: false,
                }
            });
        }

        if terminal {
            self.finish_run();
        }
    }

    /// Normal completion: join the (already exited) worker thread, recover
    /// the engine and results, and queue the completion dialog.
    fn finish_run(&mut self) {
        self.is_converting = false;

        let Some(run) = self.run.take() else {
            return;
        };

        match run.handle.join() {
            Ok(worker) => {
                let files_converted = worker.spec().files.len();
                let open_dir = worker.spec().output_dir.clone().or_else(|| {
                    self.files
                        .first()
                        .and_then(|f| f.parent())
                        .map(Path::to_path_buf)
                });
                let (engine, results) = worker.into_parts();
                self.engine = Some(engine);

                let successes = results.iter().filter(|r| r.success).count();
                self.completion = Some(CompletionDialog {
                    files_converted,
                    successes,
                    total: results.len(),
                    open_dir,
                });
            }
            Err(_) => {
                tracing::error!("conversion thread panicked");
            }
        }
    }

    /// Abnormal end (channel closed early): re-enable Convert so the user
    /// is never stuck, recover the engine if the thread exited cleanly.
    fn abort_run(&mut self) {
        self.is_converting = false;

        if let Some(run) = self.run.take() {
            if let Ok(worker) = run.handle.join() {
                let (engine, _) = worker.into_parts();
                self.engine = Some(engine);
            }
        }
    }

    pub fn open_completion_folder(&self) {
        if let Some(completion) = &self.completion {
            if let Some(dir) = &completion.open_dir {
                open_path(dir);
            }
        }
    }

    pub fn open_log_dir(&self) {
        open_path(&self.log_dir);
    }
}

/// Reveal a file or directory in the platform file manager.
pub fn open_path(path: &Path) {
    #[cfg(target_os = "windows")]
    let result = std::process::Command::new("explorer").arg(path).spawn();
    #[cfg(target_os = "macos")]
    let result = std::process::Command::new("open").arg(path).spawn();
    #[cfg(all(unix, not(target_os = "macos")))]
    let result = std::process::Command::new("xdg-open").arg(path).spawn();

    if let Err(e) = result {
        tracing::warn!("failed to open {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ConversionResult, MockEngine, MockFormatRegistry};
    use std::collections::{HashMap, HashSet};

    fn test_formats() -> FormatSelection {
        let mut map = HashMap::new();
        map.insert(
            "md".to_string(),
            HashSet::from(["txt".to_string(), "html".to_string()]),
        );
        let mut registry = MockFormatRegistry::new();
        registry.expect_list_supported_formats().return_const(map);
        FormatSelection::from_registry(&registry)
    }

    fn test_app(engine: Option<Box<dyn Engine>>) -> ConvertextApp {
        ConvertextApp {
            files: FileCollection::new(),
            formats: test_formats(),
            output_dir_text: String::new(),
            overwrite: false,
            debug_mode: false,
            keep_intermediate: false,
            is_converting: false,
            progress: 0.0,
            status: String::new(),
            result_line: None,
            startup_error: None,
            error_dialog: None,
            completion: None,
            show_debug_console: false,
            show_about: false,
            hovering_files: false,
            config: AppConfig::default(),
            log_dir: std::env::temp_dir(),
            log_buffer: LogBuffer::default(),
            engine,
            run: None,
            _logging: None,
        }
    }

    fn succeeding_engine() -> Box<dyn Engine> {
        let mut engine = MockEngine::new();
        engine.expect_override_config().return_const(());
        engine
            .expect_convert()
            .returning(|file: &Path, format: &str| {
                Ok(ConversionResult::success(
                    file.to_path_buf(),
                    file.with_extension(format),
                ))
            });
        Box::new(engine)
    }

    #[test]
    fn convert_without_files_shows_error_dialog() {
        let mut app = test_app(Some(succeeding_engine()));
        app.formats.set("txt", true);

        app.start_conversion();

        assert!(!app.is_converting);
        assert_eq!(
            app.error_dialog.as_ref().unwrap().title,
            "No files selected"
        );
    }

    #[test]
    fn convert_without_formats_shows_error_dialog() {
        let mut app = test_app(Some(succeeding_engine()));
        app.add_files(vec![PathBuf::from("/tmp/a.md")]);

        app.start_conversion();

        assert!(!app.is_converting);
        assert_eq!(
            app.error_dialog.as_ref().unwrap().title,
            "No formats selected"
        );
    }

    #[test]
    fn run_completes_and_reenables_convert() {
        let mut app = test_app(Some(succeeding_engine()));
        app.add_files(vec![PathBuf::from("/tmp/a.md"), PathBuf::from("/tmp/b.md")]);
        app.formats.set("txt", true);
        app.formats.set("html", true);

        app.start_conversion();
        assert!(app.is_converting);

        // Second click while running must be a no-op.
        app.start_conversion();
        assert!(app.error_dialog.is_none());

        // The worker finishes quickly; poll until the terminal update lands.
        for _ in 0..100 {
            app.poll_progress();
            if !app.is_converting {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        assert!(!app.is_converting);
        assert_eq!(app.progress, 100.0);
        assert_eq!(app.status, "Conversion complete!");

        let completion = app.completion.as_ref().unwrap();
        assert_eq!(completion.files_converted, 2);
        assert_eq!(completion.successes, 4);
        assert_eq!(completion.total, 4);
    }

    #[test]
    fn adding_files_defaults_output_to_first_parent() {
        let mut app = test_app(Some(succeeding_engine()));
        app.add_files(vec![PathBuf::from("/docs/report.md")]);

        assert_eq!(app.output_dir_text, "/docs");

        app.clear_files();
        assert!(app.output_dir_text.is_empty());
    }

    #[test]
    fn blank_output_field_means_per_source_directory() {
        let mut app = test_app(Some(succeeding_engine()));
        app.output_dir_text = "  ".to_string();
        assert_eq!(app.output_dir(), None);

        app.output_dir_text = "/out".to_string();
        assert_eq!(app.output_dir(), Some(PathBuf::from("/out")));
    }
}
