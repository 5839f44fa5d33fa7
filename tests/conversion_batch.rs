//! End-to-end worker tests with a scripted engine, driven over the same
//! channel the GUI polls.

use convertext_gui::engine::{ConfigOverrides, ConversionResult, Engine, EngineError};
use convertext_gui::files::FileCollection;
use convertext_gui::worker::{ConversionWorker, JobSpec, ProgressUpdate};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Engine whose behavior is decided per call by a script closure. Records
/// the overrides it was handed for later assertions.
struct ScriptedEngine {
    script: Box<dyn FnMut(&Path, &str) -> Result<ConversionResult, EngineError> + Send>,
    overrides_seen: Arc<Mutex<Vec<ConfigOverrides>>>,
}

impl ScriptedEngine {
    fn new<F>(script: F) -> (Self, Arc<Mutex<Vec<ConfigOverrides>>>)
    where
        F: FnMut(&Path, &str) -> Result<ConversionResult, EngineError> + Send + 'static,
    {
        let overrides_seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                script: Box::new(script),
                overrides_seen: overrides_seen.clone(),
            },
            overrides_seen,
        )
    }
}

impl Engine for ScriptedEngine {
    fn convert(&mut self, file: &Path, target_format: &str) -> Result<ConversionResult, EngineError> {
        (self.script)(file, target_format)
    }

    fn override_config(&mut self, overrides: &ConfigOverrides) {
        self.overrides_seen.lock().unwrap().push(overrides.clone());
    }
}

fn always_succeeds() -> (ScriptedEngine, Arc<Mutex<Vec<ConfigOverrides>>>) {
    ScriptedEngine::new(|file, format| {
        Ok(ConversionResult::success(
            file.to_path_buf(),
            file.with_extension(format),
        ))
    })
}

fn run_to_completion(engine: ScriptedEngine, spec: JobSpec) -> (Vec<ProgressUpdate>, ConversionWorker) {
    let (rx, handle) = ConversionWorker::new(Box::new(engine), spec).spawn();
    let updates: Vec<ProgressUpdate> = rx.iter().collect();
    let worker = handle.join().expect("worker thread panicked");
    (updates, worker)
}

#[test]
fn three_files_two_formats_yields_six_results_and_terminal() {
    let mut files = FileCollection::new();
    files.add(vec![
        PathBuf::from("/tmp/a.pdf"),
        PathBuf::from("/tmp/b.pdf"),
        PathBuf::from("/tmp/c.pdf"),
    ]);

    let (engine, _) = always_succeeds();
    let spec = JobSpec::new(
        files.to_vec(),
        vec!["txt".to_string(), "html".to_string()],
        None,
        false,
        false,
    );

    let (updates, worker) = run_to_completion(engine, spec);

    assert_eq!(worker.results().len(), 6);
    assert!(worker.results().iter().all(|r| r.success));
    assert_eq!(updates.len(), 7);

    let terminal = updates.last().unwrap();
    assert_eq!(terminal.percentage, 100.0);
    assert_eq!(terminal.status, "Conversion complete!");
    assert!(terminal.result.is_none());
}

#[test]
fn engine_panic_equivalent_error_is_contained() {
    let (engine, _) = ScriptedEngine::new(|_, _| Err(EngineError::Spawn("boom".to_string())));
    let spec = JobSpec::new(
        vec![PathBuf::from("/tmp/test.pdf")],
        vec!["txt".to_string()],
        None,
        false,
        false,
    );

    let (updates, worker) = run_to_completion(engine, spec);

    assert_eq!(worker.results().len(), 1);
    let result = &worker.results()[0];
    assert!(!result.success);
    assert!(result.error.as_ref().unwrap().contains("boom"));
    assert!(updates.last().unwrap().result.is_none());
}

#[test]
fn one_bad_file_does_not_stop_the_batch() {
    let (engine, _) = ScriptedEngine::new(|file, format| {
        if file.ends_with("bad.docx") {
            Err(EngineError::Spawn("unreadable".to_string()))
        } else {
            Ok(ConversionResult::success(
                file.to_path_buf(),
                file.with_extension(format),
            ))
        }
    });

    let spec = JobSpec::new(
        vec![
            PathBuf::from("/tmp/good.docx"),
            PathBuf::from("/tmp/bad.docx"),
            PathBuf::from("/tmp/also_good.docx"),
        ],
        vec!["txt".to_string()],
        None,
        false,
        false,
    );

    let (_, worker) = run_to_completion(engine, spec);

    let outcomes: Vec<bool> = worker.results().iter().map(|r| r.success).collect();
    assert_eq!(outcomes, vec![true, false, true]);
}

#[test]
fn overrides_reach_the_engine_once() {
    let (engine, overrides_seen) = always_succeeds();
    let spec = JobSpec::new(
        vec![PathBuf::from("/tmp/a.md")],
        vec!["html".to_string()],
        Some(PathBuf::from("/tmp/out")),
        true,
        true,
    );

    run_to_completion(engine, spec);

    let seen = overrides_seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].output_dir, Some(PathBuf::from("/tmp/out")));
    assert_eq!(seen[0].overwrite, Some(true));
    assert_eq!(seen[0].keep_intermediate, Some(true));
}

#[test]
fn progress_is_monotonic_over_the_channel() {
    let (engine, _) = always_succeeds();
    let spec = JobSpec::new(
        vec![PathBuf::from("/tmp/a.md"), PathBuf::from("/tmp/b.md")],
        vec!["txt".to_string(), "html".to_string(), "pdf".to_string()],
        None,
        false,
        false,
    );

    let (updates, _) = run_to_completion(engine, spec);

    let mut last = 0.0f32;
    for update in &updates {
        assert!(update.percentage >= last, "progress went backwards");
        last = update.percentage;
    }
    assert_eq!(last, 100.0);
}

#[test]
fn duplicate_adds_do_not_inflate_the_batch() {
    let mut files = FileCollection::new();
    files.add(vec![PathBuf::from("/tmp/a.pdf")]);
    files.add(vec![PathBuf::from("/tmp/a.pdf")]);
    assert_eq!(files.len(), 1);

    let (engine, _) = always_succeeds();
    let spec = JobSpec::new(files.to_vec(), vec!["txt".to_string()], None, false, false);
    let (updates, worker) = run_to_completion(engine, spec);

    assert_eq!(worker.results().len(), 1);
    assert_eq!(updates.len(), 2);
}
