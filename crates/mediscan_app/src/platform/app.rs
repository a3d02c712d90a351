use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context};
use mediscan_core::{
    update, AppState, FileCandidate, FileId, Msg, UploadCollector, UploadLimits, ViewState,
};
use mediscan_engine::{
    load_upload_file, EngineEvent, EngineHandle, ExtractionClient, ExtractionMode, Probe,
    UploadFile,
};
use mediscan_logging::{mediscan_info, mediscan_warn};

use super::effects::{EffectRunner, FileStore};
use super::ui::console::Console;
use super::ui::render::{
    render_batch, render_formats, render_health, render_info, render_selection,
};
use super::ui::theme::RenderConfig;

/// What to do with each result once it arrives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    pub mode: ExtractionMode,
    /// 1-based page to show for multi-page results.
    pub page: Option<usize>,
    pub copy_all: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub rejected: usize,
}

/// One upload-process-result session driven by the core state machine.
struct Session {
    state: AppState,
    files: FileStore,
    next_file_id: FileId,
    runner: EffectRunner,
    console: Console,
    msg_rx: mpsc::Receiver<Msg>,
    wait_limit: Duration,
}

impl Session {
    fn new(
        client: Arc<dyn ExtractionClient>,
        mode: ExtractionMode,
        config: RenderConfig,
        wait_limit: Duration,
    ) -> anyhow::Result<Self> {
        let (msg_tx, msg_rx) = mpsc::channel();
        let runner =
            EffectRunner::new(client, mode, msg_tx).context("failed to start the engine")?;
        Ok(Self {
            state: AppState::new(),
            files: FileStore::new(),
            next_file_id: 1,
            runner,
            console: Console::new(config),
            msg_rx,
            wait_limit,
        })
    }

    /// Reads the files from disk and offers them to the collector.
    fn drop_files(&mut self, paths: &[PathBuf]) -> usize {
        let mut candidates: Vec<FileCandidate> = Vec::new();
        let mut unreadable = 0;
        for path in paths {
            match load_upload_file(path) {
                Ok(file) => {
                    let id = self.next_file_id;
                    self.next_file_id += 1;
                    candidates.push(file.candidate(id));
                    self.files.insert(id, file);
                }
                Err(err) => {
                    mediscan_warn!("Skipping {}: {}", path.display(), err);
                    eprintln!("Skipping {}: {err}", path.display());
                    unreadable += 1;
                }
            }
        }
        self.dispatch(Msg::FilesDropped(candidates));
        unreadable + self.state.view().rejections.len()
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.run(effects, &self.files, &self.console);
        if state.consume_dirty() {
            self.console.update(&state.view());
        }
        self.state = state;
    }

    /// Pumps messages until the in-flight submission resolves.
    fn wait_for_completion(&mut self) -> anyhow::Result<()> {
        let deadline = Instant::now() + self.wait_limit;
        while self.state.view_state().is_loading() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.msg_rx.recv_timeout(remaining) {
                Ok(msg) => self.dispatch(msg),
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    bail!("no response within {}s", self.wait_limit.as_secs())
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    bail!("engine stopped before the request finished")
                }
            }
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        self.dispatch(Msg::Shutdown);
    }
}

/// Submits each accepted file in turn and prints its result.
pub fn run_process(
    client: Arc<dyn ExtractionClient>,
    paths: &[PathBuf],
    options: ProcessOptions,
    config: RenderConfig,
    wait_limit: Duration,
) -> anyhow::Result<ProcessSummary> {
    let mut session = Session::new(client, options.mode, config, wait_limit)?;
    let mut summary = ProcessSummary {
        rejected: session.drop_files(paths),
        ..ProcessSummary::default()
    };

    while !session.state.pending().is_empty() {
        session.dispatch(Msg::ProcessClicked);
        if let Err(err) = session.wait_for_completion() {
            session.shutdown();
            return Err(err);
        }

        let outcome = match session.state.view_state() {
            ViewState::Success { filename, .. } => Ok(filename.clone()),
            ViewState::Error { message } => Err(message.clone()),
            ViewState::Idle | ViewState::Loading { .. } => break,
        };

        match outcome {
            Ok(filename) => {
                mediscan_info!("Extraction finished for {}", filename);
                summary.succeeded += 1;
                if let Some(page) = options.page {
                    session.dispatch(Msg::PageSelected {
                        index: page.saturating_sub(1),
                    });
                }
                session.console.present(&session.state.view());
                if options.copy_all {
                    session.dispatch(Msg::CopyAllTextClicked);
                }
                session.dispatch(Msg::UploadAnotherClicked);
            }
            Err(message) => {
                mediscan_warn!("Extraction failed: {}", message);
                summary.failed += 1;
                session.console.present(&session.state.view());
                session.dispatch(Msg::RetryClicked);
            }
        }
    }

    session.shutdown();
    Ok(summary)
}

/// Opens a temporary preview of one file and keeps it alive until Enter is pressed.
pub fn run_preview(
    client: Arc<dyn ExtractionClient>,
    path: PathBuf,
    config: RenderConfig,
) -> anyhow::Result<()> {
    show_preview(client, &path, config, io::stdin().lock())?;
    Ok(())
}

/// Returns whether a preview was shown. Files the viewer cannot display only
/// get a "not available" line.
fn show_preview(
    client: Arc<dyn ExtractionClient>,
    path: &Path,
    config: RenderConfig,
    mut input: impl BufRead,
) -> anyhow::Result<bool> {
    let file = load_upload_file(path)?;
    let mut session = Session::new(client, ExtractionMode::Standard, config, Duration::ZERO)?;
    let candidate = file.candidate(session.next_file_id);
    session.next_file_id += 1;
    session.files.insert(candidate.id, file);
    session.dispatch(Msg::PreviewFileOpened(candidate));

    let shown = session.runner.preview_active();
    if shown {
        println!("Press Enter to close the preview.");
        let mut line = String::new();
        input
            .read_line(&mut line)
            .context("failed to read from stdin")?;
        session.dispatch(Msg::PreviewClosed);
    }
    session.shutdown();
    Ok(shown)
}

/// Sends all valid files in a single batch request.
pub fn run_batch(
    client: Arc<dyn ExtractionClient>,
    paths: &[PathBuf],
    config: RenderConfig,
    wait_limit: Duration,
) -> anyhow::Result<ProcessSummary> {
    let mut loaded: Vec<(FileId, UploadFile)> = Vec::new();
    let mut unreadable = 0;
    for path in paths {
        match load_upload_file(path) {
            Ok(file) => loaded.push((loaded.len() as FileId + 1, file)),
            Err(err) => {
                mediscan_warn!("Skipping {}: {}", path.display(), err);
                eprintln!("Skipping {}: {err}", path.display());
                unreadable += 1;
            }
        }
    }

    let candidates = loaded
        .iter()
        .map(|(id, file)| file.candidate(*id))
        .collect();
    let selection = UploadCollector::new(UploadLimits::default()).select(candidates);
    print!("{}", render_selection(&selection, &config));

    let store: FileStore = loaded.into_iter().collect();
    let files: Vec<UploadFile> = selection
        .accepted
        .iter()
        .filter_map(|pending| store.get(&pending.id).cloned())
        .collect();
    if files.is_empty() {
        bail!("no valid files to send");
    }

    let (event_tx, event_rx) = mpsc::channel();
    let engine = EngineHandle::spawn(client, event_tx).context("failed to start the engine")?;
    engine.submit_batch(files);
    let items = wait_for_event(&event_rx, wait_limit, |event| match event {
        EngineEvent::BatchCompleted { result } => Some(result),
        _ => None,
    })??;

    print!("{}", render_batch(&items, &config));
    let succeeded = items.iter().filter(|item| item.success).count();
    Ok(ProcessSummary {
        succeeded,
        failed: items.len() - succeeded,
        rejected: unreadable + selection.rejected.len(),
    })
}

/// Queries one read-only endpoint and prints the answer.
pub fn run_probe(
    client: Arc<dyn ExtractionClient>,
    probe: Probe,
    config: RenderConfig,
    wait_limit: Duration,
) -> anyhow::Result<()> {
    let (event_tx, event_rx) = mpsc::channel();
    let engine = EngineHandle::spawn(client, event_tx).context("failed to start the engine")?;
    engine.probe(probe);

    let text = wait_for_event(&event_rx, wait_limit, |event| match event {
        EngineEvent::HealthChecked(result) => {
            Some(result.map(|health| render_health(&health, &config)))
        }
        EngineEvent::FormatsListed(result) => {
            Some(result.map(|formats| render_formats(&formats, &config)))
        }
        EngineEvent::ServiceDescribed(result) => {
            Some(result.map(|info| render_info(&info, &config)))
        }
        _ => None,
    })??;
    print!("{text}");
    Ok(())
}

fn wait_for_event<T>(
    event_rx: &mpsc::Receiver<EngineEvent>,
    wait_limit: Duration,
    pick: impl Fn(EngineEvent) -> Option<T>,
) -> anyhow::Result<T> {
    let deadline = Instant::now() + wait_limit;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let event = event_rx.recv_timeout(remaining).map_err(|err| match err {
            mpsc::RecvTimeoutError::Timeout => {
                anyhow!("no response within {}s", wait_limit.as_secs())
            }
            mpsc::RecvTimeoutError::Disconnected => anyhow!("engine stopped unexpectedly"),
        })?;
        if let Some(value) = pick(event) {
            return Ok(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use mediscan_core::{ExtractionResult, SingleDocument, MAX_FILE_SIZE};
    use mediscan_engine::{
        AdvancedOptions, BatchItem, FailureKind, HealthStatus, ServiceInfo, SupportedFormats,
        TransferError,
    };
    use tempfile::TempDir;

    use super::*;

    /// Succeeds for files whose name starts with `ok`, fails otherwise.
    struct ScriptedClient;

    fn outcome(file: &UploadFile) -> Result<ExtractionResult, TransferError> {
        if file.name.starts_with("ok") {
            Ok(ExtractionResult::Single(SingleDocument {
                text: format!("text of {}", file.name),
                word_count: 3,
                character_count: 14,
                processing_time: 0.2,
            }))
        } else {
            Err(TransferError {
                kind: FailureKind::HttpStatus(500),
                message: "boom".to_string(),
            })
        }
    }

    #[async_trait::async_trait]
    impl ExtractionClient for ScriptedClient {
        async fn extract_text(
            &self,
            file: &UploadFile,
        ) -> Result<ExtractionResult, TransferError> {
            outcome(file)
        }

        async fn extract_text_advanced(
            &self,
            file: &UploadFile,
            _options: &AdvancedOptions,
        ) -> Result<ExtractionResult, TransferError> {
            outcome(file)
        }

        async fn batch_extract(
            &self,
            files: &[UploadFile],
        ) -> Result<Vec<BatchItem>, TransferError> {
            Ok(files
                .iter()
                .map(|file| match outcome(file) {
                    Ok(result) => BatchItem {
                        filename: file.name.clone(),
                        success: true,
                        result: Some(result),
                        error: None,
                    },
                    Err(err) => BatchItem {
                        filename: file.name.clone(),
                        success: false,
                        result: None,
                        error: Some(err.message),
                    },
                })
                .collect())
        }

        async fn health(&self) -> Result<HealthStatus, TransferError> {
            Ok(HealthStatus {
                status: "healthy".to_string(),
                timestamp: None,
                gemini_model: None,
            })
        }

        async fn supported_formats(&self) -> Result<SupportedFormats, TransferError> {
            Err(TransferError {
                kind: FailureKind::HttpStatus(503),
                message: "Failed to get supported formats: 503".to_string(),
            })
        }

        async fn service_info(&self) -> Result<ServiceInfo, TransferError> {
            Err(TransferError {
                kind: FailureKind::Network,
                message: "connection refused".to_string(),
            })
        }
    }

    fn write_files(dir: &TempDir, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                fs::write(&path, b"%PDF-1.7 scan").unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn process_counts_each_outcome() {
        mediscan_logging::initialize_for_tests();
        let dir = TempDir::new().unwrap();
        let mut paths = write_files(&dir, &["ok-report.pdf", "blurry.png", "notes.txt"]);
        paths.push(dir.path().join("missing.pdf"));

        let summary = run_process(
            Arc::new(ScriptedClient),
            &paths,
            ProcessOptions {
                copy_all: true,
                ..ProcessOptions::default()
            },
            RenderConfig::plain(),
            Duration::from_secs(10),
        )
        .unwrap();

        assert_eq!(
            summary,
            ProcessSummary {
                succeeded: 1,
                failed: 1,
                rejected: 2,
            }
        );
    }

    #[test]
    fn batch_reports_per_file_results() {
        mediscan_logging::initialize_for_tests();
        let dir = TempDir::new().unwrap();
        let paths = write_files(&dir, &["ok-a.pdf", "b.pdf", "ok-c.jpg"]);

        let summary = run_batch(
            Arc::new(ScriptedClient),
            &paths,
            RenderConfig::plain(),
            Duration::from_secs(10),
        )
        .unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.rejected, 0);
    }

    #[test]
    fn batch_without_valid_files_fails_early() {
        let dir = TempDir::new().unwrap();
        let paths = write_files(&dir, &["notes.txt"]);

        let err = run_batch(
            Arc::new(ScriptedClient),
            &paths,
            RenderConfig::plain(),
            Duration::from_secs(10),
        )
        .unwrap_err();
        assert!(err.to_string().contains("no valid files"));
    }

    #[test]
    fn probe_failures_surface_the_service_message() {
        mediscan_logging::initialize_for_tests();
        let client: Arc<dyn ExtractionClient> = Arc::new(ScriptedClient);

        run_probe(
            client.clone(),
            Probe::Health,
            RenderConfig::plain(),
            Duration::from_secs(10),
        )
        .unwrap();
        let err = run_probe(
            client,
            Probe::SupportedFormats,
            RenderConfig::plain(),
            Duration::from_secs(10),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Failed to get supported formats: 503");
    }

    #[test]
    fn preview_of_unsupported_type_is_not_an_error() {
        mediscan_logging::initialize_for_tests();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"plain notes").unwrap();

        let shown =
            show_preview(Arc::new(ScriptedClient), &path, RenderConfig::plain(), io::empty())
                .unwrap();
        assert!(!shown);
    }

    #[test]
    fn preview_ignores_the_upload_size_limit() {
        mediscan_logging::initialize_for_tests();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("huge.pdf");
        fs::File::create(&path)
            .unwrap()
            .set_len(MAX_FILE_SIZE + 1)
            .unwrap();

        let shown =
            show_preview(Arc::new(ScriptedClient), &path, RenderConfig::plain(), io::empty())
                .unwrap();
        assert!(shown);
    }

    #[test]
    fn preview_of_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.png");

        assert!(show_preview(
            Arc::new(ScriptedClient),
            &path,
            RenderConfig::plain(),
            io::empty()
        )
        .is_err());
    }
}
