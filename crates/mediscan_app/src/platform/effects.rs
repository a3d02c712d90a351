use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use mediscan_core::{Effect, FileId, Msg, RequestId};
use mediscan_engine::{
    EngineEvent, EngineHandle, ExtractionClient, ExtractionMode, PreviewService, UploadFile,
};
use mediscan_logging::{mediscan_debug, mediscan_info, mediscan_warn};

use super::ticker::ProgressTicker;
use super::ui::console::Console;

/// File bytes held by the host, keyed by the ids the core hands out.
pub type FileStore = HashMap<FileId, UploadFile>;

/// Executes the effects returned by `update` and feeds completions back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
    mode: ExtractionMode,
    msg_tx: mpsc::Sender<Msg>,
    ticker: Option<ProgressTicker>,
    previews: PreviewService,
}

impl EffectRunner {
    pub fn new(
        client: Arc<dyn ExtractionClient>,
        mode: ExtractionMode,
        msg_tx: mpsc::Sender<Msg>,
    ) -> io::Result<Self> {
        let (event_tx, event_rx) = mpsc::channel();
        let engine = EngineHandle::spawn(client, event_tx)?;
        spawn_event_loop(event_rx, msg_tx.clone())?;
        Ok(Self {
            engine,
            mode,
            msg_tx,
            ticker: None,
            previews: PreviewService::new(),
        })
    }

    pub fn run(&mut self, effects: Vec<Effect>, files: &FileStore, console: &Console) {
        for effect in effects {
            match effect {
                Effect::Submit {
                    request_id,
                    file_id,
                    filename,
                } => match files.get(&file_id) {
                    Some(file) => self.engine.submit(request_id, file.clone(), self.mode),
                    None => {
                        mediscan_warn!("Submit for unknown file id={} ({})", file_id, filename);
                        let _ = self.msg_tx.send(Msg::ExtractionFinished {
                            request_id,
                            outcome: Err(format!("{filename} is no longer available")),
                        });
                    }
                },
                Effect::StartSimulatedProgress { request_id } => self.start_ticker(request_id),
                Effect::StopSimulatedProgress => self.stop_ticker(),
                Effect::OpenPreview { file_id } => self.open_preview(file_id, files, console),
                Effect::ClosePreview => {
                    if self.previews.close_active() {
                        mediscan_debug!("Preview closed");
                    }
                }
                Effect::CopyText { text } => console.copy_text(&text),
            }
        }
    }

    fn start_ticker(&mut self, request_id: RequestId) {
        self.stop_ticker();
        match ProgressTicker::start(request_id, self.msg_tx.clone()) {
            Ok(ticker) => self.ticker = Some(ticker),
            Err(err) => mediscan_warn!("Could not start progress ticker: {}", err),
        }
    }

    pub fn preview_active(&self) -> bool {
        self.previews.active().is_some()
    }

    fn stop_ticker(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            if ticker.is_running() {
                ticker.stop();
                mediscan_debug!("Simulated progress stopped");
            }
        }
    }

    fn open_preview(&mut self, file_id: FileId, files: &FileStore, console: &Console) {
        let Some(file) = files.get(&file_id) else {
            mediscan_warn!("Preview requested for unknown file id={}", file_id);
            return;
        };
        match self.previews.open(file) {
            Ok(Some(handle)) => {
                mediscan_info!("Preview {} opened for {}", handle.id(), file.name);
                console.preview_opened(&handle);
            }
            Ok(None) => console.preview_unavailable(&file.name),
            Err(err) => {
                mediscan_warn!("Preview for {} failed: {}", file.name, err);
                console.preview_unavailable(&file.name);
            }
        }
    }
}

impl Drop for EffectRunner {
    fn drop(&mut self) {
        self.stop_ticker();
        self.previews.close_active();
    }
}

fn spawn_event_loop(
    event_rx: mpsc::Receiver<EngineEvent>,
    msg_tx: mpsc::Sender<Msg>,
) -> io::Result<()> {
    thread::Builder::new()
        .name("mediscan-events".to_string())
        .spawn(move || {
            for event in event_rx {
                match event {
                    EngineEvent::ExtractionCompleted { request_id, result } => {
                        let msg = Msg::ExtractionFinished {
                            request_id,
                            outcome: result.map_err(|err| err.message),
                        };
                        if msg_tx.send(msg).is_err() {
                            break;
                        }
                    }
                    other => mediscan_debug!("Ignoring engine event {:?}", other),
                }
            }
        })?;
    Ok(())
}
