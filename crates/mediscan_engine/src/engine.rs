use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use mediscan_core::{ExtractionResult, RequestId};
use mediscan_logging::{mediscan_debug, mediscan_info, mediscan_warn};

use crate::client::ExtractionClient;
use crate::{EngineEvent, ExtractionMode, Probe, TransferError, UploadFile};

enum EngineCommand {
    Extract {
        request_id: RequestId,
        file: UploadFile,
        mode: ExtractionMode,
    },
    Batch {
        files: Vec<UploadFile>,
    },
    Probe(Probe),
}

/// Runs transfers on a background thread that owns a tokio runtime.
///
/// Completion events go to the sender passed in at spawn time. Dropping the
/// handle stops the worker.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn spawn(
        client: Arc<dyn ExtractionClient>,
        event_tx: mpsc::Sender<EngineEvent>,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();

        thread::Builder::new()
            .name("mediscan-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let client = client.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(client.as_ref(), command, event_tx).await;
                    });
                }
                mediscan_debug!("Engine command channel closed; shutting down");
            })?;

        Ok(Self { cmd_tx })
    }

    pub fn submit(&self, request_id: RequestId, file: UploadFile, mode: ExtractionMode) {
        mediscan_info!("Submitting request {} for {}", request_id, file.name);
        self.send(EngineCommand::Extract {
            request_id,
            file,
            mode,
        });
    }

    /// Sends every file in one batch request; the outcome arrives as
    /// [`EngineEvent::BatchCompleted`].
    pub fn submit_batch(&self, files: Vec<UploadFile>) {
        mediscan_info!("Submitting batch of {} files", files.len());
        self.send(EngineCommand::Batch { files });
    }

    pub fn probe(&self, probe: Probe) {
        mediscan_debug!("Probing service: {:?}", probe);
        self.send(EngineCommand::Probe(probe));
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            mediscan_warn!("Engine worker is gone; command dropped");
        }
    }
}

async fn handle_command(
    client: &dyn ExtractionClient,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Extract {
            request_id,
            file,
            mode,
        } => {
            let result: Result<ExtractionResult, TransferError> = match mode {
                ExtractionMode::Standard => client.extract_text(&file).await,
                ExtractionMode::Advanced(options) => {
                    client.extract_text_advanced(&file, &options).await
                }
            };
            if let Err(err) = &result {
                mediscan_warn!("Request {} failed: {} ({})", request_id, err.message, err.kind);
            }
            EngineEvent::ExtractionCompleted { request_id, result }
        }
        EngineCommand::Batch { files } => {
            let result = client.batch_extract(&files).await;
            if let Err(err) = &result {
                mediscan_warn!("Batch failed: {} ({})", err.message, err.kind);
            }
            EngineEvent::BatchCompleted { result }
        }
        EngineCommand::Probe(Probe::Health) => EngineEvent::HealthChecked(client.health().await),
        EngineCommand::Probe(Probe::SupportedFormats) => {
            EngineEvent::FormatsListed(client.supported_formats().await)
        }
        EngineCommand::Probe(Probe::ServiceInfo) => {
            EngineEvent::ServiceDescribed(client.service_info().await)
        }
    };
    let _ = event_tx.send(event);
}
