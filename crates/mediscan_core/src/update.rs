use crate::render::all_text;
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesDropped(candidates) => {
            // The drop zone is disabled while a request is in flight.
            if candidates.is_empty() || state.view_state().is_loading() {
                return (state, Vec::new());
            }
            state.select_files(candidates);
            Vec::new()
        }
        Msg::FileRemoved { file_id } => {
            if state.view_state().is_loading() || state.remove_file(file_id).is_none() {
                return (state, Vec::new());
            }
            if state.preview() == Some(file_id) && state.close_preview() {
                vec![Effect::ClosePreview]
            } else {
                Vec::new()
            }
        }
        Msg::ProcessClicked => match state.begin_submission() {
            Some((request_id, file)) => vec![
                Effect::StartSimulatedProgress { request_id },
                Effect::Submit {
                    request_id,
                    file_id: file.id,
                    filename: file.name,
                },
            ],
            None => Vec::new(),
        },
        Msg::SimulatedProgressTick {
            request_id,
            increment,
        } => {
            state.advance_progress(request_id, increment);
            Vec::new()
        }
        Msg::ExtractionFinished {
            request_id,
            outcome,
        } => {
            if state.finish_submission(request_id, outcome) {
                vec![Effect::StopSimulatedProgress]
            } else {
                Vec::new()
            }
        }
        Msg::RetryClicked | Msg::UploadAnotherClicked => {
            state.return_to_upload();
            Vec::new()
        }
        Msg::PageSelected { index } => {
            state.select_page(index);
            Vec::new()
        }
        Msg::PreviewRequested { file_id } => {
            if state.open_preview(file_id) {
                vec![Effect::OpenPreview { file_id }]
            } else {
                Vec::new()
            }
        }
        Msg::PreviewFileOpened(candidate) => {
            let file_id = candidate.id;
            if state.inspect_file(candidate) {
                vec![Effect::OpenPreview { file_id }]
            } else {
                Vec::new()
            }
        }
        Msg::PreviewClosed => {
            if state.close_preview() {
                vec![Effect::ClosePreview]
            } else {
                Vec::new()
            }
        }
        Msg::CopyAllTextClicked => match state.result() {
            Some(result) => vec![Effect::CopyText {
                text: all_text(result),
            }],
            None => Vec::new(),
        },
        Msg::Shutdown => {
            let mut effects = Vec::new();
            if state.abandon_submission() {
                effects.push(Effect::StopSimulatedProgress);
            }
            if state.close_preview() {
                effects.push(Effect::ClosePreview);
            }
            effects
        }
    };

    (state, effects)
}
