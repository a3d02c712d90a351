use std::sync::Once;

use mediscan_core::{
    update, AppState, Effect, ExtractionResult, FileCandidate, Msg, RejectReason, Screen,
    SingleDocument, ViewState, MAX_FILE_SIZE,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(mediscan_logging::initialize_for_tests);
}

fn candidate(id: u64, name: &str, mime: &str) -> FileCandidate {
    FileCandidate {
        id,
        name: name.to_string(),
        size: 4096,
        mime: mime.to_string(),
    }
}

fn single(text: &str) -> ExtractionResult {
    ExtractionResult::Single(SingleDocument {
        text: text.to_string(),
        word_count: text.split_whitespace().count() as u64,
        character_count: text.chars().count() as u64,
        processing_time: 0.8,
    })
}

fn drop_and_process(state: AppState, files: Vec<FileCandidate>) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::FilesDropped(files));
    update(state, Msg::ProcessClicked)
}

#[test]
fn process_submits_first_pending_file() {
    init_logging();
    let (mut state, effects) = drop_and_process(
        AppState::new(),
        vec![
            candidate(1, "report.pdf", "application/pdf"),
            candidate(2, "scan.png", "image/png"),
        ],
    );

    assert_eq!(
        effects,
        vec![
            Effect::StartSimulatedProgress { request_id: 1 },
            Effect::Submit {
                request_id: 1,
                file_id: 1,
                filename: "report.pdf".to_string(),
            },
        ]
    );
    let view = state.view();
    assert_eq!(view.screen, Screen::Loading);
    assert_eq!(view.filename.as_deref(), Some("report.pdf"));
    assert_eq!(view.progress.as_ref().map(|p| p.percent), Some(0));
    assert_eq!(view.pending.len(), 1);
    assert_eq!(view.recent.len(), 1);
    assert!(!view.can_submit);
    assert!(state.consume_dirty());
}

#[test]
fn success_keeps_submitted_filename() {
    init_logging();
    let (state, _) = drop_and_process(
        AppState::new(),
        vec![candidate(1, "report.pdf", "application/pdf")],
    );

    let (state, effects) = update(
        state,
        Msg::ExtractionFinished {
            request_id: 1,
            outcome: Ok(single("hello world")),
        },
    );

    assert_eq!(effects, vec![Effect::StopSimulatedProgress]);
    match state.view_state() {
        ViewState::Success { filename, result } => {
            assert_eq!(filename, "report.pdf");
            assert_eq!(result, &single("hello world"));
        }
        other => panic!("expected success, got {other:?}"),
    }
    let view = state.view();
    assert_eq!(view.screen, Screen::Result);
    assert_eq!(view.settled_progress, 100);
    assert_eq!(view.result.map(|r| r.stats.words), Some(2));
}

#[test]
fn failure_shows_message_and_stops_progress() {
    init_logging();
    let (state, _) = drop_and_process(
        AppState::new(),
        vec![candidate(1, "report.pdf", "application/pdf")],
    );
    let (state, _) = update(
        state,
        Msg::SimulatedProgressTick {
            request_id: 1,
            increment: 12.0,
        },
    );

    let (state, effects) = update(
        state,
        Msg::ExtractionFinished {
            request_id: 1,
            outcome: Err("boom".to_string()),
        },
    );

    assert_eq!(effects, vec![Effect::StopSimulatedProgress]);
    assert_eq!(
        state.view_state(),
        &ViewState::Error {
            message: "boom".to_string()
        }
    );
    assert_eq!(state.view().settled_progress, 0);
}

#[test]
fn empty_error_message_gets_fallback() {
    init_logging();
    let (state, _) = drop_and_process(
        AppState::new(),
        vec![candidate(1, "report.pdf", "application/pdf")],
    );
    let (state, _) = update(
        state,
        Msg::ExtractionFinished {
            request_id: 1,
            outcome: Err("  ".to_string()),
        },
    );
    assert_eq!(
        state.view().error.as_deref(),
        Some("An unexpected error occurred")
    );
}

#[test]
fn no_second_submission_while_loading() {
    init_logging();
    let (state, _) = drop_and_process(
        AppState::new(),
        vec![
            candidate(1, "a.pdf", "application/pdf"),
            candidate(2, "b.pdf", "application/pdf"),
        ],
    );

    let (state, effects) = update(state, Msg::ProcessClicked);
    assert!(effects.is_empty());
    assert_eq!(state.in_flight(), Some(1));

    let (state, effects) = update(
        state,
        Msg::FilesDropped(vec![candidate(3, "c.pdf", "application/pdf")]),
    );
    assert!(effects.is_empty());
    assert_eq!(state.pending().len(), 1);
}

#[test]
fn stale_completion_is_ignored() {
    init_logging();
    let (state, _) = drop_and_process(
        AppState::new(),
        vec![candidate(1, "a.pdf", "application/pdf")],
    );
    let (mut state, _) = update(state, Msg::Shutdown);
    assert!(state.consume_dirty());

    let (mut state, effects) = update(
        state,
        Msg::ExtractionFinished {
            request_id: 1,
            outcome: Ok(single("late")),
        },
    );
    assert!(effects.is_empty());
    assert!(state.view_state().is_idle());
    assert!(!state.consume_dirty());
}

#[test]
fn simulated_progress_ticks_only_while_loading() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::SimulatedProgressTick {
            request_id: 1,
            increment: 10.0,
        },
    );
    assert_eq!(state.view().progress, None);

    let (state, _) = drop_and_process(state, vec![candidate(1, "a.pdf", "application/pdf")]);
    let mut state = state;
    for _ in 0..20 {
        let tick = Msg::SimulatedProgressTick {
            request_id: 1,
            increment: 15.0,
        };
        state = update(state, tick).0;
    }
    let progress = state.view().progress.expect("loading progress");
    assert_eq!(progress.percent, 95);
    assert_eq!(progress.label, "Finalizing results...");
}

#[test]
fn ticks_from_an_earlier_submission_are_ignored() {
    init_logging();
    let (state, _) = drop_and_process(
        AppState::new(),
        vec![
            candidate(1, "a.pdf", "application/pdf"),
            candidate(2, "b.pdf", "application/pdf"),
        ],
    );
    let (state, _) = update(
        state,
        Msg::ExtractionFinished {
            request_id: 1,
            outcome: Ok(single("first")),
        },
    );
    let (state, _) = update(state, Msg::UploadAnotherClicked);
    let (mut state, effects) = update(state, Msg::ProcessClicked);
    assert_eq!(effects[0], Effect::StartSimulatedProgress { request_id: 2 });
    state.consume_dirty();

    let (mut state, _) = update(
        state,
        Msg::SimulatedProgressTick {
            request_id: 1,
            increment: 14.0,
        },
    );
    assert_eq!(state.view().progress.map(|p| p.percent), Some(0));
    assert!(!state.consume_dirty());

    let (state, _) = update(
        state,
        Msg::SimulatedProgressTick {
            request_id: 2,
            increment: 14.0,
        },
    );
    assert_eq!(state.view().progress.map(|p| p.percent), Some(14));
}

#[test]
fn retry_and_upload_another_return_to_upload() {
    init_logging();
    let (state, _) = drop_and_process(
        AppState::new(),
        vec![
            candidate(1, "a.pdf", "application/pdf"),
            candidate(2, "b.pdf", "application/pdf"),
        ],
    );
    let (state, _) = update(
        state,
        Msg::ExtractionFinished {
            request_id: 1,
            outcome: Err("offline".to_string()),
        },
    );
    let (state, _) = update(state, Msg::RetryClicked);
    assert_eq!(state.view().screen, Screen::Upload);
    assert!(state.view().can_submit);

    let (state, effects) = update(state, Msg::ProcessClicked);
    assert_eq!(
        effects[1],
        Effect::Submit {
            request_id: 2,
            file_id: 2,
            filename: "b.pdf".to_string(),
        }
    );
    let (state, _) = update(
        state,
        Msg::ExtractionFinished {
            request_id: 2,
            outcome: Ok(single("ok")),
        },
    );
    let (state, _) = update(state, Msg::UploadAnotherClicked);
    assert_eq!(state.view().screen, Screen::Upload);
    assert!(!state.view().can_submit);
    assert_eq!(state.view().recent.len(), 2);
}

#[test]
fn rejected_drops_are_reported() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::FilesDropped(vec![
            candidate(1, "notes.txt", "text/plain"),
            candidate(2, "scan.jpg", "image/jpeg"),
        ]),
    );
    assert!(effects.is_empty());

    let view = state.view();
    assert_eq!(view.pending.len(), 1);
    assert_eq!(view.rejections.len(), 1);
    assert_eq!(view.rejections[0].name, "notes.txt");
    assert!(matches!(
        view.rejections[0].reason,
        RejectReason::UnsupportedType { .. }
    ));
}

#[test]
fn preview_open_and_close_emit_effects_once() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::FilesDropped(vec![candidate(7, "scan.png", "image/png")]),
    );

    let (state, effects) = update(state, Msg::PreviewRequested { file_id: 7 });
    assert_eq!(effects, vec![Effect::OpenPreview { file_id: 7 }]);
    assert_eq!(state.view().preview.map(|f| f.name), Some("scan.png".to_string()));

    let (state, effects) = update(state, Msg::PreviewClosed);
    assert_eq!(effects, vec![Effect::ClosePreview]);
    let (state, effects) = update(state, Msg::PreviewClosed);
    assert!(effects.is_empty());

    let (_state, effects) = update(state, Msg::PreviewRequested { file_id: 99 });
    assert!(effects.is_empty());
}

#[test]
fn preview_only_files_skip_upload_limits() {
    init_logging();
    let notes = candidate(3, "notes.txt", "text/plain");
    let huge = FileCandidate {
        size: MAX_FILE_SIZE + 1,
        ..candidate(4, "huge.pdf", "application/pdf")
    };

    let (state, effects) = update(AppState::new(), Msg::PreviewFileOpened(notes));
    assert_eq!(effects, vec![Effect::OpenPreview { file_id: 3 }]);
    let view = state.view();
    assert_eq!(view.preview.map(|f| f.name), Some("notes.txt".to_string()));
    assert!(view.pending.is_empty());
    assert!(view.rejections.is_empty());

    let (state, effects) = update(state, Msg::PreviewClosed);
    assert_eq!(effects, vec![Effect::ClosePreview]);
    let (state, effects) = update(state, Msg::PreviewFileOpened(huge));
    assert_eq!(effects, vec![Effect::OpenPreview { file_id: 4 }]);
    assert!(!state.view().can_submit);
}

#[test]
fn removing_previewed_file_closes_preview() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::FilesDropped(vec![candidate(7, "scan.png", "image/png")]),
    );
    let (state, _) = update(state, Msg::PreviewRequested { file_id: 7 });
    let (state, effects) = update(state, Msg::FileRemoved { file_id: 7 });

    assert_eq!(effects, vec![Effect::ClosePreview]);
    assert!(state.view().pending.is_empty());
    assert!(state.view().preview.is_none());
}

#[test]
fn shutdown_releases_timer_and_preview() {
    init_logging();
    let (state, _) = drop_and_process(
        AppState::new(),
        vec![candidate(1, "a.pdf", "application/pdf")],
    );
    let (state, _) = update(state, Msg::PreviewRequested { file_id: 1 });

    let (state, effects) = update(state, Msg::Shutdown);
    assert_eq!(
        effects,
        vec![Effect::StopSimulatedProgress, Effect::ClosePreview]
    );

    let (_state, effects) = update(state, Msg::Shutdown);
    assert!(effects.is_empty());
}

#[test]
fn copy_all_text_only_with_result() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::CopyAllTextClicked);
    assert!(effects.is_empty());

    let (state, _) = drop_and_process(state, vec![candidate(1, "a.png", "image/png")]);
    let (state, _) = update(
        state,
        Msg::ExtractionFinished {
            request_id: 1,
            outcome: Ok(single("BP 120/80")),
        },
    );
    let (_state, effects) = update(state, Msg::CopyAllTextClicked);
    assert_eq!(
        effects,
        vec![Effect::CopyText {
            text: "BP 120/80".to_string()
        }]
    );
}
