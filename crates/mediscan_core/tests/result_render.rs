use mediscan_core::{all_text, ExtractionResult, ResultStats, ResultView};
use pretty_assertions::assert_eq;
use serde_json::json;

fn report_pdf() -> ExtractionResult {
    serde_json::from_value(json!({
        "type": "pdf",
        "processing_time": 2.5,
        "pages": [
            {"page": 1, "text": "first page", "word_count": 10, "character_count": 100},
            {"page": 2, "text": "", "word_count": 20, "character_count": 200},
            {"page": 3, "text": "third page", "word_count": 30, "character_count": 300}
        ]
    }))
    .expect("valid multi-page result")
}

#[test]
fn multi_page_totals_are_sums_of_pages() {
    let result = report_pdf();
    let stats = ResultStats::of(&result);

    assert_eq!(
        stats,
        ResultStats {
            pages: 3,
            words: 60,
            characters: 600,
        }
    );
}

#[test]
fn single_document_stats_are_read_directly() {
    let result: ExtractionResult = serde_json::from_value(json!({
        "type": "image",
        "text": "Rx: amoxicillin 500mg",
        "word_count": 3,
        "character_count": 21,
        "processing_time": 0.4
    }))
    .unwrap();

    assert_eq!(
        ResultStats::of(&result),
        ResultStats {
            pages: 1,
            words: 3,
            characters: 21,
        }
    );
    assert_eq!(all_text(&result), "Rx: amoxicillin 500mg");
}

#[test]
fn single_document_counts_fall_back_to_text() {
    let result: ExtractionResult =
        serde_json::from_value(json!({"text": "two words", "processing_time": 1.0})).unwrap();

    assert_eq!(ResultStats::of(&result).words, 2);
    assert_eq!(ResultStats::of(&result).characters, 9);
}

#[test]
fn all_text_marks_page_boundaries() {
    let text = all_text(&report_pdf());
    assert_eq!(
        text,
        "=== PAGE 1 ===\n\nfirst page\n\n=== PAGE 2 ===\n\n\n\n=== PAGE 3 ===\n\nthird page"
    );
}

#[test]
fn active_page_defaults_to_first_and_clamps() {
    let result = report_pdf();
    let view = ResultView::new(&result);
    assert!(view.has_page_tabs());
    assert_eq!(view.active_index(), 0);
    assert_eq!(view.active_text(), "first page");

    let view = view.with_page(1);
    assert_eq!(view.active_page().map(|p| p.page), Some(2));
    assert_eq!(view.active_text(), "No text found on this page.");

    let view = view.with_page(42);
    assert_eq!(view.active_index(), 2);
}

#[test]
fn missing_pages_is_a_shape_error() {
    let err = serde_json::from_value::<ExtractionResult>(json!({
        "type": "pdf",
        "processing_time": 1.0
    }))
    .unwrap_err();
    assert!(err.to_string().contains("missing `pages`"));
}

#[test]
fn missing_text_is_a_shape_error() {
    let err = serde_json::from_value::<ExtractionResult>(json!({
        "type": "image",
        "word_count": 1
    }))
    .unwrap_err();
    assert!(err.to_string().contains("missing `text`"));
}

#[test]
fn page_numbers_must_increase() {
    let err = serde_json::from_value::<ExtractionResult>(json!({
        "type": "pdf",
        "pages": [
            {"page": 2, "text": "b", "word_count": 1, "character_count": 1},
            {"page": 2, "text": "c", "word_count": 1, "character_count": 1}
        ]
    }))
    .unwrap_err();
    assert!(err.to_string().contains("strictly increasing"));
}
