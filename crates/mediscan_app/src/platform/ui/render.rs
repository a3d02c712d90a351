use std::fmt::Write as _;

use chrono::{DateTime, Local, NaiveDateTime};
use mediscan_core::{
    all_text, format_file_size, format_processing_time, AppViewModel, PendingFile, Rejection,
    ResultStats, Selection, MAX_FILE_SIZE,
};
use mediscan_engine::{BatchItem, HealthStatus, ServiceInfo, SupportedFormats};

use super::theme::{RenderConfig, Role};

/// Pending files, per-file rejections and recently processed files.
///
/// Returns an empty string when there is nothing to list.
pub fn render_upload(view: &AppViewModel, config: &RenderConfig) -> String {
    render_files(&view.pending, &view.rejections, &view.recent, config)
}

/// Outcome of validating a batch before it is sent.
pub fn render_selection(selection: &Selection, config: &RenderConfig) -> String {
    render_files(&selection.accepted, &selection.rejected, &[], config)
}

fn render_files(
    pending: &[PendingFile],
    rejections: &[Rejection],
    recent: &[PendingFile],
    config: &RenderConfig,
) -> String {
    let mut out = String::new();

    if !pending.is_empty() {
        let _ = writeln!(
            out,
            "{} (max {} each)",
            config.paint(
                &format!("Selected files ({})", pending.len()),
                Role::Heading
            ),
            format_file_size(MAX_FILE_SIZE)
        );
        for file in pending {
            let _ = writeln!(out, "  {}", file_row(file, config));
        }
    }

    if !rejections.is_empty() {
        let _ = writeln!(out, "{}", config.paint("Rejected", Role::Failure));
        for rejection in rejections {
            let _ = writeln!(
                out,
                "  {} {}: {}",
                config.paint("x", Role::Failure),
                rejection.name,
                rejection.reason
            );
        }
    }

    if !recent.is_empty() {
        let names: Vec<_> = recent.iter().map(|file| file.name.as_str()).collect();
        let _ = writeln!(
            out,
            "{} {}",
            config.paint("Recently processed:", Role::Muted),
            names.join(", ")
        );
    }

    out
}

fn file_row(file: &PendingFile, config: &RenderConfig) -> String {
    format!(
        "{}  {}",
        file.name,
        config.paint(&format_file_size(file.size), Role::Muted)
    )
}

/// Statistics, page tabs and the text of the active page.
pub fn render_result(view: &AppViewModel, config: &RenderConfig) -> String {
    let Some(panel) = &view.result else {
        return String::new();
    };
    let mut out = String::new();

    let filename = view.filename.as_deref().unwrap_or("document");
    let _ = writeln!(
        out,
        "{} {}",
        config.paint("Text extracted from", Role::Success),
        config.paint(filename, Role::Heading)
    );
    let _ = writeln!(out, "  {}", stats_line(&panel.stats, &panel.processing_time));

    if !panel.page_tabs.is_empty() {
        let tabs: Vec<_> = panel
            .page_tabs
            .iter()
            .enumerate()
            .map(|(index, page)| {
                if index == panel.active_index {
                    config.paint(&format!("[{page}]"), Role::Accent)
                } else {
                    page.to_string()
                }
            })
            .collect();
        let _ = writeln!(out, "  Pages: {}", tabs.join(" "));
    }

    let header = match (panel.active_page_number, panel.active_page_words) {
        (Some(page), Some(words)) => format!("Page {page} ({words} words)"),
        (Some(page), None) => format!("Page {page}"),
        _ => "Extracted text".to_string(),
    };
    let _ = writeln!(out, "{}", config.paint(&format!("--- {header} ---"), Role::Heading));
    let _ = writeln!(out, "{}", panel.active_text);
    out
}

pub fn render_error(view: &AppViewModel, config: &RenderConfig) -> String {
    let message = view.error.as_deref().unwrap_or_default();
    format!(
        "{} {}\n",
        config.paint("Processing failed:", Role::Failure),
        message
    )
}

fn stats_line(stats: &ResultStats, processing_time: &str) -> String {
    format!(
        "{} page(s) | {} words | {} characters | {}",
        stats.pages, stats.words, stats.characters, processing_time
    )
}

/// One block per batch entry, in response order.
pub fn render_batch(items: &[BatchItem], config: &RenderConfig) -> String {
    let mut out = String::new();
    let succeeded = items.iter().filter(|item| item.success).count();
    let _ = writeln!(
        out,
        "{}",
        config.paint(
            &format!("Batch finished: {succeeded} of {} succeeded", items.len()),
            Role::Heading
        )
    );

    for item in items {
        match (&item.result, &item.error) {
            (Some(result), _) => {
                let stats = ResultStats::of(result);
                let time = format_processing_time(result.processing_time());
                let _ = writeln!(
                    out,
                    "{} {}\n  {}",
                    config.paint("ok", Role::Success),
                    item.filename,
                    stats_line(&stats, &time)
                );
                let _ = writeln!(out, "{}", all_text(result));
            }
            (None, error) => {
                let _ = writeln!(
                    out,
                    "{} {}: {}",
                    config.paint("failed", Role::Failure),
                    item.filename,
                    error.as_deref().unwrap_or("Failed to process document")
                );
            }
        }
    }
    out
}

pub fn render_health(health: &HealthStatus, config: &RenderConfig) -> String {
    let role = if health.status.eq_ignore_ascii_case("healthy") {
        Role::Success
    } else {
        Role::Failure
    };
    let mut out = format!("Service status: {}\n", config.paint(&health.status, role));
    if let Some(model) = &health.gemini_model {
        let _ = writeln!(out, "Model: {model}");
    }
    if let Some(timestamp) = &health.timestamp {
        let _ = writeln!(out, "Checked at: {}", format_timestamp(timestamp));
    }
    out
}

pub fn render_formats(formats: &SupportedFormats, config: &RenderConfig) -> String {
    let groups = &formats.supported_formats;
    let mut out = format!("{}\n", config.paint("Supported formats", Role::Heading));
    let _ = writeln!(out, "  Images: {}", groups.images.join(", "));
    let _ = writeln!(out, "  Documents: {}", groups.documents.join(", "));
    let max_size = formats
        .max_file_size
        .clone()
        .unwrap_or_else(|| format_file_size(MAX_FILE_SIZE));
    let _ = writeln!(out, "  Max file size: {max_size}");
    if let Some(limit) = formats.batch_limit {
        let _ = writeln!(out, "  Batch limit: {limit} files");
    }
    out
}

pub fn render_info(info: &ServiceInfo, config: &RenderConfig) -> String {
    let mut out = format!("{}\n", config.paint(&info.message, Role::Heading));
    if let Some(version) = &info.version {
        let _ = writeln!(out, "  Version: {version}");
    }
    if let Some(status) = &info.status {
        let _ = writeln!(out, "  Status: {status}");
    }
    if !info.endpoints.is_empty() {
        let _ = writeln!(out, "  Endpoints:");
        for (name, path) in &info.endpoints {
            let _ = writeln!(out, "    {name}: {path}");
        }
    }
    out
}

/// Service timestamps come with or without an offset; both render in local time.
pub fn format_timestamp(raw: &str) -> String {
    const DISPLAY: &str = "%Y-%m-%d %H:%M:%S";
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Local).format(DISPLAY).to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(parsed) => parsed.format(DISPLAY).to_string(),
        Err(_) => raw.to_string(),
    }
}
