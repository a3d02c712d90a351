use indicatif::{ProgressBar, ProgressStyle};
use mediscan_core::{AppViewModel, Screen};
use mediscan_engine::PreviewHandle;

use super::render::{render_error, render_result, render_upload};
use super::theme::{RenderConfig, Role};

const BAR_TEMPLATE: &str = "{prefix} [{bar:30}] {pos:>3}% {msg}";

/// Terminal output for a processing session.
///
/// Live screens (pending list, progress) are drawn whenever the state is
/// dirty. Result and error panels are printed once per submission through
/// [`Console::present`], after any page selection has been applied.
pub struct Console {
    config: RenderConfig,
    bar: Option<ProgressBar>,
    last_upload: String,
}

impl Console {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            bar: None,
            last_upload: String::new(),
        }
    }

    pub fn update(&mut self, view: &AppViewModel) {
        if view.screen == Screen::Loading {
            let bar = self
                .bar
                .get_or_insert_with(|| progress_bar(view.filename.as_deref().unwrap_or("")));
            if let Some(progress) = &view.progress {
                bar.set_position(u64::from(progress.percent));
                bar.set_message(progress.label.clone());
            }
            return;
        }

        self.finish_bar();
        if view.screen == Screen::Upload {
            let text = render_upload(view, &self.config);
            if !text.is_empty() && text != self.last_upload {
                print!("{text}");
            }
            self.last_upload = text;
        }
    }

    pub fn present(&mut self, view: &AppViewModel) {
        self.finish_bar();
        match view.screen {
            Screen::Result => print!("{}", render_result(view, &self.config)),
            Screen::Error => eprint!("{}", render_error(view, &self.config)),
            Screen::Upload | Screen::Loading => {}
        }
    }

    pub fn preview_opened(&self, handle: &PreviewHandle) {
        println!(
            "{} {} ({})",
            self.config.paint("Preview ready:", Role::Heading),
            handle.url(),
            handle.mime()
        );
    }

    pub fn preview_unavailable(&self, file_name: &str) {
        println!(
            "{}",
            self.config.paint(
                &format!("Preview not available for {file_name}"),
                Role::Muted
            )
        );
    }

    /// Terminals have no clipboard; copied text goes to stdout so it can be piped.
    pub fn copy_text(&self, text: &str) {
        println!("{text}");
    }

    fn finish_bar(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.finish_bar();
    }
}

fn progress_bar(filename: &str) -> ProgressBar {
    let bar = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_prefix(filename.to_string());
    bar
}
