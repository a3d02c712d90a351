mod platform;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use mediscan_engine::{
    AdvancedOptions, ClientSettings, ExtractionClient, ExtractionMode, OutputFormat, Probe,
    ReqwestExtractionClient,
};
use mediscan_logging::{mediscan_info, LevelFilter, LogDestination, DEFAULT_LOG_FILE};

use platform::app::{self, ProcessOptions, ProcessSummary};
use platform::ui::theme::{RenderConfig, Theme};

/// Extract text from medical scans and PDFs with the MediScan OCR service.
#[derive(Debug, Parser)]
#[command(name = "mediscan", version, about)]
struct Cli {
    /// Base URL of the extraction service [env: MEDISCAN_API_URL]
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Seconds to wait for a single request
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Where log output goes
    #[arg(long, value_enum, global = true, default_value_t = LogTarget::File)]
    log: LogTarget,

    /// Log file used by `--log file` and `--log both`
    #[arg(long, global = true, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[arg(long, value_enum, global = true, default_value_t = ColorMode::Auto)]
    color: ColorMode,

    #[arg(long, value_enum, global = true, default_value_t = ThemeArg::Light)]
    theme: ThemeArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract text from each file, one request at a time
    Process(ProcessArgs),
    /// Send up to ten files in a single batch request
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Stage a temporary preview of an image or PDF
    Preview { file: PathBuf },
    /// Check that the service is up
    Health,
    /// List the formats the service accepts
    Formats,
    /// Show service version and endpoints
    Info,
}

#[derive(Debug, Args)]
struct ProcessArgs {
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Page (1-based) to show for multi-page results
    #[arg(long)]
    page: Option<usize>,

    /// Print the combined text of every page after each result
    #[arg(long)]
    copy: bool,

    /// Use the advanced extraction endpoint
    #[arg(long)]
    advanced: bool,

    #[arg(long)]
    include_metadata: Option<bool>,

    #[arg(long)]
    include_statistics: Option<bool>,

    #[arg(long, value_enum)]
    output_format: Option<FormatArg>,
}

impl ProcessArgs {
    fn mode(&self) -> ExtractionMode {
        let options = AdvancedOptions {
            include_metadata: self.include_metadata,
            include_statistics: self.include_statistics,
            output_format: self.output_format.map(OutputFormat::from),
        };
        if self.advanced || options != AdvancedOptions::default() {
            ExtractionMode::Advanced(options)
        } else {
            ExtractionMode::Standard
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogTarget {
    File,
    Terminal,
    Both,
    Off,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
    Txt,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Txt => OutputFormat::Txt,
        }
    }
}

impl Cli {
    fn log_destination(&self) -> LogDestination {
        match self.log {
            LogTarget::File => LogDestination::File(self.log_file.clone()),
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both(self.log_file.clone()),
            LogTarget::Off => LogDestination::Off,
        }
    }

    fn render_config(&self) -> RenderConfig {
        let color = match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::env::var_os("NO_COLOR").is_none(),
        };
        let theme = match self.theme {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        };
        RenderConfig { color, theme }
    }

    fn client_settings(&self) -> anyhow::Result<ClientSettings> {
        let mut settings = ClientSettings::from_env()?;
        if let Some(url) = &self.api_url {
            settings = settings.with_base_url(url)?;
        }
        if let Some(seconds) = self.timeout {
            settings.request_timeout = Duration::from_secs(seconds.max(1));
        }
        Ok(settings)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    mediscan_logging::initialize(cli.log_destination(), cli.log_level.into());

    let settings = cli.client_settings()?;
    mediscan_info!("Using extraction service at {}", settings.base_url);
    // Covers connect, upload and the service-side processing of one request.
    let wait_limit = settings.connect_timeout + settings.request_timeout + Duration::from_secs(5);
    let client: Arc<dyn ExtractionClient> = Arc::new(
        ReqwestExtractionClient::new(settings).context("failed to build the HTTP client")?,
    );
    let config = cli.render_config();

    match cli.command {
        Command::Process(args) => {
            let options = ProcessOptions {
                mode: args.mode(),
                page: args.page,
                copy_all: args.copy,
            };
            let summary = app::run_process(client, &args.files, options, config, wait_limit)?;
            Ok(exit_code(summary))
        }
        Command::Batch { files } => {
            let summary = app::run_batch(client, &files, config, wait_limit)?;
            Ok(exit_code(summary))
        }
        Command::Preview { file } => {
            app::run_preview(client, file, config)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Health => probe(client, Probe::Health, config, wait_limit),
        Command::Formats => probe(client, Probe::SupportedFormats, config, wait_limit),
        Command::Info => probe(client, Probe::ServiceInfo, config, wait_limit),
    }
}

fn probe(
    client: Arc<dyn ExtractionClient>,
    probe: Probe,
    config: RenderConfig,
    wait_limit: Duration,
) -> anyhow::Result<ExitCode> {
    app::run_probe(client, probe, config, wait_limit)?;
    Ok(ExitCode::SUCCESS)
}

fn exit_code(summary: ProcessSummary) -> ExitCode {
    mediscan_info!(
        "Session finished: {} succeeded, {} failed, {} rejected",
        summary.succeeded,
        summary.failed,
        summary.rejected
    );
    if summary.failed == 0 && summary.succeeded > 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
