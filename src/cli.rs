use crate::engine::AnalysisClient;
use crate::logging::{self, LogTarget};
use crate::model::ServiceConfig;
use crate::orchestrator::run_single_submission;
use crate::picker::{FilePicker, PathPicker};
use crate::text_summary::{build_text_summary, JsonReport};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "movement-analysis-cli",
    version,
    about = "Upload a movement video for pose analysis and inspect the results"
)]
pub struct Cli {
    /// Video file to select at launch
    pub video: Option<PathBuf>,

    /// Base URL of the analysis service
    #[arg(long, env = "MOVEMENT_API_BASE", default_value = "http://localhost:8000")]
    pub base_url: String,

    /// Submit VIDEO, print the result as JSON and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Submit VIDEO, print a text summary and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Run silently: suppress all output except errors
    #[arg(long)]
    pub silent: bool,

    /// In the TUI, submit VIDEO as soon as the app launches
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub submit_on_launch: bool,

    /// Connection timeout for the analysis service (the upload itself is not limited)
    #[arg(long, default_value = "10s")]
    pub connect_timeout: humantime::Duration,

    /// Command used to open the annotated video, e.g. "mpv --loop"
    #[arg(long, env = "MOVEMENT_PLAYER")]
    pub player: Option<String>,

    /// Write logs to this file (the TUI logs nowhere else)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    fn is_interactive(&self) -> bool {
        !self.silent && !self.json && !self.text
    }
}

pub async fn run(args: Cli) -> Result<()> {
    if args.silent && !args.json {
        return Err(anyhow::anyhow!(
            "--silent can only be used with --json. Use --silent --json together."
        ));
    }

    let log_target = if let Some(path) = args.log_file.as_deref() {
        LogTarget::File(path)
    } else if args.is_interactive() || args.silent {
        LogTarget::Disabled
    } else {
        LogTarget::Stderr
    };
    logging::init(log_target, &args.log_level)?;

    if args.is_interactive() {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            return run_once(args).await;
        }
    }

    run_once(args).await
}

/// Build a `ServiceConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> ServiceConfig {
    ServiceConfig {
        base_url: args.base_url.clone(),
        connect_timeout: Duration::from(args.connect_timeout),
        user_agent: format!("movement-analysis-cli/{}", env!("CARGO_PKG_VERSION")),
    }
}

/// Submit the launch video once and report the outcome (text, JSON or silent).
async fn run_once(args: Cli) -> Result<()> {
    let path = args
        .video
        .clone()
        .context("a VIDEO argument is required with --text/--json")?;
    let video = PathPicker::from_path(path)
        .pick()?
        .context("no video selected")?;

    let client = AnalysisClient::new(&build_config(&args))?;
    let (out_tx, out_handle) = spawn_output_writer();

    if !args.silent {
        let _ = out_tx.send(OutputLine::Stderr(format!(
            "Uploading {} to {}",
            video.display_name,
            client.upload_url()
        )));
    }

    let session = run_single_submission(&client, video).await;

    if args.json {
        if !args.silent {
            let out = serde_json::to_string_pretty(&JsonReport::from_session(&session))?;
            let _ = out_tx.send(OutputLine::Stdout(out));
        }
    } else {
        for line in build_text_summary(&session).lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }

    drop(out_tx);
    let _ = out_handle.await;

    match session.last_error() {
        Some(err) => Err(anyhow::anyhow!("{err}")),
        None => Ok(()),
    }
}
