//! Video-rendering collaborator: hands an annotated video URI to something that can show it.

use anyhow::{Context, Result};
use std::process::{Command, Stdio};
use tracing::info;

pub trait VideoRenderer: Send {
    /// Present `uri`; returns a line suitable for the status area.
    fn render(&mut self, uri: &str) -> Result<String>;
}

/// Launches an external player, e.g. `--player "mpv --loop"`.
pub struct ExternalPlayer {
    program: String,
    args: Vec<String>,
}

impl ExternalPlayer {
    pub fn from_command(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl VideoRenderer for ExternalPlayer {
    fn render(&mut self, uri: &str) -> Result<String> {
        info!(program = %self.program, %uri, "launching player");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(uri)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("launch {}", self.program))?;
        // Reap the player when it exits so it does not linger as a zombie.
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(format!("Opened annotated video in {}", self.program))
    }
}

/// Fallback when no player is configured: just report where the video lives.
pub struct UriPrinter;

impl VideoRenderer for UriPrinter {
    fn render(&mut self, uri: &str) -> Result<String> {
        Ok(format!("Annotated video: {uri}"))
    }
}

pub fn renderer_for(player: Option<&str>) -> Box<dyn VideoRenderer> {
    match player.and_then(ExternalPlayer::from_command) {
        Some(p) => Box::new(p),
        None => Box::new(UriPrinter),
    }
}
