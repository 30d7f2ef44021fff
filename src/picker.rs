//! File-selection collaborator.

use crate::model::SelectedVideo;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Source of a local video choice. `Ok(None)` means the user cancelled.
pub trait FilePicker {
    fn pick(&mut self) -> Result<Option<SelectedVideo>>;
}

/// Picker backed by a path the user typed or passed on the command line.
#[derive(Debug, Default)]
pub struct PathPicker {
    pending: Option<PathBuf>,
}

impl PathPicker {
    /// Blank input is treated as a cancelled pick.
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim().trim_matches(|c| c == '"' || c == '\'');
        Self {
            pending: (!trimmed.is_empty()).then(|| PathBuf::from(trimmed)),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            pending: Some(path.into()),
        }
    }
}

impl FilePicker for PathPicker {
    fn pick(&mut self) -> Result<Option<SelectedVideo>> {
        match self.pending.take() {
            Some(path) => resolve(&path).map(Some),
            None => Ok(None),
        }
    }
}

/// Check that `path` names a readable file and derive its display name.
pub fn resolve(path: &Path) -> Result<SelectedVideo> {
    let meta = std::fs::metadata(path).with_context(|| format!("open {}", path.display()))?;
    if !meta.is_file() {
        bail!("{} is not a file", path.display());
    }
    let display_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SelectedVideo::new(path, display_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_a_cancellation() {
        assert_eq!(PathPicker::from_input("   ").pick().unwrap(), None);
    }

    #[test]
    fn picks_existing_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mov");
        std::fs::write(&path, b"\x00\x00\x00\x14ftypqt  ").unwrap();

        let mut picker = PathPicker::from_input(&format!("\"{}\"", path.display()));
        let picked = picker.pick().unwrap().unwrap();
        assert_eq!(picked.display_name, "clip.mov");
        assert_eq!(picked.path, path);
        assert_eq!(picker.pick().unwrap(), None);
    }

    #[test]
    fn directories_and_missing_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PathPicker::from_path(dir.path()).pick().is_err());
        assert!(PathPicker::from_path(dir.path().join("nope.mp4")).pick().is_err());
    }
}
