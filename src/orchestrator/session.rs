//! The upload/analysis session state machine.
//!
//! A [`Session`] is a single tagged state value plus a status line. All mutation
//! goes through the transition methods below; presentation layers only read.

use crate::engine;
use crate::error::AnalysisError;
use crate::model::{
    AnalysisResult, CompletedAnalysis, KeypointTimeline, Landmark, SelectedVideo,
    SubmissionTicket, UploadResponse,
};
use tracing::{debug, info, warn};

/// Named stages for the coarse progress indicator, indexed by [`Session::progress_index`].
pub const STAGES: [&str; 3] = ["Select video", "Analyzing", "Results"];

/// Landmarks shown in the compact keypoint preview.
pub const PREVIEW_LANDMARKS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Nothing in flight. Covers both "no file" and "file selected, not submitted".
    Idle {
        selected: Option<SelectedVideo>,
        last_error: Option<String>,
    },
    Pending {
        ticket: SubmissionTicket,
    },
    Done {
        selected: SelectedVideo,
        analysis: CompletedAnalysis,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Pending,
    Done,
}

/// Whether a completion was applied to the session or dropped as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    state: SessionState,
    status_message: String,
    next_ticket: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle {
                selected: None,
                last_error: None,
            },
            status_message: "Select a video to analyze".to_string(),
            next_ticket: 1,
        }
    }

    /// Store a new selection (or clear it when the picker was cancelled).
    ///
    /// Discards any result, timeline and error, whatever the current state.
    pub fn select_file(&mut self, file: Option<SelectedVideo>) {
        self.status_message = match &file {
            Some(v) => format!("Ready to upload {}", v.display_name),
            None => "No video selected".to_string(),
        };
        if let SessionState::Pending { ticket } = &self.state {
            debug!(ticket = ticket.id, "selection changed while request in flight");
        }
        self.state = SessionState::Idle {
            selected: file,
            last_error: None,
        };
    }

    /// Begin a submission. Returns the ticket the caller must issue exactly one
    /// request for, or `None` when there is nothing to submit or one is already
    /// in flight.
    pub fn submit(&mut self) -> Option<SubmissionTicket> {
        if !self.can_submit() {
            return None;
        }
        let video = self.selected_video()?.clone();
        let ticket = SubmissionTicket {
            id: self.next_ticket,
            video,
        };
        self.next_ticket += 1;
        self.status_message = format!("Uploading {} for analysis…", ticket.video.display_name);
        self.state = SessionState::Pending {
            ticket: ticket.clone(),
        };
        info!(ticket = ticket.id, video = %ticket.video.display_name, "submission started");
        Some(ticket)
    }

    /// Apply the outcome of the request issued for `ticket`.
    ///
    /// Outcomes for any ticket other than the one currently pending are stale
    /// (the user reset or re-selected meanwhile) and leave the session untouched.
    pub fn complete(
        &mut self,
        ticket: &SubmissionTicket,
        outcome: Result<UploadResponse, AnalysisError>,
        base_url: &str,
    ) -> Completion {
        let current = match &self.state {
            SessionState::Pending { ticket: current } if current.id == ticket.id => current.clone(),
            _ => {
                debug!(ticket = ticket.id, "discarding stale completion");
                return Completion::Stale;
            }
        };

        match outcome {
            Ok(resp) => {
                let mut analysis = engine::normalize(&resp, base_url);
                analysis.result.completed_at = now_rfc3339();
                self.status_message = format!("Analysis complete: {}", analysis.result.status_message);
                info!(
                    ticket = ticket.id,
                    frames = analysis.keypoints.len(),
                    annotated = analysis.result.annotated_video_reference.is_some(),
                    "submission succeeded"
                );
                self.state = SessionState::Done {
                    selected: current.video,
                    analysis,
                };
            }
            Err(err) => {
                warn!(ticket = ticket.id, error = %err, "submission failed");
                self.status_message = "Upload failed. Submit again to retry".to_string();
                self.state = SessionState::Idle {
                    selected: Some(current.video),
                    last_error: Some(err.user_message()),
                };
            }
        }
        Completion::Applied
    }

    /// Drop the current selection and anything derived from it. Keeps `last_error`.
    pub fn reset_preview(&mut self) {
        let last_error = match &mut self.state {
            SessionState::Idle { last_error, .. } => last_error.take(),
            _ => None,
        };
        self.status_message = "Preview cleared. Select a video to analyze".to_string();
        self.state = SessionState::Idle {
            selected: None,
            last_error,
        };
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            SessionState::Idle { .. } => SessionPhase::Idle,
            SessionState::Pending { .. } => SessionPhase::Pending,
            SessionState::Done { .. } => SessionPhase::Done,
        }
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn selected_video(&self) -> Option<&SelectedVideo> {
        match &self.state {
            SessionState::Idle { selected, .. } => selected.as_ref(),
            SessionState::Pending { ticket } => Some(&ticket.video),
            SessionState::Done { selected, .. } => Some(selected),
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        match &self.state {
            SessionState::Idle { last_error, .. } => last_error.as_deref(),
            _ => None,
        }
    }

    pub fn pending_ticket(&self) -> Option<&SubmissionTicket> {
        match &self.state {
            SessionState::Pending { ticket } => Some(ticket),
            _ => None,
        }
    }

    pub fn analysis(&self) -> Option<&CompletedAnalysis> {
        match &self.state {
            SessionState::Done { analysis, .. } => Some(analysis),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.analysis().map(|a| &a.result)
    }

    /// Full timeline; empty unless the last submission succeeded.
    pub fn keypoints(&self) -> &[Vec<Landmark>] {
        self.analysis()
            .map(|a| a.keypoints.as_slice())
            .unwrap_or(&[])
    }

    pub fn timeline(&self) -> KeypointTimeline {
        self.keypoints().to_vec()
    }

    pub fn can_submit(&self) -> bool {
        self.selected_video().is_some() && self.phase() != SessionPhase::Pending
    }

    pub fn progress_index(&self) -> usize {
        match self.phase() {
            SessionPhase::Idle => 0,
            SessionPhase::Pending => 1,
            SessionPhase::Done => 2,
        }
    }

    pub fn stage_name(&self) -> &'static str {
        STAGES[self.progress_index()]
    }

    /// First frame, cut to [`PREVIEW_LANDMARKS`] entries.
    pub fn keypoint_preview(&self) -> &[Landmark] {
        self.keypoints()
            .first()
            .map(|frame| &frame[..frame.len().min(PREVIEW_LANDMARKS)])
            .unwrap_or(&[])
    }
}

fn now_rfc3339() -> Option<String> {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .ok()
}
