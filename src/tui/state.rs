use crate::model::{Landmark, SessionEvent};
use crate::orchestrator::{Session, SessionPhase};
use ratatui::{
    style::Color,
    style::Style,
    text::{Line, Span},
};

pub const TAB_DASHBOARD: usize = 0;
pub const TAB_KEYPOINTS: usize = 1;
pub const TAB_HELP: usize = 2;
pub const TAB_COUNT: usize = 3;

/// Everything the UI thread renders. The session is a read-only snapshot
/// received from the controller; it is replaced, never edited, here.
pub struct UiState {
    pub tab: usize,
    pub session: Session,
    pub info: String,
    pub base_url: String,
    /// `Some` while the video path prompt is open.
    pub input: Option<String>,
    /// Frame shown on the Keypoints tab.
    pub frame_index: usize,
    pub player: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tab: TAB_DASHBOARD,
            session: Session::new(),
            info: String::new(),
            base_url: String::new(),
            input: None,
            frame_index: 0,
            player: None,
        }
    }
}

impl UiState {
    pub fn apply_event(&mut self, ev: SessionEvent) {
        match ev {
            SessionEvent::Updated { session } => {
                let finished_now =
                    session.phase() == SessionPhase::Done && self.session.phase() != SessionPhase::Done;
                self.session = *session;
                if finished_now {
                    self.frame_index = 0;
                }
                self.clamp_frame();
            }
            SessionEvent::Info(info) => self.info = info.to_message(),
        }
    }

    fn clamp_frame(&mut self) {
        let frames = self.session.keypoints().len();
        if self.frame_index >= frames {
            self.frame_index = frames.saturating_sub(1);
        }
    }

    pub fn next_frame(&mut self) {
        if self.frame_index + 1 < self.session.keypoints().len() {
            self.frame_index += 1;
        }
    }

    pub fn prev_frame(&mut self) {
        self.frame_index = self.frame_index.saturating_sub(1);
    }

    pub fn current_frame(&self) -> &[Landmark] {
        self.session
            .keypoints()
            .get(self.frame_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn annotated_uri(&self) -> Option<&str> {
        self.session
            .result()
            .and_then(|r| r.annotated_video_reference.as_deref())
    }
}

/// Push `label: value`, wrapping the value to the panel width.
pub fn push_wrapped_kv(
    out: &mut Vec<Line<'static>>,
    label: &str,
    value: &str,
    value_style: Style,
    area_width: u16,
) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }

    // Account for borders (2 chars on each side)
    let usable_width = area_width.saturating_sub(4).max(1);
    let label_text = format!("{label}:");
    let label_width = label_text.chars().count() as u16;

    let value_chars: Vec<char> = value.chars().collect();
    let mut remaining = value_chars.as_slice();
    let mut first = true;

    while !remaining.is_empty() {
        let line_width = if first {
            usable_width.saturating_sub(label_width + 1).max(1)
        } else {
            usable_width.saturating_sub(2).max(1)
        };

        let take = (remaining.len() as u16).min(line_width) as usize;
        let (chunk, rest) = remaining.split_at(take);
        let text: String = chunk.iter().collect();

        if first {
            out.push(Line::from(vec![
                Span::styled(label_text.clone(), Style::default().fg(Color::Gray)),
                Span::raw(" "),
                Span::styled(text, value_style),
            ]));
            first = false;
        } else {
            out.push(Line::from(vec![Span::raw("  "), Span::styled(text, value_style)]));
        }

        remaining = rest;
    }
}
