use super::state::{push_wrapped_kv, UiState};
use crate::format::{landmark_label, landmark_line, visibility_percent};
use crate::metrics::{PERFORMANCE_METRICS, RECOMMENDATIONS};
use crate::orchestrator::{SessionPhase, STAGES};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, Wrap},
    Frame,
};

pub fn draw_dashboard(area: Rect, f: &mut Frame, state: &UiState) {
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Stage indicator
                Constraint::Length(9), // Session: video, status, error, result
                Constraint::Min(0),    // Keypoint preview + mocked metrics
                Constraint::Length(3), // Info line
            ]
            .as_ref(),
        )
        .split(area);

    draw_stages(main[0], f, state);
    draw_session(main[1], f, state);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(main[2]);
    draw_preview(bottom[0], f, state);
    draw_metrics(bottom[1], f, state);

    let info = Paragraph::new(state.info.as_str())
        .block(Block::default().borders(Borders::ALL).title("Info"));
    f.render_widget(info, main[3]);

    if let Some(input) = state.input.as_deref() {
        draw_path_prompt(area, f, input);
    }
}

fn draw_stages(area: Rect, f: &mut Frame, state: &UiState) {
    let current = state.session.progress_index();
    let mut spans = Vec::new();
    for (i, name) in STAGES.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ›  ", Style::default().fg(Color::DarkGray)));
        }
        let style = if i == current {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if i < current {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!("{}. {}", i + 1, name), style));
    }
    let p = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Progress: {}", state.session.stage_name())),
        );
    f.render_widget(p, area);
}

fn draw_session(area: Rect, f: &mut Frame, state: &UiState) {
    let session = &state.session;
    let mut lines: Vec<Line<'static>> = Vec::new();

    let video = session
        .selected_video()
        .map(|v| v.display_name.clone())
        .unwrap_or_else(|| "none (press o to select)".to_string());
    push_wrapped_kv(&mut lines, "Video", &video, Style::default(), area.width);

    let status_style = match session.phase() {
        SessionPhase::Pending => Style::default().fg(Color::Yellow),
        SessionPhase::Done => Style::default().fg(Color::Green),
        SessionPhase::Idle => Style::default(),
    };
    push_wrapped_kv(&mut lines, "Status", session.status_message(), status_style, area.width);

    if let Some(err) = session.last_error() {
        let hint = if session.can_submit() {
            format!("{err} (press u to retry)")
        } else {
            err.to_string()
        };
        push_wrapped_kv(&mut lines, "Error", &hint, Style::default().fg(Color::Red), area.width);
    }

    if let Some(result) = session.result() {
        push_wrapped_kv(&mut lines, "Stored as", &result.source_filename, Style::default(), area.width);
        let annotated = result
            .annotated_video_reference
            .as_deref()
            .unwrap_or("not available");
        push_wrapped_kv(&mut lines, "Annotated", annotated, Style::default().fg(Color::Cyan), area.width);
        if let Some(at) = result.completed_at.as_deref() {
            push_wrapped_kv(&mut lines, "Completed", at, Style::default(), area.width);
        }
    }

    let submit_hint = if session.can_submit() {
        Span::styled("u: upload", Style::default().fg(Color::Green))
    } else {
        Span::styled("u: upload", Style::default().fg(Color::DarkGray))
    };
    let play = if state.player.is_some() { "v: play" } else { "v: show URL" };
    lines.push(Line::from(vec![
        submit_hint,
        Span::raw(format!("  o: select  x: clear  {play}  ?: help")),
    ]));

    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Session ({})", state.base_url)),
    );
    f.render_widget(p, area);
}

fn draw_preview(area: Rect, f: &mut Frame, state: &UiState) {
    let preview = state.session.keypoint_preview();
    let lines: Vec<Line> = if preview.is_empty() {
        let msg = match state.session.phase() {
            SessionPhase::Done => "No keypoints detected",
            SessionPhase::Pending => "Waiting for analysis…",
            SessionPhase::Idle => "Keypoints appear after analysis",
        };
        vec![Line::from(Span::styled(msg, Style::default().fg(Color::Gray)))]
    } else {
        preview.iter().map(|l| Line::from(landmark_line(l))).collect()
    };
    let frames = state.session.keypoints().len();
    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Keypoints (frame 1 of {frames})")),
    );
    f.render_widget(p, area);
}

fn draw_metrics(area: Rect, f: &mut Frame, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("Performance");
    if state.session.phase() != SessionPhase::Done {
        let p = Paragraph::new(Span::styled(
            "Metrics appear after analysis",
            Style::default().fg(Color::Gray),
        ))
        .block(block);
        f.render_widget(p, area);
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut constraints: Vec<Constraint> =
        PERFORMANCE_METRICS.iter().map(|_| Constraint::Length(1)).collect();
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, m) in PERFORMANCE_METRICS.iter().enumerate() {
        let g = Gauge::default()
            .gauge_style(Style::default().fg(Color::Green))
            .percent(m.percent.min(100) as u16)
            .label(format!("{} {}%", m.label, m.percent));
        f.render_widget(g, rows[i]);
    }

    let tips: Vec<Line> = RECOMMENDATIONS
        .iter()
        .map(|r| Line::from(format!("• {r}")))
        .collect();
    let p = Paragraph::new(tips).wrap(Wrap { trim: true });
    f.render_widget(p, rows[PERFORMANCE_METRICS.len()]);
}

fn draw_path_prompt(area: Rect, f: &mut Frame, input: &str) {
    let width = area.width.saturating_sub(8).max(10);
    let prompt = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + area.height / 2,
        width,
        height: 3.min(area.height),
    };
    f.render_widget(Clear, prompt);
    let p = Paragraph::new(Line::from(vec![
        Span::raw(input.to_string()),
        Span::styled("_", Style::default().fg(Color::Yellow)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Video path (Enter: select, Esc: cancel)"),
    );
    f.render_widget(p, prompt);
}

pub fn draw_keypoints(area: Rect, f: &mut Frame, state: &UiState) {
    let frames = state.session.keypoints().len();
    let title = if frames == 0 {
        "Keypoints".to_string()
    } else {
        format!("Keypoints: frame {} of {} (←/→)", state.frame_index + 1, frames)
    };

    let rows: Vec<Row> = state
        .current_frame()
        .iter()
        .map(|l| {
            let pct = visibility_percent(l.visibility);
            let color = match pct {
                80..=100 => Color::Green,
                50..=79 => Color::Yellow,
                _ => Color::Red,
            };
            Row::new(vec![
                Cell::from(landmark_label(&l.name)),
                Cell::from(format!("{:.3}", l.x)),
                Cell::from(format!("{:.3}", l.y)),
                Cell::from(Span::styled(format!("{pct}%"), Style::default().fg(color))),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ],
    )
    .header(
        Row::new(vec!["Landmark", "x", "y", "Visibility"])
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(table, area);
}
