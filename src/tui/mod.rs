mod clipboard;
mod dashboard;
mod help;
mod state;

use crate::cli::{build_config, Cli};
use crate::engine::{AnalysisClient, AnalysisService};
use crate::model::{InfoEvent, SessionEvent};
use crate::orchestrator::{self, UiCommand};
use crate::picker::{FilePicker, PathPicker};
use crate::player::renderer_for;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Tabs},
    Terminal,
};
use state::{UiState, TAB_COUNT, TAB_DASHBOARD, TAB_HELP, TAB_KEYPOINTS};
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

pub async fn run(args: Cli) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<SessionEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let client = AnalysisClient::new(&build_config(&args))?;
    let service: Arc<dyn AnalysisService> = Arc::new(client);

    // Launch selection goes through the same picker and commands as the UI.
    if let Some(path) = args.video.clone() {
        match PathPicker::from_path(path).pick() {
            Ok(file) => {
                let _ = cmd_tx.send(UiCommand::SelectFile(file));
                if args.submit_on_launch {
                    let _ = cmd_tx.send(UiCommand::Submit);
                }
            }
            Err(e) => {
                warn!(error = %e, "launch video rejected");
                let _ = event_tx.send(SessionEvent::Info(InfoEvent::Message(format!(
                    "Cannot select video: {e:#}"
                ))));
            }
        }
    }

    // TUI runs in a dedicated thread to keep all blocking terminal I/O out of the Tokio runtime.
    let ui_args = args.clone();
    let ui_cmd_tx = cmd_tx.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_args, event_rx, ui_cmd_tx));
    drop(cmd_tx);

    let res = orchestrator::run_controller(service, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    args: Cli,
    mut event_rx: UnboundedReceiver<SessionEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = UiState {
        base_url: args.base_url.clone(),
        player: args.player.clone(),
        ..Default::default()
    };
    let mut renderer = renderer_for(args.player.as_deref());

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain controller events without blocking to keep the UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        if !event::poll(Duration::from_millis(10)).unwrap_or(false) {
            continue;
        }
        let Ok(Event::Key(k)) = event::read() else {
            continue;
        };
        if k.kind != KeyEventKind::Press {
            continue;
        }

        if state.input.is_some() {
            handle_prompt_key(&mut state, &cmd_tx, k.code);
            continue;
        }

        match (k.modifiers, k.code) {
            (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                let _ = cmd_tx.send(UiCommand::Quit);
                break Ok(());
            }
            (_, KeyCode::Char('o')) => {
                state.tab = TAB_DASHBOARD;
                state.input = Some(String::new());
            }
            (_, KeyCode::Char('u')) | (_, KeyCode::Enter) => {
                // The orchestrator enforces single-flight; this only sends the request.
                let _ = cmd_tx.send(UiCommand::Submit);
            }
            (_, KeyCode::Char('x')) => {
                let _ = cmd_tx.send(UiCommand::ResetPreview);
            }
            (_, KeyCode::Char('v')) => match state.annotated_uri().map(str::to_string) {
                Some(uri) => {
                    state.info = match renderer.render(&uri) {
                        Ok(msg) => msg,
                        Err(e) => format!("Could not open video: {e:#}"),
                    };
                }
                None => state.info = "No annotated video yet".into(),
            },
            (_, KeyCode::Char('y')) => match state.annotated_uri().map(str::to_string) {
                Some(uri) => match clipboard::copy_to_clipboard(&uri) {
                    Ok(()) => state.info = format!("✓ Copied to clipboard: {uri}"),
                    Err(e) => state.info = format!("Clipboard copy failed: {e:#}"),
                },
                None => state.info = "No annotated video URL to copy".into(),
            },
            (_, KeyCode::Tab) => {
                state.tab = (state.tab + 1) % TAB_COUNT;
            }
            (_, KeyCode::Char('?')) => {
                state.tab = TAB_HELP;
            }
            (_, KeyCode::Right) | (_, KeyCode::Char('l')) => {
                if state.tab == TAB_KEYPOINTS {
                    state.next_frame();
                }
            }
            (_, KeyCode::Left) | (_, KeyCode::Char('h')) => {
                if state.tab == TAB_KEYPOINTS {
                    state.prev_frame();
                }
            }
            _ => {}
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

/// Keys while the path prompt is open. Esc is a cancelled pick and clears the selection.
fn handle_prompt_key(state: &mut UiState, cmd_tx: &UnboundedSender<UiCommand>, code: KeyCode) {
    let Some(buf) = state.input.as_mut() else {
        return;
    };
    match code {
        KeyCode::Char(c) => buf.push(c),
        KeyCode::Backspace => {
            buf.pop();
        }
        KeyCode::Esc => {
            state.input = None;
            let _ = cmd_tx.send(UiCommand::SelectFile(None));
        }
        KeyCode::Enter => {
            let typed = buf.clone();
            match PathPicker::from_input(&typed).pick() {
                Ok(file) => {
                    info!(selected = file.is_some(), "file picked");
                    state.input = None;
                    let _ = cmd_tx.send(UiCommand::SelectFile(file));
                }
                // Keep the prompt open so the path can be corrected.
                Err(e) => state.info = format!("Cannot select video: {e:#}"),
            }
        }
        _ => {}
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![
        Line::from("Dashboard"),
        Line::from("Keypoints"),
        Line::from("Help"),
    ])
    .select(state.tab)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("movement-analysis-cli"),
    )
    .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        TAB_DASHBOARD => dashboard::draw_dashboard(chunks[1], f, state),
        TAB_KEYPOINTS => dashboard::draw_keypoints(chunks[1], f, state),
        _ => help::draw_help(chunks[1], f),
    }
}
