//! Session lifecycle controller.
//!
//! Owns the [`Session`], turns UI commands into transitions, issues at most one
//! request per pending submission, and emits snapshots for presentation layers.

use super::session::{Completion, Session};
use crate::engine::AnalysisService;
use crate::error::AnalysisError;
use crate::model::{InfoEvent, SelectedVideo, SessionEvent, SubmissionTicket, UploadResponse};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

/// Commands emitted by UI layers.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    /// `None` means the picker was dismissed without a choice.
    SelectFile(Option<SelectedVideo>),
    Submit,
    ResetPreview,
    Quit,
}

type Finished = (SubmissionTicket, Result<UploadResponse, AnalysisError>);

/// Spawn the single request for `ticket`; its outcome comes back on `done_tx`.
fn issue_request(
    service: Arc<dyn AnalysisService>,
    ticket: SubmissionTicket,
    done_tx: UnboundedSender<Finished>,
) {
    tokio::spawn(async move {
        let outcome = service.upload(&ticket.video).await;
        let _ = done_tx.send((ticket, outcome));
    });
}

fn emit_snapshot(event_tx: &UnboundedSender<SessionEvent>, session: &Session) {
    let _ = event_tx.send(SessionEvent::Updated {
        session: Box::new(session.clone()),
    });
}

/// Drive the session from UI commands and request completions until quit.
pub(crate) async fn run_controller(
    service: Arc<dyn AnalysisService>,
    event_tx: UnboundedSender<SessionEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut session = Session::new();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Finished>();
    emit_snapshot(&event_tx, &session);

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::SelectFile(file)) => {
                        session.select_file(file);
                    }
                    Some(UiCommand::Submit) => match session.submit() {
                        Some(ticket) => {
                            let _ = event_tx.send(SessionEvent::Info(InfoEvent::RequestIssued {
                                ticket: ticket.id,
                                video: ticket.video.display_name.clone(),
                            }));
                            issue_request(service.clone(), ticket, done_tx.clone());
                        }
                        None => {
                            debug!("submit ignored");
                            let _ = event_tx.send(SessionEvent::Info(InfoEvent::SubmitIgnored));
                            continue;
                        }
                    },
                    Some(UiCommand::ResetPreview) => {
                        session.reset_preview();
                    }
                    // In-flight requests are not cancelled; their results are simply never read.
                    Some(UiCommand::Quit) | None => {
                        if let Some(t) = session.pending_ticket() {
                            info!(ticket = t.id, "abandoning in-flight request");
                        }
                        info!("controller shutting down");
                        break;
                    }
                }
                emit_snapshot(&event_tx, &session);
            }
            Some((ticket, outcome)) = done_rx.recv() => {
                match session.complete(&ticket, outcome, service.base_url()) {
                    Completion::Applied => emit_snapshot(&event_tx, &session),
                    Completion::Stale => {
                        let _ = event_tx.send(SessionEvent::Info(InfoEvent::StaleDiscarded {
                            ticket: ticket.id,
                        }));
                    }
                }
            }
        }
    }

    Ok(())
}

/// Select `video`, submit it and wait for the outcome. Used by non-interactive modes.
pub(crate) async fn run_single_submission(
    service: &dyn AnalysisService,
    video: SelectedVideo,
) -> Session {
    let mut session = Session::new();
    session.select_file(Some(video));
    if let Some(ticket) = session.submit() {
        let outcome = service.upload(&ticket.video).await;
        session.complete(&ticket, outcome, service.base_url());
    }
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::response::interpret_reply;
    use crate::orchestrator::SessionPhase;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    /// Replies with a fixed status/body once a permit is released.
    struct GatedService {
        calls: AtomicUsize,
        gate: Semaphore,
        status: u16,
        body: String,
    }

    impl GatedService {
        fn new(status: u16, body: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                gate: Semaphore::new(0),
                status,
                body: body.to_string(),
            }
        }
    }

    #[async_trait]
    impl AnalysisService for GatedService {
        async fn upload(&self, _video: &SelectedVideo) -> Result<UploadResponse, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _permit = self.gate.acquire().await.expect("gate closed");
            interpret_reply(self.status, &self.body)
        }

        fn base_url(&self) -> &str {
            "http://host:8000"
        }
    }

    async fn next_snapshot(rx: &mut UnboundedReceiver<SessionEvent>) -> Session {
        loop {
            match rx.recv().await.expect("controller stopped") {
                SessionEvent::Updated { session } => return *session,
                SessionEvent::Info(_) => continue,
            }
        }
    }

    async fn wait_for_phase(rx: &mut UnboundedReceiver<SessionEvent>, phase: SessionPhase) -> Session {
        loop {
            let s = next_snapshot(rx).await;
            if s.phase() == phase {
                return s;
            }
        }
    }

    fn video() -> SelectedVideo {
        SelectedVideo::new("/tmp/clip.mov", "clip.mov")
    }

    #[tokio::test]
    async fn only_one_request_per_pending_submission() {
        let service = Arc::new(GatedService::new(
            200,
            r#"{"filename":"clip.mov","message":"ok","annotated":"out.mp4","keypoints":[]}"#,
        ));
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_controller(service.clone(), event_tx, cmd_rx));

        cmd_tx.send(UiCommand::SelectFile(Some(video()))).unwrap();
        cmd_tx.send(UiCommand::Submit).unwrap();
        cmd_tx.send(UiCommand::Submit).unwrap();
        cmd_tx.send(UiCommand::Submit).unwrap();

        let pending = wait_for_phase(&mut event_rx, SessionPhase::Pending).await;
        assert!(!pending.can_submit());

        service.gate.add_permits(10);
        let done = wait_for_phase(&mut event_rx, SessionPhase::Done).await;
        assert_eq!(
            done.result().unwrap().annotated_video_reference.as_deref(),
            Some("http://host:8000/uploads/out.mp4")
        );
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);

        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn late_response_after_reset_is_not_applied() {
        let service = Arc::new(GatedService::new(200, r#"{"message":"ok"}"#));
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_controller(service.clone(), event_tx, cmd_rx));

        cmd_tx.send(UiCommand::SelectFile(Some(video()))).unwrap();
        cmd_tx.send(UiCommand::Submit).unwrap();
        wait_for_phase(&mut event_rx, SessionPhase::Pending).await;
        cmd_tx.send(UiCommand::ResetPreview).unwrap();
        let idle = wait_for_phase(&mut event_rx, SessionPhase::Idle).await;
        assert!(idle.selected_video().is_none());

        service.gate.add_permits(1);
        loop {
            match event_rx.recv().await.unwrap() {
                SessionEvent::Info(InfoEvent::StaleDiscarded { ticket }) => {
                    assert_eq!(ticket, 1);
                    break;
                }
                SessionEvent::Updated { session } => {
                    assert_ne!(session.phase(), SessionPhase::Done);
                }
                SessionEvent::Info(_) => {}
            }
        }

        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn single_submission_reports_rejection() {
        let service = GatedService::new(415, r#"{"message":"bad codec"}"#);
        service.gate.add_permits(1);
        let session = run_single_submission(&service, video()).await;
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.last_error(), Some("bad codec"));
        assert_eq!(session.selected_video(), Some(&video()));
    }
}
