//! Upload/analysis orchestration.
//!
//! `session` holds the pure state machine (selection, submission, completion,
//! reset) and its read-only projections. `controller` drives it from UI commands
//! and owns the single outstanding request. UI/CLI layers only send commands and
//! render snapshots.

mod controller;
mod session;

pub(crate) use controller::{run_controller, run_single_submission, UiCommand};
pub use session::{Session, SessionPhase, STAGES};
