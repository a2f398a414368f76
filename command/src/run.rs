//! Host-side phase convention.
//!
//! The compiled [`Cmd`](crate::Cmd) enforces one-shot semantics per phase
//! but not the ordering between phases; that contract belongs to the host.
//! [`run`] implements the documented convention: before → do (skipped when
//! the command is soft-disabled) → exactly one of after-success /
//! after-failure → after-always with the terminal error.

use crate::cmd::Cmd;
use crate::error::Error;
use crate::session::Session;

/// Executes a compiled command through its full lifecycle.
///
/// Hook errors from the after phases are logged by the command itself and do
/// not mask the primary result: `run` returns the first error from the
/// before/do phases, or the after-hook error when the primary flow
/// succeeded.
pub fn run(cmd: &Cmd, session: &Session) -> Result<(), Error> {
    if let Err(err) = cmd.exec_before(session) {
        let _ = cmd.exec_after_failure(session, &err);
        let _ = cmd.exec_after_always(session, Some(&err));
        return Err(err);
    }

    // A soft-disabled command skips do and the success/failure hooks; the
    // after-always hook still observes the (error-free) run.
    if cmd.check_disabled(session) {
        cmd.exec_after_always(session, None)?;
        return Ok(());
    }

    match cmd.exec_do(session) {
        Ok(()) => {
            cmd.exec_after_success(session)?;
            cmd.exec_after_always(session, None)?;
            Ok(())
        }
        Err(err) => {
            let _ = cmd.exec_after_failure(session, &err);
            let _ = cmd.exec_after_always(session, Some(&err));
            Err(err)
        }
    }
}
