//! The compiled, thread-safe executable command.
//!
//! A [`Cmd`] is produced once by [`compile`](crate::compile) and is
//! immutable except for the one-shot phase slots, the deferred shared-before
//! chain, and the cached disablement state, all behind one mutex. Each phase
//! runs at most once; re-invoking a consumed phase is a silent no-op so the
//! host can probe phases without bookkeeping.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

use happy_varflag::{Flag, FlagSet};

use crate::action::{
    AfterAlwaysAction, AfterFailureAction, AfterSuccessAction, BeforeAction, DisableAction,
    DoAction, Phase, PhaseSlot,
};
use crate::args::{ArgBounds, Args, checked};
use crate::error::{BoxError, Error};
use crate::session::Session;

/// Deferred shared-before work inherited from one ancestor, root first.
pub(crate) struct SharedEntry {
    pub name: String,
    pub fail_disabled: bool,
    pub disable: Option<DisableAction>,
    pub before: Option<BeforeAction>,
}

/// Compiled summary of one direct subcommand, kept for help rendering and
/// eager disablement evaluation.
pub(crate) struct SubCmdInfo {
    pub name: String,
    pub description: String,
    pub category: String,
    pub disabled: Option<bool>,
    pub disable: Option<DisableAction>,
}

/// Plain-data view of a subcommand summary.
#[derive(Debug, Clone, Serialize)]
pub struct SubSummary {
    pub name: String,
    pub description: String,
    pub category: String,
    /// Cached disablement state; `None` until evaluated.
    pub disabled: Option<bool>,
}

/// Everything the compiler snapshots into a `Cmd`.
pub(crate) struct CmdSpec {
    pub name: String,
    pub path: Vec<String>,
    pub is_root: bool,
    pub description: String,
    pub category: String,
    pub usage: Vec<String>,
    pub info: Vec<String>,
    pub bounds: ArgBounds,
    pub fail_disabled: bool,
    pub immediate: bool,
    pub args: Vec<String>,
    pub flags: FlagSet,
    pub global_flags: Vec<Flag>,
    pub shared_flags: Vec<Flag>,
    pub own_flags: Vec<Flag>,
    pub shared_chain: Vec<SharedEntry>,
    pub disable: Option<DisableAction>,
    pub before: Option<BeforeAction>,
    pub do_action: Option<DoAction>,
    pub after_success: Option<AfterSuccessAction>,
    pub after_failure: Option<AfterFailureAction>,
    pub after_always: Option<AfterAlwaysAction>,
    pub subcommands: Vec<SubCmdInfo>,
}

struct CmdState {
    shared_chain: Vec<SharedEntry>,
    disable: Option<DisableAction>,
    before: PhaseSlot<BeforeAction>,
    do_action: PhaseSlot<DoAction>,
    after_success: PhaseSlot<AfterSuccessAction>,
    after_failure: PhaseSlot<AfterFailureAction>,
    after_always: PhaseSlot<AfterAlwaysAction>,
    disabled: Option<bool>,
    disabled_reason: Option<String>,
    subcommands: Vec<SubCmdInfo>,
}

/// The compiled executable command.
///
/// See the crate docs for the phase contract. The host must call
/// [`check_disabled`](Cmd::check_disabled) before [`exec_do`](Cmd::exec_do);
/// `exec_do` itself does not re-check disablement.
pub struct Cmd {
    name: String,
    path: Vec<String>,
    is_root: bool,
    description: String,
    category: String,
    usage: Vec<String>,
    info: Vec<String>,
    bounds: ArgBounds,
    fail_disabled: bool,
    immediate: bool,
    args: Vec<String>,
    flags: FlagSet,
    global_flags: Vec<Flag>,
    shared_flags: Vec<Flag>,
    own_flags: Vec<Flag>,
    state: Mutex<CmdState>,
}

impl fmt::Debug for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cmd")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("is_root", &self.is_root)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

impl Cmd {
    pub(crate) fn from_spec(spec: CmdSpec) -> Self {
        Self {
            name: spec.name,
            path: spec.path,
            is_root: spec.is_root,
            description: spec.description,
            category: spec.category,
            usage: spec.usage,
            info: spec.info,
            bounds: spec.bounds,
            fail_disabled: spec.fail_disabled,
            immediate: spec.immediate,
            args: spec.args,
            flags: spec.flags,
            global_flags: spec.global_flags,
            shared_flags: spec.shared_flags,
            own_flags: spec.own_flags,
            state: Mutex::new(CmdState {
                shared_chain: spec.shared_chain,
                disable: spec.disable,
                before: PhaseSlot::new(spec.before),
                do_action: PhaseSlot::new(spec.do_action),
                after_success: PhaseSlot::new(spec.after_success),
                after_failure: PhaseSlot::new(spec.after_failure),
                after_always: PhaseSlot::new(spec.after_always),
                disabled: None,
                disabled_reason: None,
                subcommands: spec.subcommands,
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CmdState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Name of the resolved command.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full command path from the root, root name included.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Whether the root command itself was invoked.
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Usage lines: the derived line first, then any explicit additions.
    pub fn usage(&self) -> &[String] {
        &self.usage
    }

    /// Free-form help paragraphs in declaration order.
    pub fn info(&self) -> &[String] {
        &self.info
    }

    /// Whether this command runs before full application bootstrap.
    pub fn is_immediate(&self) -> bool {
        self.immediate
    }

    /// Resolved positional arguments, unvalidated.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Looks up a flag in the resolved lookup set (own plus injected global
    /// and shared flags).
    pub fn flag(&self, name: &str) -> Option<&Flag> {
        self.flags.get(name)
    }

    /// Flags declared on the root command.
    pub fn global_flags(&self) -> &[Flag] {
        &self.global_flags
    }

    /// Flags inherited from shared-before ancestors between root and leaf.
    pub fn shared_flags(&self) -> &[Flag] {
        &self.shared_flags
    }

    /// Flags declared directly on this command.
    pub fn own_flags(&self) -> &[Flag] {
        &self.own_flags
    }

    /// Summaries of direct subcommands, with cached disablement state.
    pub fn subcommands(&self) -> Vec<SubSummary> {
        let state = self.lock_state();
        state
            .subcommands
            .iter()
            .map(|sub| SubSummary {
                name: sub.name.clone(),
                description: sub.description.clone(),
                category: sub.category.clone(),
                disabled: sub.disabled,
            })
            .collect()
    }

    /// Whether an unconsumed before action exists.
    pub fn has_before(&self) -> bool {
        self.lock_state().before.is_armed()
    }

    /// Whether an unconsumed do action exists.
    pub fn has_do(&self) -> bool {
        self.lock_state().do_action.is_armed()
    }

    /// Evaluates (once) and returns the command's disablement state.
    ///
    /// The boolean is cached in the command state and persisted to the
    /// session profile under `cmd.<path>.disabled`; direct subcommands are
    /// evaluated eagerly at the same time so help listings can gray out
    /// disabled children without invoking them.
    pub fn check_disabled(&self, session: &Session) -> bool {
        let mut state = self.lock_state();
        self.evaluate_disabled(&mut state, session);
        state.disabled.unwrap_or(false)
    }

    /// Runs the before phase.
    ///
    /// First call resolves the deferred shared-before chain (root first,
    /// each ancestor gated by its own disablement), then evaluates this
    /// command's disablement, then invokes the before action with the
    /// validated arguments. Consumed phases no-op.
    pub fn exec_before(&self, session: &Session) -> Result<(), Error> {
        let mut state = self.lock_state();

        // Shared-before resolution happens exactly once; the chain is
        // dropped afterwards so ancestors are not kept alive.
        let chain = std::mem::take(&mut state.shared_chain);
        for mut entry in chain {
            if let Some(disable) = &entry.disable {
                if let Err(err) = disable(session) {
                    if entry.fail_disabled {
                        error!(
                            target: "happy::command",
                            command = %entry.name,
                            error = %err,
                            "shared before aborted: ancestor disabled"
                        );
                        // A failed before phase is never retried, even when
                        // the failure came from the shared chain.
                        state.before.consume();
                        return Err(Error::Action(err));
                    }
                    debug!(
                        target: "happy::command",
                        command = %entry.name,
                        error = %err,
                        "skipping shared before of disabled ancestor"
                    );
                    continue;
                }
            }
            if let Some(mut before) = entry.before.take() {
                let args = Args::new(&self.args, &self.flags);
                if let Err(err) = before(session, &args) {
                    error!(
                        target: "happy::command",
                        command = %entry.name,
                        phase = %Phase::Before,
                        error = %err,
                        "shared before action failed"
                    );
                    state.before.consume();
                    return Err(Error::Action(err));
                }
            }
        }

        let predicate_err = self.evaluate_disabled(&mut state, session);
        if state.disabled == Some(true) {
            if self.fail_disabled {
                state.before.consume();
                return Err(match predicate_err {
                    Some(err) => Error::Action(err),
                    None => Error::NotAllowed {
                        name: self.name.clone(),
                        reason: state.disabled_reason.clone(),
                    },
                });
            }
            info!(
                target: "happy::command",
                command = %self.name,
                "command disabled, before and do phases skipped"
            );
            return Ok(());
        }

        let Some(mut action) = state.before.begin() else {
            return Ok(());
        };
        let result = checked(&self.name, &self.args, &self.flags, &self.bounds)
            .and_then(|args| action(session, &args).map_err(Error::from));
        state.before.consume();
        self.log_phase_failure(Phase::Before, &result);
        result
    }

    /// Runs the do phase with the validated arguments. Consumed phases
    /// no-op. Disablement is NOT re-checked here; the host must consult
    /// [`check_disabled`](Cmd::check_disabled) first.
    pub fn exec_do(&self, session: &Session) -> Result<(), Error> {
        let mut state = self.lock_state();
        let Some(mut action) = state.do_action.begin() else {
            return Ok(());
        };
        let result = checked(&self.name, &self.args, &self.flags, &self.bounds)
            .and_then(|args| action(session, &args).map_err(Error::from));
        state.do_action.consume();
        self.log_phase_failure(Phase::Do, &result);
        result
    }

    /// Runs the after-success phase. Consumed phases no-op.
    pub fn exec_after_success(&self, session: &Session) -> Result<(), Error> {
        let mut state = self.lock_state();
        let Some(mut action) = state.after_success.begin() else {
            return Ok(());
        };
        let result = action(session).map_err(Error::from);
        state.after_success.consume();
        self.log_phase_failure(Phase::AfterSuccess, &result);
        result
    }

    /// Runs the after-failure phase with the error that failed the run.
    pub fn exec_after_failure(&self, session: &Session, err: &Error) -> Result<(), Error> {
        let mut state = self.lock_state();
        let Some(mut action) = state.after_failure.begin() else {
            return Ok(());
        };
        let result = action(session, err).map_err(Error::from);
        state.after_failure.consume();
        self.log_phase_failure(Phase::AfterFailure, &result);
        result
    }

    /// Runs the after-always phase with the terminal error, if any.
    pub fn exec_after_always(&self, session: &Session, err: Option<&Error>) -> Result<(), Error> {
        let mut state = self.lock_state();
        let Some(mut action) = state.after_always.begin() else {
            return Ok(());
        };
        let result = action(session, err).map_err(Error::from);
        state.after_always.consume();
        self.log_phase_failure(Phase::AfterAlways, &result);
        result
    }

    fn log_phase_failure(&self, phase: Phase, result: &Result<(), Error>) {
        if let Err(err) = result {
            error!(
                target: "happy::command",
                command = %self.name,
                phase = %phase,
                error = %err,
                "phase failed"
            );
        }
    }

    /// Lazily evaluates disablement, caching the result and persisting it to
    /// the profile. Returns the predicate's error on the evaluating call.
    fn evaluate_disabled(&self, state: &mut CmdState, session: &Session) -> Option<BoxError> {
        if state.disabled.is_some() {
            return None;
        }

        let mut predicate_err = None;
        let mut disabled = false;
        if let Some(disable) = &state.disable {
            if let Err(err) = disable(session) {
                disabled = true;
                state.disabled_reason = Some(err.to_string());
                predicate_err = Some(err);
            }
        }
        state.disabled = Some(disabled);

        let key = format!("cmd.{}.disabled", self.path.join("."));
        if let Err(err) = session.profile().set(&key, json!(disabled)) {
            warn!(
                target: "happy::command",
                command = %self.name,
                error = %err,
                "failed to persist disabled state"
            );
        }

        for sub in &mut state.subcommands {
            if sub.disabled.is_some() {
                continue;
            }
            let sub_disabled = sub
                .disable
                .as_ref()
                .is_some_and(|disable| disable(session).is_err());
            sub.disabled = Some(sub_disabled);
            let key = format!("cmd.{}.{}.disabled", self.path.join("."), sub.name);
            if let Err(err) = session.profile().set(&key, json!(sub_disabled)) {
                warn!(
                    target: "happy::command",
                    command = %sub.name,
                    error = %err,
                    "failed to persist disabled state"
                );
            }
        }

        predicate_err
    }
}
