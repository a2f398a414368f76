//! Error taxonomy for the command pipeline.
//!
//! Three non-overlapping layers, matching how failures surface:
//!
//! - [`ConfigError`] — builder-time mistakes (invalid names, duplicate
//!   lifecycle callbacks, flag collisions). Sticky on the builder that
//!   produced them; the first one wins.
//! - [`CompileError`] — compilation is all-or-nothing; any verification or
//!   argument-parse failure aborts with one of these.
//! - [`Error`] — runtime phase failures. Action errors pass through
//!   unchanged via the transparent [`Error::Action`] variant.

use thiserror::Error;

use crate::action::Phase;
use happy_varflag::FlagError;

/// Boxed error returned by application-supplied actions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Builder-time configuration errors.
///
/// Recorded as the sticky error on a [`Command`](crate::Command); later
/// errors on the same builder are swallowed in favor of the first.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Command name is empty or contains invalid characters.
    #[error("invalid command name: {0:?}")]
    InvalidName(String),

    /// Minimum argument count exceeds the maximum.
    #[error("command {name}: min args {min} exceeds max args {max}")]
    InvalidArgBounds { name: String, min: usize, max: usize },

    /// A lifecycle callback was assigned twice.
    #[error("command {name}: {phase} action already set")]
    DuplicateAction { name: String, phase: Phase },

    /// A flag collides with one declared on an ancestor command.
    #[error("command {path}: flag {flag} collides with a flag declared on {ancestor}")]
    FlagCollision {
        path: String,
        flag: String,
        ancestor: String,
    },

    /// A subcommand with the same name is already attached.
    #[error("command {name}: subcommand {sub} already exists")]
    DuplicateSubcommand { name: String, sub: String },

    /// An attached subcommand already carries a configuration error.
    #[error("command {name}: subcommand {sub} is invalid: {source}")]
    InvalidSubcommand {
        name: String,
        sub: String,
        #[source]
        source: Box<ConfigError>,
    },

    /// A command without a Do action must dispatch to subcommands.
    #[error("command {0} must have a Do action or at least one subcommand")]
    MissingDoAction(String),

    /// A flag could not be added to the command's flag set.
    #[error("command {name}: {source}")]
    Flag {
        name: String,
        #[source]
        source: FlagError,
    },
}

/// Compilation errors. None are recoverable; there is no partial `Cmd`.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Tree verification failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The argument vector could not be parsed against the flag tree.
    #[error("failed to parse arguments: {0}")]
    Parse(#[source] FlagError),

    /// A trailing token did not match any subcommand of the resolved leaf.
    #[error("unknown subcommand: {0}")]
    UnknownSubcommand(String),

    /// Positional tokens were supplied to a command that accepts none.
    #[error("command {name} does not accept arguments: {args:?}")]
    UnexpectedArgs { name: String, args: Vec<String> },
}

/// Runtime phase errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Arguments were supplied to a command that accepts none.
    #[error("command {0} does not accept arguments")]
    NoArgsAccepted(String),

    /// Fewer positional arguments than the configured minimum.
    #[error("command {name} requires at least {min} argument(s), got {got}")]
    TooFewArgs { name: String, min: usize, got: usize },

    /// More positional arguments than the configured maximum.
    #[error("command {name} accepts at most {max} argument(s), got {got}, extra: {extra:?}")]
    TooManyArgs {
        name: String,
        max: usize,
        got: usize,
        extra: Vec<String>,
    },

    /// Custom argument-violation message configured on the command.
    #[error("{0}")]
    ArgMessage(String),

    /// The command is disabled for this invocation.
    #[error("command not allowed: {name}{}", .reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    NotAllowed {
        name: String,
        reason: Option<String>,
    },

    /// The settings profile rejected a write.
    #[error("settings profile error: {0}")]
    Profile(String),

    /// Error returned by an application-supplied action, unchanged.
    #[error(transparent)]
    Action(#[from] BoxError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_allowed_display_with_and_without_reason() {
        let bare = Error::NotAllowed {
            name: "deploy".to_string(),
            reason: None,
        };
        assert_eq!(bare.to_string(), "command not allowed: deploy");

        let reasoned = Error::NotAllowed {
            name: "deploy".to_string(),
            reason: Some("maintenance window".to_string()),
        };
        assert_eq!(
            reasoned.to_string(),
            "command not allowed: deploy: maintenance window"
        );
    }

    #[test]
    fn test_action_error_passes_through_unchanged() {
        let inner: BoxError = "disk full".into();
        let err = Error::from(inner);
        assert_eq!(err.to_string(), "disk full");
    }
}
