//! Mutable command builder.
//!
//! A [`Command`] is the user-facing tree node: configuration, an owned flag
//! set, named children, and up to six lifecycle callbacks. Builder methods
//! consume and return `self`, so a tree is assembled as one expression and
//! concurrent re-entrant mutation is impossible by construction.
//!
//! Errors do not abort the chain. The first configuration error on a builder
//! is sticky; later methods still run (and return `self`) but further errors
//! on the same builder are swallowed in favor of the first. [`Command::err`]
//! surfaces the sticky error, searching depth-first across children.

use std::collections::HashMap;

use tracing::Level;

use happy_varflag::{Flag, FlagSet};

use crate::action::{
    ActionResult, AfterAlwaysAction, AfterFailureAction, AfterSuccessAction, BeforeAction,
    DisableAction, DoAction, Phase,
};
use crate::args::Args;
use crate::config::Config;
use crate::error::ConfigError;
use crate::logqueue::LogQueue;
use crate::session::Session;

/// A mutable command-tree node.
///
/// # Examples
///
/// ```
/// use happy_command::{Command, Config};
/// use happy_varflag::Flag;
///
/// let greet = Command::new(Config::new("greet").args(1, 1))
///     .with_flag(Flag::bool("shout").unwrap())
///     .do_action(|_session, args| {
///         println!("hello, {}", args.arg(0).unwrap_or("stranger"));
///         Ok(())
///     });
/// assert!(greet.err().is_none());
/// ```
pub struct Command {
    pub(crate) config: Config,
    pub(crate) flags: FlagSet,
    pub(crate) subcommands: HashMap<String, Command>,
    pub(crate) disable: Option<DisableAction>,
    pub(crate) before: Option<BeforeAction>,
    pub(crate) do_action: Option<DoAction>,
    pub(crate) after_success: Option<AfterSuccessAction>,
    pub(crate) after_failure: Option<AfterFailureAction>,
    pub(crate) after_always: Option<AfterAlwaysAction>,
    pub(crate) usage_lines: Vec<String>,
    pub(crate) extra_usage: Vec<String>,
    pub(crate) info: Vec<String>,
    pub(crate) err: Option<ConfigError>,
    pub(crate) queue: LogQueue,
}

impl Command {
    /// Creates a builder from a configuration.
    ///
    /// Validation happens immediately; on failure the builder carries a
    /// sticky error and every later method keeps chaining without effect.
    pub fn new(config: Config) -> Self {
        let validation = config.validate();
        let flags = FlagSet::new(config.name())
            .unwrap_or_else(|_| FlagSet::new("invalid").expect("static fallback name is valid"));
        let mut command = Self {
            config,
            flags,
            subcommands: HashMap::new(),
            disable: None,
            before: None,
            do_action: None,
            after_success: None,
            after_failure: None,
            after_always: None,
            usage_lines: Vec::new(),
            extra_usage: Vec::new(),
            info: Vec::new(),
            err: None,
            queue: LogQueue::new(),
        };
        if let Err(err) = validation {
            command.set_err(err);
        }
        command
    }

    /// The command's name.
    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// The first configuration error on this builder or any descendant,
    /// depth-first. `None` means the tree is clean so far.
    pub fn err(&self) -> Option<&ConfigError> {
        if let Some(err) = &self.err {
            return Some(err);
        }
        self.subcommands.values().find_map(Command::err)
    }

    /// Attaches the disable predicate. May be set once.
    pub fn disable<F>(mut self, action: F) -> Self
    where
        F: Fn(&Session) -> ActionResult + Send + Sync + 'static,
    {
        if self.disable.is_some() {
            self.record_duplicate(Phase::Disable);
        } else {
            self.disable = Some(Box::new(action));
        }
        self
    }

    /// Attaches the before action. May be set once.
    pub fn before<F>(mut self, action: F) -> Self
    where
        F: FnMut(&Session, &Args) -> ActionResult + Send + 'static,
    {
        if self.before.is_some() {
            self.record_duplicate(Phase::Before);
        } else {
            self.before = Some(Box::new(action));
        }
        self
    }

    /// Attaches the do action, the command's primary effect. May be set once.
    pub fn do_action<F>(mut self, action: F) -> Self
    where
        F: FnMut(&Session, &Args) -> ActionResult + Send + 'static,
    {
        if self.do_action.is_some() {
            self.record_duplicate(Phase::Do);
        } else {
            self.do_action = Some(Box::new(action));
        }
        self
    }

    /// Attaches the after-success action. May be set once.
    pub fn after_success<F>(mut self, action: F) -> Self
    where
        F: FnMut(&Session) -> ActionResult + Send + 'static,
    {
        if self.after_success.is_some() {
            self.record_duplicate(Phase::AfterSuccess);
        } else {
            self.after_success = Some(Box::new(action));
        }
        self
    }

    /// Attaches the after-failure action. May be set once.
    pub fn after_failure<F>(mut self, action: F) -> Self
    where
        F: FnMut(&Session, &crate::error::Error) -> ActionResult + Send + 'static,
    {
        if self.after_failure.is_some() {
            self.record_duplicate(Phase::AfterFailure);
        } else {
            self.after_failure = Some(Box::new(action));
        }
        self
    }

    /// Attaches the after-always action. May be set once.
    pub fn after_always<F>(mut self, action: F) -> Self
    where
        F: FnMut(&Session, Option<&crate::error::Error>) -> ActionResult + Send + 'static,
    {
        if self.after_always.is_some() {
            self.record_duplicate(Phase::AfterAlways);
        } else {
            self.after_always = Some(Box::new(action));
        }
        self
    }

    /// Adds a flag to the command's own flag set. A rejected flag degrades
    /// to a recorded configuration error; the builder stays usable.
    pub fn with_flag(mut self, flag: Flag) -> Self {
        if let Err(source) = self.flags.add(flag) {
            let err = ConfigError::Flag {
                name: self.config.name().to_string(),
                source,
            };
            self.set_err(err);
        }
        self
    }

    /// Adds several flags; each failure is recorded independently.
    pub fn with_flags(mut self, flags: impl IntoIterator<Item = Flag>) -> Self {
        for flag in flags {
            self = self.with_flag(flag);
        }
        self
    }

    /// Attaches a named child command.
    ///
    /// Records a configuration error when the child already carries one,
    /// when a child with the same name exists, or when the child's flags
    /// collide with this command's own flags. The child is attached in every
    /// case so its buffered diagnostics still surface during verification.
    pub fn with_subcommand(mut self, sub: Command) -> Self {
        let sub_name = sub.config.name().to_string();

        if let Some(err) = sub.err() {
            let err = ConfigError::InvalidSubcommand {
                name: self.config.name().to_string(),
                sub: sub_name.clone(),
                source: Box::new(err.clone()),
            };
            self.set_err(err);
        }

        for flag in sub.flags.flags() {
            let clash = std::iter::once(flag.name())
                .chain(flag.aliases().iter().map(String::as_str))
                .find(|name| self.flags.contains(name));
            if let Some(clash) = clash {
                let err = ConfigError::FlagCollision {
                    path: format!("{} {sub_name}", self.config.name()),
                    flag: clash.to_string(),
                    ancestor: self.config.name().to_string(),
                };
                self.set_err(err);
            }
        }

        if self.subcommands.contains_key(&sub_name) {
            let err = ConfigError::DuplicateSubcommand {
                name: self.config.name().to_string(),
                sub: sub_name,
            };
            self.set_err(err);
            return self;
        }

        self.subcommands.insert(sub_name, sub);
        self
    }

    /// Attaches several child commands.
    pub fn with_subcommands(mut self, subs: impl IntoIterator<Item = Command>) -> Self {
        for sub in subs {
            self = self.with_subcommand(sub);
        }
        self
    }

    /// Appends a free-form help paragraph; ordering is preserved.
    pub fn add_info(mut self, paragraph: impl Into<String>) -> Self {
        self.info.push(paragraph.into());
        self
    }

    /// Appends an additional usage line alongside the auto-derived one.
    pub fn usage(mut self, line: impl Into<String>) -> Self {
        self.extra_usage.push(line.into());
        self
    }

    fn record_duplicate(&mut self, phase: Phase) {
        let err = ConfigError::DuplicateAction {
            name: self.config.name().to_string(),
            phase,
        };
        self.set_err(err);
    }

    /// Records the error in the log queue; the first error becomes sticky.
    fn set_err(&mut self, err: ConfigError) {
        self.queue.push(
            Level::ERROR,
            err.to_string(),
            vec![("command".to_string(), self.config.name().to_string())],
        );
        if self.err.is_none() {
            self.err = Some(err);
        }
    }

    /// Verifies the tree rooted at this command.
    ///
    /// Derives usage strings from the parent path, enforces the wrapper rule
    /// (a command without a Do action must have at least one subcommand),
    /// and validates the whole subtree's flag namespace against the ancestor
    /// chain so collisions are reported at the node that introduces them.
    /// Child log queues are merged into this command's queue, success or not.
    pub(crate) fn verify(
        &mut self,
        parents: &[String],
        namespace: &mut Vec<(String, Vec<String>)>,
    ) -> Result<(), ConfigError> {
        if let Some(err) = self.err.clone() {
            // Even an aborted verification surfaces sub-tree diagnostics
            // from the single top-level queue.
            self.collect_sub_queues();
            return Err(err);
        }

        if self.do_action.is_none() && self.subcommands.is_empty() {
            let err = ConfigError::MissingDoAction(self.config.name().to_string());
            self.set_err(err.clone());
            return Err(err);
        }

        let mut path = parents.to_vec();
        path.push(self.config.name().to_string());
        let path_str = path.join(" ");

        let mut derived = path_str.clone();
        if !self.flags.is_empty() {
            derived.push_str(" [flags]");
        }
        if !self.subcommands.is_empty() {
            derived.push_str(" [subcommand]");
        }
        if self.config.max_args() > 0 {
            derived.push_str(" [args...]");
        }
        self.usage_lines = std::iter::once(derived)
            .chain(self.extra_usage.iter().cloned())
            .collect();

        let own_names: Vec<String> = self
            .flags
            .flags()
            .iter()
            .flat_map(|flag| {
                std::iter::once(flag.name().to_string()).chain(flag.aliases().iter().cloned())
            })
            .collect();

        for (ancestor, names) in namespace.iter() {
            if let Some(clash) = own_names.iter().find(|name| names.contains(name)) {
                let err = ConfigError::FlagCollision {
                    path: path_str.clone(),
                    flag: clash.clone(),
                    ancestor: ancestor.clone(),
                };
                self.set_err(err.clone());
                self.collect_sub_queues();
                return Err(err);
            }
        }

        namespace.push((path_str, own_names));
        let mut result = Ok(());
        for sub in self.subcommands.values_mut() {
            let verified = sub.verify(&path, namespace);
            self.queue.consume(&mut sub.queue);
            if verified.is_err() && result.is_ok() {
                result = verified;
            }
        }
        namespace.pop();
        result
    }

    /// Pulls every descendant's buffered diagnostics into this queue.
    fn collect_sub_queues(&mut self) {
        for sub in self.subcommands.values_mut() {
            sub.collect_sub_queues();
            self.queue.consume(&mut sub.queue);
        }
    }

    /// Builds the nested flag-set tree the compiler parses argv against.
    pub(crate) fn parse_tree(&self) -> Result<FlagSet, happy_varflag::FlagError> {
        let mut set = self.flags.clone();
        for sub in self.subcommands.values() {
            set.add_set(sub.parse_tree()?)?;
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &Session, _: &Args) -> ActionResult {
        Ok(())
    }

    #[test]
    fn test_duplicate_action_keeps_first_and_records_error() {
        let command = Command::new(Config::new("greet"))
            .do_action(noop)
            .do_action(noop)
            .add_info("still chainable");

        let err = command.err().expect("duplicate do must be recorded");
        assert!(matches!(
            err,
            ConfigError::DuplicateAction { phase: Phase::Do, .. }
        ));
        assert!(command.do_action.is_some());
        assert_eq!(command.info, vec!["still chainable".to_string()]);
    }

    #[test]
    fn test_invalid_name_is_sticky() {
        let command = Command::new(Config::new("Not Valid")).do_action(noop);
        assert!(matches!(command.err(), Some(ConfigError::InvalidName(_))));
    }

    #[test]
    fn test_wrapper_rule() {
        let mut bare = Command::new(Config::new("wrapper"));
        let mut namespace = Vec::new();
        assert!(matches!(
            bare.verify(&[], &mut namespace),
            Err(ConfigError::MissingDoAction(_))
        ));

        let mut wrapper = Command::new(Config::new("wrapper"))
            .with_subcommand(Command::new(Config::new("child")).do_action(noop));
        let mut namespace = Vec::new();
        assert!(wrapper.verify(&[], &mut namespace).is_ok());
    }

    #[test]
    fn test_child_flag_collision_with_parent() {
        let parent = Command::new(Config::new("parent"))
            .with_flag(Flag::bool("verbose").unwrap())
            .do_action(noop)
            .with_subcommand(
                Command::new(Config::new("child"))
                    .with_flag(Flag::bool("verbose").unwrap())
                    .do_action(noop),
            );
        assert!(matches!(
            parent.err(),
            Some(ConfigError::FlagCollision { .. })
        ));
    }

    #[test]
    fn test_grandchild_flag_collision_found_at_verify() {
        let grandchild = Command::new(Config::new("grandchild"))
            .with_flag(Flag::bool("verbose").unwrap())
            .do_action(noop);
        let child = Command::new(Config::new("child"))
            .do_action(noop)
            .with_subcommand(grandchild);
        let mut root = Command::new(Config::new("root"))
            .with_flag(Flag::bool("verbose").unwrap())
            .do_action(noop)
            .with_subcommand(child);

        // The attach-time check only sees direct children; verification
        // walks the whole namespace.
        assert!(root.err().is_none());
        let mut namespace = Vec::new();
        let err = root.verify(&[], &mut namespace).unwrap_err();
        match err {
            ConfigError::FlagCollision { path, flag, ancestor } => {
                assert_eq!(path, "root child grandchild");
                assert_eq!(flag, "verbose");
                assert_eq!(ancestor, "root");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_subcommand_rejected() {
        let root = Command::new(Config::new("root"))
            .with_subcommand(Command::new(Config::new("sub")).do_action(noop))
            .with_subcommand(Command::new(Config::new("sub")).do_action(noop));
        assert!(matches!(
            root.err(),
            Some(ConfigError::DuplicateSubcommand { .. })
        ));
    }

    #[test]
    fn test_invalid_subcommand_recorded_on_parent() {
        let broken = Command::new(Config::new("sub")).do_action(noop).do_action(noop);
        let root = Command::new(Config::new("root")).with_subcommand(broken);
        assert!(matches!(
            root.err,
            Some(ConfigError::InvalidSubcommand { .. })
        ));
    }

    #[test]
    fn test_verify_collects_child_diagnostics_despite_parent_error() {
        let child = Command::new(Config::new("child")).do_action(noop).do_action(noop);
        let mut root = Command::new(Config::new("root"))
            .do_action(noop)
            .do_action(noop)
            .with_subcommand(child);

        let mut namespace = Vec::new();
        assert!(root.verify(&[], &mut namespace).is_err());

        // The child's own buffered record (tagged command=child) survives
        // the aborted verification.
        assert!(root.queue.records().iter().any(|record| {
            record
                .fields
                .iter()
                .any(|(key, value)| key == "command" && value == "child")
        }));
    }

    #[test]
    fn test_verify_derives_usage() {
        let mut root = Command::new(Config::new("app"))
            .with_flag(Flag::bool("verbose").unwrap())
            .do_action(noop)
            .with_subcommand(
                Command::new(Config::new("greet"))
                    .do_action(noop)
                    .usage("app greet NAME"),
            );
        let mut namespace = Vec::new();
        root.verify(&[], &mut namespace).unwrap();

        assert_eq!(root.usage_lines[0], "app [flags] [subcommand]");
        let greet = root.subcommands.get("greet").unwrap();
        assert_eq!(
            greet.usage_lines,
            vec!["app greet".to_string(), "app greet NAME".to_string()]
        );
    }
}
