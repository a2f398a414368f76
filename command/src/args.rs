//! Resolved arguments handed to before/do actions.

use happy_varflag::{Flag, FlagSet, Value};

use crate::error::Error;

/// Positional-argument bounds with optional custom violation messages.
#[derive(Debug, Clone)]
pub(crate) struct ArgBounds {
    pub min: usize,
    pub max: usize,
    pub min_err: Option<String>,
    pub max_err: Option<String>,
}

/// Borrowed view of a command's resolved positional arguments and flags.
///
/// Constructed fresh for each phase invocation; before and do both
/// re-validate the argument counts rather than caching the result, so a
/// misconfiguration surfaces identically at both call sites.
#[derive(Debug)]
pub struct Args<'a> {
    args: &'a [String],
    flags: &'a FlagSet,
}

impl<'a> Args<'a> {
    pub(crate) fn new(args: &'a [String], flags: &'a FlagSet) -> Self {
        Self { args, flags }
    }

    /// Positional argument at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// All positional arguments in order.
    pub fn args(&self) -> &[String] {
        self.args
    }

    /// Number of positional arguments.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether no positional arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Looks up a flag by name or alias in the command's resolved flag set
    /// (own flags plus injected global and shared flags).
    pub fn flag(&self, name: &str) -> Option<&Flag> {
        self.flags.get(name)
    }

    /// The value of a flag, or `None` when the flag is not declared.
    pub fn flag_value(&self, name: &str) -> Option<&Value> {
        self.flags.get(name).map(Flag::value)
    }
}

/// Validates positional arguments against the configured bounds and returns
/// the `Args` view on success.
pub(crate) fn checked<'a>(
    name: &str,
    args: &'a [String],
    flags: &'a FlagSet,
    bounds: &ArgBounds,
) -> Result<Args<'a>, Error> {
    let got = args.len();
    if bounds.min == 0 && bounds.max == 0 && got > 0 {
        return Err(Error::NoArgsAccepted(name.to_string()));
    }
    if got < bounds.min {
        return Err(match &bounds.min_err {
            Some(message) => Error::ArgMessage(message.clone()),
            None => Error::TooFewArgs {
                name: name.to_string(),
                min: bounds.min,
                got,
            },
        });
    }
    if got > bounds.max {
        return Err(match &bounds.max_err {
            Some(message) => Error::ArgMessage(message.clone()),
            None => Error::TooManyArgs {
                name: name.to_string(),
                max: bounds.max,
                got,
                extra: args[bounds.max..].to_vec(),
            },
        });
    }
    Ok(Args::new(args, flags))
}
