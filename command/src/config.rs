//! Per-command configuration.

use crate::error::ConfigError;

/// Checks a command name: starts with an ASCII lowercase letter, then
/// lowercase letters, digits or dashes.
pub(crate) fn valid_command_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Configuration snapshot for one command.
///
/// Validated when handed to [`Command::new`](crate::Command::new); the
/// builder records a sticky [`ConfigError`](crate::ConfigError) on failure.
///
/// # Examples
///
/// ```
/// use happy_command::Config;
///
/// let config = Config::new("greet")
///     .description("Greet someone by name")
///     .args(1, 1)
///     .min_args_err("greet needs a name");
/// assert_eq!(config.name(), "greet");
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    name: String,
    description: String,
    category: String,
    min_args: usize,
    max_args: usize,
    min_args_err: Option<String>,
    max_args_err: Option<String>,
    shared_before_action: bool,
    immediate: bool,
    skip_shared_before: bool,
    fail_disabled: bool,
}

impl Config {
    /// Creates a configuration for a command named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category: String::new(),
            min_args: 0,
            max_args: 0,
            min_args_err: None,
            max_args_err: None,
            shared_before_action: false,
            immediate: false,
            skip_shared_before: false,
            fail_disabled: false,
        }
    }

    /// Sets the one-line description used in help output.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the help category this command is grouped under.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the minimum and maximum positional-argument counts.
    pub fn args(mut self, min: usize, max: usize) -> Self {
        self.min_args = min;
        self.max_args = max;
        self
    }

    /// Custom error message for a minimum-argument violation.
    pub fn min_args_err(mut self, message: impl Into<String>) -> Self {
        self.min_args_err = Some(message.into());
        self
    }

    /// Custom error message for a maximum-argument violation.
    pub fn max_args_err(mut self, message: impl Into<String>) -> Self {
        self.max_args_err = Some(message.into());
        self
    }

    /// Marks this command's before action as shared: it runs before every
    /// descendant command's own before action, root first.
    pub fn shared_before_action(mut self) -> Self {
        self.shared_before_action = true;
        self
    }

    /// Marks the command for execution before full application bootstrap.
    pub fn immediate(mut self) -> Self {
        self.immediate = true;
        self
    }

    /// Opts this command out of ancestors' shared before actions.
    pub fn skip_shared_before(mut self) -> Self {
        self.skip_shared_before = true;
        self
    }

    /// Makes disablement fail-fast: a disabled command errors out of
    /// `exec_before` instead of silently skipping.
    pub fn fail_disabled(mut self) -> Self {
        self.fail_disabled = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !valid_command_name(&self.name) {
            return Err(ConfigError::InvalidName(self.name.clone()));
        }
        if self.min_args > self.max_args {
            return Err(ConfigError::InvalidArgBounds {
                name: self.name.clone(),
                min: self.min_args,
                max: self.max_args,
            });
        }
        Ok(())
    }

    pub(crate) fn min_args(&self) -> usize {
        self.min_args
    }

    pub(crate) fn max_args(&self) -> usize {
        self.max_args
    }

    pub(crate) fn min_args_message(&self) -> Option<&str> {
        self.min_args_err.as_deref()
    }

    pub(crate) fn max_args_message(&self) -> Option<&str> {
        self.max_args_err.as_deref()
    }

    pub(crate) fn description_str(&self) -> &str {
        &self.description
    }

    pub(crate) fn category_str(&self) -> &str {
        &self.category
    }

    pub(crate) fn is_shared_before(&self) -> bool {
        self.shared_before_action
    }

    pub(crate) fn is_immediate(&self) -> bool {
        self.immediate
    }

    pub(crate) fn skips_shared_before(&self) -> bool {
        self.skip_shared_before
    }

    pub(crate) fn fails_disabled(&self) -> bool {
        self.fail_disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_command_names() {
        assert!(valid_command_name("greet"));
        assert!(valid_command_name("service-start"));
        assert!(!valid_command_name("Greet"));
        assert!(!valid_command_name("9lives"));
        assert!(!valid_command_name(""));
        assert!(!valid_command_name("has space"));
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let config = Config::new("greet").args(3, 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidArgBounds { min: 3, max: 1, .. })
        ));
    }
}
