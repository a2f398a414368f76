//! Flag definitions and typed values.

use serde::{Deserialize, Serialize};

use crate::error::{FlagError, Result};

/// Kind of value a flag accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FlagKind {
    /// Boolean flag; present means `true` unless `=false` is given.
    #[default]
    Bool,
    /// String value.
    String,
    /// 64-bit signed integer value.
    Int,
}

/// Typed value carried by a flag.
///
/// # Examples
///
/// ```
/// use happy_varflag::Value;
///
/// let v = Value::Int(8080);
/// assert_eq!(v.as_int(), Some(8080));
/// assert_eq!(v.as_str(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    String(String),
    Int(i64),
}

impl Value {
    /// Returns the boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

/// A named command-line flag.
///
/// A flag has a primary name (matched as `--name`), optional single-character
/// or word aliases (matched as `-a` / `--alias`), a kind, and a default
/// value used when the flag is absent from the parsed arguments.
///
/// # Examples
///
/// ```
/// use happy_varflag::{Flag, Value};
///
/// let verbose = Flag::bool("verbose")
///     .expect("valid name")
///     .with_alias("v")
///     .with_usage("enable verbose output");
///
/// assert_eq!(verbose.name(), "verbose");
/// assert!(!verbose.present());
/// assert_eq!(verbose.value(), &Value::Bool(false));
/// ```
#[derive(Debug, Clone)]
pub struct Flag {
    name: String,
    aliases: Vec<String>,
    usage: String,
    kind: FlagKind,
    default: Value,
    value: Option<Value>,
    present: bool,
}

/// Checks a flag or set name: starts with an ASCII letter, then letters,
/// digits or dashes. Single-character names are allowed for aliases.
pub(crate) fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl Flag {
    fn new(name: &str, kind: FlagKind, default: Value) -> Result<Self> {
        if !valid_name(name) {
            return Err(FlagError::InvalidName(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            aliases: Vec::new(),
            usage: String::new(),
            kind,
            default,
            value: None,
            present: false,
        })
    }

    /// Creates a boolean flag, defaulting to `false`.
    pub fn bool(name: &str) -> Result<Self> {
        Self::new(name, FlagKind::Bool, Value::Bool(false))
    }

    /// Creates a string flag, defaulting to the empty string.
    pub fn string(name: &str) -> Result<Self> {
        Self::new(name, FlagKind::String, Value::String(String::new()))
    }

    /// Creates an integer flag, defaulting to `0`.
    pub fn int(name: &str) -> Result<Self> {
        Self::new(name, FlagKind::Int, Value::Int(0))
    }

    /// Adds an alias. Invalid aliases are rejected when the flag is added
    /// to a [`FlagSet`](crate::FlagSet).
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Sets the usage text shown in help output.
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// Sets the default value returned when the flag is not present.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    /// Primary name of the flag (without dashes).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Aliases of the flag (without dashes).
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Usage text.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Kind of value this flag accepts.
    pub fn kind(&self) -> FlagKind {
        self.kind
    }

    /// Whether the flag appeared in the parsed arguments.
    pub fn present(&self) -> bool {
        self.present
    }

    /// The parsed value, or the default when the flag is absent.
    pub fn value(&self) -> &Value {
        self.value.as_ref().unwrap_or(&self.default)
    }

    /// Checks whether `name` matches this flag's name or any alias.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    pub(crate) fn validate_aliases(&self) -> Result<()> {
        for alias in &self.aliases {
            if !valid_name(alias) {
                return Err(FlagError::InvalidAlias(alias.clone()));
            }
        }
        Ok(())
    }

    /// Records the flag as present, parsing `raw` according to the kind.
    /// Boolean flags accept a missing value as `true`.
    pub(crate) fn set_from(&mut self, raw: Option<&str>) -> Result<()> {
        let value = match (self.kind, raw) {
            (FlagKind::Bool, None) => Value::Bool(true),
            (FlagKind::Bool, Some(raw)) => match raw {
                "true" | "1" => Value::Bool(true),
                "false" | "0" => Value::Bool(false),
                _ => {
                    return Err(FlagError::InvalidValue {
                        flag: self.name.clone(),
                        value: raw.to_string(),
                    });
                }
            },
            (FlagKind::String, Some(raw)) => Value::String(raw.to_string()),
            (FlagKind::Int, Some(raw)) => {
                let parsed = raw.parse::<i64>().map_err(|_| FlagError::InvalidValue {
                    flag: self.name.clone(),
                    value: raw.to_string(),
                })?;
                Value::Int(parsed)
            }
            (_, None) => return Err(FlagError::MissingValue(self.name.clone())),
        };
        self.value = Some(value);
        self.present = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_creation_and_default() {
        let flag = Flag::string("output").unwrap().with_usage("output path");
        assert_eq!(flag.name(), "output");
        assert_eq!(flag.usage(), "output path");
        assert!(!flag.present());
        assert_eq!(flag.value(), &Value::String(String::new()));
    }

    #[test]
    fn test_flag_rejects_invalid_name() {
        assert_eq!(
            Flag::bool("-verbose").unwrap_err(),
            FlagError::InvalidName("-verbose".to_string())
        );
        assert!(Flag::bool("").is_err());
        assert!(Flag::bool("9lives").is_err());
    }

    #[test]
    fn test_flag_matches_aliases() {
        let flag = Flag::bool("verbose").unwrap().with_alias("v");
        assert!(flag.matches("verbose"));
        assert!(flag.matches("v"));
        assert!(!flag.matches("x"));
    }

    #[test]
    fn test_bool_set_from() {
        let mut flag = Flag::bool("verbose").unwrap();
        flag.set_from(None).unwrap();
        assert!(flag.present());
        assert_eq!(flag.value(), &Value::Bool(true));

        let mut flag = Flag::bool("verbose").unwrap();
        flag.set_from(Some("false")).unwrap();
        assert_eq!(flag.value(), &Value::Bool(false));
    }

    #[test]
    fn test_int_set_from_rejects_garbage() {
        let mut flag = Flag::int("port").unwrap();
        assert_eq!(
            flag.set_from(Some("eighty")).unwrap_err(),
            FlagError::InvalidValue {
                flag: "port".to_string(),
                value: "eighty".to_string(),
            }
        );
        flag.set_from(Some("8080")).unwrap();
        assert_eq!(flag.value().as_int(), Some(8080));
    }
}
