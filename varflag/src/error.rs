//! Error types for flag definition and parsing.

use thiserror::Error;

/// Errors that can occur while defining flags or parsing arguments.
///
/// Definition-time variants (`InvalidName`, `InvalidAlias`, `Duplicate`,
/// `DuplicateSet`) surface while a flag set is being assembled; the rest
/// surface from [`FlagSet::parse`](crate::FlagSet::parse).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    /// Flag or set name is empty or contains invalid characters.
    #[error("invalid flag name: {0:?}")]
    InvalidName(String),

    /// Alias is empty or contains invalid characters.
    #[error("invalid flag alias: {0:?}")]
    InvalidAlias(String),

    /// A flag with the same name or alias already exists in the set.
    #[error("duplicate flag in set: {0}")]
    Duplicate(String),

    /// A subset with the same name already exists in the set.
    #[error("duplicate subset: {0}")]
    DuplicateSet(String),

    /// Argument looked like a flag but matched nothing on the active path.
    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    /// A non-boolean flag was given without a value.
    #[error("flag requires a value: {0}")]
    MissingValue(String),

    /// The supplied value cannot be parsed as the flag's type.
    #[error("invalid value for flag {flag}: {value:?}")]
    InvalidValue { flag: String, value: String },
}

/// Convenience alias for results with [`FlagError`].
pub type Result<T> = std::result::Result<T, FlagError>;
