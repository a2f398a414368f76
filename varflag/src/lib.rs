//! Typed command-line flags and nested flag sets.
//!
//! This crate provides the flag-parsing primitives consumed by the
//! `happy-command` pipeline:
//!
//! - [`Flag`] — a named, typed flag with aliases, usage text, and a default.
//! - [`Value`] — the typed value a flag carries (bool/string/int).
//! - [`FlagSet`] — an ordered set of flags with nested subsets. Subsets
//!   model subcommands: parsing marks the selected path of subsets "active",
//!   and [`FlagSet::into_active_chain`] hands that path to the command
//!   compiler.
//!
//! # Example
//!
//! ```
//! use happy_varflag::{Flag, FlagSet};
//!
//! let mut root = FlagSet::new("app").unwrap();
//! root.add(Flag::bool("verbose").unwrap().with_alias("v")).unwrap();
//!
//! let mut greet = FlagSet::new("greet").unwrap();
//! greet.add(Flag::bool("shout").unwrap()).unwrap();
//! root.add_set(greet).unwrap();
//!
//! let argv: Vec<String> = ["greet", "--shout", "world", "-v"]
//!     .iter().map(|s| s.to_string()).collect();
//! root.parse(&argv).unwrap();
//!
//! assert!(root.get("verbose").unwrap().present());
//! let greet = root.active_set().unwrap();
//! assert!(greet.get("shout").unwrap().present());
//! assert_eq!(greet.args(), &["world".to_string()]);
//! ```

mod error;
mod flag;
mod set;

pub use error::{FlagError, Result};
pub use flag::{Flag, FlagKind, Value};
pub use set::FlagSet;
