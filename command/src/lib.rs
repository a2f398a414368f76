//! Command tree builder, compiler, and four-phase execution lifecycle.
//!
//! This crate turns a mutable tree of [`Command`] builders into a single
//! immutable, thread-safe [`Cmd`] for the command the user actually invoked:
//!
//! - [`Command`] — a chainable builder node: configuration ([`Config`]),
//!   an owned flag set, named children, and up to six lifecycle callbacks.
//!   Configuration errors are sticky, never panics; [`Command::err`] reports
//!   the first one, depth-first.
//! - [`compile`] / [`compile_from`] — verify the tree, parse the argument
//!   vector, walk the active flag-set chain to the invoked command, resolve
//!   flag inheritance (global flags from the root, shared flags from
//!   shared-before ancestors), and snapshot one [`Cmd`] plus the buffered
//!   configuration-time [`LogQueue`].
//! - [`Cmd`] — the compiled command. Four one-shot phases (`exec_before`,
//!   `exec_do`, `exec_after_success`/`exec_after_failure`,
//!   `exec_after_always`) plus [`Cmd::check_disabled`]; each phase runs at
//!   most once and silently no-ops on re-invocation.
//! - [`run`] — the host convention tying the phases together.
//!
//! Every action receives the [`Session`], which carries cooperative
//! cancellation and the settings [`Profile`].
//!
//! # Example
//!
//! ```
//! use happy_command::{Command, Config, Session, compile_from, run};
//! use happy_varflag::Flag;
//!
//! let greet = Command::new(Config::new("greet").args(1, 1))
//!     .with_flag(Flag::bool("shout").unwrap())
//!     .do_action(|_session, args| {
//!         let name = args.arg(0).unwrap_or("stranger");
//!         if args.flag("shout").is_some_and(|f| f.present()) {
//!             println!("HELLO, {}!", name.to_uppercase());
//!         } else {
//!             println!("hello, {name}");
//!         }
//!         Ok(())
//!     });
//! let root = Command::new(Config::new("app"))
//!     .with_flag(Flag::bool("verbose").unwrap())
//!     .with_subcommand(greet);
//!
//! let argv: Vec<String> = ["greet", "--shout", "world"]
//!     .iter().map(|s| s.to_string()).collect();
//! let (cmd, mut queue) = compile_from(root, &argv).unwrap();
//! queue.flush();
//!
//! let session = Session::new();
//! run(&cmd, &session).unwrap();
//! ```

mod action;
mod args;
mod builder;
mod cmd;
mod compile;
mod config;
mod error;
mod logqueue;
mod run;
mod session;

pub use action::{
    ActionResult, AfterAlwaysAction, AfterFailureAction, AfterSuccessAction, BeforeAction,
    DisableAction, DoAction, Phase, PhaseState,
};
pub use args::Args;
pub use builder::Command;
pub use cmd::{Cmd, SubSummary};
pub use compile::{compile, compile_from};
pub use config::Config;
pub use error::{BoxError, CompileError, ConfigError, Error};
pub use logqueue::{LogQueue, Record};
pub use run::run;
pub use session::{Profile, Session};
