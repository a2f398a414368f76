//! Compilation of a builder tree into one executable command.
//!
//! Compilation is all-or-nothing: verification, argument parsing, and
//! subcommand resolution either produce a single [`Cmd`] snapshot plus the
//! accumulated configuration-time log queue, or a [`CompileError`].

use crate::args::ArgBounds;
use crate::builder::Command;
use crate::cmd::{Cmd, CmdSpec, SharedEntry, SubCmdInfo};
use crate::error::CompileError;
use crate::logqueue::LogQueue;

/// Compiles the root builder against the process argument vector.
///
/// Equivalent to [`compile_from`] with `std::env::args()` minus the program
/// name.
pub fn compile(root: Command) -> Result<(Cmd, LogQueue), CompileError> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    compile_from(root, &argv)
}

/// Compiles the root builder against an explicit argument vector.
///
/// Steps: verify the tree, parse `argv` against the merged flag-set tree,
/// walk the active-set chain to the invoked builder, resolve flag
/// inheritance (global flags from the root, shared flags from shared-before
/// ancestors), and snapshot the result into an immutable [`Cmd`]. The
/// returned [`LogQueue`] holds every configuration-time diagnostic buffered
/// anywhere in the tree; on failure the queue is flushed through `tracing`
/// before the error is returned.
///
/// # Examples
///
/// ```
/// use happy_command::{Command, Config, compile_from};
///
/// let greet = Command::new(Config::new("greet").args(1, 1))
///     .do_action(|_session, args| {
///         println!("hello, {}", args.arg(0).unwrap_or("stranger"));
///         Ok(())
///     });
/// let root = Command::new(Config::new("app")).with_subcommand(greet);
///
/// let argv: Vec<String> = ["greet", "world"].iter().map(|s| s.to_string()).collect();
/// let (cmd, mut queue) = compile_from(root, &argv).unwrap();
/// queue.flush();
///
/// assert_eq!(cmd.name(), "greet");
/// assert_eq!(cmd.args(), &["world".to_string()]);
/// ```
pub fn compile_from(mut root: Command, argv: &[String]) -> Result<(Cmd, LogQueue), CompileError> {
    let mut namespace = Vec::new();
    let verified = root.verify(&[], &mut namespace);
    let mut queue = std::mem::take(&mut root.queue);
    if let Err(err) = verified {
        queue.flush();
        return Err(err.into());
    }

    let mut parse_tree = root.parse_tree().map_err(CompileError::Parse)?;
    if let Err(err) = parse_tree.parse(argv) {
        queue.flush();
        return Err(CompileError::Parse(err));
    }

    // The active chain mirrors the subcommand path the user invoked,
    // root first; flag values parsed from argv live in these sets.
    let chain = parse_tree.into_active_chain();
    let path_names: Vec<String> = chain[1..]
        .iter()
        .map(|set| set.name().to_string())
        .collect();

    let mut ancestors: Vec<Command> = Vec::new();
    let mut current = root;
    for name in &path_names {
        let Some(child) = current.subcommands.remove(name) else {
            queue.flush();
            return Err(CompileError::UnknownSubcommand(name.clone()));
        };
        ancestors.push(current);
        current = child;
    }
    let mut leaf = current;
    let is_root = ancestors.is_empty();

    let mut chain = chain;
    let Some(leaf_set) = chain.pop() else {
        unreachable!("active chain always holds at least the root set")
    };
    let args = leaf_set.args().to_vec();

    // A leaf that accepts no positional arguments cannot carry trailing
    // tokens: on a dispatching command they are a misspelled subcommand,
    // otherwise plain excess arguments. Both abort compilation.
    if !args.is_empty() && leaf.config.max_args() == 0 {
        queue.flush();
        if leaf.subcommands.is_empty() {
            return Err(CompileError::UnexpectedArgs {
                name: leaf.config.name().to_string(),
                args,
            });
        }
        return Err(CompileError::UnknownSubcommand(args[0].clone()));
    }

    let global_flags: Vec<_> = chain
        .first()
        .map(|set| set.flags().to_vec())
        .unwrap_or_else(|| leaf_set.flags().to_vec());
    let shared_flags: Vec<_> = ancestors
        .iter()
        .zip(chain.iter())
        .skip(1)
        .filter(|(ancestor, _)| ancestor.config.is_shared_before())
        .flat_map(|(_, set)| set.flags().iter().cloned())
        .collect();
    let own_flags = leaf_set.flags().to_vec();

    // Inject inherited flags into the leaf's lookup set so execution-time
    // lookups never walk the tree. Eager namespace validation in verify()
    // guarantees these additions cannot collide.
    let mut flags = leaf_set;
    if !is_root {
        for flag in global_flags.iter().chain(shared_flags.iter()) {
            flags.add(flag.clone()).map_err(CompileError::Parse)?;
        }
    }

    let shared_chain: Vec<SharedEntry> = if leaf.config.skips_shared_before() {
        Vec::new()
    } else {
        ancestors
            .iter_mut()
            .filter(|ancestor| ancestor.config.is_shared_before() && ancestor.before.is_some())
            .map(|ancestor| SharedEntry {
                name: ancestor.config.name().to_string(),
                fail_disabled: ancestor.config.fails_disabled(),
                disable: ancestor.disable.take(),
                before: ancestor.before.take(),
            })
            .collect()
    };

    let mut subcommands: Vec<SubCmdInfo> = leaf
        .subcommands
        .drain()
        .map(|(name, mut sub)| SubCmdInfo {
            name,
            description: sub.config.description_str().to_string(),
            category: sub.config.category_str().to_string(),
            disabled: None,
            disable: sub.disable.take(),
        })
        .collect();
    subcommands.sort_by(|a, b| a.name.cmp(&b.name));

    let mut path = vec![ancestors
        .first()
        .map(|root| root.config.name().to_string())
        .unwrap_or_else(|| leaf.config.name().to_string())];
    path.extend(path_names);

    let cmd = Cmd::from_spec(CmdSpec {
        name: leaf.config.name().to_string(),
        path,
        is_root,
        description: leaf.config.description_str().to_string(),
        category: leaf.config.category_str().to_string(),
        usage: leaf.usage_lines.clone(),
        info: leaf.info.clone(),
        bounds: ArgBounds {
            min: leaf.config.min_args(),
            max: leaf.config.max_args(),
            min_err: leaf.config.min_args_message().map(str::to_string),
            max_err: leaf.config.max_args_message().map(str::to_string),
        },
        fail_disabled: leaf.config.fails_disabled(),
        immediate: leaf.config.is_immediate(),
        args,
        flags,
        global_flags,
        shared_flags,
        own_flags,
        shared_chain,
        disable: leaf.disable.take(),
        before: leaf.before.take(),
        do_action: leaf.do_action.take(),
        after_success: leaf.after_success.take(),
        after_failure: leaf.after_failure.take(),
        after_always: leaf.after_always.take(),
        subcommands,
    });

    Ok((cmd, queue))
}
