//! Reference host for the happy command framework.
//!
//! Builds a small command tree (greet, service start/stop/debug), compiles it
//! against the process arguments, and drives the compiled command through the
//! standard lifecycle. Compile-time failures exit with code 2, runtime
//! failures with code 1.

use std::process::ExitCode;

use happy_command::{Command, Config, Session, compile, run};
use happy_varflag::Flag;

fn build_tree() -> Command {
    let greet = Command::new(
        Config::new("greet")
            .description("print a greeting for NAME")
            .args(1, 1)
            .min_args_err("greet needs exactly one NAME")
            .max_args_err("greet takes a single NAME"),
    )
    .with_flag(Flag::bool("shout").expect("static flag name is valid"))
    .do_action(|_session, args| {
        let name = args.arg(0).unwrap_or("stranger");
        let shout = args.flag("shout").is_some_and(|f| f.present());
        if args.flag("verbose").is_some_and(|f| f.present()) {
            eprintln!("greeting {name}");
        }
        if shout {
            println!("HELLO, {}!", name.to_uppercase());
        } else {
            println!("hello, {name}");
        }
        Ok(())
    });

    let start = Command::new(Config::new("start").description("start the service"))
        .do_action(|_session, _args| {
            println!("service started");
            Ok(())
        });

    let stop = Command::new(Config::new("stop").description("stop the service"))
        .do_action(|_session, _args| {
            println!("service stopped");
            Ok(())
        });

    let debug = Command::new(
        Config::new("debug")
            .description("dump service internals")
            .fail_disabled(),
    )
    .disable(|_session| {
        if std::env::var("HAPPY_DEBUG").is_ok() {
            Ok(())
        } else {
            Err("debug commands are disabled".into())
        }
    })
    .do_action(|_session, _args| {
        println!("debug: everything looks happy");
        Ok(())
    });

    let service = Command::new(
        Config::new("service")
            .description("manage the demo service")
            .shared_before_action(),
    )
    .before(|_session, _args| {
        println!("service: connecting");
        Ok(())
    })
    .with_subcommands([start, stop, debug]);

    Command::new(Config::new("happy").description("happy demo application"))
        .with_flag(
            Flag::bool("verbose")
                .expect("static flag name is valid")
                .with_alias("v")
                .with_usage("print progress to stderr"),
        )
        .do_action(|_session, _args| {
            println!("happy: try `happy greet NAME` or `happy service start`");
            Ok(())
        })
        .with_subcommands([greet, service])
}

fn main() -> ExitCode {
    let (cmd, mut queue) = match compile(build_tree()) {
        Ok(compiled) => compiled,
        Err(err) => {
            eprintln!("happy: {err}");
            return ExitCode::from(2);
        }
    };
    queue.flush();

    let session = Session::new();
    match run(&cmd, &session) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("happy: {err}");
            ExitCode::FAILURE
        }
    }
}
