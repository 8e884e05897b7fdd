// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-oriented shell read from stdin: `init`, `ask`, `kill`, and `exit`,
//! each taking a node name or the literal `random` to start a background
//! loop instead of a single one-shot action.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::orchestrator::Orchestrator;

enum Command {
    Init(String),
    Ask(Target),
    Kill(Target),
    Exit,
    Blank,
    Unknown(String),
}

enum Target {
    Named(Vec<String>),
    Random,
}

/// Consumes every remaining word as a target: `random` alone, or one or
/// more node names to apply the command to in turn.
fn parse_target<'a>(mut words: impl Iterator<Item = &'a str>) -> Option<Target> {
    match words.next()? {
        "random" => Some(Target::Random),
        first => {
            let mut names = vec![first.to_string()];
            names.extend(words.map(str::to_string));
            Some(Target::Named(names))
        }
    }
}

fn parse(line: &str) -> Command {
    let mut words = line.split_whitespace();
    match words.next() {
        None => Command::Blank,
        Some("init") => match words.next() {
            Some(name) => Command::Init(name.to_string()),
            None => Command::Unknown(line.to_string()),
        },
        Some("ask") => match parse_target(words) {
            Some(target) => Command::Ask(target),
            None => Command::Unknown(line.to_string()),
        },
        Some("kill") => match parse_target(words) {
            Some(target) => Command::Kill(target),
            None => Command::Unknown(line.to_string()),
        },
        Some("exit") | Some("quit") => Command::Exit,
        _ => Command::Unknown(line.to_string()),
    }
}

/// Runs the shell to completion, returning once `exit` is read, stdin
/// closes, or the orchestrator's shutdown token is otherwise cancelled.
/// `ask_bounds`/`kill_bounds` are the `[min, max)` delay ranges used by the
/// `ask random`/`kill random` background loops, sourced from `Config`.
pub async fn run_shell(orchestrator: Arc<Orchestrator>, ask_bounds: (Duration, Duration), kill_bounds: (Duration, Duration)) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_prompt();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = orchestrator.shutdown_token().cancelled() => break,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(err = %e, "failed to read command");
                break;
            }
        };

        match parse(&line) {
            Command::Init(name) => orchestrator.init(&name).await,
            Command::Ask(Target::Named(names)) => {
                for name in names {
                    orchestrator.ask(&name).await;
                }
            }
            Command::Ask(Target::Random) => orchestrator.spawn_random_ask_loop(ask_bounds.0, ask_bounds.1),
            Command::Kill(Target::Named(names)) => {
                for name in names {
                    orchestrator.kill(&name).await;
                }
            }
            Command::Kill(Target::Random) => orchestrator.spawn_random_kill_loop(kill_bounds.0, kill_bounds.1),
            Command::Exit => {
                orchestrator.shutdown_token().cancel();
                break;
            }
            Command::Blank => {}
            Command::Unknown(line) => println!("unrecognized command: {line}"),
        }
        print_prompt();
    }
}

fn print_prompt() {
    use std::io::Write;
    print!(">>> ");
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
