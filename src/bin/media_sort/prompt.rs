use std::io::{self, BufRead, Write};

use colored::Colorize;

use media_sort::organize::{Decision, DecisionSource, LockedFailure};
use media_sort::print_warning;

/// Asks the operator on the terminal how to handle a permission failure.
#[derive(Debug, Default)]
pub struct TerminalDecisions;

impl DecisionSource for TerminalDecisions {
    fn decide(&mut self, failure: &LockedFailure) -> Decision {
        print_warning!(
            "Permission denied moving {} (attempt {}): {}",
            failure.action.source.display(),
            failure.attempt,
            failure.error
        );
        if let Some(locked) = failure.locked {
            println!("  Locked: {}", locked.display());
        }

        let options = if failure.locked.is_some() {
            "[r]etry, [s]kip, [a]bort, [u]nlock, [U]nlock all: "
        } else {
            "[r]etry, [s]kip, [a]bort: "
        };

        let stdin = io::stdin();
        loop {
            print!("{}", options.magenta());
            let _ = io::stdout().flush();

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                // Closed input cannot answer later failures either.
                Ok(0) | Err(_) => return Decision::Abort,
                Ok(_) => {}
            }
            if let Some(decision) = parse_decision(input.trim(), failure.locked.is_some()) {
                return decision;
            }
            print_warning!("Unknown choice: '{}'", input.trim());
        }
    }
}

/// Ask a yes/no question. Only `y` counts as yes.
///
/// # Errors
/// Returns an error if reading from stdin fails.
pub fn confirm(question: &str) -> io::Result<bool> {
    print!("{}", question.magenta());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Map a key to a decision. Unlock keys are case-sensitive and only valid for locked paths.
fn parse_decision(input: &str, locked: bool) -> Option<Decision> {
    match input {
        "r" | "R" => Some(Decision::Retry),
        "s" | "S" => Some(Decision::Skip),
        "a" | "A" => Some(Decision::Abort),
        "u" if locked => Some(Decision::Unlock),
        "U" if locked => Some(Decision::UnlockAll),
        _ => None,
    }
}
