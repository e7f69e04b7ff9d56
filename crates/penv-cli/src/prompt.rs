use std::io::{self, BufRead, Write};

/// Asks a yes/no question on stderr; anything but `y`/`yes` declines.
pub fn confirm(question: &str) -> bool {
    eprint!("{question} [y/N] ");
    io::stderr().flush().ok();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    is_yes(&answer)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
