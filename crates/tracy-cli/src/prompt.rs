//! Interactive questions on stdin

use std::io::{self, BufRead, Write};

use tracy_core::errors::TracyError;

/// Ask a yes/no question; only `y`/`Y` counts as yes
///
/// End of input counts as no.
pub fn confirm(question: &str) -> Result<bool, TracyError> {
    let answer = ask(&format!("{} (Y/N): ", question))?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn ask(question: &str) -> Result<String, TracyError> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", question).map_err(|e| TracyError::io("prompt", "<stdout>", e))?;
    stdout
        .flush()
        .map_err(|e| TracyError::io("prompt", "<stdout>", e))?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| TracyError::io("prompt", "<stdin>", e))?;
    Ok(line)
}
