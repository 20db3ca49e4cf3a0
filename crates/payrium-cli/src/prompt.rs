//! Terminal input for PINs, phrases and confirmations.
//!
//! Secrets are read without echo when stdin is a terminal and fall
//! back to a plain line read when it is not (pipes, CI). Prompts go to
//! stderr so `--json` output on stdout stays parseable.

use std::io::{BufRead, Write};

use payrium_types::{PayriumError, Result};
use zeroize::Zeroizing;

/// Reads one line from stdin after printing `prompt` to stderr.
pub fn read_line(prompt: &str) -> Result<Zeroizing<String>> {
    eprint!("{prompt}");
    let _ = std::io::stderr().flush();

    let mut input = Zeroizing::new(String::new());
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .map_err(|e| PayriumError::InvalidState {
            reason: format!("failed to read input: {e}"),
        })?;
    Ok(Zeroizing::new(input.trim().to_owned()))
}

/// Reads a secret without echo, or a plain line if no terminal is
/// attached.
pub fn read_secret(prompt: &str) -> Result<Zeroizing<String>> {
    match rpassword::prompt_password_stderr(prompt) {
        Ok(raw) => {
            let raw = Zeroizing::new(raw);
            Ok(Zeroizing::new(raw.trim().to_owned()))
        }
        Err(_) => read_line(""),
    }
}

/// Uses `flag` when given, otherwise prompts without echo. Serves
/// PINs and recovery phrases alike.
pub fn secret_or_prompt(flag: Option<String>, prompt: &str) -> Result<Zeroizing<String>> {
    match flag {
        Some(secret) => Ok(Zeroizing::new(secret)),
        None => read_secret(prompt),
    }
}

/// Uses `flag` when given, otherwise prompts twice for a new PIN.
pub fn new_pin(flag: Option<String>) -> Result<Zeroizing<String>> {
    if let Some(pin) = flag {
        return Ok(Zeroizing::new(pin));
    }

    let first = read_secret("New PIN: ")?;
    let second = read_secret("Repeat new PIN: ")?;
    if first != second {
        return Err(PayriumError::WeakPin {
            reason: "the two PIN entries do not match".into(),
        });
    }
    Ok(first)
}

/// Asks a yes/no question; only `y` or `yes` counts as yes.
pub fn confirm(question: &str) -> Result<bool> {
    let answer = read_line(&format!("{question} [y/N] "))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}
