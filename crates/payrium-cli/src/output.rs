//! Output formatting for human-readable and JSON modes.
//!
//! Human mode uses colored terminal output.
//! JSON mode outputs pure JSON with no ANSI escapes.

use colored::Colorize;

/// Prints a success message.
pub fn print_success(msg: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ "status": "ok", "message": msg });
        println!("{}", obj);
    } else {
        println!("{} {}", "✓".green().bold(), msg);
    }
}

/// Prints a single key-value pair (human mode only).
pub fn print_kv(key: &str, value: &str) {
    println!("{}: {}", key.bold(), value);
}

/// Prints a JSON value directly (already constructed).
pub fn print_json_value(value: &serde_json::Value) {
    println!("{value}");
}

/// Prints a warning to stderr (human mode only).
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

/// Prints an error message.
pub fn print_error(msg: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ "error": msg });
        eprintln!("{}", obj);
    } else {
        eprintln!("{} {}", "error:".red().bold(), msg);
    }
}

/// Prints recovery words as a numbered grid, three per row.
pub fn print_mnemonic(words: &[&str]) {
    println!();
    for (row, chunk) in words.chunks(3).enumerate() {
        let line: Vec<String> = chunk
            .iter()
            .enumerate()
            .map(|(col, word)| {
                let n = row * 3 + col + 1;
                // Pad before colouring; escape codes would skew the widths.
                format!(
                    "{} {}",
                    format!("{n:>2}.").dimmed(),
                    format!("{word:<10}").yellow().bold()
                )
            })
            .collect();
        println!("  {}", line.join("  "));
    }
    println!();
}
