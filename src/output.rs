//! Step-by-step terminal transcript.
//!
//! Each handler prints an intro, one entry per completed or failed step, and
//! a closing line:
//!
//! ```text
//! ┌  Create Git Worktree
//! │
//! │  ◆  Prune  git worktree prune
//! │  └  removes stale refs
//! │
//! └  Done  cd ../demo-feature-x
//! ```

use colored::{Color, Colorize};

pub fn intro(title: &str) {
    println!("{}  {}", "┌".bright_black(), title.bold());
}

/// A completed step: symbol, name, command or detail, description.
pub fn step(name: &str, detail: &str, description: &str) {
    entry(Color::Green, name, detail, description);
}

/// A failed step; the surrounding operation may still continue.
pub fn step_failed(name: &str, detail: &str, description: &str) {
    entry(Color::Red, name, detail, description);
}

pub fn step_skipped(name: &str, detail: &str, description: &str) {
    entry(Color::Yellow, name, detail, description);
}

fn entry(color: Color, name: &str, detail: &str, description: &str) {
    println!("│");
    if detail.is_empty() {
        println!("│  {}  {}", "◆".color(color), name.color(color));
    } else {
        println!(
            "│  {}  {}  {}",
            "◆".color(color),
            name.color(color),
            detail.bright_black()
        );
    }
    if color == Color::Red {
        println!("│  {}  {}", "└".bright_black(), description.red());
    } else {
        println!("│  {}  {}", "└".bright_black(), description.bright_black());
    }
}

/// An informational line inside the transcript.
pub fn note(text: &str) {
    println!("│  {}", text);
}

/// Closing line of a successful operation.
pub fn done(summary: &str) {
    println!("│");
    println!("└  {}  {}", "Done".green(), summary);
    println!();
}

/// Closing line that is neither success nor failure (nothing to do, cancelled).
pub fn outro(text: &str) {
    println!("│");
    println!("└  {}", text.bright_black());
    println!();
}

/// Closing line of an aborted operation, on stderr.
pub fn cancel(text: &str) {
    eprintln!("└  {}", text.red());
    eprintln!();
}
