//! Shared CLI helpers — path expansion, `--ctx` parsing, headings.

use std::path::{Path, PathBuf};

use colored::Colorize;

use winbot_core::TemplateContext;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

pub fn expand_path(path: &Path) -> PathBuf {
    expand_tilde(&path.to_string_lossy())
}

/// Parse one `--ctx key=value` argument.
///
/// Only the first `=` splits; the value may contain more.
pub fn parse_ctx(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{arg}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{arg}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Collect parsed `--ctx` pairs into a template context. Later keys win.
pub fn to_context(pairs: Vec<(String, String)>) -> TemplateContext {
    pairs.into_iter().collect()
}

/// Print a section heading.
pub fn print_heading(title: &str) {
    println!();
    println!("{}", format!("🪟 {title}").cyan().bold());
    println!();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
