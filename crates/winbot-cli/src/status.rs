//! `winbot status` — show catalog and channel status.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use winbot_core::config::{get_config_path, load_config};

use crate::helpers::print_heading;

/// Run the status command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);
    let config = load_config(Some(&path))
        .with_context(|| format!("failed to load {}", path.display()))?;

    print_heading("Winbot Status");

    // Config
    println!(
        "  {:<18} {} {}",
        "Catalog:".bold(),
        path.display(),
        if path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    // Windows
    match config.catalog() {
        Ok(catalog) => println!("  {:<18} {}", "Windows:".bold(), catalog.len()),
        Err(e) => println!(
            "  {:<18} {}",
            "Windows:".bold(),
            format!("invalid ({e})").red()
        ),
    }

    // Default layout
    println!(
        "  {:<18} {}",
        "Default layout:".bold(),
        format!(
            "rows {:?} | repeat: {} | exhaustion: {:?}",
            config.defaults.row_sizes, config.defaults.repeat, config.defaults.exhaustion
        )
        .dimmed()
    );

    // Telegram
    println!();
    let token = &config.telegram.token;
    let telegram = if config.telegram.is_configured() {
        format!(
            "{} token: {}...",
            "✓".green(),
            token.chars().take(10).collect::<String>()
        )
    } else {
        format!("{}", "· not configured".dimmed())
    };
    println!("  {:<18} {}", "Telegram:".bold(), telegram);
    if let Some(chat) = &config.telegram.default_chat_id {
        println!("  {:<18} {}", "Default chat:".bold(), chat);
    }
    if !cfg!(feature = "telegram") {
        println!(
            "  {:<18} {}",
            "",
            "(built without the telegram feature)".dimmed()
        );
    }

    println!();

    Ok(())
}
