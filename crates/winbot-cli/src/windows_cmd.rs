//! `winbot list|render|preview|send` — work with the window catalog.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use tracing::{debug, info};

use winbot_channels::ConsoleTransport;
use winbot_core::config::{load_config, Config};
use winbot_core::{
    Catalog, Delivery, FsLoader, MediaCache, Overrides, Sender, Target, TemplateContext,
    Transport, Window,
};

use crate::helpers::{print_heading, to_context};

/// Load the config and build its catalog.
fn load_catalog(config_path: Option<&Path>) -> Result<(Config, Catalog)> {
    let config = load_config(config_path).context("failed to load window catalog")?;
    let catalog = config.catalog().context("invalid window catalog")?;
    debug!(windows = catalog.len(), "window catalog loaded");
    Ok((config, catalog))
}

/// Instantiate one window from the catalog.
fn open_window(catalog: &Catalog, name: &str, ctx: &TemplateContext) -> Result<Window> {
    let template = catalog.get(name)?;
    let window = Window::new(template, ctx)
        .with_context(|| format!("failed to assemble window '{name}'"))?;
    Ok(window)
}

/// Send a window the way it's declared: with its primary media, or as text.
async fn dispatch(
    transport: Arc<dyn Transport>,
    window: &Window,
    target: &Target,
    ctx: TemplateContext,
) -> Result<Delivery> {
    let sender = Sender::new(transport, Arc::new(FsLoader), Arc::new(MediaCache::new()));
    let overrides = Overrides::new().context(ctx);

    let delivery = match window.template().primary_media() {
        Some(kind) => {
            sender
                .answer_media(window, kind, target, None, &overrides)
                .await?
        }
        None => sender.answer(window, target, &overrides).await?,
    };
    Ok(delivery)
}

// ─────────────────────────────────────────────
// list
// ─────────────────────────────────────────────

/// `winbot list`
pub fn list(config_path: Option<&Path>) -> Result<()> {
    let (_, catalog) = load_catalog(config_path)?;

    print_heading("Windows");

    if catalog.is_empty() {
        println!("  {}", "(no windows declared)".dimmed());
        println!();
        return Ok(());
    }

    for name in catalog.names() {
        let template = catalog.get(&name)?;
        let media = template
            .primary_media()
            .map(|kind| format!("[{kind}]"))
            .unwrap_or_default();
        println!(
            "  {:<20} {:>3} buttons  {}",
            name.bold(),
            template.buttons.len(),
            media.dimmed()
        );
    }
    println!();

    Ok(())
}

// ─────────────────────────────────────────────
// render
// ─────────────────────────────────────────────

/// `winbot render <NAME>`
pub fn render(config_path: Option<&Path>, name: &str, ctx: Vec<(String, String)>) -> Result<()> {
    let (_, catalog) = load_catalog(config_path)?;
    let ctx = to_context(ctx);
    let window = open_window(&catalog, name, &ctx)?;

    let rendered = json!({
        "name": window.name(),
        "text": window.render_text(&ctx),
        "markup": window.markup(),
    });
    println!("{}", serde_json::to_string_pretty(&rendered)?);

    Ok(())
}

// ─────────────────────────────────────────────
// preview
// ─────────────────────────────────────────────

/// `winbot preview <NAME>`
pub async fn preview(
    config_path: Option<&Path>,
    name: &str,
    ctx: Vec<(String, String)>,
    chat: &str,
) -> Result<()> {
    let (_, catalog) = load_catalog(config_path)?;
    let ctx = to_context(ctx);
    let window = open_window(&catalog, name, &ctx)?;

    let transport: Arc<dyn Transport> = Arc::new(ConsoleTransport::new());
    let delivery = dispatch(transport, &window, &Target::chat(chat), ctx).await?;
    info!(
        window = name,
        message_id = delivery.message_id.as_deref().unwrap_or("-"),
        "window previewed"
    );

    Ok(())
}

// ─────────────────────────────────────────────
// send
// ─────────────────────────────────────────────

/// `winbot send <NAME> --chat ID`
#[cfg(feature = "telegram")]
pub async fn send(
    config_path: Option<&Path>,
    name: &str,
    ctx: Vec<(String, String)>,
    chat: Option<String>,
) -> Result<()> {
    use winbot_channels::TelegramTransport;

    let (config, catalog) = load_catalog(config_path)?;
    let transport: Arc<dyn Transport> = Arc::new(TelegramTransport::from_config(&config.telegram)?);
    let chat = chat
        .or_else(|| config.telegram.default_chat_id.clone())
        .context("no chat id given and telegram.defaultChatId is not set")?;

    let ctx = to_context(ctx);
    let window = open_window(&catalog, name, &ctx)?;

    let delivery = dispatch(transport, &window, &Target::chat(chat.clone()), ctx).await?;

    info!(window = name, chat = %chat, "window sent to telegram");
    println!(
        "{} sent '{}' to chat {} (message {})",
        "✓".green(),
        name,
        chat,
        delivery.message_id.as_deref().unwrap_or("?")
    );

    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
