//! Configuration schema — the window catalog file.
//!
//! Hierarchy: `Config` → `Defaults`, `Vec<WindowSpec>`, `TelegramConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::button::Button;
use crate::error::WindowError;
use crate::keyboard::ReplyOptions;
use crate::layout::{Exhaustion, LayoutPolicy};
use crate::window::{Catalog, WindowTemplate};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.winbot/windows.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub defaults: Defaults,
    pub windows: Vec<WindowSpec>,
    pub telegram: TelegramConfig,
}

impl Config {
    /// Build a `Catalog` from the declared windows.
    ///
    /// Windows without their own layout or reply options get the defaults.
    /// Duplicate names are rejected.
    pub fn catalog(&self) -> Result<Catalog, WindowError> {
        let default_layout = self.defaults.layout()?;
        let mut seen = HashSet::new();
        let mut catalog = Catalog::new();

        for spec in &self.windows {
            if spec.name.is_empty() {
                return Err(WindowError::Config("window without a name".into()));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(WindowError::Config(format!(
                    "duplicate window name '{}'",
                    spec.name
                )));
            }
            catalog.register(spec.to_template(&default_layout, &self.defaults.reply_options));
        }

        Ok(catalog)
    }
}

// ─────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────

/// Layout applied to windows that don't declare one.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Defaults {
    pub row_sizes: Vec<usize>,
    pub repeat: bool,
    pub exhaustion: Exhaustion,
    pub reply_options: ReplyOptions,
}

impl Defaults {
    pub fn layout(&self) -> Result<LayoutPolicy, WindowError> {
        Ok(LayoutPolicy::new(self.row_sizes.clone(), self.repeat)?
            .with_exhaustion(self.exhaustion))
    }
}

impl Default for Defaults {
    fn default() -> Self {
        let layout = LayoutPolicy::default();
        Self {
            row_sizes: layout.row_sizes().to_vec(),
            repeat: layout.repeat(),
            exhaustion: layout.exhaustion(),
            reply_options: ReplyOptions::default(),
        }
    }
}

// ─────────────────────────────────────────────
// Windows
// ─────────────────────────────────────────────

/// One window as declared in the catalog.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WindowSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    pub buttons: Vec<Button>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_options: Option<ReplyOptions>,
    pub show_alert: bool,
}

impl WindowSpec {
    fn to_template(&self, layout: &LayoutPolicy, reply_options: &ReplyOptions) -> WindowTemplate {
        WindowTemplate {
            name: self.name.clone(),
            text: self.text.clone(),
            photo: self.photo.clone(),
            file: self.file.clone(),
            video: self.video.clone(),
            buttons: self.buttons.clone(),
            layout: self.layout.clone().unwrap_or_else(|| layout.clone()),
            reply_options: self
                .reply_options
                .clone()
                .unwrap_or_else(|| reply_options.clone()),
            show_alert: self.show_alert,
        }
    }
}

impl From<&WindowTemplate> for WindowSpec {
    fn from(t: &WindowTemplate) -> Self {
        Self {
            name: t.name.clone(),
            text: t.text.clone(),
            photo: t.photo.clone(),
            file: t.file.clone(),
            video: t.video.clone(),
            buttons: t.buttons.clone(),
            layout: Some(t.layout.clone()),
            reply_options: Some(t.reply_options.clone()),
            show_alert: t.show_alert,
        }
    }
}

// ─────────────────────────────────────────────
// Telegram
// ─────────────────────────────────────────────

/// Telegram channel config.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub token: String,
    /// Chat used by `winbot send` when `--chat` is omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_chat_id: Option<String>,
}

impl TelegramConfig {
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty()
    }
}
