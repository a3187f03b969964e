//! Window descriptors — what a kind of window looks like before it is
//! instantiated.
//!
//! A template is declared once (with the builder, or as data in the catalog
//! file) and shared behind an `Arc`. Buttons keep their declaration order.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::button::Button;
use crate::error::WindowError;
use crate::keyboard::ReplyOptions;
use crate::layout::{Exhaustion, LayoutPolicy};
use crate::media::MediaKind;

/// Declarative description of one window kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowTemplate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default)]
    pub buttons: Vec<Button>,
    #[serde(default)]
    pub layout: LayoutPolicy,
    #[serde(default)]
    pub reply_options: ReplyOptions,
    /// Answer callback queries as an alert popup instead of a message.
    #[serde(default)]
    pub show_alert: bool,
}

impl WindowTemplate {
    pub fn builder(name: impl Into<String>) -> WindowTemplateBuilder {
        WindowTemplateBuilder::new(name)
    }

    /// Default media path declared for `kind`.
    pub fn media_path(&self, kind: MediaKind) -> Option<&str> {
        match kind {
            MediaKind::Photo => self.photo.as_deref(),
            MediaKind::Document => self.file.as_deref(),
            MediaKind::Video => self.video.as_deref(),
        }
    }

    /// First declared media kind, in photo → video → document order.
    pub fn primary_media(&self) -> Option<MediaKind> {
        [MediaKind::Photo, MediaKind::Video, MediaKind::Document]
            .into_iter()
            .find(|&k| self.media_path(k).is_some())
    }
}

// ─────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────

/// Builder for `WindowTemplate`.
///
/// ```
/// use winbot_core::{Button, WindowTemplate};
///
/// let tpl = WindowTemplate::builder("greeting")
///     .text("Hello {username}")
///     .button(Button::inline("Say hi to {username}", "hi:{id}"))
///     .button(Button::inline("Settings", "settings"))
///     .row_sizes([2])
///     .build()
///     .unwrap();
/// assert_eq!(tpl.buttons.len(), 2);
/// ```
#[derive(Debug)]
pub struct WindowTemplateBuilder {
    name: String,
    text: Option<String>,
    photo: Option<String>,
    file: Option<String>,
    video: Option<String>,
    buttons: Vec<Button>,
    row_sizes: Vec<usize>,
    repeat: bool,
    exhaustion: Exhaustion,
    reply_options: ReplyOptions,
    show_alert: bool,
}

impl WindowTemplateBuilder {
    fn new(name: impl Into<String>) -> Self {
        let layout = LayoutPolicy::default();
        Self {
            name: name.into(),
            text: None,
            photo: None,
            file: None,
            video: None,
            buttons: Vec::new(),
            row_sizes: layout.row_sizes().to_vec(),
            repeat: layout.repeat(),
            exhaustion: layout.exhaustion(),
            reply_options: ReplyOptions::default(),
            show_alert: false,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn photo(mut self, path: impl Into<String>) -> Self {
        self.photo = Some(path.into());
        self
    }

    pub fn file(mut self, path: impl Into<String>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn video(mut self, path: impl Into<String>) -> Self {
        self.video = Some(path.into());
        self
    }

    /// Append one button (declaration order is keyboard order).
    pub fn button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }

    pub fn buttons(mut self, buttons: impl IntoIterator<Item = Button>) -> Self {
        self.buttons.extend(buttons);
        self
    }

    /// Row sizes. Setting them switches `repeat` off unless `repeat` is
    /// called afterwards.
    pub fn row_sizes(mut self, sizes: impl Into<Vec<usize>>) -> Self {
        self.row_sizes = sizes.into();
        self.repeat = false;
        self
    }

    pub fn repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn exhaustion(mut self, exhaustion: Exhaustion) -> Self {
        self.exhaustion = exhaustion;
        self
    }

    pub fn reply_options(mut self, options: ReplyOptions) -> Self {
        self.reply_options = options;
        self
    }

    pub fn show_alert(mut self, show_alert: bool) -> Self {
        self.show_alert = show_alert;
        self
    }

    /// Validate the layout and produce the template.
    pub fn build(self) -> Result<WindowTemplate, WindowError> {
        let layout =
            LayoutPolicy::new(self.row_sizes, self.repeat)?.with_exhaustion(self.exhaustion);
        Ok(WindowTemplate {
            name: self.name,
            text: self.text,
            photo: self.photo,
            file: self.file,
            video: self.video,
            buttons: self.buttons,
            layout,
            reply_options: self.reply_options,
            show_alert: self.show_alert,
        })
    }
}

// ─────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────

/// Named collection of templates.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    templates: HashMap<String, Arc<WindowTemplate>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template. Overwrites any previous template with the same name.
    pub fn register(&mut self, template: WindowTemplate) -> Arc<WindowTemplate> {
        let template = Arc::new(template);
        self.templates
            .insert(template.name.clone(), Arc::clone(&template));
        template
    }

    pub fn get(&self, name: &str) -> Result<Arc<WindowTemplate>, WindowError> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| WindowError::UnknownWindow(name.to_string()))
    }

    /// Template names, sorted for determinism.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.templates.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
