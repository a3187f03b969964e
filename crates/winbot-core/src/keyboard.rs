//! Keyboard assembler — turns a button list into a `Markup`.
//!
//! 1. empty list → `Markup::None`
//! 2. first button is a directive → that directive, the rest is dropped
//! 3. otherwise every button must share the first one's kind
//! 4. rows come from the `LayoutPolicy`

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::button::{Button, ButtonKind};
use crate::error::WindowError;
use crate::layout::LayoutPolicy;
use crate::template::{format_button, TemplateContext};

// ─────────────────────────────────────────────
// Markup
// ─────────────────────────────────────────────

/// Which keyboard a grid is rendered as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridKind {
    Inline,
    Reply,
}

/// Terminal keyboard instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    RemoveKeyboard,
    ForceReply,
}

/// Presentation flags for reply keyboards. Not used by inline grids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplyOptions {
    pub resize_keyboard: bool,
    pub one_time_keyboard: bool,
    pub is_persistent: bool,
    pub selective: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_field_placeholder: Option<String>,
}

impl Default for ReplyOptions {
    fn default() -> Self {
        Self {
            resize_keyboard: true,
            one_time_keyboard: false,
            is_persistent: false,
            selective: false,
            input_field_placeholder: None,
        }
    }
}

/// A grid of buttons laid out in rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub kind: GridKind,
    pub rows: Vec<Vec<Button>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ReplyOptions>,
}

impl Grid {
    /// Total number of buttons across all rows.
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }
}

/// The assembled keyboard of a window.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Markup {
    /// No buttons declared.
    #[default]
    None,
    Grid(Grid),
    Directive { directive: Directive },
}

impl Markup {
    pub fn is_none(&self) -> bool {
        matches!(self, Markup::None)
    }

    pub fn as_grid(&self) -> Option<&Grid> {
        match self {
            Markup::Grid(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn directive(&self) -> Option<Directive> {
        match self {
            Markup::Directive { directive } => Some(*directive),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────
// Assembly
// ─────────────────────────────────────────────

/// Classify `buttons` and build their markup.
///
/// `options` only ends up in the result for reply grids.
pub fn assemble(
    buttons: &[Button],
    policy: &LayoutPolicy,
    options: &ReplyOptions,
) -> Result<Markup, WindowError> {
    let Some(first) = buttons.first() else {
        return Ok(Markup::None);
    };

    let grid_kind = match first {
        Button::RemoveKeyboard | Button::ForceReply => {
            if buttons.len() > 1 {
                debug!(
                    directive = %first.kind(),
                    dropped = buttons.len() - 1,
                    "directive keyboard, trailing buttons dropped"
                );
            }
            let directive = match first {
                Button::RemoveKeyboard => Directive::RemoveKeyboard,
                _ => Directive::ForceReply,
            };
            return Ok(Markup::Directive { directive });
        }
        Button::InlineAction { .. } => GridKind::Inline,
        Button::ReplyKey { .. } => GridKind::Reply,
    };

    let expected = first.kind();
    if let Some((index, odd)) = buttons
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, b)| b.kind() != expected)
    {
        return Err(WindowError::UnclassifiableButtonList {
            index,
            expected,
            found: odd.kind(),
        });
    }

    let rows = policy.build_rows(buttons);
    let options = match grid_kind {
        GridKind::Reply => Some(options.clone()),
        GridKind::Inline => None,
    };

    Ok(Markup::Grid(Grid {
        kind: grid_kind,
        rows,
        options,
    }))
}

// ─────────────────────────────────────────────
// KeyboardState
// ─────────────────────────────────────────────

/// Mutable keyboard of one window instance.
///
/// `base` is what `extend(.., keep_declared = false)` appends to: the declared
/// buttons after construction, or the last `replace` set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyboardState {
    base: Vec<Button>,
    buttons: Vec<Button>,
    markup: Markup,
    layout: LayoutPolicy,
    options: ReplyOptions,
}

impl KeyboardState {
    /// Format `buttons` with `context` and assemble them.
    pub fn build(
        buttons: &[Button],
        layout: LayoutPolicy,
        options: ReplyOptions,
        context: &TemplateContext,
    ) -> Result<Self, WindowError> {
        let formatted = format_all(buttons, context);
        let markup = assemble(&formatted, &layout, &options)?;
        Ok(Self {
            base: formatted.clone(),
            buttons: formatted,
            markup,
            layout,
            options,
        })
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn markup(&self) -> &Markup {
        &self.markup
    }

    pub fn layout(&self) -> &LayoutPolicy {
        &self.layout
    }

    /// Drop the current buttons and assemble exactly `buttons`.
    pub fn replace(
        &mut self,
        buttons: &[Button],
        context: &TemplateContext,
    ) -> Result<(), WindowError> {
        let formatted = format_all(buttons, context);
        let markup = assemble(&formatted, &self.layout, &self.options)?;
        self.base = formatted.clone();
        self.buttons = formatted;
        self.markup = markup;
        Ok(())
    }

    /// Assemble `prefix` followed by `extra`. `base` is left alone.
    pub fn extend_from(
        &mut self,
        prefix: &[Button],
        extra: &[Button],
        context: &TemplateContext,
    ) -> Result<(), WindowError> {
        self.append(format_all(prefix, context), extra, context)
    }

    /// Append `extra` to the current base. The base was formatted when it
    /// was installed and is kept as is.
    pub fn extend_base(
        &mut self,
        extra: &[Button],
        context: &TemplateContext,
    ) -> Result<(), WindowError> {
        self.append(self.base.clone(), extra, context)
    }

    /// Format `extra`, put it after the already formatted `prefix` and
    /// assemble.
    fn append(
        &mut self,
        mut prefix: Vec<Button>,
        extra: &[Button],
        context: &TemplateContext,
    ) -> Result<(), WindowError> {
        prefix.extend(format_all(extra, context));
        let markup = assemble(&prefix, &self.layout, &self.options)?;
        self.buttons = prefix;
        self.markup = markup;
        Ok(())
    }
}

fn format_all(buttons: &[Button], context: &TemplateContext) -> Vec<Button> {
    buttons.iter().map(|b| format_button(b, context)).collect()
}
