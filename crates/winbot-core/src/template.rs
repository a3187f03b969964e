//! Template formatter — `{placeholder}` substitution for button labels,
//! payloads and window text.
//!
//! Syntax:
//! - `{name}` is replaced by `context["name"]`
//! - `{{` and `}}` are literal braces
//! - a `:spec` or `!conv` suffix inside a placeholder is accepted and ignored
//!
//! Substitution is all-or-nothing: when a button references anything the
//! context can't resolve, the button comes back exactly as it went in.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::button::Button;

/// Runtime values for placeholder substitution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: HashMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for TemplateContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = TemplateContext::new();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}

impl From<HashMap<String, String>> for TemplateContext {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

/// Why a template could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("placeholder '{0}' is not in the context")]
    MissingKey(String),

    #[error("malformed template: {0}")]
    Malformed(String),
}

/// Render `template` strictly against `context`.
pub fn render(template: &str, context: &TemplateContext) -> Result<String, TemplateError> {
    // Fast path: nothing to substitute or unescape.
    if !template.contains(['{', '}']) {
        return Ok(template.to_string());
    }

    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let mut field = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    match c {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => {
                            return Err(TemplateError::Malformed(format!(
                                "nested '{{' in placeholder of {template:?}"
                            )))
                        }
                        _ => field.push(c),
                    }
                }
                if !closed {
                    return Err(TemplateError::Malformed(format!(
                        "unclosed placeholder in {template:?}"
                    )));
                }

                let name = field
                    .split([':', '!'])
                    .next()
                    .unwrap_or_default()
                    .trim();
                if name.is_empty() {
                    return Err(TemplateError::Malformed(format!(
                        "empty placeholder in {template:?}"
                    )));
                }

                match context.get(name) {
                    Some(value) => out.push_str(value),
                    None => return Err(TemplateError::MissingKey(name.to_string())),
                }
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(TemplateError::Malformed(format!(
                        "single '}}' in {template:?}"
                    )));
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// Render `template`, returning it unchanged if anything is unresolved.
pub fn render_lenient(template: &str, context: &TemplateContext) -> String {
    match render(template, context) {
        Ok(rendered) => rendered,
        Err(e) => {
            debug!(error = %e, "template left unformatted");
            template.to_string()
        }
    }
}

/// Substitute placeholders in a button's text (and payload, for inline
/// buttons). Any failure returns the original button unchanged.
pub fn format_button(button: &Button, context: &TemplateContext) -> Button {
    let formatted = match button {
        Button::InlineAction { text, payload } => render(text, context).and_then(|text| {
            render(payload, context).map(|payload| Button::InlineAction { text, payload })
        }),
        Button::ReplyKey { text } => {
            render(text, context).map(|text| Button::ReplyKey { text })
        }
        Button::RemoveKeyboard | Button::ForceReply => return button.clone(),
    };

    match formatted {
        Ok(b) => b,
        Err(e) => {
            debug!(error = %e, kind = %button.kind(), "button left unformatted");
            button.clone()
        }
    }
}
