//! Button model — one interactive element of a window keyboard.
//!
//! A keyboard is built from a homogeneous list: all inline actions, all reply
//! keys, or a single terminal directive. The first element decides which.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One declared button.
///
/// In the catalog file buttons are tagged by `kind`:
///
/// ```json
/// { "kind": "inline", "text": "Open {name}", "payload": "open:{id}" }
/// { "kind": "reply", "text": "Back" }
/// { "kind": "remove_keyboard" }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Button {
    /// Clickable inline button whose payload is round-tripped to the handler.
    #[serde(rename = "inline")]
    InlineAction {
        text: String,
        #[serde(alias = "callback_data", alias = "callbackData")]
        payload: String,
    },

    /// Key of the on-screen reply keyboard.
    #[serde(rename = "reply")]
    ReplyKey { text: String },

    /// Clear any existing reply keyboard.
    #[serde(rename = "remove_keyboard")]
    RemoveKeyboard,

    /// Put the client into reply-input mode.
    #[serde(rename = "force_reply")]
    ForceReply,
}

impl Button {
    pub fn inline(text: impl Into<String>, payload: impl Into<String>) -> Self {
        Button::InlineAction {
            text: text.into(),
            payload: payload.into(),
        }
    }

    pub fn reply(text: impl Into<String>) -> Self {
        Button::ReplyKey { text: text.into() }
    }

    pub fn remove_keyboard() -> Self {
        Button::RemoveKeyboard
    }

    pub fn force_reply() -> Self {
        Button::ForceReply
    }

    pub fn kind(&self) -> ButtonKind {
        match self {
            Button::InlineAction { .. } => ButtonKind::Inline,
            Button::ReplyKey { .. } => ButtonKind::Reply,
            Button::RemoveKeyboard => ButtonKind::RemoveKeyboard,
            Button::ForceReply => ButtonKind::ForceReply,
        }
    }

    /// Visible label, if the button has one.
    pub fn text(&self) -> Option<&str> {
        match self {
            Button::InlineAction { text, .. } | Button::ReplyKey { text } => Some(text),
            _ => None,
        }
    }

    /// Callback payload (inline buttons only).
    pub fn payload(&self) -> Option<&str> {
        match self {
            Button::InlineAction { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Whether this is a terminal directive rather than a grid key.
    pub fn is_directive(&self) -> bool {
        self.kind().is_directive()
    }
}

/// Classification of a button (and of the keyboard it starts).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
    Inline,
    Reply,
    RemoveKeyboard,
    ForceReply,
}

impl ButtonKind {
    pub fn is_directive(self) -> bool {
        matches!(self, ButtonKind::RemoveKeyboard | ButtonKind::ForceReply)
    }
}

impl fmt::Display for ButtonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ButtonKind::Inline => "inline",
            ButtonKind::Reply => "reply",
            ButtonKind::RemoveKeyboard => "remove_keyboard",
            ButtonKind::ForceReply => "force_reply",
        };
        f.write_str(name)
    }
}
