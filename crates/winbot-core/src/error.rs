//! Error types shared across the window engine.
//!
//! Formatting misses never show up here: the template formatter absorbs them
//! and hands back the input unchanged. Everything in `WindowError` is a
//! structural problem the caller has to see.

use thiserror::Error;

use crate::button::ButtonKind;
use crate::media::MediaKind;

/// Errors surfaced by window construction, mutation and sending.
#[derive(Debug, Error)]
pub enum WindowError {
    /// A media send had neither an explicit path nor a template default.
    #[error("{kind} can't be empty: no path given and the window declares none")]
    MissingRequiredField { kind: MediaKind },

    /// A text send with neither explicit text nor template text.
    #[error("text can't be empty: no text given and the window declares none")]
    MissingText,

    /// The target lacks the id this operation needs.
    #[error("target has no {0}")]
    MissingTarget(&'static str),

    /// A button list mixes kinds that cannot share one keyboard.
    #[error("button #{index} is {found}, but the keyboard was classified as {expected}")]
    UnclassifiableButtonList {
        index: usize,
        expected: ButtonKind,
        found: ButtonKind,
    },

    /// A layout policy with no sizes or a zero size.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// The markup cannot be used for the requested operation.
    #[error("unsupported markup: {0}")]
    UnsupportedMarkup(&'static str),

    /// Catalog lookup miss.
    #[error("unknown window '{0}'")]
    UnknownWindow(String),

    #[error("invalid window config: {0}")]
    Config(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors reported by a `Transport` implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The remote side rejected a file identifier (deleted or never valid).
    #[error("remote rejected file identifier '{0}'")]
    InvalidFileId(String),

    /// The transport cannot perform this operation.
    #[error("{0} is not supported by this transport")]
    Unsupported(&'static str),

    /// Any other API failure.
    #[error("chat API error: {0}")]
    Api(String),
}
