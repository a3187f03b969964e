//! Winbot Core — declarative chat windows and their keyboards.
//!
//! This crate provides:
//! - **button**: the `Button` model (inline, reply, remove-keyboard, force-reply)
//! - **template**: tolerant `{placeholder}` substitution
//! - **layout**: row-size policies that turn a flat button list into rows
//! - **keyboard**: the assembler producing a `Markup`
//! - **window**: window descriptors (`WindowTemplate`) and instances (`Window`)
//! - **media**: the remote file identifier cache and local file loader
//! - **send**: the `Transport` seam and the `Sender` that drives it
//! - **config**: the JSON window catalog

pub mod button;
pub mod config;
pub mod error;
pub mod keyboard;
pub mod layout;
pub mod media;
pub mod send;
pub mod template;
pub mod utils;
pub mod window;

pub use button::{Button, ButtonKind};
pub use error::{TransportError, WindowError};
pub use keyboard::{assemble, Directive, Grid, GridKind, KeyboardState, Markup, ReplyOptions};
pub use layout::{Exhaustion, LayoutPolicy};
pub use media::{FileLoader, FsLoader, MediaCache, MediaKind, MediaSource};
pub use send::{Delivery, OutgoingMessage, Overrides, Sender, Target, Transport};
pub use template::{format_button, TemplateContext};
pub use window::{Catalog, MediaRefs, Window, WindowTemplate};
