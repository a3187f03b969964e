//! Winbot Channels — chat transports that deliver windows.
//!
//! This crate provides:
//! - **console**: `ConsoleTransport`, which renders outgoing messages as JSON
//!   instead of talking to a network (previews, dry runs, tests)
//!
//! Network transports are feature-gated modules.

pub mod console;

#[cfg(feature = "telegram")]
pub mod telegram;

pub use console::ConsoleTransport;

#[cfg(feature = "telegram")]
pub use telegram::TelegramTransport;
