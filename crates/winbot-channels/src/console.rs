//! Console transport — prints what would be sent.
//!
//! Every call is rendered as a JSON record. Records are kept in memory and,
//! unless the transport is quiet, printed to stdout one per line.
//!
//! Uploads get a synthetic file id (`console-file-<n>`) so the media cache
//! behaves the same way it would against a real backend.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use winbot_core::send::OutgoingMedia;
use winbot_core::{Delivery, Markup, MediaSource, OutgoingMessage, Target, Transport, TransportError};

/// Transport that renders messages instead of delivering them.
#[derive(Debug, Default)]
pub struct ConsoleTransport {
    quiet: bool,
    next_message: AtomicU64,
    next_file: AtomicU64,
    records: Mutex<Vec<Value>>,
}

impl ConsoleTransport {
    /// A transport that prints every record to stdout.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that only keeps records in memory.
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::default()
        }
    }

    /// Everything rendered so far, oldest first.
    pub fn records(&self) -> Vec<Value> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn emit(&self, record: Value) {
        if !self.quiet {
            println!("{record}");
        }
        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
    }

    fn message_id(&self) -> String {
        (self.next_message.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }
}

/// JSON shape of a target.
fn target_json(target: &Target) -> Value {
    json!({
        "chatId": target.chat_id,
        "messageId": target.message_id,
        "callbackId": target.callback_id,
    })
}

fn markup_json(markup: &Markup) -> Value {
    serde_json::to_value(markup).unwrap_or(Value::Null)
}

#[async_trait]
impl Transport for ConsoleTransport {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, msg: &OutgoingMessage) -> Result<Delivery, TransportError> {
        let message_id = self.message_id();

        let (media, file_id) = match &msg.media {
            None => (Value::Null, None),
            Some(OutgoingMedia { kind, source }) => match source {
                MediaSource::Bytes { data, filename } => {
                    let n = self.next_file.fetch_add(1, Ordering::SeqCst) + 1;
                    let file_id = format!("console-file-{n}");
                    let media = json!({
                        "kind": kind.to_string(),
                        "upload": { "filename": filename, "bytes": data.len() },
                        "fileId": file_id,
                    });
                    (media, Some(file_id))
                }
                MediaSource::Remote(id) => {
                    let media = json!({ "kind": kind.to_string(), "remote": id });
                    (media, Some(id.clone()))
                }
            },
        };

        self.emit(json!({
            "op": "send",
            "messageId": message_id,
            "target": target_json(&msg.target),
            "text": msg.text,
            "markup": markup_json(&msg.markup),
            "media": media,
        }));
        debug!(chat = %msg.target.chat_id, message_id = %message_id, "console send");

        Ok(Delivery {
            message_id: Some(message_id),
            file_id,
        })
    }

    async fn edit_text(
        &self,
        target: &Target,
        text: &str,
        markup: &Markup,
    ) -> Result<Delivery, TransportError> {
        self.emit(json!({
            "op": "edit_text",
            "target": target_json(target),
            "text": text,
            "markup": markup_json(markup),
        }));
        Ok(Delivery {
            message_id: target.message_id.clone(),
            file_id: None,
        })
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), TransportError> {
        self.emit(json!({
            "op": "answer_callback",
            "callbackId": callback_id,
            "text": text,
            "showAlert": show_alert,
        }));
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
