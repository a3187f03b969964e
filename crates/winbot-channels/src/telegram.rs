//! Telegram transport — delivers windows via `teloxide`.
//!
//! Markup mapping:
//! - inline grid → `InlineKeyboardMarkup` (callback buttons)
//! - reply grid → `KeyboardMarkup` with the window's `ReplyOptions`
//! - remove / force-reply directives → `KeyboardRemove` / `ForceReply`
//!
//! Media sources map to `InputFile`: bytes are uploaded, `http(s)` strings
//! become URLs, anything else is sent as an existing file id.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQueryId, FileId, ForceReply, InlineKeyboardButton, InlineKeyboardMarkup, InputFile,
    KeyboardButton, KeyboardMarkup, KeyboardRemove, MessageId, ReplyMarkup,
};
use teloxide::RequestError;
use tracing::{debug, warn};

use winbot_core::config::schema::TelegramConfig;
use winbot_core::keyboard::{Directive, Grid, GridKind};
use winbot_core::send::OutgoingMedia;
use winbot_core::{
    Button, Delivery, Markup, MediaKind, MediaSource, OutgoingMessage, Target, Transport,
    TransportError,
};

// ─────────────────────────────────────────────
// Markup conversion
// ─────────────────────────────────────────────

/// Convert an assembled `Markup` to Telegram's reply markup.
///
/// `Markup::None` maps to `None` (the message carries no keyboard).
pub fn to_reply_markup(markup: &Markup) -> Option<ReplyMarkup> {
    match markup {
        Markup::None => None,
        Markup::Grid(grid) => match grid.kind {
            GridKind::Inline => Some(ReplyMarkup::InlineKeyboard(to_inline_keyboard(grid))),
            GridKind::Reply => Some(ReplyMarkup::Keyboard(to_reply_keyboard(grid))),
        },
        Markup::Directive { directive } => Some(match directive {
            Directive::RemoveKeyboard => ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
            Directive::ForceReply => ReplyMarkup::ForceReply(ForceReply::new()),
        }),
    }
}

/// Inline keyboard for a grid. Non-inline buttons are skipped.
pub fn to_inline_keyboard(grid: &Grid) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = grid
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|button| match button {
                    Button::InlineAction { text, payload } => {
                        Some(InlineKeyboardButton::callback(text.clone(), payload.clone()))
                    }
                    _ => None,
                })
                .collect()
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

fn to_reply_keyboard(grid: &Grid) -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = grid
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|button| match button {
                    Button::ReplyKey { text } => Some(KeyboardButton::new(text.clone())),
                    _ => None,
                })
                .collect()
        })
        .collect();

    let mut keyboard = KeyboardMarkup::new(rows);
    let Some(options) = &grid.options else {
        return keyboard;
    };
    if options.resize_keyboard {
        keyboard = keyboard.resize_keyboard();
    }
    if options.one_time_keyboard {
        keyboard = keyboard.one_time_keyboard();
    }
    if options.is_persistent {
        keyboard = keyboard.persistent();
    }
    if options.selective {
        keyboard = keyboard.selective();
    }
    if let Some(placeholder) = &options.input_field_placeholder {
        keyboard = keyboard.input_field_placeholder(placeholder.clone());
    }
    keyboard
}

/// Turn a media source into an `InputFile`.
fn to_input_file(source: &MediaSource) -> InputFile {
    match source {
        MediaSource::Bytes { data, filename } => {
            InputFile::memory(data.clone()).file_name(filename.clone())
        }
        MediaSource::Remote(reference) => {
            if reference.starts_with("http://") || reference.starts_with("https://") {
                if let Ok(url) = url::Url::parse(reference) {
                    return InputFile::url(url);
                }
            }
            InputFile::file_id(FileId(reference.clone()))
        }
    }
}

// ─────────────────────────────────────────────
// Error mapping
// ─────────────────────────────────────────────

/// Telegram's wording for a file id it doesn't know.
const WRONG_FILE_ID: &str = "wrong file identifier";

fn map_request_error(err: RequestError, source: Option<&MediaSource>) -> TransportError {
    let message = err.to_string();
    if message.to_lowercase().contains(WRONG_FILE_ID) {
        if let Some(MediaSource::Remote(id)) = source {
            return TransportError::InvalidFileId(id.clone());
        }
    }
    TransportError::Api(message)
}

fn parse_chat_id(chat_id: &str) -> Result<ChatId, TransportError> {
    chat_id
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| TransportError::Api(format!("invalid telegram chat_id: {chat_id}")))
}

fn parse_message_id(message_id: &str) -> Result<MessageId, TransportError> {
    message_id
        .parse::<i32>()
        .map(MessageId)
        .map_err(|_| TransportError::Api(format!("invalid telegram message_id: {message_id}")))
}

/// File id of the attachment Telegram stored for `kind`.
///
/// Photos come in several sizes; the largest is last.
fn delivered_file_id(msg: &Message, kind: MediaKind) -> Option<String> {
    match kind {
        MediaKind::Photo => msg.photo().and_then(|sizes| sizes.last()).map(|p| p.file.id.0.clone()),
        MediaKind::Document => msg.document().map(|d| d.file.id.0.clone()),
        MediaKind::Video => msg.video().map(|v| v.file.id.0.clone()),
    }
}

// ─────────────────────────────────────────────
// TelegramTransport
// ─────────────────────────────────────────────

/// Telegram Bot API transport.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Create a transport for the bot with the given token.
    pub fn new(token: &str) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }

    /// Create a transport from the catalog's `telegram` section.
    pub fn from_config(config: &TelegramConfig) -> anyhow::Result<Self> {
        if !config.is_configured() {
            anyhow::bail!(
                "telegram token is not configured (set telegram.token or WINBOT_TELEGRAM__TOKEN)"
            );
        }
        Ok(Self::new(&config.token))
    }

    /// Wrap an existing `Bot` (shares its HTTP client).
    pub fn from_bot(bot: Bot) -> Self {
        Self { bot }
    }

    async fn send_media(
        &self,
        chat: ChatId,
        msg: &OutgoingMessage,
        media: &OutgoingMedia,
    ) -> Result<Message, RequestError> {
        let file = to_input_file(&media.source);
        let reply_markup = to_reply_markup(&msg.markup);

        match media.kind {
            MediaKind::Photo => {
                let mut req = self.bot.send_photo(chat, file);
                req.caption = msg.text.clone();
                req.reply_markup = reply_markup;
                req.await
            }
            MediaKind::Document => {
                let mut req = self.bot.send_document(chat, file);
                req.caption = msg.text.clone();
                req.reply_markup = reply_markup;
                req.await
            }
            MediaKind::Video => {
                let mut req = self.bot.send_video(chat, file);
                req.caption = msg.text.clone();
                req.reply_markup = reply_markup;
                req.await
            }
        }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, msg: &OutgoingMessage) -> Result<Delivery, TransportError> {
        let chat = parse_chat_id(&msg.target.chat_id)?;

        let Some(media) = &msg.media else {
            let text = msg.text.clone().unwrap_or_default();
            let mut req = self.bot.send_message(chat, text);
            req.reply_markup = to_reply_markup(&msg.markup);
            let sent = req.await.map_err(|e| map_request_error(e, None))?;
            debug!(chat_id = chat.0, message_id = sent.id.0, "telegram message sent");
            return Ok(Delivery {
                message_id: Some(sent.id.0.to_string()),
                file_id: None,
            });
        };

        let sent = match self.send_media(chat, msg, media).await {
            Ok(sent) => sent,
            Err(e) => {
                let err = map_request_error(e, Some(&media.source));
                warn!(chat_id = chat.0, kind = %media.kind, error = %err, "telegram media send failed");
                return Err(err);
            }
        };

        let file_id = delivered_file_id(&sent, media.kind);
        debug!(
            chat_id = chat.0,
            message_id = sent.id.0,
            kind = %media.kind,
            "telegram media sent"
        );
        Ok(Delivery {
            message_id: Some(sent.id.0.to_string()),
            file_id,
        })
    }

    async fn edit_text(
        &self,
        target: &Target,
        text: &str,
        markup: &Markup,
    ) -> Result<Delivery, TransportError> {
        let chat = parse_chat_id(&target.chat_id)?;
        let message_id = target
            .message_id
            .as_deref()
            .ok_or(TransportError::Unsupported("edit without a message id"))?;
        let message = parse_message_id(message_id)?;

        let mut req = self.bot.edit_message_text(chat, message, text);
        match markup {
            Markup::None => {}
            Markup::Grid(grid) if grid.kind == GridKind::Inline => {
                req.reply_markup = Some(to_inline_keyboard(grid));
            }
            _ => return Err(TransportError::Unsupported("non-inline keyboard on edit")),
        }

        let edited = req.await.map_err(|e| map_request_error(e, None))?;
        Ok(Delivery {
            message_id: Some(edited.id.0.to_string()),
            file_id: None,
        })
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), TransportError> {
        let mut req = self
            .bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()));
        req.text = text.map(str::to_string);
        req.show_alert = Some(show_alert);
        req.await.map_err(|e| map_request_error(e, None))?;
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
