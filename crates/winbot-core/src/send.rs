//! Sending windows — the `Transport` seam and the `Sender` that drives it.
//!
//! The `Sender` owns no network code. It resolves text, markup and media for
//! a `Window`, consults the `MediaCache` before loading any bytes, and hands
//! an `OutgoingMessage` to whatever `Transport` it was built with.
//!
//! Media flow for one path:
//! 1. cached id → send by id (the loader is not called)
//! 2. the remote side rejects the id → evict it, fall through to upload
//! 3. take the per-path upload guard, re-check the cache, load, send
//! 4. store the identifier the transport reports

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{TransportError, WindowError};
use crate::keyboard::{GridKind, Markup};
use crate::media::{FileLoader, MediaCache, MediaKind, MediaSource};
use crate::template::TemplateContext;
use crate::window::Window;

// ─────────────────────────────────────────────
// Transport types
// ─────────────────────────────────────────────

/// Where a message goes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Target {
    /// Chat/conversation identifier.
    pub chat_id: String,
    /// Message to edit (for `edit_text`).
    pub message_id: Option<String>,
    /// Callback query to answer (for `alert`).
    pub callback_id: Option<String>,
}

impl Target {
    pub fn chat(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            ..Self::default()
        }
    }

    pub fn with_message(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn with_callback(mut self, callback_id: impl Into<String>) -> Self {
        self.callback_id = Some(callback_id.into());
        self
    }
}

/// Attachment of an outgoing message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMedia {
    pub kind: MediaKind,
    pub source: MediaSource,
}

/// Everything a transport needs to deliver one message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub target: Target,
    /// Message text, or the caption when `media` is set.
    pub text: Option<String>,
    pub markup: Markup,
    pub media: Option<OutgoingMedia>,
}

/// Confirmation returned by a transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Delivery {
    pub message_id: Option<String>,
    /// Identifier assigned to the attached file, if any.
    pub file_id: Option<String>,
}

/// A chat backend able to deliver windows.
///
/// Implementations only forward parameters; retries and rate limiting are
/// their own business.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Backend name for logging (e.g. "telegram").
    fn name(&self) -> &str;

    /// Send a new message, with or without an attachment.
    async fn send(&self, msg: &OutgoingMessage) -> Result<Delivery, TransportError>;

    /// Replace the text (and inline keyboard) of `target.message_id`.
    async fn edit_text(
        &self,
        target: &Target,
        text: &str,
        markup: &Markup,
    ) -> Result<Delivery, TransportError>;

    /// Answer a callback query, optionally as an alert popup.
    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), TransportError>;
}

// ─────────────────────────────────────────────
// Overrides
// ─────────────────────────────────────────────

/// Per-call values that win over the window's own.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    /// Explicit text/caption (used verbatim, not rendered).
    pub text: Option<String>,
    /// Explicit keyboard.
    pub markup: Option<Markup>,
    /// Context for rendering the window text.
    pub context: TemplateContext,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn markup(mut self, markup: Markup) -> Self {
        self.markup = Some(markup);
        self
    }

    pub fn context(mut self, context: TemplateContext) -> Self {
        self.context = context;
        self
    }

    fn resolve_text(&self, window: &Window) -> Option<String> {
        self.text
            .clone()
            .or_else(|| window.render_text(&self.context))
    }

    fn resolve_markup(&self, window: &Window) -> Markup {
        self.markup
            .clone()
            .unwrap_or_else(|| window.markup().clone())
    }
}

// ─────────────────────────────────────────────
// Sender
// ─────────────────────────────────────────────

/// Sends windows through a transport, reusing uploaded media.
#[derive(Clone)]
pub struct Sender {
    transport: Arc<dyn Transport>,
    loader: Arc<dyn FileLoader>,
    cache: Arc<MediaCache>,
}

impl Sender {
    pub fn new(
        transport: Arc<dyn Transport>,
        loader: Arc<dyn FileLoader>,
        cache: Arc<MediaCache>,
    ) -> Self {
        Self {
            transport,
            loader,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<MediaCache> {
        &self.cache
    }

    /// Send the window as a text message.
    ///
    /// Windows declared with `show_alert` answer the target's callback query
    /// instead, when there is one.
    pub async fn answer(
        &self,
        window: &Window,
        target: &Target,
        overrides: &Overrides,
    ) -> Result<Delivery, WindowError> {
        if window.show_alert() && target.callback_id.is_some() {
            self.alert(window, target, overrides).await?;
            return Ok(Delivery::default());
        }

        let text = overrides.resolve_text(window).ok_or(WindowError::MissingText)?;
        let msg = OutgoingMessage {
            target: target.clone(),
            text: Some(text),
            markup: overrides.resolve_markup(window),
            media: None,
        };

        let delivery = self.transport.send(&msg).await?;
        debug!(
            transport = self.transport.name(),
            window = window.name(),
            chat = %target.chat_id,
            "window sent"
        );
        Ok(delivery)
    }

    pub async fn answer_photo(
        &self,
        window: &Window,
        target: &Target,
        path: Option<&str>,
        overrides: &Overrides,
    ) -> Result<Delivery, WindowError> {
        self.answer_media(window, MediaKind::Photo, target, path, overrides)
            .await
    }

    pub async fn answer_document(
        &self,
        window: &Window,
        target: &Target,
        path: Option<&str>,
        overrides: &Overrides,
    ) -> Result<Delivery, WindowError> {
        self.answer_media(window, MediaKind::Document, target, path, overrides)
            .await
    }

    pub async fn answer_video(
        &self,
        window: &Window,
        target: &Target,
        path: Option<&str>,
        overrides: &Overrides,
    ) -> Result<Delivery, WindowError> {
        self.answer_media(window, MediaKind::Video, target, path, overrides)
            .await
    }

    /// Send the window with an attachment of `kind`.
    ///
    /// `path` overrides the window's default for that kind.
    pub async fn answer_media(
        &self,
        window: &Window,
        kind: MediaKind,
        target: &Target,
        path: Option<&str>,
        overrides: &Overrides,
    ) -> Result<Delivery, WindowError> {
        let path = path
            .or_else(|| window.media().get(kind))
            .ok_or(WindowError::MissingRequiredField { kind })?
            .to_string();

        let base = OutgoingMessage {
            target: target.clone(),
            text: overrides.resolve_text(window),
            markup: overrides.resolve_markup(window),
            media: None,
        };

        if let Some(remote_id) = self.cache.get(&path) {
            debug!(path = %path, remote_id = %remote_id, "media cache hit");
            match self.send_source(&base, kind, MediaSource::Remote(remote_id)).await {
                Ok(delivery) => return Ok(delivery),
                Err(TransportError::InvalidFileId(id)) => {
                    warn!(path = %path, remote_id = %id, "cached media id rejected, re-uploading");
                    self.cache.evict(&path);
                }
                Err(e) => return Err(e.into()),
            }
        }

        let _guard = self.cache.upload_guard(&path).await;

        // Another task may have uploaded while we waited for the guard.
        if let Some(remote_id) = self.cache.get(&path) {
            let delivery = self
                .send_source(&base, kind, MediaSource::Remote(remote_id))
                .await?;
            return Ok(delivery);
        }

        let source = self.loader.load(&path).await?;
        let uploaded = source.is_upload();
        let delivery = self.send_source(&base, kind, source).await?;

        if let Some(file_id) = &delivery.file_id {
            self.cache.put(path.clone(), file_id.clone());
        }
        info!(
            transport = self.transport.name(),
            kind = %kind,
            path = %path,
            uploaded,
            "media sent"
        );
        Ok(delivery)
    }

    async fn send_source(
        &self,
        base: &OutgoingMessage,
        kind: MediaKind,
        source: MediaSource,
    ) -> Result<Delivery, TransportError> {
        let mut msg = base.clone();
        msg.media = Some(OutgoingMedia { kind, source });
        self.transport.send(&msg).await
    }

    /// Edit a previously sent message in place.
    ///
    /// Only inline keyboards can be attached to an edit.
    pub async fn edit_text(
        &self,
        window: &Window,
        target: &Target,
        overrides: &Overrides,
    ) -> Result<Delivery, WindowError> {
        if target.message_id.is_none() {
            return Err(WindowError::MissingTarget("message id"));
        }

        let markup = overrides.resolve_markup(window);
        match &markup {
            Markup::None => {}
            Markup::Grid(grid) if grid.kind == GridKind::Inline => {}
            _ => {
                return Err(WindowError::UnsupportedMarkup(
                    "edits accept inline keyboards only",
                ))
            }
        }

        let text = overrides.resolve_text(window).ok_or(WindowError::MissingText)?;
        let delivery = self.transport.edit_text(target, &text, &markup).await?;
        Ok(delivery)
    }

    /// Answer the target's callback query with the window text.
    pub async fn alert(
        &self,
        window: &Window,
        target: &Target,
        overrides: &Overrides,
    ) -> Result<(), WindowError> {
        let callback_id = target
            .callback_id
            .as_deref()
            .ok_or(WindowError::MissingTarget("callback id"))?;
        let text = overrides.resolve_text(window);
        self.transport
            .answer_callback(callback_id, text.as_deref(), window.show_alert())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::Button;
    use crate::window::WindowTemplate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records every call; uploads get a fresh id, `stale` ids are rejected.
    #[derive(Default)]
    struct MockTransport {
        sent: tokio::sync::Mutex<Vec<OutgoingMessage>>,
        edits: tokio::sync::Mutex<Vec<(String, Markup)>>,
        callbacks: tokio::sync::Mutex<Vec<(String, Option<String>, bool)>>,
        uploads: AtomicUsize,
        stale: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for MockTransport {
        fn name(&self) -> &str {
            "mock"
        }

        async fn send(&self, msg: &OutgoingMessage) -> Result<Delivery, TransportError> {
            let file_id = match &msg.media {
                Some(OutgoingMedia {
                    source: MediaSource::Remote(id),
                    ..
                }) => {
                    let is_stale = self.stale.lock().unwrap().contains(id);
                    if is_stale {
                        return Err(TransportError::InvalidFileId(id.clone()));
                    }
                    Some(id.clone())
                }
                Some(OutgoingMedia {
                    source: MediaSource::Bytes { .. },
                    ..
                }) => {
                    let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
                    Some(format!("remote-{n}"))
                }
                None => None,
            };
            self.sent.lock().await.push(msg.clone());
            Ok(Delivery {
                message_id: Some("1".into()),
                file_id,
            })
        }

        async fn edit_text(
            &self,
            _target: &Target,
            text: &str,
            markup: &Markup,
        ) -> Result<Delivery, TransportError> {
            self.edits.lock().await.push((text.to_string(), markup.clone()));
            Ok(Delivery::default())
        }

        async fn answer_callback(
            &self,
            callback_id: &str,
            text: Option<&str>,
            show_alert: bool,
        ) -> Result<(), TransportError> {
            self.callbacks.lock().await.push((
                callback_id.to_string(),
                text.map(String::from),
                show_alert,
            ));
            Ok(())
        }
    }

    /// Returns fixed bytes and counts calls.
    #[derive(Default)]
    struct CountingLoader {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FileLoader for CountingLoader {
        async fn load(&self, path: &str) -> Result<MediaSource, WindowError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(MediaSource::Bytes {
                data: b"bytes".to_vec(),
                filename: path.to_string(),
            })
        }
    }

    struct Fixture {
        transport: Arc<MockTransport>,
        loader: Arc<CountingLoader>,
        cache: Arc<MediaCache>,
        sender: Sender,
    }

    fn fixture() -> Fixture {
        let transport = Arc::new(MockTransport::default());
        let loader = Arc::new(CountingLoader::default());
        let cache = Arc::new(MediaCache::new());
        let sender = Sender::new(transport.clone(), loader.clone(), cache.clone());
        Fixture {
            transport,
            loader,
            cache,
            sender,
        }
    }

    fn window(builder: crate::window::WindowTemplateBuilder) -> Window {
        Window::new(Arc::new(builder.build().unwrap()), &TemplateContext::new()).unwrap()
    }

    #[tokio::test]
    async fn test_answer_renders_text_and_markup() {
        let f = fixture();
        let w = window(
            WindowTemplate::builder("hello")
                .text("Hello {username}")
                .button(Button::inline("Hi", "hi")),
        );
        let overrides = Overrides::new().context(TemplateContext::new().with("username", "ann"));

        f.sender
            .answer(&w, &Target::chat("42"), &overrides)
            .await
            .unwrap();

        let sent = f.transport.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text.as_deref(), Some("Hello ann"));
        assert_eq!(&sent[0].markup, w.markup());
        assert!(sent[0].media.is_none());
    }

    #[tokio::test]
    async fn test_answer_overrides_win() {
        let f = fixture();
        let w = window(WindowTemplate::builder("hello").text("Hello"));
        let overrides = Overrides::new().text("Bye").markup(Markup::None);

        f.sender
            .answer(&w, &Target::chat("42"), &overrides)
            .await
            .unwrap();

        let sent = f.transport.sent.lock().await;
        assert_eq!(sent[0].text.as_deref(), Some("Bye"));
        assert_eq!(sent[0].markup, Markup::None);
    }

    #[tokio::test]
    async fn test_answer_without_text_fails() {
        let f = fixture();
        let w = window(WindowTemplate::builder("silent"));
        let err = f
            .sender
            .answer(&w, &Target::chat("42"), &Overrides::new())
            .await
            .unwrap_err();
        assert!(matches!(err, WindowError::MissingText));
    }

    #[tokio::test]
    async fn test_answer_routes_to_alert() {
        let f = fixture();
        let w = window(WindowTemplate::builder("popup").text("Saved!").show_alert(true));
        let target = Target::chat("42").with_callback("cbq-1");

        f.sender.answer(&w, &target, &Overrides::new()).await.unwrap();

        assert!(f.transport.sent.lock().await.is_empty());
        let callbacks = f.transport.callbacks.lock().await;
        assert_eq!(
            callbacks[0],
            ("cbq-1".to_string(), Some("Saved!".to_string()), true)
        );
    }

    #[tokio::test]
    async fn test_photo_upload_then_cache_reuse() {
        let f = fixture();
        let w = window(WindowTemplate::builder("pic").text("caption"));
        let target = Target::chat("42");

        let first = f
            .sender
            .answer_photo(&w, &target, Some("x.jpg"), &Overrides::new())
            .await
            .unwrap();
        assert_eq!(first.file_id.as_deref(), Some("remote-1"));
        assert_eq!(f.loader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.cache.get("x.jpg").as_deref(), Some("remote-1"));

        f.sender
            .answer_photo(&w, &target, Some("x.jpg"), &Overrides::new())
            .await
            .unwrap();
        assert_eq!(f.loader.calls.load(Ordering::SeqCst), 1);

        let sent = f.transport.sent.lock().await;
        assert_eq!(
            sent[1].media,
            Some(OutgoingMedia {
                kind: MediaKind::Photo,
                source: MediaSource::Remote("remote-1".into())
            })
        );
        assert_eq!(sent[1].text.as_deref(), Some("caption"));
    }

    #[tokio::test]
    async fn test_media_uses_template_default_path() {
        let f = fixture();
        let w = window(WindowTemplate::builder("doc").file("report.pdf"));

        f.sender
            .answer_document(&w, &Target::chat("42"), None, &Overrides::new())
            .await
            .unwrap();

        assert_eq!(f.cache.get("report.pdf").as_deref(), Some("remote-1"));
        let sent = f.transport.sent.lock().await;
        assert_eq!(sent[0].media.as_ref().unwrap().kind, MediaKind::Document);
    }

    #[tokio::test]
    async fn test_media_missing_path() {
        let f = fixture();
        let w = window(WindowTemplate::builder("nothing"));
        let err = f
            .sender
            .answer_video(&w, &Target::chat("42"), None, &Overrides::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WindowError::MissingRequiredField {
                kind: MediaKind::Video
            }
        ));
        assert_eq!(f.loader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stale_cached_id_is_evicted_and_reuploaded() {
        let f = fixture();
        f.cache.put("x.jpg", "gone");
        f.transport.stale.lock().unwrap().push("gone".into());
        let w = window(WindowTemplate::builder("pic"));

        let delivery = f
            .sender
            .answer_photo(&w, &Target::chat("42"), Some("x.jpg"), &Overrides::new())
            .await
            .unwrap();

        assert_eq!(delivery.file_id.as_deref(), Some("remote-1"));
        assert_eq!(f.loader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.cache.get("x.jpg").as_deref(), Some("remote-1"));
    }

    #[tokio::test]
    async fn test_concurrent_misses_upload_once() {
        let f = fixture();
        let w = Arc::new(window(WindowTemplate::builder("pic").photo("x.jpg")));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let sender = f.sender.clone();
            let w = w.clone();
            handles.push(tokio::spawn(async move {
                sender
                    .answer_photo(&w, &Target::chat("42"), None, &Overrides::new())
                    .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        assert_eq!(f.transport.uploads.load(Ordering::SeqCst), 1);
        assert_eq!(f.loader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.transport.sent.lock().await.len(), 4);
        assert_eq!(f.cache.pending_uploads(), 0);
    }

    #[tokio::test]
    async fn test_edit_text_inline_only() {
        let f = fixture();
        let target = Target::chat("42").with_message("7");

        let inline = window(
            WindowTemplate::builder("inline")
                .text("Page 2")
                .button(Button::inline("Next", "next")),
        );
        f.sender
            .edit_text(&inline, &target, &Overrides::new())
            .await
            .unwrap();
        assert_eq!(f.transport.edits.lock().await[0].0, "Page 2");

        let reply = window(
            WindowTemplate::builder("reply")
                .text("Pick")
                .button(Button::reply("Yes")),
        );
        let err = f
            .sender
            .edit_text(&reply, &target, &Overrides::new())
            .await
            .unwrap_err();
        assert!(matches!(err, WindowError::UnsupportedMarkup(_)));
    }

    #[tokio::test]
    async fn test_edit_text_needs_message_id() {
        let f = fixture();
        let w = window(WindowTemplate::builder("x").text("t"));
        let err = f
            .sender
            .edit_text(&w, &Target::chat("42"), &Overrides::new())
            .await
            .unwrap_err();
        assert!(matches!(err, WindowError::MissingTarget("message id")));
    }

    #[tokio::test]
    async fn test_alert_needs_callback_id() {
        let f = fixture();
        let w = window(WindowTemplate::builder("x").text("t"));
        let err = f
            .sender
            .alert(&w, &Target::chat("42"), &Overrides::new())
            .await
            .unwrap_err();
        assert!(matches!(err, WindowError::MissingTarget("callback id")));
    }
}
