//! Window instances — a template plus its own, mutable keyboard.

use std::sync::Arc;

use tracing::debug;

use crate::button::Button;
use crate::error::WindowError;
use crate::keyboard::{KeyboardState, Markup};
use crate::media::MediaKind;
use crate::template::{render_lenient, TemplateContext};

use super::template::WindowTemplate;

/// Media paths a window sends by default.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MediaRefs {
    pub photo: Option<String>,
    pub file: Option<String>,
    pub video: Option<String>,
}

impl MediaRefs {
    pub fn get(&self, kind: MediaKind) -> Option<&str> {
        match kind {
            MediaKind::Photo => self.photo.as_deref(),
            MediaKind::Document => self.file.as_deref(),
            MediaKind::Video => self.video.as_deref(),
        }
    }

    pub fn set(&mut self, kind: MediaKind, path: Option<String>) {
        match kind {
            MediaKind::Photo => self.photo = path,
            MediaKind::Document => self.file = path,
            MediaKind::Video => self.video = path,
        }
    }

    fn from_template(template: &WindowTemplate) -> Self {
        Self {
            photo: template.photo.clone(),
            file: template.file.clone(),
            video: template.video.clone(),
        }
    }
}

/// One instantiated window.
///
/// Owns its keyboard and media refs; the template is shared. Not meant to be
/// mutated from several tasks at once.
#[derive(Clone, Debug)]
pub struct Window {
    template: Arc<WindowTemplate>,
    keyboard: KeyboardState,
    media: MediaRefs,
}

impl Window {
    /// Instantiate `template`: format the declared buttons with `context`
    /// and assemble the keyboard.
    pub fn new(
        template: Arc<WindowTemplate>,
        context: &TemplateContext,
    ) -> Result<Self, WindowError> {
        let keyboard = KeyboardState::build(
            &template.buttons,
            template.layout.clone(),
            template.reply_options.clone(),
            context,
        )?;
        debug!(
            window = %template.name,
            buttons = keyboard.buttons().len(),
            "window assembled"
        );
        Ok(Self {
            media: MediaRefs::from_template(&template),
            template,
            keyboard,
        })
    }

    pub fn name(&self) -> &str {
        &self.template.name
    }

    pub fn template(&self) -> &WindowTemplate {
        &self.template
    }

    /// Raw (unrendered) window text.
    pub fn text(&self) -> Option<&str> {
        self.template.text.as_deref()
    }

    /// Window text with placeholders substituted where possible.
    pub fn render_text(&self, context: &TemplateContext) -> Option<String> {
        self.text().map(|t| render_lenient(t, context))
    }

    pub fn markup(&self) -> &Markup {
        self.keyboard.markup()
    }

    pub fn buttons(&self) -> &[Button] {
        self.keyboard.buttons()
    }

    pub fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }

    pub fn media(&self) -> &MediaRefs {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut MediaRefs {
        &mut self.media
    }

    pub fn show_alert(&self) -> bool {
        self.template.show_alert
    }

    /// Throw away the current buttons and assemble exactly `buttons`.
    pub fn replace(
        &mut self,
        buttons: &[Button],
        context: &TemplateContext,
    ) -> Result<&Markup, WindowError> {
        self.keyboard.replace(buttons, context)?;
        Ok(self.keyboard.markup())
    }

    /// Append `buttons` and reassemble.
    ///
    /// With `keep_declared` the template's buttons come first; otherwise the
    /// current base set does (the declared buttons, or the last `replace`).
    /// Calling this twice with the same arguments gives the same markup.
    pub fn extend(
        &mut self,
        buttons: &[Button],
        keep_declared: bool,
        context: &TemplateContext,
    ) -> Result<&Markup, WindowError> {
        if keep_declared {
            let declared = self.template.buttons.clone();
            self.keyboard.extend_from(&declared, buttons, context)?;
        } else {
            self.keyboard.extend_base(buttons, context)?;
        }
        Ok(self.keyboard.markup())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::{Directive, GridKind};

    fn menu() -> Arc<WindowTemplate> {
        Arc::new(
            WindowTemplate::builder("menu")
                .text("Hi {name}")
                .button(Button::inline("A {n}", "cb:{n}"))
                .button(Button::inline("B", "cb:b"))
                .button(Button::inline("C", "cb:c"))
                .row_sizes([2])
                .repeat(true)
                .build()
                .unwrap(),
        )
    }

    fn labels(markup: &Markup) -> Vec<Vec<String>> {
        markup
            .as_grid()
            .unwrap()
            .rows
            .iter()
            .map(|row| row.iter().filter_map(|b| b.text().map(String::from)).collect())
            .collect()
    }

    #[test]
    fn test_construction_formats_and_assembles() {
        let ctx = TemplateContext::new().with("n", "1");
        let w = Window::new(menu(), &ctx).unwrap();
        let grid = w.markup().as_grid().unwrap();
        assert_eq!(grid.kind, GridKind::Inline);
        assert_eq!(
            grid.rows,
            vec![
                vec![Button::inline("A 1", "cb:1"), Button::inline("B", "cb:b")],
                vec![Button::inline("C", "cb:c")],
            ]
        );
    }

    #[test]
    fn test_construction_without_context_keeps_placeholders() {
        let w = Window::new(menu(), &TemplateContext::new()).unwrap();
        assert_eq!(w.buttons()[0], Button::inline("A {n}", "cb:{n}"));
    }

    #[test]
    fn test_empty_window_has_no_markup() {
        let tpl = Arc::new(WindowTemplate::builder("plain").text("hi").build().unwrap());
        let w = Window::new(tpl, &TemplateContext::new()).unwrap();
        assert!(w.markup().is_none());
    }

    #[test]
    fn test_render_text() {
        let w = Window::new(menu(), &TemplateContext::new()).unwrap();
        let ctx = TemplateContext::new().with("name", "Ann");
        assert_eq!(w.render_text(&ctx).as_deref(), Some("Hi Ann"));
        assert_eq!(
            w.render_text(&TemplateContext::new()).as_deref(),
            Some("Hi {name}")
        );
    }

    #[test]
    fn test_replace_uses_only_new_buttons() {
        let ctx = TemplateContext::new();
        let mut w = Window::new(menu(), &ctx).unwrap();
        w.replace(&[Button::inline("X", "x")], &ctx).unwrap();
        assert_eq!(labels(w.markup()), vec![vec!["X".to_string()]]);
        assert_eq!(w.buttons().len(), 1);
    }

    #[test]
    fn test_replace_twice_same_markup() {
        let ctx = TemplateContext::new().with("id", 7);
        let new = [Button::inline("Item {id}", "item:{id}"), Button::inline("Back", "back")];
        let mut w = Window::new(menu(), &ctx).unwrap();
        let first = w.replace(&new, &ctx).unwrap().clone();
        let second = w.replace(&new, &ctx).unwrap().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_replace_with_directive() {
        let ctx = TemplateContext::new();
        let mut w = Window::new(menu(), &ctx).unwrap();
        let markup = w.replace(&[Button::RemoveKeyboard], &ctx).unwrap();
        assert_eq!(markup.directive(), Some(Directive::RemoveKeyboard));
    }

    #[test]
    fn test_extend_keep_declared() {
        let ctx = TemplateContext::new().with("n", "1");
        let mut w = Window::new(menu(), &ctx).unwrap();
        w.extend(&[Button::inline("D", "cb:d")], true, &ctx).unwrap();
        assert_eq!(
            labels(w.markup()),
            vec![vec!["A 1", "B"], vec!["C", "D"]]
                .into_iter()
                .map(|r| r.into_iter().map(String::from).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_extend_is_idempotent() {
        let ctx = TemplateContext::new();
        let extra = [Button::inline("D", "cb:d")];
        let mut w = Window::new(menu(), &ctx).unwrap();

        let first = w.extend(&extra, true, &ctx).unwrap().clone();
        let second = w.extend(&extra, true, &ctx).unwrap().clone();
        assert_eq!(first, second);

        let third = w.extend(&extra, false, &ctx).unwrap().clone();
        let fourth = w.extend(&extra, false, &ctx).unwrap().clone();
        assert_eq!(third, fourth);
        assert_eq!(w.buttons().len(), 4);
    }

    #[test]
    fn test_extend_without_declared_appends_to_replaced_set() {
        let ctx = TemplateContext::new();
        let mut w = Window::new(menu(), &ctx).unwrap();
        w.replace(&[Button::inline("X", "x")], &ctx).unwrap();
        w.extend(&[Button::inline("Y", "y")], false, &ctx).unwrap();
        assert_eq!(
            w.buttons(),
            &[Button::inline("X", "x"), Button::inline("Y", "y")]
        );

        w.extend(&[Button::inline("Y", "y")], true, &ctx).unwrap();
        assert_eq!(w.buttons().len(), 4);
        assert_eq!(w.buttons()[0], Button::inline("A {n}", "cb:{n}"));
    }

    #[test]
    fn test_extend_does_not_reformat_held_buttons() {
        let ctx = TemplateContext::new().with("n", "{m}").with("m", "X");
        let mut w = Window::new(menu(), &ctx).unwrap();
        assert_eq!(w.buttons()[0], Button::inline("A {m}", "cb:{m}"));

        w.extend(&[Button::inline("D", "d")], false, &ctx).unwrap();
        assert_eq!(w.buttons()[0], Button::inline("A {m}", "cb:{m}"));
        assert_eq!(w.buttons()[3], Button::inline("D", "d"));
    }

    #[test]
    fn test_extend_mixed_kinds_rejected_and_window_unchanged() {
        let ctx = TemplateContext::new();
        let mut w = Window::new(menu(), &ctx).unwrap();
        let before = w.markup().clone();
        let result = w.extend(&[Button::reply("nope")], true, &ctx);
        assert!(matches!(
            result,
            Err(WindowError::UnclassifiableButtonList { index: 3, .. })
        ));
        assert_eq!(w.markup(), &before);
    }

    #[test]
    fn test_media_refs_from_template() {
        let tpl = Arc::new(
            WindowTemplate::builder("m")
                .photo("p.jpg")
                .build()
                .unwrap(),
        );
        let mut w = Window::new(tpl, &TemplateContext::new()).unwrap();
        assert_eq!(w.media().get(MediaKind::Photo), Some("p.jpg"));
        w.media_mut().set(MediaKind::Video, Some("v.mp4".into()));
        assert_eq!(w.media().get(MediaKind::Video), Some("v.mp4"));
    }
}
