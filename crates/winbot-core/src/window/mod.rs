//! Windows — declarative templates and the instances built from them.
//!
//! A `WindowTemplate` is declared once (builder or catalog file). A `Window`
//! is created per use from a template and a `TemplateContext`; it owns a
//! `KeyboardState` and `MediaRefs` and can have its buttons replaced or
//! extended at runtime.

pub mod instance;
pub mod template;

pub use instance::{MediaRefs, Window};
pub use template::{Catalog, WindowTemplate, WindowTemplateBuilder};
