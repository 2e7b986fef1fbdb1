//! Compile plain-text tables of contents into pdfmark outline payloads.
//!
//! A TOC document is a list of `title ..... page` lines, optionally
//! interleaved with `<!---offset +N--->` directives that shift every
//! following page number. [`compiler`] turns the text into
//! [`BookmarkRecord`]s, [`validator`] checks them against a base offset and
//! [`render`] produces the `%!PS` pdfmark payload and a human-readable
//! preview.

pub mod compiler;
pub mod model;
pub mod render;
pub mod validator;

pub use compiler::{TocCompiler, compile};
pub use model::{BookmarkRecord, Compilation, Diagnostic, Severity, Validation};
pub use render::{Report, escape_title, render_payload, render_preview};
pub use validator::validate;
