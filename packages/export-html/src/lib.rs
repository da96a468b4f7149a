//! # Pagecraft HTML Export
//!
//! Turns an editor document into a standalone `{html, css, js}` bundle.
//! The markup is the editor's preview render (no toolbars, no
//! `data-node-id` hooks, no placeholders), re-indented for reading.

mod compiler;


pub use compiler::{export_document, ExportBundle, ExportError, ExportOptions, SCRIPT_NAME, STYLESHEET_NAME};
