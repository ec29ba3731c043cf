//! Report rendering.

pub mod pdf;

pub use pdf::{render_document, PdfRenderer, ROWS_PER_PAGE};
