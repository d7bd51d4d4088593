// src/converters/mod.rs
pub mod pdf;
pub mod text;

// Re-export the converter entry points for convenience
pub use pdf::render_pdf;
pub use text::html_to_text;
