//! Error types for md2pdf.
//!
//! [`RenderError`] is what an [`crate::HtmlRenderer`] reports when it cannot
//! produce a PDF. [`Error`] covers everything else the conversion driver can
//! run into and wraps render failures.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the conversion driver and configuration loader.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{} not found", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration '{}': {detail}", path.display())]
    Config { path: PathBuf, detail: String },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Failure reported by an HTML-to-PDF renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("HTML input is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Typst compilation failed: {0}")]
    Compile(String),

    #[error("PDF generation failed: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
