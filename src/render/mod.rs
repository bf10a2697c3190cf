//! HTML-to-PDF rendering.
//!
//! [`HtmlRenderer`] is the seam the conversion driver renders through.
//! [`TypstRenderer`] implements it by translating the HTML document (its
//! stylesheet and its body) into Typst and compiling that to PDF.

mod markup;
mod style;

use std::io::Write;

use scraper::{Html, Selector};
use tracing::debug;
use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_library::diag::{SourceDiagnostic, Warned};
use typst_library::layout::PagedDocument;
use typst_pdf::PdfOptions;

use crate::config::FontConfig;
use crate::css::Stylesheet;
use crate::error::RenderError;

/// Renders a complete HTML document to PDF.
pub trait HtmlRenderer {
    /// Render `html` and write the PDF to `dest`.
    fn render(&self, html: &[u8], dest: &mut dyn Write) -> Result<(), RenderError>;
}

/// Renders HTML through Typst using the embedded font set.
#[derive(Debug, Clone, Default)]
pub struct TypstRenderer {
    fonts: FontConfig,
}

impl TypstRenderer {
    pub fn new(fonts: FontConfig) -> Self {
        Self { fonts }
    }

    /// Compile Typst source to PDF bytes.
    pub fn compile(&self, source: String) -> Result<Vec<u8>, RenderError> {
        let font_options = TypstKitFontOptions::new()
            .include_embedded_fonts(true)
            .include_system_fonts(self.fonts.system);

        let engine = TypstEngine::builder()
            .main_file(source)
            .search_fonts_with(font_options)
            .build();

        let compiled: Warned<Result<PagedDocument, _>> = engine.compile();
        for warning in &compiled.warnings {
            debug!("typst warning: {}", warning.message);
        }
        let doc = compiled
            .output
            .map_err(|e| RenderError::Compile(format!("{:?}", e)))?;
        debug!(pages = doc.pages.len(), "compiled document");

        typst_pdf::pdf(&doc, &PdfOptions::default())
            .map_err(|errors| RenderError::Export(join_diagnostics(&errors)))
    }
}

impl HtmlRenderer for TypstRenderer {
    fn render(&self, html: &[u8], dest: &mut dyn Write) -> Result<(), RenderError> {
        let html = std::str::from_utf8(html)?;
        let pdf = self.compile(html_to_typst(html))?;
        dest.write_all(&pdf)?;
        dest.flush()?;
        Ok(())
    }
}

/// Translate an HTML document to Typst source: stylesheet rules first, then the body.
pub fn html_to_typst(html: &str) -> String {
    let document = Html::parse_document(html);
    let sheet = Stylesheet::parse(&style_text(&document));
    let mut out = style::preamble(&sheet);
    out.push_str(&markup::body_to_typst(&document));
    out
}

/// Concatenated text of every `<style>` element.
fn style_text(document: &Html) -> String {
    Selector::parse("style").ok().map_or_else(String::new, |selector| {
        document
            .select(&selector)
            .flat_map(|style| style.text())
            .collect()
    })
}

fn join_diagnostics(diagnostics: &[SourceDiagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.message.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
