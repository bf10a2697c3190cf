mod config;
mod css;
mod driver;
mod error;
mod markdown;
mod render;
mod template;

pub use config::{Config, DocumentConfig, FontConfig, MarkdownConfig};
pub use driver::{convert_file, markdown_file_to_pdf};
pub use error::{Error, RenderError};
pub use render::{HtmlRenderer, TypstRenderer, html_to_typst};
pub use template::{HtmlDocument, STYLESHEET};

/// Convert markdown to an HTML fragment using the default config.
pub fn markdown_to_html(markdown: &str) -> String {
    markdown_to_html_with_config(markdown, &Config::compiled_default())
}

/// Convert markdown to an HTML fragment with custom config.
pub fn markdown_to_html_with_config(markdown: &str, config: &Config) -> String {
    markdown::to_html(markdown, &config.markdown)
}

/// Convert markdown to a complete, styled HTML document.
pub fn markdown_to_document(markdown: &str, config: &Config) -> String {
    let body = markdown_to_html_with_config(markdown, config);
    HtmlDocument::new(&config.document.title, &body).render()
}

/// Convert markdown to PDF bytes using default config.
pub fn markdown_to_pdf(markdown: &str) -> Result<Vec<u8>, Error> {
    markdown_to_pdf_with_config(markdown, &Config::compiled_default())
}

/// Convert markdown to PDF bytes with custom config.
pub fn markdown_to_pdf_with_config(markdown: &str, config: &Config) -> Result<Vec<u8>, Error> {
    let html = markdown_to_document(markdown, config);
    let mut pdf = Vec::new();
    TypstRenderer::new(config.fonts.clone()).render(html.as_bytes(), &mut pdf)?;
    Ok(pdf)
}
