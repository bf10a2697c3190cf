use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Error;
use crate::render::HtmlRenderer;

/// Convert the Markdown file at `input` to a PDF at `output`.
///
/// The destination is created only once the input has been read. If the
/// renderer fails, the partially written destination is removed.
///
/// When `html_copy` is given, the intermediate HTML document is written
/// there before rendering starts, so it is available even when rendering
/// fails. Failing to write it aborts the conversion.
pub fn convert_file(
    input: &Path,
    output: &Path,
    html_copy: Option<&Path>,
    config: &Config,
    renderer: &dyn HtmlRenderer,
) -> Result<(), Error> {
    if !input.exists() {
        return Err(Error::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    let markdown = fs::read_to_string(input).map_err(|source| Error::Read {
        path: input.to_path_buf(),
        source,
    })?;
    info!("Read {} bytes from {}", markdown.len(), input.display());

    let html = crate::markdown_to_document(&markdown, config);
    debug!("HTML document is {} bytes", html.len());

    if let Some(path) = html_copy {
        fs::write(path, &html).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Wrote HTML document to {}", path.display());
    }

    let file = File::create(output).map_err(|source| Error::Write {
        path: output.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    let rendered = renderer
        .render(html.as_bytes(), &mut writer)
        .map_err(Error::from)
        .and_then(|()| {
            writer.flush().map_err(|source| Error::Write {
                path: output.to_path_buf(),
                source,
            })
        });
    drop(writer);

    if let Err(e) = rendered {
        if let Err(cleanup) = fs::remove_file(output) {
            warn!("Could not remove partial output {}: {}", output.display(), cleanup);
        }
        return Err(e);
    }

    info!("Wrote {}", output.display());
    Ok(())
}

/// Convert `input` to `output` and report the outcome on stdout.
///
/// Returns `true` on success. Every failure is reported and turned into
/// `false`; nothing is propagated.
pub fn markdown_file_to_pdf(
    input: &Path,
    output: &Path,
    html_copy: Option<&Path>,
    config: &Config,
    renderer: &dyn HtmlRenderer,
) -> bool {
    match convert_file(input, output, html_copy, config, renderer) {
        Ok(()) => {
            println!(
                "✓ Successfully converted {} to {}",
                input.display(),
                output.display()
            );
            true
        }
        Err(e) => {
            println!("✗ Error converting to PDF: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use std::cell::RefCell;
    use std::io::Write;

    /// Records the HTML it was given and writes a fixed payload.
    #[derive(Default)]
    struct RecordingRenderer {
        seen: RefCell<Vec<String>>,
    }

    impl HtmlRenderer for RecordingRenderer {
        fn render(&self, html: &[u8], dest: &mut dyn Write) -> Result<(), RenderError> {
            self.seen
                .borrow_mut()
                .push(String::from_utf8_lossy(html).into_owned());
            dest.write_all(b"%PDF-stub")?;
            Ok(())
        }
    }

    /// Writes some bytes, then reports a failure.
    struct FailingRenderer;

    impl HtmlRenderer for FailingRenderer {
        fn render(&self, _html: &[u8], dest: &mut dyn Write) -> Result<(), RenderError> {
            dest.write_all(b"%PDF-partial")?;
            Err(RenderError::Export("font table corrupt".to_string()))
        }
    }

    fn write_input(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("input.md");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn converts_and_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "# Title\n\n| A |\n|---|\n| 1 |\n");
        let output = dir.path().join("out.pdf");
        let renderer = RecordingRenderer::default();

        assert!(markdown_file_to_pdf(&input, &output, None, &Config::default(), &renderer));
        assert_eq!(fs::read(&output).unwrap(), b"%PDF-stub");

        let seen = renderer.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("<h1 id=\"title\">Title</h1>"));
        assert!(seen[0].contains("<table>"));
        assert!(seen[0].contains("<title>Enterprise Maturity Assessment</title>"));
    }

    #[test]
    fn same_input_gives_identical_html() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "# A\n\nSome *text*.\n");
        let renderer = RecordingRenderer::default();

        for name in ["one.pdf", "two.pdf"] {
            convert_file(&input, &dir.path().join(name), None, &Config::default(), &renderer).unwrap();
        }
        let seen = renderer.seen.borrow();
        assert_eq!(seen[0], seen[1]);
    }

    #[test]
    fn missing_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");

        let err = convert_file(
            &dir.path().join("missing.md"),
            &output,
            None,
            &Config::default(),
            &RecordingRenderer::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InputNotFound { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn renderer_failure_is_reported_and_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "text");
        let output = dir.path().join("out.pdf");

        let err = convert_file(&input, &output, None, &Config::default(), &FailingRenderer).unwrap_err();
        assert!(err.to_string().contains("font table corrupt"), "got: {err}");
        assert!(!output.exists());

        assert!(!markdown_file_to_pdf(&input, &output, None, &Config::default(), &FailingRenderer));
    }

    #[test]
    fn html_copy_matches_rendered_document() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "# Title\n\n[TOC]\n");
        let output = dir.path().join("out.pdf");
        let html = dir.path().join("out.html");
        let renderer = RecordingRenderer::default();

        convert_file(&input, &output, Some(html.as_path()), &Config::default(), &renderer).unwrap();
        assert_eq!(fs::read_to_string(&html).unwrap(), renderer.seen.borrow()[0]);
    }

    #[test]
    fn html_copy_survives_render_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "text");
        let output = dir.path().join("out.pdf");
        let html = dir.path().join("out.html");

        convert_file(&input, &output, Some(html.as_path()), &Config::default(), &FailingRenderer)
            .unwrap_err();
        assert!(fs::read_to_string(&html).unwrap().contains("<p>text</p>"));
        assert!(!output.exists());
    }

    #[test]
    fn unwritable_html_copy_stops_before_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "text");
        let output = dir.path().join("out.pdf");
        let html = dir.path().join("no-such-dir").join("out.html");

        let err = convert_file(
            &input,
            &output,
            Some(html.as_path()),
            &Config::default(),
            &RecordingRenderer::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Write { ref path, .. } if *path == html));
        assert!(!output.exists());
    }

    #[test]
    fn unwritable_destination_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "text");
        let output = dir.path().join("no-such-dir").join("out.pdf");

        let err = convert_file(
            &input,
            &output,
            None,
            &Config::default(),
            &RecordingRenderer::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
    }

    #[test]
    fn empty_input_renders_through_typst() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "");
        let output = dir.path().join("empty.pdf");

        let renderer = crate::TypstRenderer::default();
        assert!(markdown_file_to_pdf(&input, &output, None, &Config::default(), &renderer));
        let pdf = fs::read(&output).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }
}
