/// Print stylesheet embedded in every generated document.
pub const STYLESHEET: &str = r#"
@page {
    size: A4;
    margin: 2cm;
}
body {
    font-family: Helvetica, Arial, sans-serif;
    font-size: 11pt;
    line-height: 1.6;
    color: #333;
}
h1 {
    font-size: 24pt;
    margin-top: 0.5em;
    margin-bottom: 0.5em;
    page-break-after: avoid;
    border-bottom: 2px solid #333;
    padding-bottom: 0.3em;
}
h2 {
    font-size: 18pt;
    margin-top: 1em;
    margin-bottom: 0.5em;
    page-break-after: avoid;
    border-bottom: 1px solid #666;
    padding-bottom: 0.2em;
}
h3 {
    font-size: 14pt;
    margin-top: 0.8em;
    margin-bottom: 0.4em;
    page-break-after: avoid;
}
h4 {
    font-size: 12pt;
    margin-top: 0.6em;
    margin-bottom: 0.3em;
}
table {
    border-collapse: collapse;
    width: 100%;
    margin: 1em 0;
    page-break-inside: avoid;
}
table th, table td {
    border: 1px solid #ddd;
    padding: 8px;
    text-align: left;
}
table th {
    background-color: #f2f2f2;
    font-weight: bold;
}
code {
    background-color: #f4f4f4;
    padding: 2px 4px;
    font-family: "Courier New", monospace;
    font-size: 10pt;
}
pre {
    background-color: #f4f4f4;
    padding: 1em;
    overflow-x: auto;
    page-break-inside: avoid;
}
pre code {
    background-color: transparent;
    padding: 0;
}
ul, ol {
    margin: 0.5em 0;
    padding-left: 2em;
}
li {
    margin: 0.3em 0;
}
blockquote {
    border-left: 4px solid #ddd;
    padding-left: 1em;
    margin: 1em 0;
    color: #666;
}
hr {
    border: none;
    border-top: 1px solid #ddd;
    margin: 2em 0;
}
"#;

/// A complete HTML document: the shell around a rendered Markdown fragment.
#[derive(Debug, Clone)]
pub struct HtmlDocument<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

impl<'a> HtmlDocument<'a> {
    pub fn new(title: &'a str, body: &'a str) -> Self {
        Self { title, body }
    }

    /// Render the document. The body is inserted verbatim.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(STYLESHEET.len() + self.body.len() + 256);
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>");
        out.push_str(&escape_html(self.title));
        out.push_str("</title>\n<style>");
        out.push_str(STYLESHEET);
        out.push_str("</style>\n</head>\n<body>\n");
        out.push_str(self.body);
        out.push_str("</body>\n</html>\n");
        out
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail
    let _ = pulldown_cmark_escape::escape_html(&mut out, text);
    out
}
