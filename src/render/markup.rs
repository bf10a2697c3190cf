//! Translate the `<body>` of an HTML document into Typst markup.
//!
//! All document text is emitted as Typst string literals (`#"..."`), so
//! characters that are significant in Typst markup never need escaping.

use std::collections::{HashMap, HashSet};

use scraper::{ElementRef, Html, Selector};

/// Typst markup for the document body. Empty if the document has no body.
pub fn body_to_typst(document: &Html) -> String {
    let Some(body) = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
    else {
        return String::new();
    };

    let mut emitter = Emitter {
        labels: unique_labels(document),
        out: String::new(),
    };
    emitter.children(body);
    emitter.out
}

/// Element ids that can safely become Typst labels: valid label syntax and
/// used exactly once, so links to them are never ambiguous.
fn unique_labels(document: &Html) -> HashSet<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for el in document.root_element().descendants().filter_map(ElementRef::wrap) {
        if let Some(id) = el.value().id() {
            *counts.entry(id).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .filter(|(id, n)| *n == 1 && typst_syntax::is_valid_label_literal_id(id))
        .map(|(id, _)| id.to_string())
        .collect()
}


fn is_block(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "body"
            | "dd"
            | "div"
            | "dl"
            | "dt"
            | "figure"
            | "footer"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "li"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "tbody"
            | "td"
            | "tfoot"
            | "th"
            | "thead"
            | "tr"
            | "ul"
    )
}

struct Emitter {
    labels: HashSet<String>,
    out: String,
}

impl Emitter {
    fn children(&mut self, el: ElementRef<'_>) {
        for child in el.children() {
            if let Some(child_el) = ElementRef::wrap(child) {
                self.element(child_el);
            } else if let Some(text) = child.value().as_text() {
                let collapsed = collapse_whitespace(text);
                if collapsed.trim().is_empty() {
                    // Whitespace next to a block boundary is layout, not content
                    let prev_block = child
                        .prev_sibling()
                        .and_then(ElementRef::wrap)
                        .is_none_or(|e| is_block(e.value().name()));
                    let next_block = child
                        .next_sibling()
                        .and_then(ElementRef::wrap)
                        .is_none_or(|e| is_block(e.value().name()));
                    if prev_block || next_block {
                        continue;
                    }
                }
                self.text(&collapsed);
            }
        }
    }

    fn element(&mut self, el: ElementRef<'_>) {
        let name = el.value().name();
        match name {
            "head" | "script" | "style" | "template" | "noscript" => {}
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.heading(el, &name[1..]),
            "p" => {
                self.block_start();
                self.anchor(el);
                self.children(el);
                self.end_block();
            }
            "strong" | "b" => self.wrap(el, "#strong["),
            "em" | "i" | "cite" => self.wrap(el, "#emph["),
            "del" | "s" | "strike" => self.wrap(el, "#strike["),
            "u" | "ins" => self.wrap(el, "#underline["),
            "sup" => self.wrap(el, "#super["),
            "sub" => self.wrap(el, "#sub["),
            "code" | "kbd" | "samp" | "tt" => self.inline_code(el),
            "pre" => self.code_block(el),
            "a" => self.link(el),
            "br" => self.out.push_str("#linebreak()"),
            "img" => self.image(el),
            "input" => self.checkbox(el),
            "ul" => self.list(el, false),
            "ol" => self.list(el, true),
            "blockquote" => {
                self.block_start();
                self.out.push_str("#quote(block: true)[");
                self.children(el);
                self.trim_end();
                self.out.push(']');
                self.end_block();
            }
            "hr" => {
                self.block_start();
                self.out.push_str("#hrule()");
                self.end_block();
            }
            "table" => self.table(el),
            "dt" => {
                self.block_start();
                self.anchor(el);
                self.wrap(el, "#strong[");
                self.end_block();
            }
            "dd" => {
                self.block_start();
                self.out.push_str("#pad(left: 2em)[");
                self.children(el);
                self.trim_end();
                self.out.push(']');
                self.end_block();
            }
            _ => {
                self.anchor(el);
                self.children(el);
            }
        }
    }

    fn text(&mut self, text: &str) {
        let text = if self.at_line_start() {
            text.trim_start()
        } else {
            text
        };
        if text.is_empty() {
            return;
        }
        self.out.push('#');
        push_string(&mut self.out, text);
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with(['\n', '['])
    }

    fn block_start(&mut self) {
        if !self.at_line_start() {
            self.out.push('\n');
        }
    }

    fn end_block(&mut self) {
        self.trim_end();
        self.out.push_str("\n\n");
    }

    fn trim_end(&mut self) {
        let len = self.out.trim_end().len();
        self.out.truncate(len);
    }

    fn wrap(&mut self, el: ElementRef<'_>, open: &str) {
        self.out.push_str(open);
        self.children(el);
        self.out.push(']');
    }

    /// An invisible, linkable marker for elements that carry an id.
    fn anchor(&mut self, el: ElementRef<'_>) {
        if let Some(id) = el.value().id().filter(|id| self.labels.contains(*id)) {
            self.out.push_str(&format!("#metadata(none) <{id}>"));
        }
    }

    fn heading(&mut self, el: ElementRef<'_>, level: &str) {
        self.block_start();
        self.out.push_str(&format!("#heading(level: {level})["));
        self.children(el);
        self.trim_end();
        self.out.push(']');
        if let Some(id) = el.value().id().filter(|id| self.labels.contains(*id)) {
            self.out.push_str(&format!(" <{id}>"));
        }
        self.end_block();
    }

    fn inline_code(&mut self, el: ElementRef<'_>) {
        let code: String = el.text().collect();
        self.out.push_str("#raw(");
        push_string(&mut self.out, &code);
        self.out.push(')');
    }

    fn code_block(&mut self, el: ElementRef<'_>) {
        let lang = el
            .children()
            .filter_map(ElementRef::wrap)
            .find(|c| c.value().name() == "code")
            .and_then(|code| {
                code.value()
                    .classes()
                    .find_map(|class| class.strip_prefix("language-"))
            });
        let mut code: String = el.text().collect();
        if code.ends_with('\n') {
            code.pop();
        }

        self.block_start();
        self.out.push_str("#raw(block: true, ");
        if let Some(lang) = lang {
            self.out.push_str("lang: ");
            push_string(&mut self.out, lang);
            self.out.push_str(", ");
        }
        push_string(&mut self.out, &code);
        self.out.push(')');
        self.end_block();
    }

    fn link(&mut self, el: ElementRef<'_>) {
        let href = el.value().attr("href").unwrap_or("").trim();
        if let Some(target) = href.strip_prefix('#') {
            if self.labels.contains(target) {
                self.out.push_str(&format!("#link(<{target}>)["));
                self.children(el);
                self.out.push(']');
                return;
            }
        } else if !href.is_empty() {
            self.out.push_str("#link(");
            push_string(&mut self.out, href);
            self.out.push_str(")[");
            self.children(el);
            self.out.push(']');
            return;
        }
        // Dangling anchor or bare <a>: keep the text
        self.anchor(el);
        self.children(el);
    }

    fn image(&mut self, el: ElementRef<'_>) {
        let alt = el.value().attr("alt").unwrap_or("").trim();
        if !alt.is_empty() {
            self.out.push_str("#emph[");
            self.text(alt);
            self.out.push(']');
        }
    }

    fn checkbox(&mut self, el: ElementRef<'_>) {
        if el.value().attr("type") == Some("checkbox") {
            let checked = el.value().attr("checked").is_some();
            self.text(if checked { "[x]" } else { "[ ]" });
        }
    }

    fn list(&mut self, el: ElementRef<'_>, ordered: bool) {
        self.block_start();
        if ordered {
            match el
                .value()
                .attr("start")
                .and_then(|s| s.trim().parse::<u64>().ok())
            {
                Some(start) if start != 1 => {
                    self.out.push_str(&format!("#enum(start: {start},\n"))
                }
                _ => self.out.push_str("#enum(\n"),
            }
        } else {
            self.out.push_str("#list(\n");
        }

        for item in el
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|c| c.value().name() == "li")
        {
            self.out.push_str("  [");
            self.anchor(item);
            self.children(item);
            self.trim_end();
            self.out.push_str("],\n");
        }

        self.out.push(')');
        self.end_block();
    }

    fn table(&mut self, el: ElementRef<'_>) {
        let mut header = Vec::new();
        let mut body = Vec::new();
        for section in el.children().filter_map(ElementRef::wrap) {
            match section.value().name() {
                "thead" => header.extend(rows_of(section)),
                "tbody" | "tfoot" => body.extend(rows_of(section)),
                "tr" => body.push(section),
                _ => {}
            }
        }

        let columns = header
            .iter()
            .chain(&body)
            .map(|row| cells_of(*row).count())
            .max()
            .unwrap_or(0);
        if columns == 0 {
            return;
        }

        self.block_start();
        self.out
            .push_str(&format!("#table(\n  columns: table-columns({columns}),\n"));
        if !header.is_empty() {
            self.out.push_str("  table.header(\n");
            for row in &header {
                self.row(*row, columns, "    ");
            }
            self.out.push_str("  ),\n");
        }
        for row in &body {
            self.row(*row, columns, "  ");
        }
        self.out.push(')');
        self.end_block();
    }

    /// One table row, padded with empty cells so later rows stay aligned.
    fn row(&mut self, row: ElementRef<'_>, columns: usize, indent: &str) {
        let mut count = 0;
        for cell in cells_of(row) {
            self.out.push_str(indent);
            match cell_align(cell) {
                Some(align) => self
                    .out
                    .push_str(&format!("table.cell(align: {align})[")),
                None => self.out.push('['),
            }
            self.children(cell);
            self.trim_end();
            self.out.push_str("],\n");
            count += 1;
        }
        for _ in count..columns {
            self.out.push_str(indent);
            self.out.push_str("[],\n");
        }
    }
}

fn rows_of<'a>(section: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    section
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|r| r.value().name() == "tr")
}

fn cells_of<'a>(row: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| matches!(c.value().name(), "th" | "td"))
}

fn cell_align(cell: ElementRef<'_>) -> Option<&'static str> {
    let style = cell.value().attr("style")?;
    let value = style.split(';').find_map(|decl| {
        let (property, value) = decl.split_once(':')?;
        (property.trim() == "text-align").then(|| value.trim())
    })?;
    match value {
        "left" => Some("left"),
        "center" => Some("center"),
        "right" => Some("right"),
        _ => None,
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// Push `text` as a Typst string literal.
fn push_string(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typst(body: &str) -> String {
        body_to_typst(&Html::parse_document(&format!(
            "<!DOCTYPE html><html><head><title>t</title></head><body>{body}</body></html>"
        )))
    }

    #[test]
    fn empty_body() {
        assert_eq!(typst(""), "");
    }

    #[test]
    fn paragraphs() {
        assert_eq!(
            typst("<p>Hello world</p>\n<p>Second</p>\n"),
            "#\"Hello world\"\n\n#\"Second\"\n\n"
        );
    }

    #[test]
    fn inline_formatting_keeps_spaces_between_elements() {
        assert_eq!(
            typst("<p>a <strong>b</strong> <em>c</em> <del>d</del></p>"),
            "#\"a \"#strong[#\"b\"]#\" \"#emph[#\"c\"]#\" \"#strike[#\"d\"]\n\n"
        );
    }

    #[test]
    fn markup_characters_are_literal() {
        assert_eq!(
            typst("<p>a * b # c = \"q\" \\ d</p>"),
            "#\"a * b # c = \\\"q\\\" \\\\ d\"\n\n"
        );
    }

    #[test]
    fn heading_with_label() {
        assert_eq!(
            typst("<h1 id=\"intro\">Intro</h1>"),
            "#heading(level: 1)[#\"Intro\"] <intro>\n\n"
        );
    }

    #[test]
    fn internal_links_only_to_known_labels() {
        let out = typst("<h2 id=\"a\">A</h2>\n<p><a href=\"#a\">go</a> <a href=\"#missing\">x</a></p>");
        assert!(out.contains("#link(<a>)[#\"go\"]#\" \"#\"x\""), "got: {out}");
    }

    #[test]
    fn duplicate_ids_are_not_labels() {
        let out = typst("<h1 id=\"a\">One</h1><h1 id=\"a\">Two</h1><p><a href=\"#a\">x</a></p>");
        assert!(!out.contains("<a>"), "got: {out}");
    }

    #[test]
    fn ids_typst_cannot_label_fall_back_to_text() {
        let out = typst("<h1 id=\"area²\">Scope</h1><p><a href=\"#area²\">see</a></p>");
        assert_eq!(out, "#heading(level: 1)[#\"Scope\"]\n\n#\"see\"\n\n");
    }

    #[test]
    fn external_link() {
        assert_eq!(
            typst("<p><a href=\"https://example.com/?q=&quot;x&quot;\">site</a></p>"),
            "#link(\"https://example.com/?q=\\\"x\\\"\")[#\"site\"]\n\n"
        );
    }

    #[test]
    fn code() {
        assert_eq!(
            typst("<pre><code class=\"language-rust\">let x = \"1\";\n</code></pre>\n"),
            "#raw(block: true, lang: \"rust\", \"let x = \\\"1\\\";\")\n\n"
        );
        assert_eq!(
            typst("<pre><code>a\n  b\n</code></pre>"),
            "#raw(block: true, \"a\\n  b\")\n\n"
        );
        assert_eq!(typst("<p><code>x*y</code></p>"), "#raw(\"x*y\")\n\n");
    }

    #[test]
    fn lists() {
        assert_eq!(
            typst("<ul>\n<li>one</li>\n<li>two\n<ul>\n<li>nested</li>\n</ul>\n</li>\n</ul>\n"),
            "#list(\n  [#\"one\"],\n  [#\"two \"\n#list(\n  [#\"nested\"],\n)],\n)\n\n"
        );
        assert_eq!(
            typst("<ol start=\"3\">\n<li>x</li>\n</ol>"),
            "#enum(start: 3,\n  [#\"x\"],\n)\n\n"
        );
        assert_eq!(typst("<ol><li>x</li></ol>"), "#enum(\n  [#\"x\"],\n)\n\n");
    }

    #[test]
    fn task_list_items() {
        let out = typst("<ul>\n<li><input disabled=\"\" type=\"checkbox\" checked=\"\"/>\ndone</li>\n<li><input disabled=\"\" type=\"checkbox\"/>\ntodo</li>\n</ul>");
        assert!(out.contains("[#\"[x]\"#\" done\"]"), "got: {out}");
        assert!(out.contains("[#\"[ ]\"#\" todo\"]"), "got: {out}");
    }

    #[test]
    fn table_with_header_alignment_and_short_rows() {
        let out = typst(
            "<table><thead><tr><th>A</th><th style=\"text-align: center\">B</th></tr></thead>\
             <tbody>\n<tr><td>1</td></tr>\n</tbody></table>",
        );
        assert_eq!(
            out,
            "#table(\n  columns: table-columns(2),\n  table.header(\n    [#\"A\"],\n    table.cell(align: center)[#\"B\"],\n  ),\n  [#\"1\"],\n  [],\n)\n\n"
        );
    }

    #[test]
    fn blockquote_and_rule() {
        assert_eq!(
            typst("<blockquote>\n<p>quoted</p>\n</blockquote>\n<hr />\n"),
            "#quote(block: true)[#\"quoted\"]\n\n#hrule()\n\n"
        );
    }

    #[test]
    fn footnotes_link_to_definitions() {
        let out = typst(
            "<p>x<sup class=\"footnote-reference\"><a href=\"#1\">1</a></sup></p>\n\
             <div class=\"footnote-definition\" id=\"1\"><sup class=\"footnote-definition-label\">1</sup>\n<p>Note</p>\n</div>\n",
        );
        assert!(out.contains("#super[#link(<1>)[#\"1\"]]"), "got: {out}");
        assert!(out.contains("#metadata(none) <1>"), "got: {out}");
        assert!(out.contains("#\"Note\""), "got: {out}");
    }

    #[test]
    fn images_fall_back_to_alt_text() {
        assert_eq!(
            typst("<p><img src=\"chart.png\" alt=\"Maturity chart\" /></p>"),
            "#emph[#\"Maturity chart\"]\n\n"
        );
    }

    #[test]
    fn scripts_are_ignored() {
        assert_eq!(typst("<script>alert(1)</script><p>ok</p>"), "#\"ok\"\n\n");
    }
}
