//! Translate the document stylesheet into Typst set and show rules.

use crate::css::{self, Stylesheet};

/// Typst rules equivalent to the print stylesheet, emitted ahead of the body.
///
/// Always defines `hrule()` and `table-columns(n)`, which the body markup calls.
pub fn preamble(sheet: &Stylesheet) -> String {
    let mut out = String::new();

    page_rules(sheet, &mut out);
    body_rules(sheet, &mut out);
    out.push_str("#set par(linebreaks: \"optimized\")\n");
    for level in 1..=6 {
        heading_rules(sheet, level, &mut out);
    }
    table_rules(sheet, &mut out);
    code_rules(sheet, &mut out);
    list_rules(sheet, &mut out);
    quote_rules(sheet, &mut out);
    rule_definition(sheet, &mut out);

    out.push('\n');
    out
}

/// Join `key: value` pairs whose value is present.
fn args(pairs: &[(&str, Option<String>)]) -> Vec<String> {
    pairs
        .iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| format!("{key}: {v}")))
        .collect()
}

fn page_rules(sheet: &Stylesheet, out: &mut String) {
    let mut page = Vec::new();
    if let Some(size) = sheet.get("@page", "size").and_then(css::page_size) {
        page.push(size);
    }
    if let Some(margin) = sheet.get("@page", "margin").and_then(css::edges) {
        page.push(format!("margin: {}", margin.to_typst()));
    }
    if !page.is_empty() {
        out.push_str(&format!("#set page({})\n", page.join(", ")));
    }
}

fn font_list(value: &str) -> Option<String> {
    let families = css::font_families(value);
    match families.as_slice() {
        [] => None,
        [single] => Some(format!("\"{single}\"")),
        many => Some(format!(
            "({})",
            many.iter()
                .map(|f| format!("\"{f}\""))
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}

fn body_rules(sheet: &Stylesheet, out: &mut String) {
    let text = args(&[
        ("font", sheet.get("body", "font-family").and_then(font_list)),
        ("size", sheet.get("body", "font-size").and_then(css::length)),
        ("fill", sheet.get("body", "color").and_then(css::color)),
    ]);
    if !text.is_empty() {
        out.push_str(&format!("#set text({})\n", text.join(", ")));
    }

    if let Some(line_height) = sheet.get("body", "line-height").and_then(css::number) {
        let leading = (line_height - 1.0).max(0.0);
        out.push_str(&format!("#set par(leading: {}em)\n", css::trim_float(leading)));
    }
}

fn heading_rules(sheet: &Stylesheet, level: u8, out: &mut String) {
    let selector = format!("h{level}");
    let get = |property: &str| sheet.get(&selector, property);

    let size = get("font-size").and_then(css::length);
    let sticky = get("page-break-after")
        .or_else(|| get("break-after"))
        .filter(|v| v.trim() == "avoid")
        .map(|_| "true".to_string());
    let block = args(&[
        ("above", get("margin-top").and_then(css::length)),
        ("below", get("margin-bottom").and_then(css::length)),
        ("sticky", sticky),
        (
            "stroke",
            get("border-bottom")
                .and_then(css::border)
                .map(|b| format!("(bottom: {b})")),
        ),
        (
            "inset",
            get("padding-bottom")
                .and_then(css::length)
                .map(|p| format!("(bottom: {p})")),
        ),
    ]);

    if size.is_none() && block.is_empty() {
        return;
    }

    out.push_str(&format!("#show heading.where(level: {level}): it => {{\n"));
    if let Some(size) = size {
        out.push_str(&format!("  set text(size: {size})\n"));
    }
    let mut block_args = vec!["width: 100%".to_string()];
    block_args.extend(block);
    out.push_str(&format!("  block({}, it)\n}}\n", block_args.join(", ")));
}

fn table_rules(sheet: &Stylesheet, out: &mut String) {
    let header_fill = sheet
        .get("table th", "background-color")
        .and_then(css::color)
        .map(|c| format!("(_, y) => if y == 0 {{ {c} }}"));
    let align = sheet
        .get("table td", "text-align")
        .filter(|v| matches!(v.trim(), "left" | "center" | "right"))
        .map(|v| v.trim().to_string());
    let table = args(&[
        ("stroke", sheet.get("table td", "border").and_then(css::border)),
        (
            "inset",
            sheet
                .get("table td", "padding")
                .and_then(css::edges)
                .map(|e| e.to_typst()),
        ),
        ("fill", header_fill),
        ("align", align),
    ]);
    if !table.is_empty() {
        out.push_str(&format!("#set table({})\n", table.join(", ")));
    }

    if sheet
        .get("table th", "font-weight")
        .is_some_and(|w| matches!(w.trim(), "bold" | "bolder" | "700" | "800" | "900"))
    {
        out.push_str("#show table.cell.where(y: 0): set text(weight: \"bold\")\n");
    }

    let margin = sheet.get("table", "margin").and_then(css::edges);
    let unbreakable = sheet
        .get("table", "page-break-inside")
        .filter(|v| v.trim() == "avoid")
        .map(|_| "false".to_string());
    let block = args(&[
        ("above", margin.as_ref().map(|m| m.top.clone())),
        ("below", margin.as_ref().map(|m| m.bottom.clone())),
        ("breakable", unbreakable),
    ]);
    if !block.is_empty() {
        out.push_str(&format!("#show table: set block({})\n", block.join(", ")));
    }

    let full_width = sheet
        .get("table", "width")
        .is_some_and(|w| w.trim() == "100%");
    if full_width {
        out.push_str("#let table-columns(n) = (1fr,) * n\n");
    } else {
        out.push_str("#let table-columns(n) = n\n");
    }
}

fn code_rules(sheet: &Stylesheet, out: &mut String) {
    let text = args(&[
        ("font", sheet.get("code", "font-family").and_then(font_list)),
        ("size", sheet.get("code", "font-size").and_then(css::length)),
    ]);
    if !text.is_empty() {
        out.push_str(&format!("#show raw: set text({})\n", text.join(", ")));
    }

    let padding = sheet.get("code", "padding").and_then(css::edges);
    let inline = args(&[
        ("fill", sheet.get("code", "background-color").and_then(css::color)),
        ("inset", padding.as_ref().map(|p| format!("(x: {})", p.left))),
        ("outset", padding.as_ref().map(|p| format!("(y: {})", p.top))),
    ]);
    if !inline.is_empty() {
        out.push_str(&format!(
            "#show raw.where(block: false): box.with({})\n",
            inline.join(", ")
        ));
    }

    let unbreakable = sheet
        .get("pre", "page-break-inside")
        .filter(|v| v.trim() == "avoid")
        .map(|_| "false".to_string());
    let block = args(&[
        ("fill", sheet.get("pre", "background-color").and_then(css::color)),
        (
            "inset",
            sheet.get("pre", "padding").and_then(css::edges).map(|e| e.to_typst()),
        ),
        ("breakable", unbreakable),
    ]);
    if !block.is_empty() {
        out.push_str(&format!(
            "#show raw.where(block: true): block.with(width: 100%, {})\n",
            block.join(", ")
        ));
    }
}

fn list_rules(sheet: &Stylesheet, out: &mut String) {
    // Marker and gap sit inside the CSS padding
    let indent = sheet
        .get("ul", "padding-left")
        .and_then(css::length)
        .map(|p| format!("{p} - 1em"));
    let spacing = sheet
        .get("li", "margin")
        .and_then(css::edges)
        .map(|m| format!("{} + {}", m.top, m.bottom));
    let list = args(&[("indent", indent), ("spacing", spacing)]);
    if !list.is_empty() {
        let list = list.join(", ");
        out.push_str(&format!("#set list({list})\n#set enum({list})\n"));
    }
}

fn quote_rules(sheet: &Stylesheet, out: &mut String) {
    let get = |property: &str| sheet.get("blockquote", property);
    let margin = get("margin").and_then(css::edges);
    let block = args(&[
        (
            "stroke",
            get("border-left")
                .and_then(css::border)
                .map(|b| format!("(left: {b})")),
        ),
        (
            "inset",
            get("padding-left")
                .and_then(css::length)
                .map(|p| format!("(left: {p})")),
        ),
        ("above", margin.as_ref().map(|m| m.top.clone())),
        ("below", margin.as_ref().map(|m| m.bottom.clone())),
    ]);
    let fill = get("color").and_then(css::color);
    if block.is_empty() && fill.is_none() {
        return;
    }

    let body = match fill {
        Some(fill) => format!("text(fill: {fill}, it.body)"),
        None => "it.body".to_string(),
    };
    let mut block_args = block;
    block_args.push(body);
    out.push_str(&format!(
        "#show quote.where(block: true): it => block({})\n",
        block_args.join(", ")
    ));
}

fn rule_definition(sheet: &Stylesheet, out: &mut String) {
    let stroke = sheet
        .get("hr", "border-top")
        .and_then(css::border)
        .unwrap_or_else(|| "0.5pt + gray".to_string());
    let margin = sheet.get("hr", "margin").and_then(css::edges);
    let mut block = args(&[
        ("above", margin.as_ref().map(|m| m.top.clone())),
        ("below", margin.as_ref().map(|m| m.bottom.clone())),
    ]);
    block.push(format!("line(length: 100%, stroke: {stroke})"));
    out.push_str(&format!("#let hrule() = block({})\n", block.join(", ")));
}
