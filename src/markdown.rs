use std::collections::HashSet;

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

use crate::config::MarkdownConfig;
use crate::template::escape_html;

/// A heading collected for the table of contents.
struct Heading {
    level: u8,
    id: String,
    title: String,
}

/// Render markdown text to an HTML fragment.
pub fn to_html(markdown: &str, config: &MarkdownConfig) -> String {
    let parser = Parser::new_ext(markdown, options(config));
    let mut events = strip_metadata(parser);

    if config.toc {
        let headings = assign_heading_ids(&mut events);
        expand_toc_markers(&mut events, &headings);
    }

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

fn options(config: &MarkdownConfig) -> Options {
    let mut options = Options::empty();
    let toggles = [
        (config.tables, Options::ENABLE_TABLES),
        (config.footnotes, Options::ENABLE_FOOTNOTES),
        (config.strikethrough, Options::ENABLE_STRIKETHROUGH),
        (config.tasklists, Options::ENABLE_TASKLISTS),
        (config.definition_lists, Options::ENABLE_DEFINITION_LIST),
        (config.heading_attributes, Options::ENABLE_HEADING_ATTRIBUTES),
        (config.smart_punctuation, Options::ENABLE_SMART_PUNCTUATION),
        (config.frontmatter, Options::ENABLE_YAML_STYLE_METADATA_BLOCKS),
    ];
    for (enabled, option) in toggles {
        if enabled {
            options.insert(option);
        }
    }
    options
}

/// Drop YAML front matter so it never reaches the output.
fn strip_metadata(parser: Parser<'_>) -> Vec<Event<'_>> {
    let mut in_metadata = false;
    parser
        .filter(|event| match event {
            Event::Start(Tag::MetadataBlock(_)) => {
                in_metadata = true;
                false
            }
            Event::End(TagEnd::MetadataBlock(_)) => {
                in_metadata = false;
                false
            }
            _ => !in_metadata,
        })
        .collect()
}

/// Give every heading a unique id and return them in document order.
///
/// Explicit ids (`# Title {#id}`) are kept as written. Generated ids are a
/// slug of the heading text, suffixed `_1`, `_2`, ... on collision.
fn assign_heading_ids(events: &mut [Event<'_>]) -> Vec<Heading> {
    let mut used = HashSet::new();
    let mut headings = Vec::new();

    let mut i = 0;
    while i < events.len() {
        let Event::Start(Tag::Heading { level, id, .. }) = &events[i] else {
            i += 1;
            continue;
        };
        let level = heading_level_to_u8(*level);
        let explicit = id.as_ref().map(|id| id.to_string());

        let mut title = String::new();
        let mut end = i + 1;
        while end < events.len() && !matches!(events[end], Event::End(TagEnd::Heading(_))) {
            if let Event::Text(text) | Event::Code(text) = &events[end] {
                title.push_str(text);
            }
            end += 1;
        }

        let id = match explicit {
            Some(id) => {
                used.insert(id.clone());
                id
            }
            None => {
                let base = slug::slugify(&title);
                let base = if base.is_empty() { "section".to_string() } else { base };
                unique_id(&base, &mut used)
            }
        };

        if let Event::Start(Tag::Heading { id: slot, .. }) = &mut events[i] {
            *slot = Some(CowStr::from(id.clone()));
        }
        headings.push(Heading { level, id, title });
        i = end;
    }

    headings
}

fn unique_id(base: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut n = 1;
    while used.contains(&candidate) {
        candidate = format!("{base}_{n}");
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}

/// Replace every paragraph consisting solely of `[TOC]` with the table of contents.
fn expand_toc_markers(events: &mut Vec<Event<'_>>, headings: &[Heading]) {
    let mut i = 0;
    while i < events.len() {
        if matches!(events[i], Event::Start(Tag::Paragraph)) {
            if let Some(end) = toc_marker_end(events, i) {
                let toc = toc_html(headings);
                events.splice(i..=end, [Event::Html(CowStr::from(toc))]);
            }
        }
        i += 1;
    }
}

/// Index of the paragraph end if the paragraph starting at `start` is a `[TOC]` marker.
fn toc_marker_end(events: &[Event<'_>], start: usize) -> Option<usize> {
    // The parser may split the brackets into separate text events
    let mut text = String::new();
    for (offset, event) in events[start + 1..].iter().enumerate() {
        match event {
            Event::Text(t) => text.push_str(t),
            Event::End(TagEnd::Paragraph) => {
                return (text.trim() == "[TOC]").then_some(start + 1 + offset);
            }
            _ => return None,
        }
    }
    None
}

fn toc_html(headings: &[Heading]) -> String {
    let mut out = String::from("<div class=\"toc\">\n");
    let mut levels: Vec<u8> = Vec::new();

    for heading in headings {
        match levels.last() {
            Some(&top) if heading.level <= top => {
                out.push_str("</li>\n");
                // Climb out until the heading sits under the nearest shallower one
                while let &[.., parent, top] = levels.as_slice() {
                    if heading.level >= top {
                        break;
                    }
                    if heading.level > parent {
                        if let Some(top) = levels.last_mut() {
                            *top = heading.level;
                        }
                        break;
                    }
                    levels.pop();
                    out.push_str("</ul>\n</li>\n");
                }
                if let [base] = levels.as_mut_slice() {
                    *base = (*base).min(heading.level);
                }
            }
            _ => {
                out.push_str("<ul>\n");
                levels.push(heading.level);
            }
        }
        out.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            escape_html(&heading.id),
            escape_html(&heading.title)
        ));
    }

    if !levels.is_empty() {
        out.push_str("</li>\n");
        for _ in 1..levels.len() {
            out.push_str("</ul>\n</li>\n");
        }
        out.push_str("</ul>\n");
    }

    out.push_str("</div>\n");
    out
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
