//! A small CSS reader.
//!
//! Only flat rule sets are understood (`selectors { property: value; }`),
//! which is all the print stylesheet uses. Values are kept as text and
//! converted on demand by the helpers at the bottom of this module.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static RE_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^{}]+)\{([^{}]*)\}").unwrap());
static RE_LENGTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?(?:\d+\.?\d*|\.\d+))(px|pt|cm|mm|in|em|%)?$").unwrap());
static RE_HEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap());

#[derive(Debug, Clone)]
struct Rule {
    selectors: Vec<String>,
    declarations: Vec<(String, String)>,
}

/// Parsed rule sets, in source order.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: Vec<Rule>,
}

impl Stylesheet {
    pub fn parse(css: &str) -> Self {
        let css = RE_COMMENT.replace_all(css, "");
        let rules = RE_RULE
            .captures_iter(&css)
            .map(|caps| Rule {
                selectors: caps[1].split(',').map(normalize_selector).collect(),
                declarations: caps[2]
                    .split(';')
                    .filter_map(|decl| {
                        let (property, value) = decl.split_once(':')?;
                        let property = property.trim().to_ascii_lowercase();
                        let value = value.trim();
                        (!property.is_empty() && !value.is_empty())
                            .then(|| (property, value.to_string()))
                    })
                    .collect(),
            })
            .collect();
        Self { rules }
    }

    /// Value of `property` for exactly `selector`. Later declarations win.
    pub fn get(&self, selector: &str, property: &str) -> Option<&str> {
        let selector = normalize_selector(selector);
        self.rules
            .iter()
            .filter(|rule| rule.selectors.iter().any(|s| *s == selector))
            .flat_map(|rule| rule.declarations.iter())
            .filter(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
            .last()
    }
}

fn normalize_selector(selector: &str) -> String {
    selector.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A CSS length as Typst source (`11pt`, `2cm`, `0.5em`, `100%`).
/// Pixels are converted at 96dpi.
pub fn length(value: &str) -> Option<String> {
    let caps = RE_LENGTH.captures(value.trim())?;
    let number: f64 = caps[1].parse().ok()?;
    match caps.get(2).map(|m| m.as_str()) {
        Some("px") => Some(format!("{}pt", trim_float(number * 0.75))),
        Some(unit) => Some(format!("{}{unit}", trim_float(number))),
        None if number == 0.0 => Some("0pt".to_string()),
        None => None,
    }
}

/// A unitless number, e.g. a `line-height` multiplier.
pub fn number(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

/// A CSS colour as Typst source, or `none` for `transparent`.
pub fn color(value: &str) -> Option<String> {
    let value = value.trim();
    if RE_HEX.is_match(value) {
        return Some(format!("rgb(\"{value}\")"));
    }
    let named = match value.to_ascii_lowercase().as_str() {
        "transparent" => "none",
        "black" => "black",
        "white" => "white",
        "gray" | "grey" => "gray",
        "silver" => "silver",
        "red" => "red",
        "green" => "green",
        "blue" => "blue",
        _ => return None,
    };
    Some(named.to_string())
}

/// A border shorthand (`1px solid #ddd`) as a Typst stroke, `none` when the
/// border is switched off.
pub fn border(value: &str) -> Option<String> {
    let mut width = None;
    let mut paint = None;
    for token in value.split_whitespace() {
        match token {
            "none" | "hidden" => return Some("none".to_string()),
            _ => {
                if let Some(len) = length(token) {
                    width = Some(len);
                } else if let Some(c) = color(token) {
                    paint = Some(c);
                }
            }
        }
    }
    match (width, paint) {
        (Some(w), Some(c)) => Some(format!("{w} + {c}")),
        (Some(w), None) => Some(w),
        (None, Some(c)) => Some(format!("0.75pt + {c}")),
        (None, None) => None,
    }
}

/// Top, right, bottom and left edges of a box shorthand.
#[derive(Debug, Clone, PartialEq)]
pub struct Edges {
    pub top: String,
    pub right: String,
    pub bottom: String,
    pub left: String,
}

impl Edges {
    /// Typst dictionary form, collapsed to a single length when uniform.
    pub fn to_typst(&self) -> String {
        if self.top == self.right && self.top == self.bottom && self.top == self.left {
            self.top.clone()
        } else {
            format!(
                "(top: {}, right: {}, bottom: {}, left: {})",
                self.top, self.right, self.bottom, self.left
            )
        }
    }
}

pub fn edges(value: &str) -> Option<Edges> {
    let parts = value
        .split_whitespace()
        .map(length)
        .collect::<Option<Vec<_>>>()?;
    let (top, right, bottom, left) = match parts.as_slice() {
        [all] => (all, all, all, all),
        [vertical, horizontal] => (vertical, horizontal, vertical, horizontal),
        [top, horizontal, bottom] => (top, horizontal, bottom, horizontal),
        [top, right, bottom, left] => (top, right, bottom, left),
        _ => return None,
    };
    Some(Edges {
        top: top.clone(),
        right: right.clone(),
        bottom: bottom.clone(),
        left: left.clone(),
    })
}

/// An `@page { size }` value as Typst `page` arguments.
pub fn page_size(value: &str) -> Option<String> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    let landscape = tokens.iter().any(|t| t.eq_ignore_ascii_case("landscape"));
    let rest: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| !t.eq_ignore_ascii_case("landscape") && !t.eq_ignore_ascii_case("portrait"))
        .collect();

    let mut args = match rest.as_slice() {
        [] => return landscape.then(|| "flipped: true".to_string()),
        [name] => {
            let paper = match name.to_ascii_lowercase().as_str() {
                "letter" => "us-letter".to_string(),
                "legal" => "us-legal".to_string(),
                "ledger" => "us-tabloid".to_string(),
                other if other.len() == 2 && (other.starts_with('a') || other.starts_with('b')) => {
                    other.to_string()
                }
                other => {
                    let side = length(other)?;
                    return Some(format!("width: {side}, height: {side}"));
                }
            };
            format!("paper: \"{paper}\"")
        }
        [width, height] => format!("width: {}, height: {}", length(width)?, length(height)?),
        _ => return None,
    };
    if landscape {
        args.push_str(", flipped: true");
    }
    Some(args)
}

/// Font families as a Typst array of lower-cased names.
/// Generic families map to a bundled fallback.
pub fn font_families(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|f| !f.is_empty())
        .map(|f| match f.to_ascii_lowercase().as_str() {
            "sans-serif" | "serif" | "system-ui" => "libertinus serif".to_string(),
            "monospace" => "dejavu sans mono".to_string(),
            other => other.to_string(),
        })
        .collect()
}

pub(crate) fn trim_float(value: f64) -> String {
    let s = format!("{value:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" { "0".to_string() } else { s.to_string() }
}
