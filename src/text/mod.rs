//! Text normalization for extracted strings
//!
//! Every string that leaves the parser or the search result scraper passes
//! through [`normalize_text`]. Multi-line body text goes through
//! [`normalize_block`], which keeps one line break between non-empty lines.

use regex::Regex;
use std::sync::LazyLock;

/// Leftover markup such as `<br/>` or `</span>` that survived text extraction
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*)?/?>").expect("tag pattern is valid")
});

/// Named and numeric character references
static ENTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z]{2,8});")
        .expect("entity pattern is valid")
});

/// Horizontal whitespace runs, including non-breaking and zero-width spaces
static SPACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s\u{00A0}\u{2000}-\u{200B}\u{202F}\u{205F}\u{3000}\u{FEFF}]+")
        .expect("space pattern is valid")
});

/// Longest run of one repeated symbol kept by [`collapse_repeated_symbols`]
const MAX_SYMBOL_RUN: usize = 3;

/// Cleans a single-line string
///
/// Steps:
/// 1. Decode leftover character references (`&amp;`, `&#39;`, `&nbsp;` ...)
/// 2. Remove leftover markup tags
/// 3. Replace control characters with spaces
/// 4. Collapse runs of the same punctuation or symbol to at most three
/// 5. Collapse whitespace to single spaces and trim
///
/// # Examples
///
/// ```
/// use plethora::text::normalize_text;
///
/// assert_eq!(normalize_text("  Hello&nbsp;&amp;\n  world!!!!!!  "), "Hello & world!!!");
/// assert_eq!(normalize_text("<b>Bold</b> text"), "Bold text");
/// ```
pub fn normalize_text(input: &str) -> String {
    let decoded = decode_entities(input);
    let untagged = TAG_PATTERN.replace_all(&decoded, " ");
    let visible: String = untagged
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let collapsed = collapse_repeated_symbols(&visible);
    SPACE_PATTERN.replace_all(&collapsed, " ").trim().to_string()
}

/// Cleans multi-line text line by line
///
/// Each line is normalized with [`normalize_text`]; blank lines are dropped
/// and the rest are joined with a single `\n`.
pub fn normalize_block(input: &str) -> String {
    input
        .lines()
        .map(normalize_text)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncates to at most `max_chars` characters on a char boundary
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => input[..idx].trim_end().to_string(),
        None => input.to_string(),
    }
}

fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    ENTITY_PATTERN
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let body = &caps[1];
            decode_entity(body).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(body: &str) -> Option<String> {
    if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from);
    }
    if let Some(dec) = body.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32).map(String::from);
    }

    let decoded = match body {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "copy" => "\u{00A9}",
        "reg" => "\u{00AE}",
        "trade" => "\u{2122}",
        _ => return None,
    };
    Some(decoded.to_string())
}

/// Shortens runs like `=======` or `!!!!!!` to [`MAX_SYMBOL_RUN`] characters
fn collapse_repeated_symbols(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous: Option<char> = None;
    let mut run = 0usize;

    for c in input.chars() {
        if Some(c) == previous {
            run += 1;
        } else {
            previous = Some(c);
            run = 1;
        }

        let is_symbol = !c.is_alphanumeric() && !c.is_whitespace();
        if is_symbol && run > MAX_SYMBOL_RUN {
            continue;
        }
        out.push(c);
    }

    out
}
