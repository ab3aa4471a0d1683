//! HTML parser for structured page extraction
//!
//! This module turns a fetched HTML document into a [`PageContent`]:
//! - Noise elements (scripts, navigation, boilerplate blocks) are removed first
//! - A content root is chosen from a prioritized list of strategies
//! - Headings, paragraphs, lists, tables and images come from the root
//! - Title, meta description and outbound links come from the whole document
//!
//! Stripping detaches subtrees, but `Html::select` still walks detached
//! nodes. Every query after stripping therefore starts from
//! `Html::root_element`, which only reaches attached descendants.
//!
//! Every extracted string passes through [`normalize_text`].

use crate::model::{Heading, Image, Link, ListBlock, ListKind, PageContent};
use crate::text::{normalize_block, normalize_text, truncate_chars};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Paragraphs at or below this many characters are dropped
pub const MIN_PARAGRAPH_CHARS: usize = 40;
/// List items at or below this many characters are dropped
pub const MIN_LIST_ITEM_CHARS: usize = 15;
pub const MAX_LISTS: usize = 20;
pub const MAX_TABLES: usize = 10;
pub const MAX_TABLE_ROWS: usize = 50;
/// Images need at least this much alt text
pub const MIN_IMAGE_ALT_CHARS: usize = 5;
pub const MAX_IMAGES: usize = 20;
pub const MAX_LINK_TEXT_CHARS: usize = 100;
pub const MAX_LINKS: usize = 200;

/// Elements that never carry page content
const NOISE_TAGS: &str =
    "script, style, noscript, template, iframe, svg, form, nav, footer, header, aside";

/// `id`/`class` fragments marking boilerplate blocks
const BOILERPLATE_MARKERS: &[&str] = &[
    "cookie",
    "banner",
    "sidebar",
    "advert",
    "popup",
    "newsletter",
    "breadcrumb",
    "share",
    "social",
    "related",
    "comments",
    "menu",
];

/// Structural elements exempt from marker-based removal
const PROTECTED_TAGS: &[&str] = &["html", "head", "body", "main", "article"];

/// Content root strategies in priority order; the first non-empty match wins
const CONTENT_ROOTS: &[&str] = &[
    "article",
    "main",
    "[role=main]",
    "#content",
    ".content",
    "#main-content",
    ".post-content",
    ".entry-content",
    ".article-body",
    "#mw-content-text",
    "body",
];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid") // Static pattern, safe to panic
}

static NOISE: LazyLock<Selector> = LazyLock::new(|| selector(NOISE_TAGS));
static MARKED: LazyLock<Selector> = LazyLock::new(|| selector("[id], [class]"));
static ROOTS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| CONTENT_ROOTS.iter().map(|css| selector(css)).collect());
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static OG_TITLE: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property="og:title"]"#));
static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[name="description"], meta[name="Description"]"#));
static OG_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[property="og:description"]"#));
static HEADINGS: LazyLock<Selector> = LazyLock::new(|| selector("h1, h2, h3, h4, h5, h6"));
static PARAGRAPHS: LazyLock<Selector> = LazyLock::new(|| selector("p"));
static LISTS: LazyLock<Selector> = LazyLock::new(|| selector("ul, ol"));
static TABLES: LazyLock<Selector> = LazyLock::new(|| selector("table"));
static ROWS: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static IMAGES: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static ANCHORS: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

/// Parses an HTML response into structured page content
///
/// # Arguments
///
/// * `html` - The response body
/// * `page_url` - The URL that was requested (stored in the result)
/// * `base_url` - The URL relative links resolve against (after redirects)
/// * `content_type` - The response Content-Type, if any
///
/// # Returns
///
/// * `Ok(PageContent)` - Successfully parsed page
/// * `Err(String)` - The response is not an HTML document
///
/// # Example
///
/// ```
/// use plethora::crawler::extract_page;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// let page = extract_page(html, "https://example.com/", &base, Some("text/html")).unwrap();
/// assert_eq!(page.title, "Test");
/// assert_eq!(page.links[0].url, "https://example.com/page");
/// ```
pub fn extract_page(
    html: &str,
    page_url: &str,
    base_url: &Url,
    content_type: Option<&str>,
) -> Result<PageContent, String> {
    if let Some(content_type) = content_type {
        if !is_html_content_type(content_type) {
            return Err(format!("Unsupported content type: {}", content_type));
        }
    }
    if html.trim().is_empty() {
        return Err("Empty response body".to_string());
    }

    let mut document = Html::parse_document(html);
    strip_noise(&mut document);

    let attached = document.root_element();
    let root = select_content_root(attached);

    Ok(PageContent {
        url: page_url.to_string(),
        title: extract_title(attached),
        meta_description: extract_description(attached),
        headings: root.map(extract_headings).unwrap_or_default(),
        text: root.map(extract_paragraphs).unwrap_or_default(),
        lists: root.map(extract_lists).unwrap_or_default(),
        tables: root.map(extract_tables).unwrap_or_default(),
        images: root.map(|r| extract_images(r, base_url)).unwrap_or_default(),
        links: extract_links(attached, base_url),
    })
}

/// Returns true for HTML and XHTML media types
pub fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Detaches noise elements and boilerplate blocks from the tree
fn strip_noise(document: &mut Html) {
    let mut doomed: Vec<_> = document.select(&NOISE).map(|el| el.id()).collect();
    doomed.extend(
        document
            .select(&MARKED)
            .filter(|el| is_boilerplate(el))
            .map(|el| el.id()),
    );

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn is_boilerplate(element: &ElementRef) -> bool {
    let value = element.value();
    if PROTECTED_TAGS.contains(&value.name()) {
        return false;
    }

    let marked = |token: &str| {
        let token = token.to_ascii_lowercase();
        BOILERPLATE_MARKERS.iter().any(|marker| token.contains(marker))
    };
    value.id().is_some_and(marked) || value.classes().any(marked)
}

/// Picks the first root strategy that matches an element with visible text
///
/// Falls back to `<body>` even when it has no text, so images and tables on
/// text-less pages are still found.
fn select_content_root(document: ElementRef<'_>) -> Option<ElementRef<'_>> {
    ROOTS
        .iter()
        .find_map(|sel| {
            document
                .select(sel)
                .find(|el| el.text().any(|t| !t.trim().is_empty()))
        })
        .or_else(|| document.select(&BODY).next())
}

fn element_text(element: ElementRef) -> String {
    normalize_text(&element.text().collect::<String>())
}

fn meta_content(document: ElementRef, sel: &Selector) -> Option<String> {
    document
        .select(sel)
        .filter_map(|el| el.value().attr("content"))
        .map(normalize_text)
        .find(|s| !s.is_empty())
}

fn extract_title(document: ElementRef) -> String {
    document
        .select(&TITLE)
        .map(element_text)
        .find(|s| !s.is_empty())
        .or_else(|| meta_content(document, &OG_TITLE))
        .unwrap_or_default()
}

fn extract_description(document: ElementRef) -> String {
    meta_content(document, &DESCRIPTION)
        .or_else(|| meta_content(document, &OG_DESCRIPTION))
        .unwrap_or_default()
}

fn extract_headings(root: ElementRef) -> Vec<Heading> {
    root.select(&HEADINGS)
        .filter_map(|el| {
            let level = el.value().name()[1..].parse::<u8>().ok()?;
            let text = element_text(el);
            (!text.is_empty()).then_some(Heading { level, text })
        })
        .collect()
}

/// Joins kept paragraphs one per line
fn extract_paragraphs(root: ElementRef) -> String {
    let kept: Vec<String> = root
        .select(&PARAGRAPHS)
        .map(element_text)
        .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect();
    normalize_block(&kept.join("\n"))
}

fn child_elements<'a>(
    element: ElementRef<'a>,
    names: &'a [&'a str],
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| names.contains(&child.value().name()))
}

fn extract_lists(root: ElementRef) -> Vec<ListBlock> {
    root.select(&LISTS)
        .filter_map(|list| {
            let kind = if list.value().name() == "ol" {
                ListKind::Ordered
            } else {
                ListKind::Unordered
            };
            let items: Vec<String> = child_elements(list, &["li"])
                .map(element_text)
                .filter(|item| item.chars().count() > MIN_LIST_ITEM_CHARS)
                .collect();
            (!items.is_empty()).then_some(ListBlock { kind, items })
        })
        .take(MAX_LISTS)
        .collect()
}

fn extract_tables(root: ElementRef) -> Vec<Vec<Vec<String>>> {
    root.select(&TABLES)
        .take(MAX_TABLES)
        .map(|table| {
            table
                .select(&ROWS)
                .map(|row| {
                    child_elements(row, &["th", "td"])
                        .map(element_text)
                        .collect::<Vec<_>>()
                })
                .filter(|cells| cells.iter().any(|c| !c.is_empty()))
                .take(MAX_TABLE_ROWS)
                .collect()
        })
        .collect()
}

fn extract_images(root: ElementRef, base_url: &Url) -> Vec<Image> {
    root.select(&IMAGES)
        .filter_map(|img| {
            let alt = normalize_text(img.value().attr("alt")?);
            if alt.chars().count() < MIN_IMAGE_ALT_CHARS {
                return None;
            }
            let src = img
                .value()
                .attr("src")
                .filter(|s| !s.trim().is_empty())
                .or_else(|| img.value().attr("data-src"))?;
            let src = resolve_link(src, base_url)?;
            Some(Image { src, alt })
        })
        .take(MAX_IMAGES)
        .collect()
}

fn extract_links(document: ElementRef, base_url: &Url) -> Vec<Link> {
    let mut seen = HashSet::new();
    document
        .select(&ANCHORS)
        .filter_map(|a| {
            let url = resolve_link(a.value().attr("href")?, base_url)?;
            if !seen.insert(url.clone()) {
                return None;
            }
            let text = truncate_chars(&element_text(a), MAX_LINK_TEXT_CHARS);
            Some(Link { text, url })
        })
        .take(MAX_LINKS)
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}
