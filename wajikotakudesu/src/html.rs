//! Document access and small HTML helpers shared by the extractors
//!
//! `scraper::Html` is not `Send`, so a fetched page travels through async
//! code as a [`Document`] (the raw HTML) and is parsed inside a
//! synchronous [`Document::query`] closure.

use scraper::{ElementRef, Html, Selector};

/// Value of a stream URL when the embed fragment holds no iframe
pub const NO_IFRAME: &str = "No iframe found";

/// A fetched page
#[derive(Debug, Clone)]
pub struct Document {
    html: String,
    base_url: String,
}

impl Document {
    pub fn new(html: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            base_url: base_url.into(),
        }
    }

    /// Parses the page and runs `f` on the tree
    pub fn query<R>(&self, f: impl FnOnce(&Html) -> R) -> R {
        let tree = Html::parse_document(&self.html);
        f(&tree)
    }

    pub fn raw(&self) -> &str {
        &self.html
    }

    /// Base URL of the site the page came from
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::error!("Invalid selector {:?}: {:?}", css, e);
            None
        }
    }
}

/// All descendants of `scope` matching `css`, in document order
pub fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match parse_selector(css) {
        Some(selector) => scope.select(&selector).collect(),
        None => Vec::new(),
    }
}

/// First descendant of `scope` matching `css`
pub fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = parse_selector(css)?;
    scope.select(&selector).next()
}

/// Concatenated text of an element, trimmed
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of every element matching `css`, concatenated and trimmed
pub fn text_of(scope: ElementRef<'_>, css: &str) -> String {
    select_all(scope, css)
        .into_iter()
        .map(|e| e.text().collect::<String>())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Attribute of the first element matching `css`
pub fn attr_of(scope: ElementRef<'_>, css: &str, attr: &str) -> Option<String> {
    select_first(scope, css)
        .and_then(|e| e.value().attr(attr))
        .map(|v| v.trim().to_string())
}

/// Next element sibling of `element`
pub fn next_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// Last path segment of a URL, ignoring a trailing slash
///
/// `https://otakudesu.cloud/anime/kimetsu-no-yaiba-sub-indo/` → `kimetsu-no-yaiba-sub-indo`
pub fn slug_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or("");
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string()
}

/// Absolute URL of an href found on the site
pub fn source_url(base_url: &str, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() || href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href)
    }
}

/// `src` of the first iframe of an HTML fragment, or [`NO_IFRAME`]
pub fn iframe_src(fragment: &str) -> String {
    let tree = Html::parse_fragment(fragment);
    select_first(tree.root_element(), "iframe")
        .and_then(|iframe| iframe.value().attr("src"))
        .map(|src| src.trim().to_string())
        .filter(|src| !src.is_empty())
        .unwrap_or_else(|| NO_IFRAME.to_string())
}

/// `"Tanggal Rilis"` → `"tanggalRilis"`
pub fn to_camel_case(label: &str) -> String {
    let mut out = String::new();
    for (i, word) in label
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        let lower = word.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

/// First run of digits in `text`
///
/// `"Episode 12"` → `Some(12)`, `"Unknown"` → `None`
pub fn first_number(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
