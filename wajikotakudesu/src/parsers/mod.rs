//! Page extractors
//!
//! Each extractor is a plain function from a parsed page to a model. They
//! know the site's markup and nothing about caching or the network; the
//! client runs them as pipeline transforms.

pub mod anime;
pub mod batch;
pub mod cards;
pub mod episode;
pub mod listing;

use crate::html::{
    element_text, select_all, select_first, slug_from_url, source_url, to_camel_case,
};
use crate::models::{GenreLinkCard, Pagination};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Builds the two URLs every card carries: our API href and the site URL
#[derive(Debug, Clone)]
pub struct Links {
    base_url: String,
    route: String,
}

impl Links {
    pub fn new(base_url: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            route: route.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    /// `{route}/{kind}/{slug}`
    pub fn href(&self, kind: &str, slug: &str) -> String {
        format!("{}/{}/{}", self.route, kind, slug)
    }

    /// `{route}/{section}`
    pub fn section(&self, section: &str) -> String {
        format!("{}/{}", self.route, section)
    }

    /// Absolute site URL of an href found on a page
    pub fn source(&self, href: &str) -> String {
        source_url(&self.base_url, href)
    }
}

/// Title, slug and both URLs read from one `<a>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkCard {
    pub title: String,
    pub slug: String,
    pub href: String,
    pub otakudesu_url: String,
}

pub fn link_card(anchor: ElementRef<'_>, kind: &str, links: &Links) -> LinkCard {
    let raw = anchor.value().attr("href").unwrap_or("");
    let slug = slug_from_url(raw);
    LinkCard {
        title: element_text(anchor),
        href: links.href(kind, &slug),
        otakudesu_url: links.source(raw),
        slug,
    }
}

pub fn genre_card(anchor: ElementRef<'_>, links: &Links) -> GenreLinkCard {
    let card = link_card(anchor, "genres", links);
    GenreLinkCard {
        title: card.title,
        genre_id: card.slug,
        href: card.href,
        otakudesu_url: card.otakudesu_url,
    }
}

/// Labelled details (`Judul: ...`) and the genre links among them
#[derive(Debug, Clone, Default)]
pub struct Details {
    pub info: BTreeMap<String, String>,
    pub genre_list: Vec<GenreLinkCard>,
}

impl Details {
    /// Removes and returns the value of the first present key
    pub fn take(&mut self, keys: &[&str]) -> String {
        keys.iter()
            .find_map(|key| self.info.remove(*key))
            .unwrap_or_default()
    }
}

/// Reads `Label: value` rows; rows holding genre links feed `genre_list`
pub fn parse_details(rows: &[ElementRef<'_>], links: &Links) -> Details {
    let mut details = Details::default();

    for row in rows {
        let text = element_text(*row);
        let Some((label, value)) = text.split_once(':') else {
            continue;
        };
        let key = to_camel_case(label);
        if key.is_empty() {
            continue;
        }

        if key.contains("genre") {
            details
                .genre_list
                .extend(select_all(*row, "a").into_iter().map(|a| genre_card(a, links)));
        } else {
            details.info.insert(key, value.trim().to_string());
        }
    }

    details
}

/// Pagination block of the listing pages, `None` when the page has none
pub fn parse_pagination(html: &Html) -> Option<Pagination> {
    let root = html.root_element();
    let block = select_first(root, ".pagination")
        .or_else(|| select_first(root, ".pagenavix"))?;

    let current = select_first(block, ".page-numbers.current")
        .and_then(|e| crate::html::first_number(&element_text(e)))
        .unwrap_or(1);
    let total = select_all(block, ".page-numbers")
        .into_iter()
        .filter_map(|e| crate::html::first_number(&element_text(e)))
        .max()
        .unwrap_or(current)
        .max(current);

    let has_prev_page = select_first(block, ".prev").is_some() || current > 1;
    let has_next_page = select_first(block, ".next").is_some() || current < total;

    Some(Pagination {
        current_page: current,
        total_pages: total,
        has_prev_page,
        prev_page: has_prev_page.then(|| current.saturating_sub(1).max(1)),
        has_next_page,
        next_page: has_next_page.then_some(current + 1),
    })
}

static EPISODE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)episode\s*(\d+)(?:\s|$)").expect("valid regex"));

/// Number following "episode" in a title
///
/// `"Frieren Episode 12 Subtitle Indonesia"` → `Some(12)`. Titles where the
/// word after "episode" is not a plain number (`"Episode 1-12"`) give `None`.
pub fn episode_number(title: &str) -> Option<u32> {
    EPISODE_NUMBER
        .captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
