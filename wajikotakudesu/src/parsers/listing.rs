//! Listing pages: home, schedule, A–Z list, genres, paginated listings, search

use super::cards::{anime_link_card, completed_card, genre_anime_card, ongoing_card, search_card};
use super::{genre_card, parse_pagination, Links};
use crate::html::{attr_of, select_all, text_of};
use crate::models::{
    AllAnimes, AllGenres, AnimeLetterGroup, CompletedAnimeCard, GenreAnimeCard, Home,
    OngoingAnimeCard, Paged, Schedule, ScheduleDay, SearchResults,
};
use scraper::Html;

/// Front page: the first `.venz` block is ongoing, the second completed
pub fn home(html: &Html, links: &Links) -> Home {
    let root = html.root_element();
    let mut home = Home::default();
    home.ongoing.href = links.section("ongoing");
    home.completed.href = links.section("completed");

    for (index, anchor) in select_all(root, ".rapi > a").into_iter().enumerate() {
        let url = links.source(anchor.value().attr("href").unwrap_or(""));
        match index {
            0 => home.ongoing.otakudesu_url = url,
            1 => home.completed.otakudesu_url = url,
            _ => {}
        }
    }

    for (index, block) in select_all(root, ".venz").into_iter().enumerate() {
        let cards = select_all(block, "ul li .detpost");
        match index {
            0 => home
                .ongoing
                .anime_list
                .extend(cards.into_iter().map(|c| ongoing_card(c, links))),
            1 => home
                .completed
                .anime_list
                .extend(cards.into_iter().map(|c| completed_card(c, links))),
            _ => {}
        }
    }

    home
}

pub fn schedule(html: &Html, links: &Links) -> Schedule {
    let days = select_all(html.root_element(), ".kglist321")
        .into_iter()
        .map(|block| ScheduleDay {
            day: text_of(block, "h2"),
            anime_list: select_all(block, "ul li a")
                .into_iter()
                .map(|a| anime_link_card(a, links))
                .collect(),
        })
        .collect();

    Schedule { days }
}

pub fn all_animes(html: &Html, links: &Links) -> AllAnimes {
    let list = select_all(html.root_element(), ".bariskelom")
        .into_iter()
        .map(|block| AnimeLetterGroup {
            start_with: text_of(block, ".barispenz a"),
            anime_list: select_all(block, ".jdlbar a")
                .into_iter()
                .map(|a| anime_link_card(a, links))
                .collect(),
        })
        .collect();

    AllAnimes { list }
}

pub fn all_genres(html: &Html, links: &Links) -> AllGenres {
    AllGenres {
        genre_list: select_all(html.root_element(), ".genres li a")
            .into_iter()
            .map(|a| genre_card(a, links))
            .collect(),
    }
}

pub fn ongoing(html: &Html, links: &Links) -> Paged<OngoingAnimeCard> {
    Paged {
        anime_list: select_all(html.root_element(), ".venutama ul li")
            .into_iter()
            .map(|li| ongoing_card(li, links))
            .collect(),
        pagination: parse_pagination(html),
    }
}

pub fn completed(html: &Html, links: &Links) -> Paged<CompletedAnimeCard> {
    Paged {
        anime_list: select_all(html.root_element(), ".venutama ul li")
            .into_iter()
            .map(|li| completed_card(li, links))
            .collect(),
        pagination: parse_pagination(html),
    }
}

pub fn search(html: &Html, links: &Links) -> SearchResults {
    SearchResults {
        anime_list: select_all(html.root_element(), "ul.chivsrc li")
            .into_iter()
            .map(|li| search_card(li, links))
            .collect(),
    }
}

pub fn genre_animes(html: &Html, links: &Links) -> Paged<GenreAnimeCard> {
    Paged {
        anime_list: select_all(html.root_element(), ".venser .col-anime")
            .into_iter()
            .map(|card| genre_anime_card(card, links))
            .collect(),
        pagination: parse_pagination(html),
    }
}

/// Poster of the first image matching `css`, empty when missing
pub(super) fn poster(html: &Html, css: &str) -> String {
    attr_of(html.root_element(), css, "src").unwrap_or_default()
}
