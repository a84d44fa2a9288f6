//! Anime cards, one reader per card layout the site uses

use super::{genre_card, link_card, Links};
use crate::html::{attr_of, element_text, first_number, select_all, slug_from_url, text_of};
use crate::models::{
    AnimeLinkCard, CompletedAnimeCard, GenreAnimeCard, OngoingAnimeCard, RecommendedAnimeCard,
    SearchAnimeCard, Synopsis,
};
use scraper::ElementRef;

struct CardLink {
    anime_id: String,
    href: String,
    otakudesu_url: String,
}

fn card_link(raw: &str, links: &Links) -> CardLink {
    let anime_id = slug_from_url(raw);
    CardLink {
        href: links.href("anime", &anime_id),
        otakudesu_url: links.source(raw),
        anime_id,
    }
}

/// `.detpost` card of the ongoing listings
pub fn ongoing_card(card: ElementRef<'_>, links: &Links) -> OngoingAnimeCard {
    let link = card_link(&attr_of(card, "a", "href").unwrap_or_default(), links);
    OngoingAnimeCard {
        title: text_of(card, ".jdlflm"),
        poster: attr_of(card, "img", "src").unwrap_or_default(),
        episodes: first_number(&text_of(card, ".epz")),
        release_day: text_of(card, ".epztipe"),
        latest_release_date: text_of(card, ".newnime"),
        anime_id: link.anime_id,
        href: link.href,
        otakudesu_url: link.otakudesu_url,
    }
}

/// `.detpost` card of the completed listings, where `.epztipe` holds the score
pub fn completed_card(card: ElementRef<'_>, links: &Links) -> CompletedAnimeCard {
    let link = card_link(&attr_of(card, "a", "href").unwrap_or_default(), links);
    CompletedAnimeCard {
        title: text_of(card, ".jdlflm"),
        poster: attr_of(card, "img", "src").unwrap_or_default(),
        episodes: first_number(&text_of(card, ".epz")),
        score: text_of(card, ".epztipe"),
        last_release_date: text_of(card, ".newnime"),
        anime_id: link.anime_id,
        href: link.href,
        otakudesu_url: link.otakudesu_url,
    }
}

/// `ul.chivsrc li` search result
///
/// The `.set` rows read `Genres : ...`, `Status : ...`, `Rating : ...`.
pub fn search_card(card: ElementRef<'_>, links: &Links) -> SearchAnimeCard {
    let link = card_link(&attr_of(card, "h2 a", "href").unwrap_or_default(), links);
    let mut result = SearchAnimeCard {
        title: text_of(card, "h2 a"),
        poster: attr_of(card, "img", "src").unwrap_or_default(),
        anime_id: link.anime_id,
        href: link.href,
        otakudesu_url: link.otakudesu_url,
        ..Default::default()
    };

    for row in select_all(card, ".set") {
        let text = element_text(row);
        let Some((label, value)) = text.split_once(':') else {
            continue;
        };
        match label.trim().to_lowercase().as_str() {
            "genres" | "genre" => {
                result.genre_list = select_all(row, "a")
                    .into_iter()
                    .map(|a| genre_card(a, links))
                    .collect();
            }
            "status" => result.status = value.trim().to_string(),
            "rating" => result.score = value.trim().to_string(),
            _ => {}
        }
    }

    result
}

/// `.venser .col-anime` card of a genre listing
pub fn genre_anime_card(card: ElementRef<'_>, links: &Links) -> GenreAnimeCard {
    let link = card_link(
        &attr_of(card, ".col-anime-title a", "href").unwrap_or_default(),
        links,
    );
    GenreAnimeCard {
        title: text_of(card, ".col-anime-title"),
        poster: attr_of(card, ".col-anime-cover img", "src").unwrap_or_default(),
        studios: text_of(card, ".col-anime-studio"),
        score: text_of(card, ".col-anime-rating"),
        episodes: first_number(&text_of(card, ".col-anime-eps")),
        season: text_of(card, ".col-anime-date"),
        anime_id: link.anime_id,
        href: link.href,
        otakudesu_url: link.otakudesu_url,
        synopsis: synopsis(&select_all(card, ".col-synopsis p"), links),
        genre_list: select_all(card, ".col-anime-genre a")
            .into_iter()
            .map(|a| genre_card(a, links))
            .collect(),
    }
}

/// `.isi-recommend-anime-series .isi-konten` card
pub fn recommended_card(card: ElementRef<'_>, links: &Links) -> RecommendedAnimeCard {
    let raw = attr_of(card, "a", "href").unwrap_or_default();
    let link = card_link(&raw, links);
    RecommendedAnimeCard {
        title: text_of(card, ".judul-recommend-anime-series"),
        poster: attr_of(card, "img", "src").unwrap_or_default(),
        anime_id: link.anime_id,
        href: link.href,
        otakudesu_url: link.otakudesu_url,
    }
}

/// `<a>` pointing to an anime page
pub fn anime_link_card(anchor: ElementRef<'_>, links: &Links) -> AnimeLinkCard {
    let card = link_card(anchor, "anime", links);
    AnimeLinkCard {
        title: card.title,
        anime_id: card.slug,
        href: card.href,
        otakudesu_url: card.otakudesu_url,
    }
}

/// Paragraph texts, and anime pages linked from them
pub fn synopsis(paragraphs: &[ElementRef<'_>], links: &Links) -> Synopsis {
    let mut result = Synopsis::default();

    for paragraph in paragraphs {
        let text = element_text(*paragraph);
        if !text.is_empty() {
            result.paragraphs.push(text);
        }
        for anchor in select_all(*paragraph, "a") {
            let is_anime = anchor
                .value()
                .attr("href")
                .is_some_and(|href| href.contains("/anime/"));
            if is_anime {
                result.connections.push(anime_link_card(anchor, links));
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn links() -> Links {
        Links::new("https://otakudesu.test", "/otakudesu")
    }

    #[test]
    fn test_ongoing_card() {
        let html = Html::parse_fragment(
            r#"<div class="detpost">
                <div class="epz"><i class="fa fa-play"></i> Episode 11</div>
                <div class="epztipe"><i class="fa fa-calendar"></i> Sabtu</div>
                <div class="newnime">01 Des</div>
                <div class="thumb"><a href="https://otakudesu.test/anime/frieren-sub-indo/">
                    <div class="thumbz"><img src="https://img.test/frieren.jpg"><h2 class="jdlflm">Sousou no Frieren</h2></div>
                </a></div>
            </div>"#,
        );
        let card = ongoing_card(html.root_element(), &links());

        assert_eq!(card.title, "Sousou no Frieren");
        assert_eq!(card.poster, "https://img.test/frieren.jpg");
        assert_eq!(card.episodes, Some(11));
        assert_eq!(card.release_day, "Sabtu");
        assert_eq!(card.latest_release_date, "01 Des");
        assert_eq!(card.anime_id, "frieren-sub-indo");
        assert_eq!(card.href, "/otakudesu/anime/frieren-sub-indo");
    }

    #[test]
    fn test_completed_card_reads_score() {
        let html = Html::parse_fragment(
            r#"<div class="detpost">
                <div class="epz">24 Episode</div>
                <div class="epztipe">8.75</div>
                <div class="newnime">22 Mar</div>
                <a href="/anime/bocchi-sub-indo/"><img src="/b.jpg"><h2 class="jdlflm">Bocchi</h2></a>
            </div>"#,
        );
        let card = completed_card(html.root_element(), &links());

        assert_eq!(card.episodes, Some(24));
        assert_eq!(card.score, "8.75");
        assert_eq!(card.last_release_date, "22 Mar");
        assert_eq!(card.otakudesu_url, "https://otakudesu.test/anime/bocchi-sub-indo/");
    }

    #[test]
    fn test_search_card() {
        let html = Html::parse_fragment(
            r#"<li><img src="/n.jpg"><h2><a href="https://otakudesu.test/anime/naruto-sub-indo/">Naruto</a></h2>
                <div class="set"><b>Genres</b> : <a href="/genres/action/">Action</a>, <a href="/genres/comedy/">Comedy</a></div>
                <div class="set"><b>Status</b> : Completed</div>
                <div class="set"><b>Rating</b> : 7.99</div></li>"#,
        );
        let card = search_card(html.root_element(), &links());

        assert_eq!(card.title, "Naruto");
        assert_eq!(card.anime_id, "naruto-sub-indo");
        assert_eq!(card.status, "Completed");
        assert_eq!(card.score, "7.99");
        assert_eq!(card.genre_list.len(), 2);
        assert_eq!(card.genre_list[0].href, "/otakudesu/genres/action");
    }

    #[test]
    fn test_synopsis_connections() {
        let html = Html::parse_fragment(
            r#"<div><p>First part.</p><p>Sequel of <a href="/anime/season-one/">Season One</a> and <a href="/genres/x/">X</a></p><p> </p></div>"#,
        );
        let paragraphs = select_all(html.root_element(), "p");
        let synopsis = synopsis(&paragraphs, &links());

        assert_eq!(synopsis.paragraphs.len(), 2);
        assert_eq!(synopsis.connections.len(), 1);
        assert_eq!(synopsis.connections[0].anime_id, "season-one");
    }
}
