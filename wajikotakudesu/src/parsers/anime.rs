//! Anime detail page

use super::cards::{recommended_card, synopsis};
use super::listing::poster;
use super::{episode_number, parse_details, Links};
use crate::html::{element_text, select_all, slug_from_url};
use crate::models::{AnimeDetails, BatchLinkCard, EpisodeNumberCard};
use scraper::Html;

pub fn anime_details(html: &Html, links: &Links) -> AnimeDetails {
    let root = html.root_element();
    let mut details = parse_details(&select_all(root, ".infozingle p"), links);

    let mut anime = AnimeDetails {
        title: details.take(&["judul"]),
        japanese: details.take(&["japanese"]),
        score: details.take(&["skor"]),
        producers: details.take(&["produser"]),
        kind: details.take(&["tipe"]),
        status: details.take(&["status"]),
        episodes: details.take(&["totalEpisode"]).trim().parse().ok(),
        duration: details.take(&["durasi"]),
        aired: details.take(&["tanggalRilis"]),
        studios: details.take(&["studio"]),
        poster: poster(html, "#venkonten .fotoanime img"),
        synopsis: synopsis(&select_all(root, ".sinopc p"), links),
        genre_list: details.genre_list,
        ..Default::default()
    };

    // First list is the batch link, second the episodes
    for (index, block) in select_all(root, ".episodelist").into_iter().enumerate() {
        for item in select_all(block, "ul li") {
            let Some(anchor) = select_all(item, "a").into_iter().next() else {
                continue;
            };
            let title = element_text(anchor);
            let raw = anchor.value().attr("href").unwrap_or("");
            let slug = slug_from_url(raw);

            match index {
                0 => {
                    anime.batch = Some(BatchLinkCard {
                        title,
                        href: links.href("batch", &slug),
                        otakudesu_url: links.source(raw),
                        batch_id: slug,
                    })
                }
                1 => anime.episode_list.push(EpisodeNumberCard {
                    title: episode_number(&title),
                    href: links.href("episode", &slug),
                    otakudesu_url: links.source(raw),
                    episode_id: slug,
                }),
                _ => {}
            }
        }
    }

    anime.recommended_anime_list = select_all(root, ".isi-recommend-anime-series .isi-konten")
        .into_iter()
        .map(|card| recommended_card(card, links))
        .collect();

    anime
}
