//! Episode page: metadata, navigation, downloads and streaming mirrors

use super::{episode_number, link_card, parse_details, Links};
use crate::codec::{self, ServerTriple};
use crate::error::{Error, Result};
use crate::html::{
    attr_of, element_text, next_element, select_all, select_first, slug_from_url, text_of,
};
use crate::models::{
    AnimeEpisode, AnimeServers, DownloadQuality, DownloadUrl, EpisodeLinkCard, EpisodeNumberCard,
    Server, ServerQuality,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use scraper::{ElementRef, Html};

/// Label of the navigation link back to the anime page
const SEE_ALL_EPISODES: &str = "See All Episodes";

pub fn episode(html: &Html, episode_id: &str, links: &Links) -> AnimeEpisode {
    let root = html.root_element();
    let mut details = parse_details(&select_all(root, ".infozingle p"), links);

    let mut episode = AnimeEpisode {
        title: text_of(root, ".posttl"),
        release_time: select_first(root, ".kategoz .fa.fa-clock-o")
            .and_then(next_element)
            .map(element_text)
            .unwrap_or_default(),
        default_streaming_url: attr_of(root, ".responsive-embed-stream iframe", "src")
            .unwrap_or_default(),
        servers_href: format!("{}/servers", links.href("episode", episode_id)),
        ..Default::default()
    };

    // Index heuristic: the first link is "previous", the second or third is
    // "next". Breaks if the site adds more navigation links.
    for (index, anchor) in select_all(root, ".flir a").into_iter().enumerate() {
        let card = link_card(anchor, "episode", links);
        if card.title.contains(SEE_ALL_EPISODES) {
            continue;
        }
        let (title, slot) = match index {
            0 => ("Prev", &mut episode.prev_episode),
            1 | 2 => ("Next", &mut episode.next_episode),
            _ => continue,
        };
        *slot = Some(EpisodeLinkCard {
            title: title.to_string(),
            episode_id: card.slug,
            href: card.href,
            otakudesu_url: card.otakudesu_url,
        });
    }
    episode.has_prev_episode = episode.prev_episode.is_some();
    episode.has_next_episode = episode.next_episode.is_some();

    episode.download_url.qualities = select_all(root, ".download ul li")
        .into_iter()
        .map(|li| {
            let mut quality = download_quality(li);
            quality.title = quality.title.replace(' ', "_");
            quality
        })
        .collect();

    episode.info.episode_list = select_all(root, ".keyingpost li")
        .into_iter()
        .filter_map(|li| select_first(li, "a"))
        .map(|anchor| {
            let raw = anchor.value().attr("href").unwrap_or("");
            let episode_id = slug_from_url(raw);
            EpisodeNumberCard {
                title: episode_number(&element_text(anchor)),
                href: links.href("episode", &episode_id),
                otakudesu_url: links.source(raw),
                episode_id,
            }
        })
        .collect();

    episode.info.kind = details.take(&["tipe"]);
    episode.info.credit = details.take(&["credit"]);
    episode.info.encoder = details.take(&["encoder"]);
    episode.info.duration = details.take(&["duration", "durasi"]);
    episode.info.genre_list = details.genre_list;
    episode.info.extra = details.info;

    episode
}

/// `<li>` of a download list: `<strong>` quality, `<i>` size, one `<a>` per host
pub(super) fn download_quality(item: ElementRef<'_>) -> DownloadQuality {
    DownloadQuality {
        title: text_of(item, "strong"),
        size: text_of(item, "i"),
        urls: select_all(item, "a")
            .into_iter()
            .map(|a| DownloadUrl {
                title: element_text(a),
                url: a.value().attr("href").unwrap_or("").trim().to_string(),
            })
            .collect(),
    }
}

/// Streaming mirrors of an episode page, with opaque server ids
///
/// Each mirror link carries a base64 JSON `data-content` holding the
/// admin-ajax parameters `{id, i, q}`.
pub fn servers(html: &Html, links: &Links) -> Result<AnimeServers> {
    let mut result = AnimeServers::default();

    for list in select_all(html.root_element(), ".mirrorstream ul") {
        let mut server_list = Vec::new();
        for anchor in select_all(list, "li a") {
            let content = anchor.value().attr("data-content").unwrap_or("");
            let triple = decode_mirror(content)?;
            let server_id = codec::encode(&triple).into_string();
            server_list.push(Server {
                title: element_text(anchor),
                href: links.href("server", &server_id),
                server_id,
            });
        }

        result.qualities.push(ServerQuality {
            title: quality_title(list),
            server_list,
        });
    }

    Ok(result)
}

/// `Mirror 480p` header text of a mirror list, reduced to `480p`
fn quality_title(list: ElementRef<'_>) -> String {
    let compact = |s: String| s.split_whitespace().collect::<String>();
    let whole = compact(list.text().collect());
    let items = compact(
        select_all(list, "li")
            .into_iter()
            .flat_map(|li| li.text())
            .collect(),
    );

    whole
        .replacen(&items, "", 1)
        .to_lowercase()
        .replace("mirror", "")
}

fn decode_mirror(content: &str) -> Result<ServerTriple> {
    let bytes = STANDARD.decode(content.trim())?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)?;

    let field = |name: &str| match value.get(name) {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    match (field("id"), field("i"), field("q")) {
        (Some(id), Some(i), Some(q)) => ServerTriple::new(id, i, q)
            .map_err(|_| Error::other(format!("unexpected mirror payload: {}", value))),
        _ => Err(Error::other(format!("incomplete mirror payload: {}", value))),
    }
}
