//! Batch download page

use super::episode::download_quality;
use super::listing::poster;
use super::{genre_card, Links};
use crate::html::{element_text, next_element, select_all, select_first, to_camel_case};
use crate::models::{AnimeBatch, DownloadFormat};
use scraper::{ElementRef, Html, Node};
use std::collections::BTreeMap;

pub fn batch(html: &Html, links: &Links) -> AnimeBatch {
    let root = html.root_element();
    let mut info = select_first(root, ".animeinfo .infos")
        .map(info_lines)
        .unwrap_or_default();

    let mut take = |key: &str| info.remove(key).unwrap_or_default();
    let mut batch = AnimeBatch {
        title: take("judul"),
        score: take("rating"),
        episodes: take("episodes").trim().parse().ok(),
        japanese: take("japanese"),
        kind: take("type"),
        duration: take("duration"),
        studios: take("studios"),
        producers: take("producers"),
        aired: take("aired"),
        credit: take("credit"),
        poster: poster(html, ".animeinfo img"),
        genre_list: select_all(root, ".animeinfo .infos a")
            .into_iter()
            .map(|a| genre_card(a, links))
            .collect(),
        ..Default::default()
    };
    batch.extra = info;

    batch.download_url.formats = select_all(root, ".batchlink h4")
        .into_iter()
        .map(|heading| DownloadFormat {
            title: element_text(heading),
            qualities: next_element(heading)
                .map(|list| select_all(list, "li").into_iter().map(download_quality).collect())
                .unwrap_or_default(),
        })
        .collect();

    batch
}

/// `<br>`-separated `Label: value` lines of the info box, genres left out
fn info_lines(infos: ElementRef<'_>) -> BTreeMap<String, String> {
    let mut text = String::new();
    for node in infos.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(&t.replace('\n', " ")),
            Node::Element(e) if e.name() == "br" => text.push('\n'),
            _ => {}
        }
    }

    text.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(label, value)| (to_camel_case(label), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty() && !key.contains("genre"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::Scraped;

    const PAGE: &str = r#"<html><body>
        <div class="animeinfo"><img src="https://img.test/bocchi.jpg">
          <div class="infos">
            <b>Judul</b>: Bocchi the Rock!<br>
            <b>Japanese</b>: ぼっち・ざ・ろっく！<br>
            <b>Type</b>: TV<br>
            <b>Episodes</b>: 12<br>
            <b>Rating</b>: 8.80<br>
            <b>Genres</b>: <a href="/genres/comedy/">Comedy</a>, <a href="/genres/music/">Music</a><br>
            <b>Duration</b>: 23 Min.<br>
            <b>Studios</b>: CloverWorks<br>
            <b>Season</b>: Fall 2022
          </div>
        </div>
        <div class="batchlink">
          <h4>Bocchi the Rock! Batch Sub Indo</h4>
          <ul>
            <li><strong>Mp4 480p</strong><a href="https://dl.test/1">GoFile</a><i>600 MB</i></li>
            <li><strong>Mp4 720p</strong><a href="https://dl.test/2">GoFile</a><a href="https://dl.test/3">Acefile</a><i>1 GB</i></li>
          </ul>
        </div>
    </body></html>"#;

    #[test]
    fn test_batch_page() {
        let links = Links::new("https://otakudesu.test", "/otakudesu");
        let batch = batch(&Html::parse_document(PAGE), &links);

        assert_eq!(batch.title, "Bocchi the Rock!");
        assert_eq!(batch.japanese, "ぼっち・ざ・ろっく！");
        assert_eq!(batch.kind, "TV");
        assert_eq!(batch.episodes, Some(12));
        assert_eq!(batch.score, "8.80");
        assert_eq!(batch.duration, "23 Min.");
        assert_eq!(batch.studios, "CloverWorks");
        assert_eq!(batch.poster, "https://img.test/bocchi.jpg");
        assert_eq!(batch.extra.get("season").map(String::as_str), Some("Fall 2022"));
        assert!(!batch.extra.contains_key("genres"));
        assert_eq!(batch.genre_list.len(), 2);

        let format = &batch.download_url.formats[0];
        assert_eq!(format.title, "Bocchi the Rock! Batch Sub Indo");
        assert_eq!(format.qualities.len(), 2);
        assert_eq!(format.qualities[1].title, "Mp4 720p");
        assert_eq!(format.qualities[1].urls.len(), 2);
        assert!(!batch.is_empty());
    }

    #[test]
    fn test_missing_markup_is_empty() {
        let links = Links::new("https://otakudesu.test", "/otakudesu");
        assert!(batch(&Html::parse_document("<p>404</p>"), &links).is_empty());
    }
}
