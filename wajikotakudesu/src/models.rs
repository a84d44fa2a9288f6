//! Data models for the otakudesu pages
//!
//! Field names serialize in camelCase, which is what API consumers see.
//! Every page result implements [`Scraped`] so the pipeline can reject
//! pages that yielded nothing.

use crate::scrape::Scraped;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Shared cards
// ============================================================================

/// Link to an anime page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnimeLinkCard {
    pub title: String,
    pub anime_id: String,
    pub href: String,
    pub otakudesu_url: String,
}

/// Link to a genre listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenreLinkCard {
    pub title: String,
    pub genre_id: String,
    pub href: String,
    pub otakudesu_url: String,
}

/// Previous/next episode link
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeLinkCard {
    pub title: String,
    pub episode_id: String,
    pub href: String,
    pub otakudesu_url: String,
}

/// Entry of an episode list, titled by its number when one can be read
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeNumberCard {
    pub title: Option<u32>,
    pub episode_id: String,
    pub href: String,
    pub otakudesu_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchLinkCard {
    pub title: String,
    pub batch_id: String,
    pub href: String,
    pub otakudesu_url: String,
}

/// Card of the ongoing listings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OngoingAnimeCard {
    pub title: String,
    pub poster: String,
    pub episodes: Option<u32>,
    pub release_day: String,
    pub latest_release_date: String,
    pub anime_id: String,
    pub href: String,
    pub otakudesu_url: String,
}

/// Card of the completed listings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedAnimeCard {
    pub title: String,
    pub poster: String,
    pub episodes: Option<u32>,
    pub score: String,
    pub last_release_date: String,
    pub anime_id: String,
    pub href: String,
    pub otakudesu_url: String,
}

/// Card of the search results
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnimeCard {
    pub title: String,
    pub poster: String,
    pub status: String,
    pub score: String,
    pub anime_id: String,
    pub href: String,
    pub otakudesu_url: String,
    pub genre_list: Vec<GenreLinkCard>,
}

/// Card of a genre listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenreAnimeCard {
    pub title: String,
    pub poster: String,
    pub studios: String,
    pub score: String,
    pub episodes: Option<u32>,
    pub season: String,
    pub anime_id: String,
    pub href: String,
    pub otakudesu_url: String,
    pub synopsis: Synopsis,
    pub genre_list: Vec<GenreLinkCard>,
}

/// Card of the "recommended" block of an anime page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedAnimeCard {
    pub title: String,
    pub poster: String,
    pub anime_id: String,
    pub href: String,
    pub otakudesu_url: String,
}

/// Synopsis paragraphs and the anime pages they link to
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Synopsis {
    pub paragraphs: Vec<String>,
    pub connections: Vec<AnimeLinkCard>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub has_prev_page: bool,
    pub prev_page: Option<u32>,
    pub has_next_page: bool,
    pub next_page: Option<u32>,
}

/// One listing page and its pagination
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Paged<C> {
    pub anime_list: Vec<C>,
    pub pagination: Option<Pagination>,
}

impl<C> Default for Paged<C> {
    fn default() -> Self {
        Self {
            anime_list: Vec::new(),
            pagination: None,
        }
    }
}

impl<C> Scraped for Paged<C> {
    fn is_empty(&self) -> bool {
        self.anime_list.is_empty()
    }
}

// ============================================================================
// Pages
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OngoingSection {
    pub href: String,
    pub otakudesu_url: String,
    pub anime_list: Vec<OngoingAnimeCard>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSection {
    pub href: String,
    pub otakudesu_url: String,
    pub anime_list: Vec<CompletedAnimeCard>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Home {
    pub ongoing: OngoingSection,
    pub completed: CompletedSection,
}

impl Scraped for Home {
    fn is_empty(&self) -> bool {
        self.ongoing.anime_list.is_empty() && self.completed.anime_list.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDay {
    pub day: String,
    pub anime_list: Vec<AnimeLinkCard>,
}

/// Weekly release schedule
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schedule {
    pub days: Vec<ScheduleDay>,
}

impl Scraped for Schedule {
    fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnimeLetterGroup {
    pub start_with: String,
    pub anime_list: Vec<AnimeLinkCard>,
}

/// Every anime of the site, grouped by first letter
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllAnimes {
    pub list: Vec<AnimeLetterGroup>,
}

impl Scraped for AllAnimes {
    fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AllGenres {
    pub genre_list: Vec<GenreLinkCard>,
}

impl Scraped for AllGenres {
    fn is_empty(&self) -> bool {
        self.genre_list.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub anime_list: Vec<SearchAnimeCard>,
}

impl Scraped for SearchResults {
    fn is_empty(&self) -> bool {
        self.anime_list.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnimeDetails {
    pub title: String,
    pub poster: String,
    pub japanese: String,
    pub score: String,
    pub producers: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub episodes: Option<u32>,
    pub duration: String,
    pub aired: String,
    pub studios: String,
    pub batch: Option<BatchLinkCard>,
    pub synopsis: Synopsis,
    pub genre_list: Vec<GenreLinkCard>,
    pub episode_list: Vec<EpisodeNumberCard>,
    pub recommended_anime_list: Vec<RecommendedAnimeCard>,
}

impl Scraped for AnimeDetails {
    fn is_empty(&self) -> bool {
        self.title.is_empty() && self.episode_list.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadUrl {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadQuality {
    pub title: String,
    pub size: String,
    pub urls: Vec<DownloadUrl>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpisodeDownloads {
    pub qualities: Vec<DownloadQuality>,
}

/// Details block of an episode page
///
/// Labels the site adds beyond the named fields land in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeInfo {
    pub credit: String,
    pub encoder: String,
    pub duration: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub genre_list: Vec<GenreLinkCard>,
    pub episode_list: Vec<EpisodeNumberCard>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnimeEpisode {
    pub title: String,
    pub release_time: String,
    pub default_streaming_url: String,
    pub servers_href: String,
    pub has_prev_episode: bool,
    pub prev_episode: Option<EpisodeLinkCard>,
    pub has_next_episode: bool,
    pub next_episode: Option<EpisodeLinkCard>,
    pub download_url: EpisodeDownloads,
    pub info: EpisodeInfo,
}

impl Scraped for AnimeEpisode {
    fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.default_streaming_url.is_empty()
            && self.prev_episode.is_none()
            && self.next_episode.is_none()
            && self.download_url.qualities.is_empty()
    }
}

/// A streaming mirror, identified by an opaque server id
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub title: String,
    pub server_id: String,
    pub href: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerQuality {
    pub title: String,
    pub server_list: Vec<Server>,
}

/// Streaming mirrors of an episode, grouped by quality
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnimeServers {
    pub qualities: Vec<ServerQuality>,
}

impl Scraped for AnimeServers {
    fn is_empty(&self) -> bool {
        self.qualities.is_empty()
    }
}

/// Resolved stream location of one server
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerUrl {
    pub url: String,
}

impl Scraped for ServerUrl {
    fn is_empty(&self) -> bool {
        self.url.is_empty() || self.url == crate::html::NO_IFRAME
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadFormat {
    pub title: String,
    pub qualities: Vec<DownloadQuality>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchDownloads {
    pub formats: Vec<DownloadFormat>,
}

/// Batch download page
///
/// Labels the site adds beyond the named fields land in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnimeBatch {
    pub title: String,
    pub poster: String,
    pub japanese: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub score: String,
    pub episodes: Option<u32>,
    pub duration: String,
    pub studios: String,
    pub producers: String,
    pub aired: String,
    pub credit: String,
    pub genre_list: Vec<GenreLinkCard>,
    pub download_url: BatchDownloads,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Scraped for AnimeBatch {
    fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.genre_list.is_empty()
            && self.download_url.formats.is_empty()
    }
}
