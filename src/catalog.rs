use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use futures_util::future::join;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use crate::config::{MOVIE_CATALOG_PATH, POSTER_PLACEHOLDER, RANDOM_PICK_URL, SERIES_CATALOG_PATH};
use crate::logging::{log_event, LogLevel};

const VIDEO_HOSTS: [&str; 3] = ["youtube.com", "youtu.be", "vimeo.com"];
const MEDIA_EXTENSIONS: [&str; 2] = [".mp4", ".m3u8"];
const SERIES_LIST_KEY: &str = "series_list";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to fetch {location}: {reason}")]
    Fetch { location: String, reason: String },
    #[error("{location} responded with status {status}")]
    Status { location: String, status: u16 },
    #[error("failed to parse {location}: {reason}")]
    Parse { location: String, reason: String },
    #[error("{location} has an unexpected document shape")]
    Shape { location: String },
}

impl CatalogError {
    pub fn class(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Status { .. } => "status",
            Self::Parse { .. } => "parse",
            Self::Shape { .. } => "shape",
        }
    }
}

/// Where catalog documents come from: HTTP in the browser, the filesystem
/// on the host, a map in tests.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    async fn fetch_json(&self, location: &str) -> Result<Value, CatalogError>;
}

/// A JSON value that may arrive as either a number or a string.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Genre {
    List(Vec<String>),
    Text(String),
}

impl Genre {
    pub fn tokens(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::List(values) => values.iter().map(String::as_str).collect(),
            Self::Text(value) => value.split(',').collect(),
        };

        raw.into_iter()
            .map(|token| token.trim().to_lowercase())
            .filter(|token| !token.is_empty())
            .collect()
    }

    pub fn label(&self) -> String {
        match self {
            Self::List(values) => values.join(", "),
            Self::Text(value) => value.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Movie,
    Series,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "movie" => Some(Self::Movie),
            "series" => Some(Self::Series),
            _ => None,
        }
    }
}

fn lenient_kind<'de, D>(deserializer: D) -> Result<Option<EntryKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(EntryKind::parse))
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: Scalar,
    pub title: String,
    #[serde(default)]
    pub genre: Option<Genre>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub year: Option<Scalar>,
    #[serde(default)]
    pub rating: Option<Scalar>,
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: Option<EntryKind>,
    #[serde(default, alias = "subtitles")]
    pub captions: Option<String>,
    #[serde(default)]
    pub fallback_video: Option<String>,
}

impl CatalogEntry {
    pub fn kind(&self) -> EntryKind {
        self.kind.unwrap_or(EntryKind::Movie)
    }

    pub fn genres(&self) -> Vec<String> {
        self.genre.as_ref().map(Genre::tokens).unwrap_or_default()
    }

    pub fn genre_label(&self) -> String {
        self.genre
            .as_ref()
            .map(Genre::label)
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn video_url(&self) -> &str {
        self.video.as_deref().unwrap_or_default()
    }

    pub fn poster_url(&self) -> &str {
        [self.thumbnail.as_deref(), self.poster.as_deref()]
            .into_iter()
            .flatten()
            .find(|value| !value.trim().is_empty())
            .unwrap_or(POSTER_PLACEHOLDER)
    }

    pub fn year_label(&self) -> String {
        label_or_na(self.year.as_ref())
    }

    pub fn rating_label(&self) -> String {
        label_or_na(self.rating.as_ref())
    }

    pub fn description_text(&self) -> &str {
        self.description
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or("No description available.")
    }

    pub fn id_key(&self) -> String {
        self.id.to_string()
    }

    fn matches_query(&self, lowered: &str) -> bool {
        self.title.to_lowercase().contains(lowered)
            || self.genres().iter().any(|token| token.contains(lowered))
            || self.kind().as_str().contains(lowered)
    }
}

fn label_or_na(value: Option<&Scalar>) -> String {
    value
        .map(ToString::to_string)
        .filter(|label| !label.trim().is_empty())
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn is_direct_media(raw: &str) -> bool {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(url) => has_media_extension(url.path()),
        Err(_) => has_media_extension(without_query(trimmed)),
    }
}

fn without_query(raw: &str) -> &str {
    raw.split(['?', '#']).next().unwrap_or(raw)
}

fn has_media_extension(path: &str) -> bool {
    let lowered = path.to_ascii_lowercase();
    MEDIA_EXTENSIONS
        .iter()
        .any(|extension| lowered.ends_with(extension))
}

fn with_default_scheme(raw: &str) -> Cow<'_, str> {
    if raw.contains("://") {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(format!("https://{raw}"))
    }
}

pub fn is_video_host(url: &Url) -> bool {
    if !(url.scheme() == "http" || url.scheme() == "https") {
        return false;
    }

    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    VIDEO_HOSTS.contains(&host)
}

pub fn is_valid_video_url(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }

    // The scheme is only assumed for the host check; a bare `trailer.mp4`
    // would otherwise parse as a host with an empty path.
    is_direct_media(trimmed)
        || Url::parse(&with_default_scheme(trimmed)).is_ok_and(|url| is_video_host(&url))
}

pub fn search_entries(entries: &[CatalogEntry], query: &str) -> Vec<CatalogEntry> {
    let lowered = query.trim().to_lowercase();
    if lowered.is_empty() {
        return entries.to_vec();
    }

    entries
        .iter()
        .filter(|entry| entry.matches_query(&lowered))
        .cloned()
        .collect()
}

pub fn filter_entries_by_genre(entries: &[CatalogEntry], genre: &str) -> Vec<CatalogEntry> {
    let lowered = genre.trim().to_lowercase();
    if lowered.is_empty() {
        return entries.to_vec();
    }

    entries
        .iter()
        .filter(|entry| entry.genres().contains(&lowered))
        .cloned()
        .collect()
}

pub fn collect_genres(entries: &[CatalogEntry]) -> Vec<String> {
    entries
        .iter()
        .flat_map(CatalogEntry::genres)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The entry after `current_id` in `entries`, wrapping to the first.
pub fn next_after<'a>(entries: &'a [CatalogEntry], current_id: &Scalar) -> Option<&'a CatalogEntry> {
    let position = entries.iter().position(|entry| &entry.id == current_id)?;
    if entries.len() < 2 {
        return None;
    }
    entries.get((position + 1) % entries.len())
}

fn document_items(location: &str, document: Value) -> Result<Vec<Value>, CatalogError> {
    match document {
        Value::Array(items) => Ok(items),
        Value::Object(mut fields) => match fields.remove(SERIES_LIST_KEY) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(CatalogError::Shape {
                location: location.to_string(),
            }),
        },
        _ => Err(CatalogError::Shape {
            location: location.to_string(),
        }),
    }
}

fn decode_entries(location: &str, items: Vec<Value>, origin: EntryKind) -> Vec<CatalogEntry> {
    let mut entries = Vec::with_capacity(items.len());
    let mut skipped = 0usize;

    for item in items {
        match serde_json::from_value::<CatalogEntry>(item) {
            Ok(mut entry) => {
                entry.kind = Some(entry.kind.unwrap_or(origin));
                entries.push(entry);
            }
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        log_event(
            LogLevel::Warn,
            "catalog_entries_skipped",
            json!({ "location": location, "skipped": skipped }),
        );
    }

    entries
}

#[derive(Deserialize)]
struct ListingResponse {
    #[serde(default)]
    data: Option<ListingData>,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    movies: Option<Vec<ListingMovie>>,
}

#[derive(Deserialize)]
struct ListingMovie {
    id: Scalar,
    title: String,
    #[serde(default)]
    genres: Option<Vec<String>>,
    #[serde(default)]
    yt_trailer_code: Option<String>,
    #[serde(default)]
    medium_cover_image: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    year: Option<Scalar>,
    #[serde(default)]
    rating: Option<Scalar>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

impl ListingMovie {
    fn into_entry(self) -> CatalogEntry {
        let genre = match self.genres {
            Some(genres) if !genres.is_empty() => Genre::List(genres),
            _ => Genre::Text("Unknown".to_string()),
        };
        let video = non_empty(self.yt_trailer_code)
            .map(|code| format!("https://www.youtube.com/watch?v={code}"))
            .unwrap_or_default();
        let cover = non_empty(self.medium_cover_image);

        CatalogEntry {
            id: self.id,
            title: self.title,
            genre: Some(genre),
            video: Some(video),
            thumbnail: cover.clone(),
            poster: cover,
            description: Some(
                non_empty(self.summary).unwrap_or_else(|| "No description available.".to_string()),
            ),
            year: self.year.filter(|year| *year != Scalar::Int(0)),
            rating: self.rating,
            kind: Some(EntryKind::Movie),
            captions: None,
            fallback_video: None,
        }
    }
}

fn log_failure(event: &str, error: &CatalogError) {
    log_event(
        LogLevel::Error,
        event,
        json!({ "error_class": error.class(), "error": error.to_string() }),
    );
}

pub struct CatalogAccessor<S> {
    source: S,
    movies_location: String,
    series_location: String,
    random_location: String,
}

impl<S: CatalogSource> CatalogAccessor<S> {
    pub fn new(source: S) -> Self {
        Self::with_locations(source, MOVIE_CATALOG_PATH, SERIES_CATALOG_PATH, RANDOM_PICK_URL)
    }

    pub fn with_locations(source: S, movies: &str, series: &str, random: &str) -> Self {
        Self {
            source,
            movies_location: movies.to_string(),
            series_location: series.to_string(),
            random_location: random.to_string(),
        }
    }

    async fn fetch_items(&self, location: &str) -> Vec<Value> {
        let fetched = self
            .source
            .fetch_json(location)
            .await
            .and_then(|document| document_items(location, document));

        match fetched {
            Ok(items) => items,
            Err(error) => {
                log_failure("catalog_document_failed", &error);
                Vec::new()
            }
        }
    }

    /// Both documents merged, typed, and filtered to playable video URLs.
    pub async fn load_all(&self) -> Vec<CatalogEntry> {
        let (movies, series) = join(
            self.fetch_items(&self.movies_location),
            self.fetch_items(&self.series_location),
        )
        .await;

        let mut entries = decode_entries(&self.movies_location, movies, EntryKind::Movie);
        entries.extend(decode_entries(&self.series_location, series, EntryKind::Series));

        let total = entries.len();
        entries.retain(|entry| is_valid_video_url(entry.video_url()));

        log_event(
            LogLevel::Debug,
            "catalog_loaded",
            json!({ "entries": entries.len(), "rejected_video_urls": total - entries.len() }),
        );
        entries
    }

    pub async fn search(&self, query: &str) -> Vec<CatalogEntry> {
        search_entries(&self.load_all().await, query)
    }

    pub async fn filter_by_genre(&self, genre: &str) -> Vec<CatalogEntry> {
        filter_entries_by_genre(&self.load_all().await, genre)
    }

    pub async fn list_genres(&self) -> Vec<String> {
        collect_genres(&self.load_all().await)
    }

    /// `roll` is a uniform sample from `[0, 1)` choosing among the listing.
    pub async fn random_pick(&self, roll: f64) -> Option<CatalogEntry> {
        let document = match self.source.fetch_json(&self.random_location).await {
            Ok(document) => document,
            Err(error) => {
                log_failure("random_pick_failed", &error);
                return None;
            }
        };

        let listing: ListingResponse = match serde_json::from_value(document) {
            Ok(listing) => listing,
            Err(error) => {
                log_failure(
                    "random_pick_failed",
                    &CatalogError::Parse {
                        location: self.random_location.clone(),
                        reason: error.to_string(),
                    },
                );
                return None;
            }
        };

        let mut movies = listing
            .data
            .and_then(|data| data.movies)
            .unwrap_or_default();
        if movies.is_empty() {
            log_event(LogLevel::Warn, "random_pick_empty", json!({}));
            return None;
        }

        let index = ((roll.clamp(0.0, 1.0) * movies.len() as f64) as usize).min(movies.len() - 1);
        Some(movies.swap_remove(index).into_entry())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    pub(crate) struct MapSource {
        documents: HashMap<String, Value>,
    }

    impl MapSource {
        pub(crate) fn new(documents: Vec<(&str, Value)>) -> Self {
            Self {
                documents: documents
                    .into_iter()
                    .map(|(location, document)| (location.to_string(), document))
                    .collect(),
            }
        }
    }

    impl CatalogSource for MapSource {
        async fn fetch_json(&self, location: &str) -> Result<Value, CatalogError> {
            self.documents
                .get(location)
                .cloned()
                .ok_or_else(|| CatalogError::Status {
                    location: location.to_string(),
                    status: 404,
                })
        }
    }

    pub(crate) fn entry(value: Value) -> CatalogEntry {
        serde_json::from_value(value).expect("valid entry")
    }

    fn nova() -> Value {
        json!({
            "id": 1,
            "title": "Nova",
            "genre": "Action, Drama",
            "video": "https://youtu.be/abc",
            "type": "movie"
        })
    }

    fn accessor(movies: Value, series: Value) -> CatalogAccessor<MapSource> {
        CatalogAccessor::new(MapSource::new(vec![
            (MOVIE_CATALOG_PATH, movies),
            (SERIES_CATALOG_PATH, series),
        ]))
    }

    fn titles(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.title.as_str()).collect()
    }

    #[test]
    fn accepted_video_urls() {
        for url in [
            "https://youtu.be/abc",
            "http://www.youtube.com/watch?v=xyz",
            "youtube.com/watch?v=xyz",
            "HTTPS://VIMEO.COM/1234",
            "https://cdn.example.com/films/nova.MP4",
            "https://cdn.example.com/live/index.m3u8?token=1",
            "media/trailer.mp4",
            "trailer.mp4",
            "clip.M3U8",
            "trailer.mp4?t=30",
        ] {
            assert!(is_valid_video_url(url), "{url} should be accepted");
        }
    }

    #[test]
    fn bare_file_names_are_valid_and_play_directly() {
        for url in ["trailer.mp4", "./trailer.mp4", "clip.M3U8"] {
            assert!(is_valid_video_url(url), "{url} should be accepted");
            assert!(is_direct_media(url), "{url} should play directly");
        }
        assert!(!is_direct_media("youtube.com/watch?v=xyz"));
    }

    #[test]
    fn rejected_video_urls() {
        for url in [
            "",
            "   ",
            "https://example.com/watch?v=xyz",
            "https://cdn.example.com/nova.avi",
            "ftp://youtube.com/video",
            "https://notyoutube.com/watch",
        ] {
            assert!(!is_valid_video_url(url), "{url:?} should be rejected");
        }
    }

    #[test]
    fn genre_tokens_are_trimmed_lowercase() {
        assert_eq!(
            Genre::Text(" Action ,Drama,, ".to_string()).tokens(),
            vec!["action", "drama"]
        );
        assert_eq!(
            Genre::List(vec!["Sci-Fi".to_string(), "Comedy".to_string()]).tokens(),
            vec!["sci-fi", "comedy"]
        );
    }

    #[test]
    fn entry_accepts_loose_scalars_and_unknown_type() {
        let parsed = entry(json!({
            "id": "s-7",
            "title": "Orbit",
            "year": 2021,
            "rating": "8.1",
            "type": "Documentary",
            "subtitles": "/subs/orbit.vtt",
            "fallbackVideo": "https://cdn.example.com/orbit.mp4"
        }));

        assert_eq!(parsed.id_key(), "s-7");
        assert_eq!(parsed.year_label(), "2021");
        assert_eq!(parsed.rating_label(), "8.1");
        assert_eq!(parsed.kind, None);
        assert_eq!(parsed.captions.as_deref(), Some("/subs/orbit.vtt"));
        assert_eq!(parsed.fallback_video.as_deref(), Some("https://cdn.example.com/orbit.mp4"));
        assert_eq!(parsed.genre_label(), "N/A");
        assert_eq!(parsed.poster_url(), POSTER_PLACEHOLDER);
    }

    #[test]
    fn nova_scenario() {
        let entries = vec![entry(nova())];

        assert_eq!(titles(&search_entries(&entries, "drama")), vec!["Nova"]);
        assert_eq!(titles(&filter_entries_by_genre(&entries, "action")), vec!["Nova"]);
        assert!(filter_entries_by_genre(&entries, "comedy").is_empty());
    }

    #[test]
    fn search_matches_title_genre_or_type_case_insensitively() {
        let entries = vec![
            entry(nova()),
            entry(json!({ "id": 2, "title": "Harbor Lights", "genre": ["Romance"], "type": "series" })),
            entry(json!({ "id": 3, "title": "Quiet", "genre": "Thriller", "type": "movie" })),
        ];

        assert_eq!(titles(&search_entries(&entries, "HARBOR")), vec!["Harbor Lights"]);
        assert_eq!(titles(&search_entries(&entries, "roman")), vec!["Harbor Lights"]);
        assert_eq!(titles(&search_entries(&entries, "series")), vec!["Harbor Lights"]);
        assert_eq!(titles(&search_entries(&entries, "movie")), vec!["Nova", "Quiet"]);
        assert_eq!(search_entries(&entries, "  ").len(), 3);
    }

    #[test]
    fn genre_filter_requires_whole_token() {
        let entries = vec![entry(json!({ "id": 1, "title": "Nova", "genre": "Science Fiction" }))];

        assert!(filter_entries_by_genre(&entries, "science").is_empty());
        assert_eq!(filter_entries_by_genre(&entries, "SCIENCE FICTION").len(), 1);
        assert_eq!(filter_entries_by_genre(&entries, "").len(), 1);
    }

    #[test]
    fn genres_are_sorted_and_unique() {
        let entries = vec![
            entry(json!({ "id": 1, "title": "A", "genre": "Drama, action" })),
            entry(json!({ "id": 2, "title": "B", "genre": ["Action", "Comedy"] })),
        ];

        assert_eq!(collect_genres(&entries), vec!["action", "comedy", "drama"]);
    }

    #[test]
    fn next_after_wraps_and_needs_two_entries() {
        let entries = vec![
            entry(json!({ "id": 1, "title": "A" })),
            entry(json!({ "id": 2, "title": "B" })),
        ];

        assert_eq!(next_after(&entries, &Scalar::Int(1)).map(|e| e.title.as_str()), Some("B"));
        assert_eq!(next_after(&entries, &Scalar::Int(2)).map(|e| e.title.as_str()), Some("A"));
        assert!(next_after(&entries, &Scalar::Int(9)).is_none());
        assert!(next_after(&entries[..1], &Scalar::Int(1)).is_none());
    }

    #[tokio::test]
    async fn load_all_merges_types_and_drops_invalid_video() {
        let catalog = accessor(
            json!([
                nova(),
                { "id": 2, "title": "No Source", "video": "" },
                { "id": 3, "title": "Untyped", "video": "https://cdn.example.com/u.mp4" },
                { "title": "Missing id", "video": "https://youtu.be/zzz" }
            ]),
            json!({ "series_list": [
                { "id": 10, "title": "Tides", "video": "https://vimeo.com/42" },
                { "id": 11, "title": "Forced", "video": "https://vimeo.com/43", "type": "movie" }
            ]}),
        );

        let entries = catalog.load_all().await;
        let summary: Vec<(&str, EntryKind)> = entries
            .iter()
            .map(|entry| (entry.title.as_str(), entry.kind()))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("Nova", EntryKind::Movie),
                ("Untyped", EntryKind::Movie),
                ("Tides", EntryKind::Series),
                ("Forced", EntryKind::Movie),
            ]
        );
        assert!(entries.iter().all(|entry| is_valid_video_url(entry.video_url())));
    }

    #[tokio::test]
    async fn missing_or_malformed_documents_fail_soft() {
        let catalog = CatalogAccessor::new(MapSource::new(vec![(
            SERIES_CATALOG_PATH,
            json!({ "shows": [] }),
        )]));

        assert!(catalog.load_all().await.is_empty());
        assert!(catalog.search("anything").await.is_empty());
        assert!(catalog.list_genres().await.is_empty());
    }

    #[tokio::test]
    async fn accessor_queries_reload_catalog() {
        let catalog = accessor(json!([nova()]), json!([]));

        assert_eq!(titles(&catalog.search("nov").await), vec!["Nova"]);
        assert_eq!(titles(&catalog.filter_by_genre("Drama").await), vec!["Nova"]);
        assert_eq!(catalog.list_genres().await, vec!["action", "drama"]);
    }

    #[tokio::test]
    async fn random_pick_normalizes_listing_record() {
        let catalog = CatalogAccessor::new(MapSource::new(vec![(
            RANDOM_PICK_URL,
            json!({ "data": { "movies": [
                { "id": 5, "title": "First", "genres": ["Drama"], "yt_trailer_code": "abc123",
                  "medium_cover_image": "https://img.example.com/5.jpg", "summary": "",
                  "year": 1999, "rating": 7.5 },
                { "id": 6, "title": "Second" }
            ]}}),
        )]));

        let first = catalog.random_pick(0.0).await.expect("a pick");
        assert_eq!(first.title, "First");
        assert_eq!(first.video_url(), "https://www.youtube.com/watch?v=abc123");
        assert_eq!(first.poster_url(), "https://img.example.com/5.jpg");
        assert_eq!(first.description_text(), "No description available.");
        assert_eq!(first.rating_label(), "7.5");
        assert_eq!(first.kind(), EntryKind::Movie);

        let second = catalog.random_pick(0.99).await.expect("a pick");
        assert_eq!(second.title, "Second");
        assert_eq!(second.genres(), vec!["unknown"]);
        assert_eq!(second.video_url(), "");
        assert_eq!(second.year_label(), "N/A");
    }

    #[tokio::test]
    async fn random_pick_is_none_on_failure_or_empty_listing() {
        let unreachable = CatalogAccessor::new(MapSource::new(vec![]));
        assert!(unreachable.random_pick(0.5).await.is_none());

        let empty = CatalogAccessor::new(MapSource::new(vec![(
            RANDOM_PICK_URL,
            json!({ "data": { "movies": [] } }),
        )]));
        assert!(empty.random_pick(0.5).await.is_none());

        let malformed = CatalogAccessor::new(MapSource::new(vec![(RANDOM_PICK_URL, json!("oops"))]));
        assert!(malformed.random_pick(0.5).await.is_none());
    }
}
