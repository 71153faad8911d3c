//! YouTube Music catalog client
//!
//! Talks to the InnerTube JSON API used by the music.youtube.com web client
//! (`WEB_REMIX`). Four endpoints are needed:
//! - `search` with the songs filter for discovery
//! - `player` for track metadata
//! - `next` (watch playlist) for the lyrics browse id
//! - `browse` for the lyrics text
//!
//! Response parsing is tolerant: renderers missing the fields we need are
//! skipped rather than failing the whole response.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use lyricle_common::config::ProviderConfig;

use super::catalog_provider::{
    CatalogProvider, LyricsReference, RawLyrics, SearchHit, TrackMetadata,
};
use crate::error::ProviderError;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
const ORIGIN: &str = "https://music.youtube.com";
const CLIENT_NAME: &str = "WEB_REMIX";

/// Search params selecting the "Songs" filter
const SONGS_FILTER_PARAMS: &str = "EgWKAQIIAWoMEA4QChADEAQQCRAF";

/// Lyrics browse ids carry this prefix
const LYRICS_BROWSE_PREFIX: &str = "MPLY";

/// Separator between artist/album/duration runs in list items
const RUN_SEPARATOR: &str = " • ";

/// Rate limiter enforcing a minimum interval between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// YouTube Music InnerTube client
pub struct YtMusicClient {
    http_client: reqwest::Client,
    base_url: String,
    client_version: String,
    language: String,
    rate_limiter: Arc<RateLimiter>,
}

impl YtMusicClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_version: config.client_version.clone(),
            language: config.language.clone(),
            rate_limiter: Arc::new(RateLimiter::new(config.min_request_interval_ms)),
        })
    }

    fn context(&self) -> Value {
        json!({
            "client": {
                "clientName": CLIENT_NAME,
                "clientVersion": self.client_version,
                "hl": self.language,
            },
            "user": {}
        })
    }

    /// POST an InnerTube request; `body` is merged with the client context
    async fn post(&self, endpoint: &str, mut body: Value) -> Result<Value, ProviderError> {
        self.rate_limiter.wait().await;

        body["context"] = self.context();
        let url = format!("{}/{}?alt=json&prettyPrint=false", self.base_url, endpoint);

        tracing::debug!(endpoint = %endpoint, "Querying YouTube Music API");

        let response = self
            .http_client
            .post(&url)
            .header(reqwest::header::ORIGIN, ORIGIN)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(endpoint.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

#[async_trait]
impl CatalogProvider for YtMusicClient {
    fn name(&self) -> &'static str {
        "ytmusic"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
        let response = self
            .post("search", json!({ "query": query, "params": SONGS_FILTER_PARAMS }))
            .await?;

        let mut hits = parse_search_results(&response);
        hits.truncate(limit);

        tracing::debug!(query = %query, hits = hits.len(), "Search completed");
        Ok(hits)
    }

    async fn get_metadata(&self, external_id: &str) -> Result<TrackMetadata, ProviderError> {
        let response = self
            .post("player", json!({ "videoId": external_id }))
            .await?;

        parse_player_metadata(&response, external_id)
    }

    async fn get_lyrics_reference(
        &self,
        external_id: &str,
    ) -> Result<Option<LyricsReference>, ProviderError> {
        let response = self
            .post(
                "next",
                json!({
                    "videoId": external_id,
                    "playlistId": format!("RDAMVM{}", external_id),
                    "enablePersistentPlaylistPanel": true,
                    "isAudioOnly": true,
                    "tunerSettingValue": "AUTOMIX_SETTING_NORMAL",
                }),
            )
            .await?;

        Ok(parse_lyrics_browse_id(&response).map(LyricsReference))
    }

    async fn get_lyrics(
        &self,
        reference: &LyricsReference,
    ) -> Result<Option<RawLyrics>, ProviderError> {
        let response = self
            .post("browse", json!({ "browseId": reference.0 }))
            .await?;

        Ok(parse_lyrics(&response))
    }
}

/// Collect every value stored under `key`, depth first
fn collect_key<'a>(value: &'a Value, key: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                if k == key {
                    out.push(v);
                }
                collect_key(v, key, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_key(item, key, out);
            }
        }
        _ => {}
    }
}

fn first_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let mut found = Vec::new();
    collect_key(value, key, &mut found);
    found.into_iter().next()
}

fn thumbnail_urls(thumbnails: Option<&Value>) -> Vec<String> {
    thumbnails
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|t| t.get("url").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn column_runs(renderer: &Value, column: usize) -> Vec<&Value> {
    renderer
        .pointer(&format!(
            "/flexColumns/{}/musicResponsiveListItemFlexColumnRenderer/text/runs",
            column
        ))
        .and_then(Value::as_array)
        .map(|runs| runs.iter().collect())
        .unwrap_or_default()
}

fn run_browse_id(run: &Value) -> Option<&str> {
    run.pointer("/navigationEndpoint/browseEndpoint/browseId")
        .and_then(Value::as_str)
}

/// Parse one `musicResponsiveListItemRenderer` into a search hit
fn parse_list_item(renderer: &Value) -> Option<SearchHit> {
    let title_runs = column_runs(renderer, 0);
    let title = title_runs
        .first()
        .and_then(|r| r.get("text"))
        .and_then(Value::as_str)?
        .to_string();

    let external_id = renderer
        .pointer("/playlistItemData/videoId")
        .or_else(|| first_key(renderer, "watchEndpoint").and_then(|w| w.get("videoId")))
        .and_then(Value::as_str)
        .map(str::to_string);

    let detail_runs = column_runs(renderer, 1);
    let mut artists = Vec::new();
    let mut album = None;

    for run in &detail_runs {
        let Some(text) = run.get("text").and_then(Value::as_str) else {
            continue;
        };
        match run_browse_id(run) {
            Some(id) if id.starts_with("UC") => artists.push(text.to_string()),
            Some(id) if id.starts_with("MPRE") => album = Some(text.to_string()),
            _ => {}
        }
    }

    // Unlinked artists: text runs before the first separator
    if artists.is_empty() {
        artists = detail_runs
            .iter()
            .filter_map(|r| r.get("text").and_then(Value::as_str))
            .take_while(|t| *t != RUN_SEPARATOR)
            .filter(|t| !matches!(t.trim(), "" | "," | "&" | "Song"))
            .map(str::to_string)
            .collect();
    }

    let thumbnails = thumbnail_urls(
        renderer.pointer("/thumbnail/musicThumbnailRenderer/thumbnail/thumbnails"),
    );

    Some(SearchHit {
        external_id,
        title,
        artists,
        album,
        thumbnails,
    })
}

/// Parse a `search` response into hits, in display order
pub fn parse_search_results(response: &Value) -> Vec<SearchHit> {
    let mut renderers = Vec::new();
    collect_key(response, "musicResponsiveListItemRenderer", &mut renderers);

    renderers.into_iter().filter_map(parse_list_item).collect()
}

/// Parse a `player` response into track metadata
pub fn parse_player_metadata(
    response: &Value,
    external_id: &str,
) -> Result<TrackMetadata, ProviderError> {
    let Some(details) = response.get("videoDetails") else {
        let status = response
            .pointer("/playabilityStatus/status")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN");
        if status == "ERROR" {
            return Err(ProviderError::NotFound(external_id.to_string()));
        }
        return Err(ProviderError::Parse(format!(
            "player response for {} has no videoDetails (status {})",
            external_id, status
        )));
    };

    let text = |key: &str| {
        details
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Unknown")
            .to_string()
    };

    Ok(TrackMetadata {
        title: text("title"),
        artist: text("author"),
        thumbnails: thumbnail_urls(details.pointer("/thumbnail/thumbnails")),
    })
}

/// Find the lyrics browse id in a `next` response
///
/// The lyrics tab only carries a browse endpoint when lyrics exist.
pub fn parse_lyrics_browse_id(response: &Value) -> Option<String> {
    let mut ids = Vec::new();
    collect_key(response, "browseId", &mut ids);

    ids.into_iter()
        .filter_map(Value::as_str)
        .find(|id| id.starts_with(LYRICS_BROWSE_PREFIX))
        .map(str::to_string)
}

/// Extract plain lyrics text from a `browse` response
pub fn parse_lyrics(response: &Value) -> Option<RawLyrics> {
    let shelf = first_key(response, "musicDescriptionShelfRenderer")?;
    let runs = shelf.pointer("/description/runs")?.as_array()?;

    let text: String = runs
        .iter()
        .filter_map(|r| r.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(RawLyrics::Text(text))
    }
}
