//! Candidate discovery
//!
//! Runs keyword searches against the catalog and collects distinct songs.
//! Queries are built from a per-language template table, optionally suffixed
//! with each year of the requested range. Results are shuffled so repeated
//! jobs do not always import the same head of the search ranking.
//!
//! Discovery never fails: a search that errors is logged and skipped, so a
//! provider outage yields fewer (possibly zero) candidates.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use lyricle_common::db::normalize_key;

use super::catalog_provider::CatalogProvider;
use crate::models::Candidate;

/// Extra results requested beyond what is still missing
const SEARCH_HEADROOM: usize = 10;

/// Templates used when the language has no dedicated table
pub const DEFAULT_QUERIES: &[&str] = &[
    "top songs",
    "popular songs",
    "greatest hits",
    "best songs ever",
    "hit songs",
];

/// Search templates for a language code, or the default set
pub fn queries_for_language(language: Option<&str>) -> &'static [&'static str] {
    match language {
        Some("en") => &["top hits", "popular songs", "best songs", "greatest hits", "hit songs"],
        Some("es") => &["éxitos musicales", "canciones populares", "mejores canciones", "hits latinos"],
        Some("hi") => &["bollywood hits", "hindi songs", "best hindi songs", "bollywood popular"],
        Some("ko") => &["kpop hits", "인기 가요", "korean popular songs", "kpop best"],
        Some("ja") => &["jpop hits", "日本の人気曲", "japanese popular songs"],
        Some("pt") => &["músicas populares", "hits brasileiros", "melhores músicas"],
        Some("fr") => &["chansons populaires", "hits français", "meilleures chansons"],
        Some("de") => &["deutsche hits", "beliebte lieder", "beste deutsche songs"],
        Some("it") => &["canzoni italiane", "hits italiani", "musica italiana"],
        Some("te") => &["telugu hit songs", "telugu popular songs", "telugu melody songs"],
        Some("ta") => &["tamil hit songs", "tamil popular songs", "tamil melody hits"],
        _ => DEFAULT_QUERIES,
    }
}

/// Year passes: inclusive range, a single bound, or one pass without a year
pub fn year_passes(year_from: Option<i32>, year_to: Option<i32>) -> Vec<Option<i32>> {
    match (year_from, year_to) {
        (Some(from), Some(to)) => (from..=to).map(Some).collect(),
        (Some(year), None) | (None, Some(year)) => vec![Some(year)],
        (None, None) => vec![None],
    }
}

/// What to look for
#[derive(Debug, Clone, Default)]
pub struct DiscoveryRequest {
    pub language: Option<String>,
    pub count: usize,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    /// Free-text query searched ahead of the templates
    pub search_query: Option<String>,
}

impl DiscoveryRequest {
    /// Base queries in search order, before year suffixes
    fn base_queries(&self) -> Vec<String> {
        let mut queries: Vec<String> = self.search_query.iter().cloned().collect();
        queries.extend(
            queries_for_language(self.language.as_deref())
                .iter()
                .map(|q| q.to_string()),
        );
        queries
    }
}

/// Searches the catalog for import candidates
pub struct DiscoveryEngine {
    provider: Arc<dyn CatalogProvider>,
    search_delay: Duration,
    max_search_limit: usize,
}

impl DiscoveryEngine {
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        search_delay: Duration,
        max_search_limit: usize,
    ) -> Self {
        Self {
            provider,
            search_delay,
            max_search_limit,
        }
    }

    /// Discover up to `request.count` distinct candidates in random order
    pub async fn discover(&self, request: &DiscoveryRequest) -> Vec<Candidate> {
        let candidates = self.scan(request).await;
        shuffle_and_truncate(candidates, request.count, &mut rand::thread_rng())
    }

    /// Run the searches and collect distinct candidates in ranking order
    ///
    /// Stops as soon as `request.count` candidates are collected.
    pub async fn scan(&self, request: &DiscoveryRequest) -> Vec<Candidate> {
        let queries = request.base_queries();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut seen_keys: HashSet<(String, String)> = HashSet::new();
        let mut found: Vec<Candidate> = Vec::new();
        let mut searches = 0usize;

        'years: for year in year_passes(request.year_from, request.year_to) {
            for base in &queries {
                if found.len() >= request.count {
                    break 'years;
                }

                let query = match year {
                    Some(year) => format!("{} {}", base, year),
                    None => base.clone(),
                };
                let limit = self
                    .max_search_limit
                    .min(request.count - found.len() + SEARCH_HEADROOM);

                if searches > 0 && !self.search_delay.is_zero() {
                    tokio::time::sleep(self.search_delay).await;
                }
                searches += 1;

                let hits = match self.provider.search(&query, limit).await {
                    Ok(hits) => hits,
                    Err(e) => {
                        warn!(query = %query, error = %e, "Search failed, skipping query");
                        continue;
                    }
                };
                debug!(query = %query, hits = hits.len(), "Search returned");

                for hit in hits {
                    let Some(external_id) = hit.external_id.clone() else {
                        continue;
                    };
                    if !seen_ids.insert(external_id.clone()) {
                        continue;
                    }

                    let artist = hit.artist_display();
                    let key = (normalize_key(&hit.title), normalize_key(&artist));
                    if !seen_keys.insert(key) {
                        continue;
                    }

                    found.push(Candidate {
                        external_id,
                        title: hit.title.clone(),
                        artist,
                        album: hit.album.clone(),
                        thumbnail_url: hit.best_thumbnail().map(str::to_string),
                    });

                    if found.len() >= request.count {
                        break;
                    }
                }
            }
        }

        info!(
            provider = self.provider.name(),
            searches,
            found = found.len(),
            requested = request.count,
            "Discovery scan finished"
        );
        found
    }
}

/// Shuffle candidates and keep at most `count`
pub fn shuffle_and_truncate<R: Rng + ?Sized>(
    mut candidates: Vec<Candidate>,
    count: usize,
    rng: &mut R,
) -> Vec<Candidate> {
    candidates.shuffle(rng);
    candidates.truncate(count);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn candidate(id: &str) -> Candidate {
        Candidate {
            external_id: id.to_string(),
            title: format!("title {}", id),
            artist: "artist".to_string(),
            album: None,
            thumbnail_url: None,
        }
    }

    #[test]
    fn test_known_language_templates() {
        assert_eq!(queries_for_language(Some("ja")).len(), 3);
        assert_eq!(queries_for_language(Some("ko"))[1], "인기 가요");
        assert_eq!(queries_for_language(Some("en"))[0], "top hits");
    }

    #[test]
    fn test_unknown_or_missing_language_uses_defaults() {
        assert_eq!(queries_for_language(Some("xx")), DEFAULT_QUERIES);
        assert_eq!(queries_for_language(None), DEFAULT_QUERIES);
    }

    #[test]
    fn test_year_passes() {
        assert_eq!(year_passes(Some(2019), Some(2021)), vec![Some(2019), Some(2020), Some(2021)]);
        assert_eq!(year_passes(Some(2019), None), vec![Some(2019)]);
        assert_eq!(year_passes(None, Some(1999)), vec![Some(1999)]);
        assert_eq!(year_passes(None, None), vec![None]);
    }

    #[test]
    fn test_search_query_goes_first() {
        let request = DiscoveryRequest {
            language: Some("it".to_string()),
            search_query: Some("sanremo".to_string()),
            count: 5,
            ..Default::default()
        };
        let queries = request.base_queries();
        assert_eq!(queries[0], "sanremo");
        assert_eq!(queries.len(), 4);
    }

    #[test]
    fn test_shuffle_and_truncate() {
        let candidates: Vec<_> = (0..10).map(|i| candidate(&i.to_string())).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let picked = shuffle_and_truncate(candidates.clone(), 4, &mut rng);
        assert_eq!(picked.len(), 4);
        assert!(picked.iter().all(|c| candidates.contains(c)));

        let all = shuffle_and_truncate(candidates.clone(), 50, &mut rng);
        assert_eq!(all.len(), 10);
    }

    #[test]
    fn test_shuffle_is_reproducible_with_seed() {
        let candidates: Vec<_> = (0..10).map(|i| candidate(&i.to_string())).collect();
        let a = shuffle_and_truncate(candidates.clone(), 10, &mut StdRng::seed_from_u64(42));
        let b = shuffle_and_truncate(candidates, 10, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
