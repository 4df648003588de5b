//! Metadata lookup (MusicBrainz)
//!
//! Barcode, ISRC and ISWC lookups against the MusicBrainz web service.
//! Callers validate codes first; a miss comes back as `found: false`.
//! Requests are throttled with a token bucket (MusicBrainz allows one
//! request per second per client).

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use rdesk_common::config::LookupConfig;
use rdesk_common::model::{GtinLookup, IsrcLookup, IswcLookup, ReleaseType};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Lookup request failed: {0}")]
    Network(String),

    #[error("Lookup service returned {0}")]
    Status(u16),

    #[error("Could not parse lookup response: {0}")]
    Parse(String),
}

#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn release_by_barcode(&self, gtin: &str) -> Result<GtinLookup, LookupError>;
    async fn recording_by_isrc(&self, isrc: &str) -> Result<IsrcLookup, LookupError>;
    async fn work_by_iswc(&self, iswc: &str) -> Result<IswcLookup, LookupError>;
}

#[derive(Debug, Deserialize)]
struct MbArtistCredit {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct MbReleaseGroup {
    #[serde(rename = "primary-type")]
    primary_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MbRelease {
    title: String,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(rename = "track-count", default)]
    track_count: Option<u32>,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<MbArtistCredit>,
    #[serde(rename = "release-group", default)]
    release_group: MbReleaseGroup,
}

#[derive(Debug, Deserialize)]
struct MbReleaseSearch {
    #[serde(default)]
    releases: Vec<MbRelease>,
}

#[derive(Debug, Deserialize)]
struct MbRecording {
    title: String,
    /// Milliseconds
    #[serde(default)]
    length: Option<u64>,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<MbArtistCredit>,
}

#[derive(Debug, Deserialize)]
struct MbIsrc {
    #[serde(default)]
    recordings: Vec<MbRecording>,
}

#[derive(Debug, Deserialize)]
struct MbRelationArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct MbRelation {
    #[serde(rename = "type")]
    relation_type: String,
    #[serde(default)]
    artist: Option<MbRelationArtist>,
}

#[derive(Debug, Deserialize)]
struct MbWork {
    title: String,
    #[serde(default)]
    relations: Vec<MbRelation>,
}

#[derive(Debug, Deserialize)]
struct MbIswc {
    #[serde(default)]
    works: Vec<MbWork>,
}

fn join_credits(credits: &[MbArtistCredit]) -> Option<String> {
    let names: Vec<&str> = credits.iter().map(|c| c.name.as_str()).collect();
    (!names.is_empty()).then(|| names.join(", "))
}

fn release_type_from(primary_type: Option<&str>) -> Option<ReleaseType> {
    match primary_type?.to_ascii_lowercase().as_str() {
        "single" => Some(ReleaseType::Single),
        "ep" => Some(ReleaseType::Ep),
        "album" => Some(ReleaseType::Album),
        _ => None,
    }
}

fn gtin_result(gtin: &str, search: MbReleaseSearch) -> GtinLookup {
    let Some(release) = search.releases.into_iter().next() else {
        return GtinLookup::not_found(gtin);
    };
    GtinLookup {
        found: true,
        gtin: gtin.to_string(),
        artist: join_credits(&release.artist_credit),
        release_type: release_type_from(release.release_group.primary_type.as_deref()),
        track_count: release.track_count,
        country: release.country.filter(|c| c.len() == 2),
        release_date: release.date.filter(|d| !d.is_empty()),
        title: Some(release.title),
    }
}

fn isrc_result(isrc: &str, body: MbIsrc) -> IsrcLookup {
    let Some(recording) = body.recordings.into_iter().next() else {
        return IsrcLookup::not_found(isrc);
    };
    IsrcLookup {
        found: true,
        isrc: isrc.to_string(),
        artist: join_credits(&recording.artist_credit),
        duration_seconds: recording.length.map(|ms| ((ms + 500) / 1000) as u32),
        title: Some(recording.title),
    }
}

fn iswc_result(iswc: &str, body: MbIswc) -> IswcLookup {
    let Some(work) = body.works.into_iter().next() else {
        return IswcLookup::not_found(iswc);
    };
    let mut writers: Vec<String> = Vec::new();
    for relation in work.relations {
        if !matches!(relation.relation_type.as_str(), "composer" | "lyricist" | "writer") {
            continue;
        }
        if let Some(artist) = relation.artist {
            if !writers.contains(&artist.name) {
                writers.push(artist.name);
            }
        }
    }
    IswcLookup {
        found: true,
        iswc: iswc.to_string(),
        title: Some(work.title),
        writers,
    }
}

/// `T1234567890` → `T-123.456.789-0`, the form MusicBrainz indexes
fn dotted_iswc(cleaned: &str) -> String {
    if cleaned.len() != 11 || !cleaned.is_ascii() {
        return cleaned.to_string();
    }
    format!(
        "{}-{}.{}.{}-{}",
        &cleaned[0..1],
        &cleaned[1..4],
        &cleaned[4..7],
        &cleaned[7..10],
        &cleaned[10..11]
    )
}

pub struct MusicBrainzLookup {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl MusicBrainzLookup {
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let per_second = NonZeroU32::new(config.rate_per_second).unwrap_or(NonZeroU32::MIN);
        info!(
            "MusicBrainz lookup at {} ({} req/s)",
            config.base_url, per_second
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        })
    }

    /// GET `path` under the base URL; `None` on 404
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, LookupError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, "Querying MusicBrainz");

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("fmt", "json")])
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json()
                .await
                .map(Some)
                .map_err(|e| LookupError::Parse(e.to_string())),
            status => Err(LookupError::Status(status.as_u16())),
        }
    }
}

#[async_trait]
impl MetadataLookup for MusicBrainzLookup {
    async fn release_by_barcode(&self, gtin: &str) -> Result<GtinLookup, LookupError> {
        let query = format!("barcode:{}", gtin);
        let search: Option<MbReleaseSearch> =
            self.get("release/", &[("query", &query), ("limit", "1")]).await?;
        Ok(search.map_or_else(|| GtinLookup::not_found(gtin), |s| gtin_result(gtin, s)))
    }

    async fn recording_by_isrc(&self, isrc: &str) -> Result<IsrcLookup, LookupError> {
        let body: Option<MbIsrc> = self
            .get(&format!("isrc/{}", isrc), &[("inc", "artist-credits")])
            .await?;
        Ok(body.map_or_else(|| IsrcLookup::not_found(isrc), |b| isrc_result(isrc, b)))
    }

    async fn work_by_iswc(&self, iswc: &str) -> Result<IswcLookup, LookupError> {
        let body: Option<MbIswc> = self
            .get(&format!("iswc/{}", dotted_iswc(iswc)), &[("inc", "artist-rels")])
            .await?;
        Ok(body.map_or_else(|| IswcLookup::not_found(iswc), |b| iswc_result(iswc, b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_search_maps_first_hit() {
        let search: MbReleaseSearch = serde_json::from_str(
            r#"{"releases": [{
                "title": "Night Drive",
                "country": "DE",
                "date": "2021-05-07",
                "track-count": 9,
                "artist-credit": [{"name": "Nova"}, {"name": "Kite"}],
                "release-group": {"primary-type": "Album"}
            }]}"#,
        )
        .unwrap();
        let lookup = gtin_result("4006381333931", search);
        assert!(lookup.found);
        assert_eq!(lookup.title.as_deref(), Some("Night Drive"));
        assert_eq!(lookup.artist.as_deref(), Some("Nova, Kite"));
        assert_eq!(lookup.release_type, Some(ReleaseType::Album));
        assert_eq!(lookup.track_count, Some(9));
        assert_eq!(lookup.country.as_deref(), Some("DE"));
    }

    #[test]
    fn test_empty_search_is_a_miss() {
        let search: MbReleaseSearch = serde_json::from_str(r#"{"releases": []}"#).unwrap();
        let lookup = gtin_result("036000291452", search);
        assert!(!lookup.found);
        assert_eq!(lookup.gtin, "036000291452");
    }

    #[test]
    fn test_isrc_duration_rounds_to_seconds() {
        let body: MbIsrc = serde_json::from_value(serde_json::json!({
            "recordings": [{
                "title": "Night Drive",
                "length": 185600,
                "artist-credit": [{ "name": "Nova" }],
            }],
        }))
        .unwrap();
        let lookup = isrc_result("USRC17607839", body);
        assert_eq!(lookup.duration_seconds, Some(186));
        assert_eq!(lookup.artist.as_deref(), Some("Nova"));
    }

    #[test]
    fn test_iswc_writers_deduplicated() {
        let body: MbIswc = serde_json::from_str(
            r#"{"works": [{"title": "Night Drive", "relations": [
                {"type": "composer", "artist": {"name": "Nova Reyes"}},
                {"type": "lyricist", "artist": {"name": "Nova Reyes"}},
                {"type": "arranger", "artist": {"name": "Sam Kite"}}
            ]}]}"#,
        )
        .unwrap();
        let lookup = iswc_result("T0345246801", body);
        assert_eq!(lookup.writers, vec!["Nova Reyes"]);
    }

    #[test]
    fn test_dotted_iswc() {
        assert_eq!(dotted_iswc("T0345246801"), "T-034.524.680-1");
        assert_eq!(dotted_iswc("T123"), "T123");
    }

    #[test]
    fn test_release_type_names() {
        assert_eq!(release_type_from(Some("EP")), Some(ReleaseType::Ep));
        assert_eq!(release_type_from(Some("Broadcast")), None);
        assert_eq!(release_type_from(None), None);
    }
}
