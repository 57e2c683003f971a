use crate::captions::{CaptionFormat, CaptionResolver, CaptionResult};
use crate::config::Config;
use crate::error::FetchError;
use crate::transport::Transport;
use crate::validation::{validate_api_key, validate_region_code, validate_video_id, ApiKey};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";
const VIDEO_CATEGORIES_URL: &str = "https://www.googleapis.com/youtube/v3/videoCategories";
const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";

/// Maximum results per request allowed by the platform.
pub const MAX_RESULTS: usize = 50;

const MUSIC_CATEGORY_ID: &str = "10";

// Default owning channel for categories when upstream omits it.
const PLATFORM_CHANNEL_ID: &str = "UCBR8-60-B28hp2BmDPdntcQ";

/// A normalized trending item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendRecord {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub channel_id: Option<String>,
    pub published_at: Option<String>,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub tags: Vec<String>,
    pub category_id: Option<String>,
    pub description: String,
    pub duration: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captions: Option<CaptionResult>,
}

impl TrendRecord {
    /// Map one raw upstream item onto a record. Items without an id are
    /// dropped; missing counters default to 0.
    pub fn from_item(item: &Value) -> Option<Self> {
        let id = item.get("id").and_then(Value::as_str)?.to_string();
        let snippet = item.get("snippet").cloned().unwrap_or(Value::Null);
        let statistics = item.get("statistics").cloned().unwrap_or(Value::Null);
        let content_details = item.get("contentDetails").cloned().unwrap_or(Value::Null);

        Some(Self {
            id,
            title: str_field(&snippet, "title"),
            channel: str_field(&snippet, "channelTitle"),
            channel_id: opt_str_field(&snippet, "channelId"),
            published_at: opt_str_field(&snippet, "publishedAt"),
            views: count_field(&statistics, "viewCount"),
            likes: count_field(&statistics, "likeCount"),
            comments: count_field(&statistics, "commentCount"),
            tags: snippet
                .get("tags")
                .and_then(Value::as_array)
                .map(|tags| {
                    tags.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            category_id: opt_str_field(&snippet, "categoryId"),
            description: str_field(&snippet, "description"),
            duration: opt_str_field(&content_details, "duration"),
            thumbnail_url: snippet
                .pointer("/thumbnails/high/url")
                .and_then(Value::as_str)
                .map(str::to_string),
            captions: None,
        })
    }
}

/// One video category available in a region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDescriptor {
    pub id: String,
    pub title: String,
    pub channel_id: String,
    pub assignable: bool,
}

impl CategoryDescriptor {
    fn from_item(item: &Value) -> Option<Self> {
        let id = item.get("id").and_then(Value::as_str)?.to_string();
        let snippet = item.get("snippet").cloned().unwrap_or(Value::Null);

        Some(Self {
            id,
            title: str_field(&snippet, "title"),
            channel_id: opt_str_field(&snippet, "channelId")
                .unwrap_or_else(|| PLATFORM_CHANNEL_ID.to_string()),
            assignable: snippet
                .get("assignable")
                .and_then(Value::as_bool)
                .unwrap_or(true),
        })
    }
}

/// Parameters for a trending-videos fetch.
#[derive(Debug, Clone)]
pub struct TrendingQuery {
    pub region: String,
    pub max_results: usize,
    pub category_filter: Option<String>,
    pub include_captions: bool,
    pub caption_language: String,
}

impl Default for TrendingQuery {
    fn default() -> Self {
        Self {
            region: "US".to_string(),
            max_results: 25,
            category_filter: None,
            include_captions: false,
            caption_language: "en".to_string(),
        }
    }
}

/// Per-domain retrieval against the trending platform API.
///
/// Every operation validates its inputs before any network call.
#[derive(Clone)]
pub struct TrendingFetcher {
    transport: Arc<dyn Transport>,
    api_key: Option<String>,
    caption_formats: Vec<CaptionFormat>,
    overfetch_multiplier: usize,
    published_after_days: i64,
}

impl TrendingFetcher {
    pub fn new(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self {
            transport,
            api_key: config.api.youtube_api_key.clone(),
            caption_formats: config.captions.preferred_formats.clone(),
            overfetch_multiplier: config.collection.overfetch_multiplier,
            published_after_days: config.collection.published_after_days,
        }
    }

    /// Validated credential, or a configuration error if none is set.
    pub fn require_key(&self) -> Result<ApiKey, FetchError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FetchError::missing_key("YouTube"))?;
        Ok(validate_api_key(key, "YouTube")?)
    }

    /// Resolver wired to this fetcher's transport and credential.
    pub fn resolver(&self) -> CaptionResolver {
        let key = self
            .api_key
            .as_deref()
            .and_then(|k| validate_api_key(k, "YouTube").ok());
        CaptionResolver::new(
            Arc::clone(&self.transport),
            key,
            self.caption_formats.clone(),
        )
    }

    /// Fetch the trending chart for a region, optionally enriching each
    /// record with a resolved caption.
    pub async fn fetch_trending_videos(
        &self,
        query: &TrendingQuery,
    ) -> Result<Vec<TrendRecord>, FetchError> {
        let key = self.require_key()?;
        let region = validate_region_code(&query.region)?;
        let max_results = query.max_results.clamp(1, MAX_RESULTS);

        let mut params = vec![
            ("part", "snippet,contentDetails,statistics".to_string()),
            ("chart", "mostPopular".to_string()),
            ("regionCode", region.to_string()),
            ("maxResults", max_results.to_string()),
            ("key", key.as_str().to_string()),
        ];
        if let Some(category) = &query.category_filter {
            params.push(("videoCategoryId", category.clone()));
        }

        info!("📈 Fetching trending videos for {}", region);
        let body = self.transport.get_json(VIDEOS_URL, &params).await?;
        let mut records = parse_record_items(&body);

        if query.include_captions {
            let resolver = self.resolver();
            for record in &mut records {
                let Ok(video_id) = validate_video_id(&record.id) else {
                    continue;
                };
                record.captions = resolver.resolve(&video_id, &query.caption_language).await;
            }
        }

        Ok(records)
    }

    /// Titles of the trending chart for a region.
    pub async fn fetch_trending_topics(
        &self,
        region: &str,
        max_results: usize,
    ) -> Result<Vec<String>, FetchError> {
        let query = TrendingQuery {
            region: region.to_string(),
            max_results,
            ..TrendingQuery::default()
        };
        let videos = self.fetch_trending_videos(&query).await?;
        Ok(videos
            .into_iter()
            .filter(|v| !v.title.is_empty())
            .map(|v| v.title)
            .collect())
    }

    /// Trending music videos (fixed music category).
    pub async fn fetch_trending_music(
        &self,
        region: &str,
        max_results: usize,
    ) -> Result<Vec<TrendRecord>, FetchError> {
        let query = TrendingQuery {
            region: region.to_string(),
            max_results,
            category_filter: Some(MUSIC_CATEGORY_ID.to_string()),
            ..TrendingQuery::default()
        };
        self.fetch_trending_videos(&query).await
    }

    /// List video categories, either for a region or for an explicit set of
    /// video ids. Exactly one selector must be supplied.
    pub async fn list_categories(
        &self,
        region: Option<&str>,
        video_ids: Option<&[String]>,
    ) -> Result<Vec<CategoryDescriptor>, FetchError> {
        let key = self.require_key()?;

        let params = match (region, video_ids) {
            (Some(region), None) => {
                let region = validate_region_code(region)?;
                debug!("Fetching video categories for region {}", region);
                vec![
                    ("part", "snippet".to_string()),
                    ("regionCode", region.to_string()),
                    ("key", key.as_str().to_string()),
                ]
            }
            (None, Some(ids)) => {
                let category_ids = self.categories_of_videos(ids, &key).await?;
                if category_ids.is_empty() {
                    warn!("No category IDs found for the provided video IDs");
                    return Ok(Vec::new());
                }
                debug!("Fetching details for {} categories", category_ids.len());
                vec![
                    ("part", "snippet".to_string()),
                    (
                        "id",
                        category_ids.into_iter().collect::<Vec<_>>().join(","),
                    ),
                    ("key", key.as_str().to_string()),
                ]
            }
            _ => {
                return Err(FetchError::Configuration(
                    "exactly one of region or video_ids must be provided".to_string(),
                ));
            }
        };

        let body = self.transport.get_json(VIDEO_CATEGORIES_URL, &params).await?;
        let categories: Vec<CategoryDescriptor> = body
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(CategoryDescriptor::from_item).collect())
            .unwrap_or_default();

        info!("Fetched {} video categories", categories.len());
        Ok(categories)
    }

    /// Resolve each video to its category id, de-duplicated.
    async fn categories_of_videos(
        &self,
        video_ids: &[String],
        key: &ApiKey,
    ) -> Result<BTreeSet<String>, FetchError> {
        let validated: Result<Vec<_>, _> = video_ids
            .iter()
            .map(|id| validate_video_id(id))
            .collect();
        let validated = validated?;

        let params = [
            ("part", "snippet".to_string()),
            (
                "id",
                validated
                    .iter()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            ("key", key.as_str().to_string()),
        ];

        debug!("Fetching video details for {} videos", validated.len());
        let body = self.transport.get_json(VIDEOS_URL, &params).await?;

        let mut category_ids = BTreeSet::new();
        if let Some(items) = body.get("items").and_then(Value::as_array) {
            for item in items {
                if let Some(category_id) = item
                    .pointer("/snippet/categoryId")
                    .and_then(Value::as_str)
                {
                    category_ids.insert(category_id.to_string());
                }
            }
        }

        Ok(category_ids)
    }

    /// Top-n popular videos for a category, sorted by view count descending.
    ///
    /// Two-phase fetch: a search over-fetches candidates ordered by view
    /// count within a recency window, then a details batch fetch fills in
    /// full metadata. Items whose category does not match the request are
    /// dropped before sorting and truncation.
    pub async fn fetch_popular_by_category(
        &self,
        category_id: &str,
        n: usize,
        region: &str,
    ) -> Result<Vec<TrendRecord>, FetchError> {
        let key = self.require_key()?;
        let region = validate_region_code(region)?;
        let n = n.clamp(1, MAX_RESULTS);

        let search_limit = (n * self.overfetch_multiplier.max(1)).min(MAX_RESULTS);
        let published_after = (Utc::now() - chrono::Duration::days(self.published_after_days))
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        let search_params = [
            ("part", "id".to_string()),
            ("type", "video".to_string()),
            ("videoCategoryId", category_id.to_string()),
            ("regionCode", region.to_string()),
            ("maxResults", search_limit.to_string()),
            ("order", "viewCount".to_string()),
            ("publishedAfter", published_after),
            ("key", key.as_str().to_string()),
        ];

        debug!(
            "Searching for videos in category {} in {}",
            category_id, region
        );
        let search_body = self.transport.get_json(SEARCH_URL, &search_params).await?;

        let video_ids: Vec<String> = search_body
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.pointer("/id/videoId").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if video_ids.is_empty() {
            warn!(
                "No videos found for category {} in {}",
                category_id, region
            );
            return Ok(Vec::new());
        }

        let details_params = [
            ("part", "snippet,contentDetails,statistics".to_string()),
            ("id", video_ids.join(",")),
            ("key", key.as_str().to_string()),
        ];

        let details_body = self.transport.get_json(VIDEOS_URL, &details_params).await?;
        let mut videos: Vec<TrendRecord> = parse_record_items(&details_body)
            .into_iter()
            .filter(|record| match &record.category_id {
                Some(actual) if actual == category_id => true,
                other => {
                    // Search results can carry a stale category assignment.
                    debug!(
                        "Skipping video {} - category mismatch: expected {}, got {:?}",
                        record.id, category_id, other
                    );
                    false
                }
            })
            .collect();

        videos.sort_by(|a, b| b.views.cmp(&a.views));
        videos.truncate(n);

        info!(
            "Fetched {} popular videos from category {}",
            videos.len(),
            category_id
        );
        Ok(videos)
    }
}

fn parse_record_items(body: &Value) -> Vec<TrendRecord> {
    body.get("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(TrendRecord::from_item).collect())
        .unwrap_or_default()
}

fn str_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn opt_str_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Counters arrive as strings, numbers, or not at all; anything unusable
/// normalizes to 0.
fn count_field(value: &Value, field: &str) -> u64 {
    match value.get(field) {
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}
