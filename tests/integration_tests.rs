use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use trend_harvester::collection::BulkCollector;
use trend_harvester::error::{FetchError, TransportError};
use trend_harvester::captions::CaptionFormat;
use trend_harvester::storage::ResultStore;
use trend_harvester::transport::Transport;
use trend_harvester::validation::{validate_region_code, validate_video_id};
use trend_harvester::{ConfigBuilder, TrendingFetcher, TrendingQuery};

type JsonHandler =
    Box<dyn Fn(&str, &[(&str, String)]) -> Result<Value, TransportError> + Send + Sync>;
type TextHandler =
    Box<dyn Fn(&str, &[(&str, String)]) -> Result<String, TransportError> + Send + Sync>;

/// In-memory transport driven by test-supplied handlers.
struct MockTransport {
    json: JsonHandler,
    text: TextHandler,
}

impl MockTransport {
    fn new(
        json: impl Fn(&str, &[(&str, String)]) -> Result<Value, TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            json: Box::new(json),
            text: Box::new(|url, _| {
                Err(TransportError::Status {
                    status: 404,
                    body: format!("no text handler for {}", url),
                })
            }),
        }
    }

    fn with_text(
        mut self,
        text: impl Fn(&str, &[(&str, String)]) -> Result<String, TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.text = Box::new(text);
        self
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, TransportError> {
        (self.json)(url, query)
    }

    async fn get_text(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<String, TransportError> {
        (self.text)(url, query)
    }
}

fn param<'a>(query: &'a [(&str, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.as_str())
}

fn server_error() -> TransportError {
    TransportError::Status {
        status: 500,
        body: "boom".to_string(),
    }
}

fn fetcher_with(transport: MockTransport) -> TrendingFetcher {
    let config = ConfigBuilder::new()
        .with_api_key("0123456789abcdef")
        .build();
    TrendingFetcher::new(Arc::new(transport), &config)
}

#[tokio::test]
async fn popular_by_category_filters_sorts_and_truncates() {
    let transport = MockTransport::new(|url, query| {
        if url.contains("/search") {
            assert_eq!(param(query, "order"), Some("viewCount"));
            assert!(param(query, "publishedAfter").is_some());
            return Ok(json!({"items": [
                {"id": {"videoId": "aaaaaaaaaaa"}},
                {"id": {"videoId": "bbbbbbbbbbb"}},
                {"id": {"videoId": "ccccccccccc"}},
            ]}));
        }
        if url.contains("/videos") {
            return Ok(json!({"items": [
                {"id": "aaaaaaaaaaa", "snippet": {"categoryId": "10", "title": "low"},
                 "statistics": {"viewCount": "100"}},
                // Category drifted upstream, must be dropped
                {"id": "bbbbbbbbbbb", "snippet": {"categoryId": "22", "title": "wrong"},
                 "statistics": {"viewCount": "900"}},
                {"id": "ccccccccccc", "snippet": {"categoryId": "10", "title": "high"},
                 "statistics": {"viewCount": "500"}},
            ]}));
        }
        Err(server_error())
    });

    let fetcher = fetcher_with(transport);
    let videos = fetcher
        .fetch_popular_by_category("10", 2, "US")
        .await
        .unwrap();

    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0].id, "ccccccccccc");
    assert_eq!(videos[0].views, 500);
    assert_eq!(videos[1].id, "aaaaaaaaaaa");
    assert!(videos.iter().all(|v| v.id != "bbbbbbbbbbb"));
}

#[tokio::test]
async fn trending_counters_default_to_zero() {
    let transport = MockTransport::new(|url, _| {
        if url.contains("/videos") {
            return Ok(json!({"items": [
                {"id": "aaaaaaaaaaa", "snippet": {"title": "no stats"}}
            ]}));
        }
        Err(server_error())
    });

    let fetcher = fetcher_with(transport);
    let videos = fetcher
        .fetch_trending_videos(&TrendingQuery::default())
        .await
        .unwrap();

    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].views, 0);
    assert_eq!(videos[0].likes, 0);
    assert_eq!(videos[0].comments, 0);
}

#[tokio::test]
async fn invalid_region_never_reaches_transport() {
    let transport = MockTransport::new(|url, _| {
        panic!("transport must not be called, got {}", url);
    });

    let fetcher = fetcher_with(transport);
    let query = TrendingQuery {
        region: "ZZ".to_string(),
        ..TrendingQuery::default()
    };

    let result = fetcher.fetch_trending_videos(&query).await;
    assert!(matches!(result, Err(FetchError::Validation(_))));
}

#[tokio::test]
async fn missing_key_is_a_configuration_error() {
    let transport = MockTransport::new(|url, _| {
        panic!("transport must not be called, got {}", url);
    });

    let config = ConfigBuilder::new().build();
    let fetcher = TrendingFetcher::new(Arc::new(transport), &config);

    let result = fetcher.fetch_trending_videos(&TrendingQuery::default()).await;
    assert!(matches!(result, Err(FetchError::Configuration(_))));
}

#[tokio::test]
async fn caption_resolution_never_raises() {
    // Every adapter fails; the resolver must come back with nothing.
    let transport = MockTransport::new(|_, _| Err(server_error()))
        .with_text(|_, _| Err(server_error()));

    let fetcher = fetcher_with(transport);
    let resolver = fetcher.resolver();
    let video_id = validate_video_id("dQw4w9WgXcQ").unwrap();

    assert!(resolver.resolve(&video_id, "en").await.is_none());
}

#[tokio::test]
async fn malformed_transcript_cues_resolve_to_nothing() {
    // A cue with an absurd start offset must not take the resolver down;
    // the direct source yields to the next one, which has no captions.
    let transport = MockTransport::new(|url, _| {
        if url.contains("timedtext") {
            return Ok(json!([
                {"start": 1e300, "duration": 1.0, "text": "boom"}
            ]));
        }
        Err(server_error())
    });

    let fetcher = fetcher_with(transport);
    let resolver = fetcher.resolver();
    let video_id = validate_video_id("dQw4w9WgXcQ").unwrap();

    assert!(resolver.resolve(&video_id, "en").await.is_none());
}

#[tokio::test]
async fn direct_transcript_produces_srt() {
    let transport = MockTransport::new(|url, query| {
        if url.contains("timedtext") {
            assert_eq!(param(query, "v"), Some("dQw4w9WgXcQ"));
            return Ok(json!([
                {"start": 0.0, "duration": 1.5, "text": "Never gonna"},
                {"start": 1.5, "duration": 1.5, "text": "give you up"},
            ]));
        }
        Err(server_error())
    });

    let fetcher = fetcher_with(transport);
    let resolver = fetcher.resolver();
    let video_id = validate_video_id("dQw4w9WgXcQ").unwrap();

    let caption = resolver.resolve(&video_id, "en").await.unwrap();
    assert_eq!(caption.format, CaptionFormat::Srt);
    assert!(caption.auto_generated);
    assert!(caption
        .content
        .starts_with("1\n00:00:00,000 --> 00:00:01,500\nNever gonna"));
    assert!(caption.content.contains("2\n00:00:01,500 --> 00:00:03,000"));
}

#[tokio::test]
async fn format_fallback_records_secondary_format() {
    // Direct transcript unavailable, listing succeeds, srt download fails,
    // vtt succeeds: the result must carry the vtt format.
    let transport = MockTransport::new(|url, _| {
        if url.contains("timedtext") {
            return Err(server_error());
        }
        if url.contains("/captions") {
            return Ok(json!({"items": [
                {"id": "track-1", "snippet": {"language": "en", "trackKind": "standard"}}
            ]}));
        }
        Err(server_error())
    })
    .with_text(|_, query| match param(query, "tfmt") {
        Some("vtt") => Ok("WEBVTT\n\n00:00.000 --> 00:01.000\nhi".to_string()),
        _ => Err(TransportError::Status {
            status: 404,
            body: "srt not available".to_string(),
        }),
    });

    let fetcher = fetcher_with(transport);
    let resolver = fetcher.resolver();
    let video_id = validate_video_id("dQw4w9WgXcQ").unwrap();

    let caption = resolver.resolve(&video_id, "en").await.unwrap();
    assert_eq!(caption.format, CaptionFormat::Vtt);
    assert_eq!(caption.language, "en");
    assert!(!caption.auto_generated);
}

#[tokio::test]
async fn list_categories_requires_exactly_one_selector() {
    let transport = MockTransport::new(|_, _| Err(server_error()));
    let fetcher = fetcher_with(transport);

    let result = fetcher.list_categories(None, None).await;
    assert!(matches!(result, Err(FetchError::Configuration(_))));

    let transport = MockTransport::new(|_, _| Err(server_error()));
    let fetcher = fetcher_with(transport);
    let ids = vec!["dQw4w9WgXcQ".to_string()];
    let result = fetcher.list_categories(Some("US"), Some(&ids)).await;
    assert!(matches!(result, Err(FetchError::Configuration(_))));
}

#[tokio::test]
async fn list_categories_by_video_ids_dedupes() {
    let transport = MockTransport::new(|url, query| {
        if url.contains("/videos") {
            return Ok(json!({"items": [
                {"id": "aaaaaaaaaaa", "snippet": {"categoryId": "10"}},
                {"id": "bbbbbbbbbbb", "snippet": {"categoryId": "10"}},
                {"id": "ccccccccccc", "snippet": {"categoryId": "24"}},
            ]}));
        }
        if url.contains("/videoCategories") {
            // De-duplicated and ordered category id lookup
            assert_eq!(param(query, "id"), Some("10,24"));
            return Ok(json!({"items": [
                {"id": "10", "snippet": {"title": "Music"}},
                {"id": "24", "snippet": {"title": "Entertainment"}},
            ]}));
        }
        Err(server_error())
    });

    let fetcher = fetcher_with(transport);
    let ids = vec![
        "aaaaaaaaaaa".to_string(),
        "bbbbbbbbbbb".to_string(),
        "ccccccccccc".to_string(),
    ];

    let categories = fetcher.list_categories(None, Some(&ids)).await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].title, "Music");
}

#[tokio::test]
async fn bulk_sweep_isolates_region_failures() {
    // Three regions; the middle one (GB, in sorted order CA < GB < US)
    // fails its category fetch. The other two must complete untouched.
    let transport = MockTransport::new(|url, query| {
        if url.contains("/videoCategories") {
            if param(query, "regionCode") == Some("GB") {
                return Err(server_error());
            }
            return Ok(json!({"items": [
                {"id": "1", "snippet": {"title": "Film & Animation"}}
            ]}));
        }
        if url.contains("/search") {
            return Ok(json!({"items": [{"id": {"videoId": "aaaaaaaaaaa"}}]}));
        }
        if url.contains("/videos") {
            return Ok(json!({"items": [
                {"id": "aaaaaaaaaaa", "snippet": {"categoryId": "1", "title": "t"},
                 "statistics": {"viewCount": "5"}}
            ]}));
        }
        Err(server_error())
    });

    let temp_dir = TempDir::new().unwrap();
    let fetcher = fetcher_with(transport);
    let store = ResultStore::new(temp_dir.path().join("out"));

    let regions = vec![
        validate_region_code("us").unwrap(),
        validate_region_code("gb").unwrap(),
        validate_region_code("ca").unwrap(),
    ];

    let collector = BulkCollector::new(fetcher, store, 4).with_regions(regions);
    let report = collector.run(5).await.unwrap();

    assert_eq!(report.total_regions_processed, 3);
    assert_eq!(report.total_category_units, 2);
    assert_eq!(report.total_popular_video_units, 2);
    assert_eq!(report.total_errors, 1);
    assert!(report.errors[0].contains("GB"));

    // Deterministic, sorted region order in the report
    assert_eq!(report.category_units[0].region, "CA");
    assert_eq!(report.category_units[1].region, "US");
    assert_eq!(report.regions_processed, vec!["CA", "GB", "US"]);
    assert_eq!(report.max_videos_per_category, 5);

    for unit in &report.popular_video_units {
        assert_eq!(unit.videos, 1);
        assert!(unit.saved_to.as_ref().unwrap().exists());
    }
}

#[tokio::test]
async fn bulk_sweep_isolates_category_failures() {
    // Category 2's popular fetch fails everywhere; category 1 still lands.
    let transport = MockTransport::new(|url, query| {
        if url.contains("/videoCategories") {
            return Ok(json!({"items": [
                {"id": "1", "snippet": {"title": "Film"}},
                {"id": "2", "snippet": {"title": "Autos"}},
            ]}));
        }
        if url.contains("/search") {
            if param(query, "videoCategoryId") == Some("2") {
                return Err(server_error());
            }
            return Ok(json!({"items": [{"id": {"videoId": "aaaaaaaaaaa"}}]}));
        }
        if url.contains("/videos") {
            return Ok(json!({"items": [
                {"id": "aaaaaaaaaaa", "snippet": {"categoryId": "1", "title": "t"},
                 "statistics": {"viewCount": "5"}}
            ]}));
        }
        Err(server_error())
    });

    let temp_dir = TempDir::new().unwrap();
    let fetcher = fetcher_with(transport);
    let store = ResultStore::new(temp_dir.path().join("out"));

    let collector = BulkCollector::new(fetcher, store, 2)
        .with_regions(vec![validate_region_code("US").unwrap()]);
    let report = collector.run(3).await.unwrap();

    assert_eq!(report.total_regions_processed, 1);
    assert_eq!(report.total_category_units, 1);
    assert_eq!(report.total_popular_video_units, 1);
    assert_eq!(report.total_errors, 1);
    assert!(report.errors[0].contains("category 2"));
    assert_eq!(report.popular_video_units[0].category_id, "1");
}

#[tokio::test]
async fn bulk_sweep_fails_fast_without_credentials() {
    let transport = MockTransport::new(|url, _| {
        panic!("transport must not be called, got {}", url);
    });

    let config = ConfigBuilder::new().build();
    let fetcher = TrendingFetcher::new(Arc::new(transport), &config);
    let temp_dir = TempDir::new().unwrap();
    let store = ResultStore::new(temp_dir.path().join("out"));

    let collector = BulkCollector::new(fetcher, store, 2);
    let result = collector.run(5).await;
    assert!(matches!(result, Err(FetchError::Configuration(_))));
}
