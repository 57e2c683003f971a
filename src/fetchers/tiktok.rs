use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

const HASHTAGS_URL: &str =
    "https://api.apify.com/v2/acts/dtrungtin~tiktok-trending-hashtags/runs/last/dataset/items";
const SOUNDS_URL: &str =
    "https://api.apify.com/v2/acts/dtrungtin~tiktok-trending-sounds/runs/last/dataset/items";

/// One trending hashtag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashtagTrend {
    pub hashtag: String,
    pub count: u64,
}

/// One trending sound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundTrend {
    pub sound_name: String,
    pub play_count: u64,
}

/// Short-video trend signals from the third-party dataset endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShortVideoTrends {
    pub hashtags: Vec<HashtagTrend>,
    pub sounds: Vec<SoundTrend>,
}

/// Fetches short-video trend datasets. The token is optional and only
/// raises rate limits; failures yield empty lists, never errors.
pub struct ShortVideoFetcher {
    transport: Arc<dyn Transport>,
    token: Option<String>,
}

impl ShortVideoFetcher {
    pub fn new(transport: Arc<dyn Transport>, token: Option<String>) -> Self {
        Self { transport, token }
    }

    pub async fn fetch_short_video_trends(&self) -> ShortVideoTrends {
        let query = [("clean", "1".to_string())];
        let bearer = self.token.as_deref();

        let hashtags = match self
            .transport
            .get_json_auth(HASHTAGS_URL, &query, bearer)
            .await
        {
            Ok(body) => parse_hashtags(&body),
            Err(e) => {
                warn!("Failed to fetch trending hashtags: {}", e);
                Vec::new()
            }
        };

        let sounds = match self.transport.get_json_auth(SOUNDS_URL, &query, bearer).await {
            Ok(body) => parse_sounds(&body),
            Err(e) => {
                warn!("Failed to fetch trending sounds: {}", e);
                Vec::new()
            }
        };

        info!(
            "🎵 Short-video trends: {} hashtags, {} sounds",
            hashtags.len(),
            sounds.len()
        );
        ShortVideoTrends { hashtags, sounds }
    }
}

fn parse_hashtags(body: &Value) -> Vec<HashtagTrend> {
    body.as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| HashtagTrend {
                    hashtag: item
                        .get("hashtag")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    count: count_of(item, "playCount"),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_sounds(body: &Value) -> Vec<SoundTrend> {
    body.as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| SoundTrend {
                    sound_name: item
                        .get("soundName")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    play_count: count_of(item, "playCount"),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn count_of(item: &Value, field: &str) -> u64 {
    match item.get(field) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}
