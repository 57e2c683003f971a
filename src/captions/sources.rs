use super::srt::{cues_to_srt, TranscriptCue};
use super::{
    select_track, CaptionFormat, CaptionMethod, CaptionResult, CaptionSource, CaptionTrack,
    SourceOutcome,
};
use crate::transport::Transport;
use crate::validation::{ApiKey, VideoId};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

const TRANSCRIPT_API_URL: &str = "https://www.youtube.com/api/timedtext";
const CAPTIONS_API_URL: &str = "https://www.googleapis.com/youtube/v3/captions";

/// Direct-transcript source: fast, auto-caption only.
///
/// Returns the raw cue list for a video in one call; any failure means
/// "try the next source", never an error.
pub struct DirectTranscriptSource {
    transport: Arc<dyn Transport>,
    endpoint: String,
}

impl DirectTranscriptSource {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            endpoint: TRANSCRIPT_API_URL.to_string(),
        }
    }

    pub fn with_endpoint(transport: Arc<dyn Transport>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl CaptionSource for DirectTranscriptSource {
    async fn fetch(&self, video_id: &VideoId, language: &str) -> SourceOutcome {
        let query = [
            ("v", video_id.to_string()),
            ("lang", language.to_string()),
            ("fmt", "json3".to_string()),
        ];

        let body = match self.transport.get_json(&self.endpoint, &query).await {
            Ok(body) => body,
            Err(e) => {
                debug!("Direct transcript fetch failed for {}: {}", video_id, e);
                return SourceOutcome::Skip;
            }
        };

        let cues: Vec<TranscriptCue> = match serde_json::from_value(body) {
            Ok(cues) => cues,
            Err(e) => {
                debug!("Unexpected transcript shape for {}: {}", video_id, e);
                return SourceOutcome::Skip;
            }
        };

        // Empty cue list, or one where no cue had usable offsets.
        let content = cues_to_srt(&cues);
        if content.is_empty() {
            debug!("No usable transcript cues for {}", video_id);
            return SourceOutcome::Skip;
        }

        SourceOutcome::Resolved(CaptionResult {
            language: language.to_string(),
            auto_generated: true,
            content,
            format: CaptionFormat::Srt,
            method: CaptionMethod::DirectTranscript,
        })
    }

    fn name(&self) -> &'static str {
        "direct-transcript"
    }
}

/// Platform-captions-listing source: supports manual tracks and multiple
/// languages via a two-step list-then-download flow.
pub struct ListedTracksSource {
    transport: Arc<dyn Transport>,
    api_key: Option<ApiKey>,
    formats: Vec<CaptionFormat>,
    endpoint: String,
}

impl ListedTracksSource {
    pub fn new(
        transport: Arc<dyn Transport>,
        api_key: Option<ApiKey>,
        formats: Vec<CaptionFormat>,
    ) -> Self {
        let formats = if formats.is_empty() {
            vec![CaptionFormat::Srt, CaptionFormat::Vtt]
        } else {
            formats
        };

        Self {
            transport,
            api_key,
            formats,
            endpoint: CAPTIONS_API_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn list_tracks(&self, video_id: &VideoId, key: &ApiKey) -> Option<Vec<CaptionTrack>> {
        let query = [
            ("part", "snippet".to_string()),
            ("videoId", video_id.to_string()),
            ("key", key.as_str().to_string()),
        ];

        let body = match self.transport.get_json(&self.endpoint, &query).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Caption listing failed for {}: {}", video_id, e);
                return None;
            }
        };

        let items = body.get("items").and_then(Value::as_array)?;
        let tracks = items.iter().filter_map(parse_track).collect();
        Some(tracks)
    }

    /// Format fallback: try each configured format in order, first success wins.
    async fn download_track(&self, track: &CaptionTrack, key: &ApiKey) -> Option<CaptionResult> {
        let url = format!("{}/{}", self.endpoint, track.track_id);

        for format in &self.formats {
            let query = [
                ("key", key.as_str().to_string()),
                ("tfmt", format.as_param().to_string()),
            ];

            match self.transport.get_text(&url, &query).await {
                Ok(content) => {
                    return Some(CaptionResult {
                        language: track.language.clone(),
                        auto_generated: track.auto_generated,
                        content,
                        format: *format,
                        method: CaptionMethod::PlatformApi,
                    });
                }
                Err(e) => {
                    debug!(
                        "Caption download in {} failed for track {}: {}",
                        format.as_param(),
                        track.track_id,
                        e
                    );
                }
            }
        }

        None
    }
}

#[async_trait]
impl CaptionSource for ListedTracksSource {
    async fn fetch(&self, video_id: &VideoId, language: &str) -> SourceOutcome {
        // Without a key this source cannot run; let the chain continue.
        let Some(key) = &self.api_key else {
            debug!("No API key configured, skipping platform caption listing");
            return SourceOutcome::Skip;
        };

        let Some(tracks) = self.list_tracks(video_id, key).await else {
            return SourceOutcome::NoCaptions;
        };

        if tracks.is_empty() {
            debug!("No caption tracks listed for {}", video_id);
            return SourceOutcome::NoCaptions;
        }

        debug!("Found {} caption tracks for {}", tracks.len(), video_id);

        let Some(track) = select_track(&tracks, language) else {
            warn!(
                "No suitable caption track for {} (language '{}')",
                video_id, language
            );
            return SourceOutcome::NoCaptions;
        };

        match self.download_track(track, key).await {
            Some(result) => SourceOutcome::Resolved(result),
            None => SourceOutcome::NoCaptions,
        }
    }

    fn name(&self) -> &'static str {
        "platform-captions"
    }
}

fn parse_track(item: &Value) -> Option<CaptionTrack> {
    let snippet = item.get("snippet")?;
    Some(CaptionTrack {
        language: snippet
            .get("language")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        auto_generated: snippet.get("trackKind").and_then(Value::as_str) == Some("ASR"),
        track_id: item.get("id").and_then(Value::as_str)?.to_string(),
    })
}
