pub mod selection;
pub mod sources;
pub mod srt;

use crate::transport::Transport;
use crate::validation::{ApiKey, VideoId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

pub use selection::{classify_track, select_track, TrackTier};
pub use sources::{DirectTranscriptSource, ListedTracksSource};
pub use srt::{cues_to_srt, SrtEntry, TranscriptCue};

/// Upstream metadata for one available caption track.
///
/// Transient: exists only while a track is being selected.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub language: String,
    pub auto_generated: bool,
    pub track_id: String,
}

/// Subtitle content format supported for downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionFormat {
    Srt,
    Vtt,
}

impl CaptionFormat {
    pub fn as_param(&self) -> &'static str {
        match self {
            CaptionFormat::Srt => "srt",
            CaptionFormat::Vtt => "vtt",
        }
    }
}

/// Which source produced a caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptionMethod {
    DirectTranscript,
    PlatformApi,
}

/// A resolved caption: at most one per video per resolution call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionResult {
    pub language: String,
    pub auto_generated: bool,
    pub content: String,
    pub format: CaptionFormat,
    pub method: CaptionMethod,
}

/// Outcome of one caption source attempt.
#[derive(Debug)]
pub enum SourceOutcome {
    /// Caption resolved, stop here
    Resolved(CaptionResult),
    /// Source unusable or failed, advance to the next source
    Skip,
    /// Source answered authoritatively that no caption exists
    NoCaptions,
}

/// One way of obtaining caption text for a video.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn fetch(&self, video_id: &VideoId, language: &str) -> SourceOutcome;

    fn name(&self) -> &'static str;
}

/// Resolves captions by walking an ordered list of sources.
///
/// The resolver's only guaranteed output is a caption or nothing; adapter
/// failures are downgraded to fallback steps and never reach the caller.
pub struct CaptionResolver {
    sources: Vec<Box<dyn CaptionSource>>,
}

impl CaptionResolver {
    /// Standard source chain: direct transcript first, platform listing second.
    pub fn new(
        transport: Arc<dyn Transport>,
        api_key: Option<ApiKey>,
        formats: Vec<CaptionFormat>,
    ) -> Self {
        let sources: Vec<Box<dyn CaptionSource>> = vec![
            Box::new(DirectTranscriptSource::new(Arc::clone(&transport))),
            Box::new(ListedTracksSource::new(transport, api_key, formats)),
        ];

        Self { sources }
    }

    /// Build a resolver from an explicit source list. Ordering is priority.
    pub fn with_sources(sources: Vec<Box<dyn CaptionSource>>) -> Self {
        Self { sources }
    }

    /// Resolve at most one caption for the video in the requested language.
    pub async fn resolve(&self, video_id: &VideoId, language: &str) -> Option<CaptionResult> {
        for source in &self.sources {
            match source.fetch(video_id, language).await {
                SourceOutcome::Resolved(result) => {
                    info!(
                        "📝 Caption resolved for {} via {} ({}, auto={})",
                        video_id,
                        source.name(),
                        result.language,
                        result.auto_generated
                    );
                    return Some(result);
                }
                SourceOutcome::Skip => {
                    debug!(
                        "Caption source {} skipped for {}, trying next",
                        source.name(),
                        video_id
                    );
                }
                SourceOutcome::NoCaptions => {
                    debug!("No captions available for {}", video_id);
                    return None;
                }
            }
        }

        debug!("All caption sources exhausted for {}", video_id);
        None
    }
}
