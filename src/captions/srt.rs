use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One raw transcript cue as returned by the direct-transcript source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptCue {
    /// Cue start offset in seconds
    pub start: f64,
    /// Cue duration in seconds
    pub duration: f64,
    /// Cue text
    pub text: String,
}

/// SRT (SubRip Subtitle) entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SrtEntry {
    /// Sequential number, 1-based
    pub index: u32,
    /// Start timestamp
    pub start: Duration,
    /// End timestamp
    pub end: Duration,
    /// Subtitle text
    pub text: String,
}

impl SrtEntry {
    pub fn new(index: u32, start: Duration, end: Duration, text: String) -> Self {
        Self {
            index,
            start,
            end,
            text: text.trim().to_string(),
        }
    }
}

impl fmt::Display for SrtEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{} --> {}\n{}",
            self.index,
            format_timestamp(self.start),
            format_timestamp(self.end),
            self.text
        )
    }
}

/// Format a duration as an SRT timestamp (HH:MM:SS,mmm).
pub fn format_timestamp(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = duration.subsec_millis();

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Convert a raw cue list into numbered SRT entries.
///
/// Cue offsets come from an untrusted response body. Negative values clamp
/// to zero; non-finite or unrepresentably large values drop the cue. The
/// surviving entries stay sequentially numbered.
pub fn entries_from_cues(cues: &[TranscriptCue]) -> Vec<SrtEntry> {
    let mut entries = Vec::with_capacity(cues.len());

    for cue in cues {
        if !cue.start.is_finite() || !cue.duration.is_finite() {
            continue;
        }
        let Ok(start) = Duration::try_from_secs_f64(cue.start.max(0.0)) else {
            continue;
        };
        let Ok(length) = Duration::try_from_secs_f64(cue.duration.max(0.0)) else {
            continue;
        };
        let Some(end) = start.checked_add(length) else {
            continue;
        };

        let index = entries.len() as u32 + 1;
        entries.push(SrtEntry::new(index, start, end, cue.text.clone()));
    }

    entries
}

/// Render SRT entries as a complete subtitle document.
pub fn render_srt(entries: &[SrtEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Convenience: raw cues straight to SRT text.
pub fn cues_to_srt(cues: &[TranscriptCue]) -> String {
    render_srt(&entries_from_cues(cues))
}
