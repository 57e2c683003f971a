use super::CaptionTrack;

/// Priority rank for a caption track. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TrackTier {
    /// Exact language match, human-authored
    ExactManual = 1,
    /// Language-prefix match (e.g. requested `en` matches `en-US`), human-authored
    PrefixManual = 2,
    /// Exact language match, auto-generated
    ExactAuto = 3,
    /// Any English-prefixed, human-authored track
    AnyEnglishManual = 4,
}

/// Classify one track against the requested language, or `None` if it is
/// not a candidate at all.
pub fn classify_track(track: &CaptionTrack, language: &str) -> Option<TrackTier> {
    let lang = track.language.as_str();

    if lang == language {
        if track.auto_generated {
            return Some(TrackTier::ExactAuto);
        }
        return Some(TrackTier::ExactManual);
    }

    if !track.auto_generated {
        if lang.starts_with(language) {
            return Some(TrackTier::PrefixManual);
        }
        if lang.starts_with("en") {
            return Some(TrackTier::AnyEnglishManual);
        }
    }

    None
}

/// Pick the best track for the requested language.
///
/// Scanning stops as soon as a manual exact or prefix match is found; lower
/// tiers are remembered while the scan continues. The same winner is chosen
/// regardless of list ordering.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    let mut best: Option<(TrackTier, &CaptionTrack)> = None;

    for track in tracks {
        let Some(tier) = classify_track(track, language) else {
            continue;
        };

        if best.map_or(true, |(current, _)| tier < current) {
            best = Some((tier, track));
        }

        if matches!(tier, TrackTier::ExactManual | TrackTier::PrefixManual) {
            break;
        }
    }

    best.map(|(_, track)| track)
}
