use crate::error::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Region codes accepted by the trending endpoints.
pub const VALID_REGION_CODES: [&str; 20] = [
    "US", "GB", "CA", "AU", "DE", "FR", "JP", "IN", "BR", "MX", "KR", "RU", "IT", "ES", "NL",
    "SE", "NO", "DK", "FI", "CH",
];

const VIDEO_ID_PATTERN: &str = r"^[a-zA-Z0-9_-]{11}$";
const MIN_API_KEY_LENGTH: usize = 10;

/// A validated, uppercase two-letter region code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionCode(String);

impl RegionCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated 11-character video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated API key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keys never appear in logs or debug output.
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

/// Validate and normalize a region code.
pub fn validate_region_code(region_code: &str) -> Result<RegionCode, ValidationError> {
    let trimmed = region_code.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyRegion);
    }

    let normalized = trimmed.to_uppercase();
    if !VALID_REGION_CODES.contains(&normalized.as_str()) {
        let mut valid: Vec<&str> = VALID_REGION_CODES.to_vec();
        valid.sort_unstable();
        return Err(ValidationError::InvalidRegion {
            code: normalized,
            valid: valid.join(", "),
        });
    }

    Ok(RegionCode(normalized))
}

/// Validate a video ID against the 11-character pattern.
pub fn validate_video_id(video_id: &str) -> Result<VideoId, ValidationError> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(VIDEO_ID_PATTERN).unwrap());

    if !pattern.is_match(video_id) {
        return Err(ValidationError::InvalidVideoId(video_id.to_string()));
    }

    Ok(VideoId(video_id.to_string()))
}

/// Validate an API key: non-empty and at least a minimum length.
pub fn validate_api_key(api_key: &str, service_name: &str) -> Result<ApiKey, ValidationError> {
    if api_key.is_empty() {
        return Err(ValidationError::EmptyApiKey {
            service: service_name.to_string(),
        });
    }

    if api_key.len() < MIN_API_KEY_LENGTH {
        return Err(ValidationError::ApiKeyTooShort {
            service: service_name.to_string(),
        });
    }

    Ok(ApiKey(api_key.to_string()))
}

/// All supported regions, sorted for deterministic traversal.
pub fn sorted_region_codes() -> Vec<RegionCode> {
    let mut regions: Vec<RegionCode> = VALID_REGION_CODES
        .iter()
        .map(|code| RegionCode(code.to_string()))
        .collect();
    regions.sort();
    regions
}
