//! Trend Harvester
//!
//! Aggregates social-media trend signals (trending videos, topics, music,
//! categories, hashtags) from remote platform APIs, resolves captions
//! through a tiered fallback chain, and performs bulk multi-region
//! collection sweeps that survive partial failures.

pub mod captions;
pub mod collection;
pub mod config;
pub mod error;
pub mod fetchers;
pub mod storage;
pub mod transport;
pub mod validation;

// Re-export main types for easy access
pub use crate::captions::{CaptionFormat, CaptionMethod, CaptionResolver, CaptionResult};
pub use crate::collection::{BulkCollector, CollectionReport};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{FetchError, TransportError, ValidationError};
pub use crate::fetchers::{
    CategoryDescriptor, ShortVideoFetcher, ShortVideoTrends, TrendRecord, TrendingFetcher,
    TrendingQuery,
};
pub use crate::storage::ResultStore;
pub use crate::transport::{HttpTransport, Transport};
pub use crate::validation::{
    validate_api_key, validate_region_code, validate_video_id, RegionCode, VideoId,
};
