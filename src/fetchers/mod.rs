pub mod tiktok;
pub mod youtube;

pub use tiktok::{HashtagTrend, ShortVideoFetcher, ShortVideoTrends, SoundTrend};
pub use youtube::{CategoryDescriptor, TrendRecord, TrendingFetcher, TrendingQuery};
