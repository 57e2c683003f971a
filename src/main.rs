use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

mod captions;
mod collection;
mod config;
mod error;
mod fetchers;
mod storage;
mod transport;
mod validation;

use crate::collection::BulkCollector;
use crate::config::Config;
use crate::error::FetchError;
use crate::fetchers::{ShortVideoFetcher, TrendingFetcher, TrendingQuery};
use crate::storage::ResultStore;
use crate::transport::HttpTransport;
use crate::validation::validate_video_id;

fn cli() -> Command {
    Command::new("Trend Harvester")
        .version("0.1.0")
        .about("Social media trend aggregation and bulk collection")
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("trending | topics | music | shorts | categories | captions | bulk")
                .default_value("trending"),
        )
        .arg(
            Arg::new("region")
                .short('r')
                .long("region")
                .value_name("CODE")
                .help("Region code for trending results")
                .default_value("US"),
        )
        .arg(
            Arg::new("max-results")
                .short('n')
                .long("max-results")
                .value_name("NUM")
                .help("Maximum results to fetch (max 50)")
                .default_value("25"),
        )
        .arg(
            Arg::new("category")
                .short('c')
                .long("category")
                .value_name("ID")
                .help("Category filter for trending mode"),
        )
        .arg(
            Arg::new("video-id")
                .long("video-id")
                .value_name("ID")
                .help("Video ID for captions mode"),
        )
        .arg(
            Arg::new("include-captions")
                .long("include-captions")
                .help("Resolve captions for each trending video")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("caption-language")
                .long("caption-language")
                .value_name("LANG")
                .help("Caption language (defaults to the configured language)"),
        )
        .arg(
            Arg::new("max-per-category")
                .long("max-per-category")
                .value_name("NUM")
                .help("Videos per category in bulk mode"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Output directory for saved results"),
        )
        .arg(
            Arg::new("workers")
                .short('w')
                .long("workers")
                .value_name("NUM")
                .help("Number of parallel workers for bulk mode"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    // Initialize logging
    let filter = if matches.get_flag("verbose") {
        "trend_harvester=debug,info"
    } else {
        "trend_harvester=info,warn"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });

    if let Some(output_dir) = matches.get_one::<String>("output-dir") {
        config.output.base_dir = PathBuf::from(output_dir);
    }
    if let Some(workers) = matches.get_one::<String>("workers") {
        config.collection.max_workers = workers.parse()?;
    }
    if let Some(max) = matches.get_one::<String>("max-per-category") {
        config.collection.max_videos_per_category = max.parse()?;
    }
    config.validate()?;

    let mode = matches.get_one::<String>("mode").unwrap().as_str();
    let region = matches.get_one::<String>("region").unwrap();
    let max_results: usize = matches.get_one::<String>("max-results").unwrap().parse()?;

    info!("🚀 Trend Harvester starting (mode: {})", mode);

    let transport = Arc::new(HttpTransport::new(config.api.timeout_seconds)?);
    let fetcher = TrendingFetcher::new(transport.clone(), &config);
    let store = ResultStore::new(config.output.base_dir.clone());

    match mode {
        "trending" => {
            let query = TrendingQuery {
                region: region.clone(),
                max_results,
                category_filter: matches.get_one::<String>("category").cloned(),
                include_captions: matches.get_flag("include-captions"),
                caption_language: matches
                    .get_one::<String>("caption-language")
                    .cloned()
                    .unwrap_or_else(|| config.captions.default_language.clone()),
            };
            let videos = soften(fetcher.fetch_trending_videos(&query).await)?;
            info!("📈 Fetched {} trending videos for {}", videos.len(), region);
            store
                .save_json(&videos, &format!("trending_videos_{}", region))
                .await?;
        }
        "topics" => {
            let topics = soften(fetcher.fetch_trending_topics(region, max_results).await)?;
            info!("🗒️ Fetched {} trending topics for {}", topics.len(), region);
            store
                .save_json(&topics, &format!("trending_topics_{}", region))
                .await?;
        }
        "music" => {
            let music = soften(fetcher.fetch_trending_music(region, max_results).await)?;
            info!("🎶 Fetched {} trending music videos for {}", music.len(), region);
            store
                .save_json(&music, &format!("trending_music_{}", region))
                .await?;
        }
        "shorts" => {
            let shorts = ShortVideoFetcher::new(transport.clone(), config.api.apify_token.clone());
            let trends = shorts.fetch_short_video_trends().await;
            store.save_json(&trends, "short_video_trends").await?;
        }
        "categories" => {
            let categories = soften(fetcher.list_categories(Some(region), None).await)?;
            info!("📂 Fetched {} categories for {}", categories.len(), region);
            store
                .save_json(&categories, &format!("video_categories_{}", region))
                .await?;
        }
        "captions" => {
            let Some(raw_id) = matches.get_one::<String>("video-id") else {
                error!("--video-id is required for captions mode");
                return Err(anyhow::anyhow!("missing --video-id"));
            };
            let video_id = validate_video_id(raw_id)?;
            let language = matches
                .get_one::<String>("caption-language")
                .unwrap_or(&config.captions.default_language);

            let resolver = fetcher.resolver();
            match resolver.resolve(&video_id, language).await {
                Some(caption) => {
                    info!(
                        "📝 Caption found: {} ({:?}, {} chars)",
                        caption.language,
                        caption.format,
                        caption.content.len()
                    );
                    store
                        .save_json(&caption, &format!("captions_{}", video_id))
                        .await?;
                }
                None => info!("No captions available for {}", video_id),
            }
        }
        "bulk" => {
            let collector = BulkCollector::new(fetcher, store, config.collection.max_workers);
            let report = collector
                .run(config.collection.max_videos_per_category)
                .await?;

            info!("🎉 Bulk collection completed");
            info!("🌍 Regions processed: {}", report.total_regions_processed);
            info!("📂 Category units: {}", report.total_category_units);
            info!("📹 Popular video units: {}", report.total_popular_video_units);
            info!("❌ Errors: {}", report.total_errors);
        }
        other => {
            error!("Unknown mode: {}", other);
            return Err(anyhow::anyhow!("unknown mode '{}'", other));
        }
    }

    Ok(())
}

/// Standalone fetches degrade to an empty result on transport or upstream
/// failures; validation and configuration problems stay hard errors.
fn soften<T: Default>(result: Result<T, FetchError>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e @ (FetchError::Transport(_) | FetchError::UpstreamData(_))) => {
            warn!("Fetch failed, returning empty result: {}", e);
            Ok(T::default())
        }
        Err(e) => Err(e.into()),
    }
}
