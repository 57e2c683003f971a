use crate::error::FetchError;
use crate::fetchers::{CategoryDescriptor, TrendingFetcher};
use crate::storage::ResultStore;
use crate::validation::{sorted_region_codes, RegionCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info, warn};

/// One completed category-listing unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUnit {
    pub region: String,
    pub categories: usize,
    pub saved_to: Option<PathBuf>,
}

/// One completed popular-videos unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularVideosUnit {
    pub region: String,
    pub category_id: String,
    pub category_title: String,
    pub videos: usize,
    pub saved_to: Option<PathBuf>,
}

/// Final summary of a bulk collection sweep.
///
/// Built incrementally, finalized once every unit has been attempted. A
/// failing unit contributes to `errors` and the sweep continues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionReport {
    pub category_units: Vec<CategoryUnit>,
    pub popular_video_units: Vec<PopularVideosUnit>,
    pub errors: Vec<String>,
    pub total_regions_processed: usize,
    pub total_category_units: usize,
    pub total_popular_video_units: usize,
    pub total_errors: usize,
    pub max_videos_per_category: usize,
    pub regions_processed: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

enum UnitOutcome {
    Completed {
        unit: PopularVideosUnit,
    },
    Failed {
        region: String,
        category_id: String,
        message: String,
    },
}

/// Drives the two-level fan-out over regions and their categories.
///
/// The category set is only known after each region's category fetch, so
/// popular-video work items are generated lazily and fed into a bounded
/// worker pool. One unit's failure never cancels or corrupts another's.
pub struct BulkCollector {
    fetcher: TrendingFetcher,
    store: ResultStore,
    regions: Vec<RegionCode>,
    max_workers: usize,
    worker_semaphore: Arc<Semaphore>,
}

impl BulkCollector {
    pub fn new(fetcher: TrendingFetcher, store: ResultStore, max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            fetcher,
            store,
            regions: sorted_region_codes(),
            max_workers,
            worker_semaphore: Arc::new(Semaphore::new(max_workers)),
        }
    }

    /// Restrict the sweep to an explicit region set (sorted for
    /// deterministic reporting).
    pub fn with_regions(mut self, mut regions: Vec<RegionCode>) -> Self {
        regions.sort();
        self.regions = regions;
        self
    }

    /// Run the full sweep and emit one report.
    ///
    /// The only fatal error is misconfiguration detected before the sweep
    /// starts; every per-unit failure becomes a report entry.
    pub async fn run(&self, max_per_category: usize) -> Result<CollectionReport, FetchError> {
        // Misconfiguration is fatal before any unit is attempted.
        self.fetcher.require_key()?;

        info!(
            "🚀 Starting comprehensive collection for {} regions...",
            self.regions.len()
        );

        let (tx, mut rx) = mpsc::channel::<(usize, usize, UnitOutcome)>(self.max_workers);
        let mut category_units = Vec::new();
        // Keyed by (region index, unit index) so parallel completions can be
        // re-sorted into deterministic region order.
        let mut keyed_errors: Vec<(usize, usize, String)> = Vec::new();
        let mut keyed_units: Vec<(usize, usize, PopularVideosUnit)> = Vec::new();

        for (region_index, region) in self.regions.iter().enumerate() {
            info!(
                "🌍 Processing region {}/{}: {}",
                region_index + 1,
                self.regions.len(),
                region
            );

            let categories = match self
                .fetcher
                .list_categories(Some(region.as_str()), None)
                .await
            {
                Ok(categories) => categories,
                Err(e) => {
                    let message = format!("Error processing region {}: {}", region, e);
                    error!("{}", message);
                    keyed_errors.push((region_index, 0, message));
                    continue;
                }
            };

            info!("  Found {} categories in {}", categories.len(), region);

            let saved_to = match self
                .store
                .save_json(&categories, &format!("video_categories_{}", region))
                .await
            {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Failed to save categories for {}: {}", region, e);
                    None
                }
            };

            category_units.push(CategoryUnit {
                region: region.to_string(),
                categories: categories.len(),
                saved_to,
            });

            for (category_index, category) in categories.into_iter().enumerate() {
                if category.id.is_empty() {
                    continue;
                }

                self.spawn_popular_videos_unit(
                    region.clone(),
                    region_index,
                    category_index,
                    category,
                    max_per_category,
                    tx.clone(),
                );
            }
        }

        // Close the channel so the drain below terminates once every
        // in-flight unit has reported.
        drop(tx);

        while let Some((region_index, category_index, outcome)) = rx.recv().await {
            match outcome {
                UnitOutcome::Completed { unit } => {
                    keyed_units.push((region_index, category_index + 1, unit));
                }
                UnitOutcome::Failed {
                    region,
                    category_id,
                    message,
                } => {
                    error!(
                        "Error processing category {} in {}: {}",
                        category_id, region, message
                    );
                    keyed_errors.push((
                        region_index,
                        category_index + 1,
                        format!(
                            "Error processing category {} in {}: {}",
                            category_id, region, message
                        ),
                    ));
                }
            }
        }

        keyed_units.sort_by_key(|(region_index, unit_index, _)| (*region_index, *unit_index));
        keyed_errors.sort_by_key(|(region_index, unit_index, _)| (*region_index, *unit_index));

        let popular_video_units: Vec<PopularVideosUnit> =
            keyed_units.into_iter().map(|(_, _, unit)| unit).collect();
        let errors: Vec<String> = keyed_errors
            .into_iter()
            .map(|(_, _, message)| message)
            .collect();

        let report = CollectionReport {
            total_regions_processed: self.regions.len(),
            total_category_units: category_units.len(),
            total_popular_video_units: popular_video_units.len(),
            total_errors: errors.len(),
            max_videos_per_category: max_per_category,
            regions_processed: self.regions.iter().map(|r| r.to_string()).collect(),
            completed_at: Utc::now(),
            category_units,
            popular_video_units,
            errors,
        };

        // The summary itself is one extra persisted unit.
        match self.store.save_json(&report, "collection_summary").await {
            Ok(path) => info!("🎉 Collection complete! Summary saved to: {}", path.display()),
            Err(e) => warn!("Failed to save collection summary: {}", e),
        }

        if report.total_errors > 0 {
            warn!("Errors encountered: {}", report.total_errors);
        }

        Ok(report)
    }

    fn spawn_popular_videos_unit(
        &self,
        region: RegionCode,
        region_index: usize,
        category_index: usize,
        category: CategoryDescriptor,
        max_per_category: usize,
        tx: mpsc::Sender<(usize, usize, UnitOutcome)>,
    ) {
        let fetcher = self.fetcher.clone();
        let store = self.store.clone();
        let semaphore = Arc::clone(&self.worker_semaphore);

        tokio::spawn(async move {
            // Closed semaphores cannot occur here; treat failure as a unit error.
            let _permit = match semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            info!(
                "    Category: {} (ID: {}) in {}",
                category.title, category.id, region
            );

            let outcome = match fetcher
                .fetch_popular_by_category(&category.id, max_per_category, region.as_str())
                .await
            {
                Ok(videos) => {
                    let stem = format!("popular_videos_category_{}_{}", category.id, region);
                    let saved_to = match store.save_json(&videos, &stem).await {
                        Ok(path) => Some(path),
                        Err(e) => {
                            warn!("Failed to save popular videos for {}: {}", stem, e);
                            None
                        }
                    };

                    UnitOutcome::Completed {
                        unit: PopularVideosUnit {
                            region: region.to_string(),
                            category_id: category.id,
                            category_title: category.title,
                            videos: videos.len(),
                            saved_to,
                        },
                    }
                }
                Err(e) => UnitOutcome::Failed {
                    region: region.to_string(),
                    category_id: category.id,
                    message: e.to_string(),
                },
            };

            if tx
                .send((region_index, category_index, outcome))
                .await
                .is_err()
            {
                error!("Failed to report unit result for {}", region);
            }
        });
    }
}
