use crate::enrich::Enricher;
use crate::error::Result;
use crate::metrics;
use crate::normalize::normalize;
use crate::source::RecordFetcher;
use crate::storage::{ApplicantStore, WatermarkStore};
use std::sync::Arc;
use tracing::info;

/// Summary of one ingest run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub fetched: usize,
    pub written: u64,
    pub watermark: Option<i64>,
}

impl IngestReport {
    pub fn no_new_data(&self) -> bool {
        self.fetched == 0
    }
}

/// The fetch -> normalize -> enrich -> persist -> watermark sequence.
///
/// Runs synchronously within one task delivery. The watermark is written
/// last, only after the batch commit, so a crash or failure anywhere leaves
/// it untouched and the next run retries the same span.
pub struct IngestPipeline {
    fetcher: RecordFetcher,
    enricher: Arc<dyn Enricher>,
    applicants: Arc<dyn ApplicantStore>,
    watermarks: Arc<dyn WatermarkStore>,
    source_name: String,
}

impl IngestPipeline {
    pub fn new(
        fetcher: RecordFetcher,
        enricher: Arc<dyn Enricher>,
        applicants: Arc<dyn ApplicantStore>,
        watermarks: Arc<dyn WatermarkStore>,
        source_name: String,
    ) -> Self {
        Self {
            fetcher,
            enricher,
            applicants,
            watermarks,
            source_name,
        }
    }

    pub async fn run(&self) -> Result<IngestReport> {
        let resume_after = self.resume_point().await?;

        let outcome = self.fetcher.fetch_new(resume_after).await;
        metrics::RECORDS_FETCHED_TOTAL
            .with_label_values(&[&self.source_name])
            .inc_by(outcome.records.len() as f64);

        if outcome.records.is_empty() {
            info!("No new data found for '{}'", self.source_name);
            return Ok(IngestReport::default());
        }

        let fetched = outcome.records.len();
        let canonical: Vec<_> = outcome.records.into_iter().map(normalize).collect();

        // The run's high-water mark comes from the batch we control, not the
        // enrichment response.
        let high_mark = canonical.iter().filter_map(|r| r.id).max();

        let enriched = self.enricher.enrich(canonical).await?;
        let written = self.applicants.persist(&enriched).await?;
        metrics::RECORDS_WRITTEN_TOTAL
            .with_label_values(&[&self.source_name])
            .inc_by(written as f64);

        // Durable state is committed; only now may the watermark advance.
        if let Some(mark) = high_mark {
            self.watermarks.set(&self.source_name, mark).await?;
        }

        info!(
            "Ingest run for '{}' complete: {} fetched, {} written, watermark {:?}",
            self.source_name, fetched, written, high_mark
        );

        Ok(IngestReport {
            fetched,
            written,
            watermark: high_mark,
        })
    }

    /// The identifier to crawl down to: the stored watermark, or, when none
    /// exists yet, the maximum identifier reconstructed from persisted
    /// records (zero on a fresh database).
    async fn resume_point(&self) -> Result<i64> {
        if let Some(mark) = self.watermarks.get(&self.source_name).await? {
            return Ok(mark);
        }
        Ok(self.applicants.max_ingested_id().await?.unwrap_or(0))
    }
}
