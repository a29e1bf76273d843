//! Dashboard aggregates over the persisted records.
//!
//! The interesting part of the dashboard is the queries, and those are
//! deliberately replaceable: the pipeline only depends on the
//! [`AnalyticsView`] trait, triggered by the `recompute` task kind.

use crate::config::AnalyticsConfig;
use crate::error::{GradBridgeError, Result};
use crate::storage::PostgresConnector;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Headline numbers shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub total_entries: i64,

    /// Entries for the configured focus term.
    pub term: String,
    pub term_entries: i64,

    /// Percentage of international entries across the whole table.
    pub pct_international: Option<f64>,

    pub avg_gpa: Option<f64>,
    pub avg_gre: Option<f64>,
    pub avg_gre_v: Option<f64>,
    pub avg_gre_aw: Option<f64>,

    /// Percentage of acceptances among the focus term's entries.
    pub term_acceptance_rate: Option<f64>,

    pub computed_at: DateTime<Utc>,
}

#[async_trait]
pub trait AnalyticsView: Send + Sync {
    async fn recompute(&self) -> Result<AnalyticsSummary>;
}

/// Computes the summary with straight SQL aggregates.
pub struct PostgresAnalyticsView {
    connector: PostgresConnector,
    term: String,
}

impl PostgresAnalyticsView {
    pub fn new(connector: PostgresConnector, config: &AnalyticsConfig) -> Self {
        Self {
            connector,
            term: config.term.clone(),
        }
    }
}

#[async_trait]
impl AnalyticsView for PostgresAnalyticsView {
    async fn recompute(&self) -> Result<AnalyticsSummary> {
        info!("Recomputing analytics for term '{}'", self.term);
        let client = self.connector.get_client().await?;

        let totals = client
            .query_one(
                "SELECT COUNT(*), \
                        (100.0 * COUNT(*) FILTER (WHERE us_or_international = 'International') \
                         / NULLIF(COUNT(*), 0))::float8, \
                        AVG(gpa)::float8, AVG(gre)::float8, AVG(gre_v)::float8, AVG(gre_aw)::float8 \
                 FROM applicants",
                &[],
            )
            .await
            .map_err(|e| GradBridgeError::Database(format!("Totals query failed: {}", e)))?;

        let term_stats = client
            .query_one(
                "SELECT COUNT(*), \
                        (100.0 * COUNT(*) FILTER (WHERE status LIKE 'Accepted%') \
                         / NULLIF(COUNT(*), 0))::float8 \
                 FROM applicants WHERE term = $1",
                &[&self.term],
            )
            .await
            .map_err(|e| GradBridgeError::Database(format!("Term query failed: {}", e)))?;

        Ok(AnalyticsSummary {
            total_entries: totals.get(0),
            term: self.term.clone(),
            term_entries: term_stats.get(0),
            pct_international: totals.get(1),
            avg_gpa: totals.get(2),
            avg_gre: totals.get(3),
            avg_gre_v: totals.get(4),
            avg_gre_aw: totals.get(5),
            term_acceptance_rate: term_stats.get(1),
            computed_at: Utc::now(),
        })
    }
}
