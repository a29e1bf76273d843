use crate::error::{GradBridgeError, Result};
use crate::models::EnrichedRecord;
use crate::source::parser::parse_entry_id;
use crate::storage::PostgresConnector;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Idempotent persistence of enriched records, keyed on the entry URL.
///
/// Re-persisting an already-stored record is a no-op, never a duplicate and
/// never an error. One batch is one transaction: a malformed numeric field
/// anywhere in the batch commits nothing.
#[async_trait]
pub trait ApplicantStore: Send + Sync {
    /// Persist a batch, returning the number of rows actually written.
    async fn persist(&self, records: &[EnrichedRecord]) -> Result<u64>;

    /// Highest numeric URL suffix across all stored records.
    ///
    /// Bootstrap fallback for when no watermark row exists yet; scans every
    /// stored record, so callers should reach for it only in that case.
    async fn max_ingested_id(&self) -> Result<Option<i64>>;
}

/// Parse an optional score string as a float.
///
/// Absent and empty values become `None`; anything else must parse. A
/// malformed value is a hard error so that a bad batch fails closed instead
/// of being silently dropped to `NULL`.
pub fn coerce_score(field: &str, value: Option<&str>) -> Result<Option<f64>> {
    match value {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<f64>().map(Some).map_err(|_| {
            GradBridgeError::Validation(format!("Invalid numeric value for {}: {:?}", field, s))
        }),
    }
}

fn text_or_null(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// One record with all field coercions applied, ready to bind.
struct CoercedRow<'a> {
    program: Option<&'a str>,
    comments: Option<&'a str>,
    date_added: Option<&'a str>,
    url: Option<&'a str>,
    status: Option<&'a str>,
    term: Option<&'a str>,
    us_or_international: Option<&'a str>,
    gpa: Option<f64>,
    gre: Option<f64>,
    gre_v: Option<f64>,
    gre_aw: Option<f64>,
    degree: Option<&'a str>,
    llm_generated_program: Option<&'a str>,
    llm_generated_university: Option<&'a str>,
}

/// Coerce the whole batch up front so validation failures abort before any
/// row is written.
fn coerce_batch(records: &[EnrichedRecord]) -> Result<Vec<CoercedRow<'_>>> {
    records
        .iter()
        .map(|r| {
            Ok(CoercedRow {
                program: text_or_null(&r.record.program),
                comments: text_or_null(&r.record.comments),
                date_added: text_or_null(&r.record.date_added),
                url: text_or_null(&r.record.url),
                status: text_or_null(&r.record.status),
                term: text_or_null(&r.record.term),
                us_or_international: text_or_null(&r.record.us_or_international),
                gpa: coerce_score("gpa", r.record.gpa.as_deref())?,
                gre: coerce_score("gre", r.record.gre.as_deref())?,
                gre_v: coerce_score("gre_v", r.record.gre_v.as_deref())?,
                gre_aw: coerce_score("gre_aw", r.record.gre_aw.as_deref())?,
                degree: text_or_null(&r.record.degree),
                llm_generated_program: text_or_null(&r.llm_generated_program),
                llm_generated_university: text_or_null(&r.llm_generated_university),
            })
        })
        .collect()
}

/// PostgreSQL-backed applicant store.
pub struct PostgresApplicantStore {
    connector: PostgresConnector,
}

impl PostgresApplicantStore {
    pub fn new(connector: PostgresConnector) -> Self {
        Self { connector }
    }
}

const INSERT_APPLICANT: &str = "INSERT INTO applicants \
    (program, comments, date_added, url, status, term, us_or_international, \
     gpa, gre, gre_v, gre_aw, degree, llm_generated_program, llm_generated_university) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
    ON CONFLICT (url) DO NOTHING";

#[async_trait]
impl ApplicantStore for PostgresApplicantStore {
    async fn persist(&self, records: &[EnrichedRecord]) -> Result<u64> {
        let rows = coerce_batch(records)?;

        let mut client = self.connector.get_client().await?;
        let tx = client
            .transaction()
            .await
            .map_err(|e| GradBridgeError::Database(format!("Failed to open transaction: {}", e)))?;

        let statement = tx
            .prepare(INSERT_APPLICANT)
            .await
            .map_err(|e| GradBridgeError::Database(format!("Failed to prepare insert: {}", e)))?;

        let mut written = 0;
        for row in &rows {
            let affected = tx
                .execute(
                    &statement,
                    &[
                        &row.program,
                        &row.comments,
                        &row.date_added,
                        &row.url,
                        &row.status,
                        &row.term,
                        &row.us_or_international,
                        &row.gpa,
                        &row.gre,
                        &row.gre_v,
                        &row.gre_aw,
                        &row.degree,
                        &row.llm_generated_program,
                        &row.llm_generated_university,
                    ],
                )
                .await
                .map_err(|e| GradBridgeError::Database(format!("Insert failed: {}", e)))?;
            written += affected;
        }

        tx.commit()
            .await
            .map_err(|e| GradBridgeError::Database(format!("Commit failed: {}", e)))?;

        info!(
            "Persisted batch: {} of {} records written",
            written,
            records.len()
        );
        Ok(written)
    }

    async fn max_ingested_id(&self) -> Result<Option<i64>> {
        let client = self.connector.get_client().await?;
        let rows = client
            .query("SELECT url FROM applicants WHERE url IS NOT NULL", &[])
            .await
            .map_err(|e| GradBridgeError::Database(format!("Failed to scan URLs: {}", e)))?;

        let max = rows
            .iter()
            .filter_map(|row| parse_entry_id(row.get::<_, &str>(0)))
            .max();

        debug!("Reconstructed max ingested id: {:?}", max);
        Ok(max)
    }
}

/// In-memory applicant store (tests and dry runs). Shares the coercion path
/// with the PostgreSQL store so validation semantics cannot drift.
pub struct MemoryApplicantStore {
    by_url: Arc<RwLock<HashMap<String, EnrichedRecord>>>,
    unkeyed: Arc<RwLock<Vec<EnrichedRecord>>>,
}

impl MemoryApplicantStore {
    pub fn new() -> Self {
        Self {
            by_url: Arc::new(RwLock::new(HashMap::new())),
            unkeyed: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.by_url.read().await.len() + self.unkeyed.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn get(&self, url: &str) -> Option<EnrichedRecord> {
        self.by_url.read().await.get(url).cloned()
    }
}

impl Default for MemoryApplicantStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApplicantStore for MemoryApplicantStore {
    async fn persist(&self, records: &[EnrichedRecord]) -> Result<u64> {
        // Validate the whole batch before touching state, as the transaction
        // does in PostgreSQL.
        coerce_batch(records)?;

        let mut by_url = self.by_url.write().await;
        let mut unkeyed = self.unkeyed.write().await;

        let mut written = 0;
        for record in records {
            match text_or_null(&record.record.url) {
                Some(url) => {
                    if !by_url.contains_key(url) {
                        by_url.insert(url.to_string(), record.clone());
                        written += 1;
                    }
                }
                None => {
                    unkeyed.push(record.clone());
                    written += 1;
                }
            }
        }

        Ok(written)
    }

    async fn max_ingested_id(&self) -> Result<Option<i64>> {
        let by_url = self.by_url.read().await;
        Ok(by_url.keys().filter_map(|url| parse_entry_id(url)).max())
    }
}
