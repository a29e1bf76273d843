use serde::{Deserialize, Serialize};

/// One survey entry as scraped from a results page, before any cleanup.
///
/// Produced by the fetcher, consumed immediately by the normalizer. Badge
/// fields are raw strings exactly as they appear on the page; `id` is the
/// numeric suffix of the detail link when it parses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub id: Option<i64>,
    pub school: Option<String>,
    pub program: Option<String>,
    pub degree: Option<String>,
    pub date_added: Option<String>,
    pub status: Option<String>,
    pub link: Option<String>,
    pub semester_year: Option<String>,
    pub citizenship: Option<String>,
    pub gpa: Option<String>,
    pub gre: Option<String>,
    pub gre_v: Option<String>,
    pub gre_q: Option<String>,
    pub gre_aw: Option<String>,
    pub comments: Option<String>,
}

/// Normalized shape handed to the enrichment service.
///
/// Field names on the wire match the exchange format the enrichment service
/// expects. Score fields stay raw strings here; they are parsed (and
/// validated) at the persistence boundary. The quantitative GRE sub-score is
/// recognized during badge classification but intentionally not carried
/// forward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// `"<program>, <school>"` when both source fields were present.
    pub program: Option<String>,
    pub comments: Option<String>,
    pub date_added: Option<String>,
    pub url: Option<String>,
    pub status: Option<String>,
    pub term: Option<String>,

    #[serde(rename = "US/International")]
    pub us_or_international: Option<String>,

    #[serde(rename = "Degree")]
    pub degree: Option<String>,

    #[serde(rename = "GRE")]
    pub gre: Option<String>,

    #[serde(rename = "GRE_V")]
    pub gre_v: Option<String>,

    #[serde(rename = "GPA")]
    pub gpa: Option<String>,

    #[serde(rename = "GRE_AW")]
    pub gre_aw: Option<String>,
}

/// Canonical record plus the two labels assigned by the enrichment service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: CanonicalRecord,

    #[serde(rename = "llm-generated-program")]
    pub llm_generated_program: Option<String>,

    #[serde(rename = "llm-generated-university")]
    pub llm_generated_university: Option<String>,
}
