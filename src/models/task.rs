use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task kinds routed by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Ingest,
    Recompute,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Ingest => "ingest",
            TaskKind::Recompute => "recompute",
        }
    }
}

/// Broker payload: `{"kind": ..., "ts": ..., "payload": {}}`.
///
/// Tasks carry no pipeline state. Everything a run needs is re-derived from
/// the watermark store and the external source at consume time, which is what
/// makes a redelivered task safe to replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMessage {
    pub kind: TaskKind,
    pub ts: DateTime<Utc>,

    #[serde(default)]
    pub payload: serde_json::Value,
}

impl TaskMessage {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            ts: Utc::now(),
            payload: serde_json::json!({}),
        }
    }

    /// Compact UTF-8 JSON encoding used on the wire.
    pub fn to_wire(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_wire(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
