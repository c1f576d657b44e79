//! Presentation mapping for query results.
//!
//! Converts engine results into serializable report structs without losing
//! any field, so front-ends (chat replies, CLI, JSON consumers) render from
//! the same data.

use serde::Serialize;

use crate::engine::{QueryResult, WalkEntry, WalkResult};

/// Serializable view of a [`QueryResult`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueryReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&QueryResult> for QueryReport {
    fn from(result: &QueryResult) -> Self {
        match result {
            QueryResult::Success {
                oid,
                value,
                value_type,
            } => Self {
                success: true,
                oid: Some(oid.clone()),
                value: Some(value.clone()),
                value_type: Some(value_type.clone()),
                error: None,
            },
            QueryResult::Failure { message } => Self {
                success: false,
                oid: None,
                value: None,
                value_type: None,
                error: Some(message.clone()),
            },
        }
    }
}

impl QueryReport {
    /// Human-readable rendering, one fact per line.
    pub fn render_text(&self) -> String {
        match (&self.oid, &self.value, &self.value_type, &self.error) {
            (Some(oid), Some(value), Some(value_type), None) => {
                format!("OID: {oid}\nType: {value_type}\nValue: {value}")
            }
            _ => format!(
                "Error: {}",
                self.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Serializable view of one walk row.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WalkReportEntry {
    pub oid: String,
    pub value: String,
}

impl From<&WalkEntry> for WalkReportEntry {
    fn from(entry: &WalkEntry) -> Self {
        Self {
            oid: entry.oid.clone(),
            value: entry.value.clone(),
        }
    }
}

/// Serializable view of a [`WalkResult`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WalkReport {
    pub success: bool,
    pub entries: Vec<WalkReportEntry>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&WalkResult> for WalkReport {
    fn from(result: &WalkResult) -> Self {
        match result {
            WalkResult::Success { entries, count } => Self {
                success: true,
                entries: entries.iter().map(WalkReportEntry::from).collect(),
                count: *count,
                error: None,
            },
            WalkResult::Failure { message } => Self {
                success: false,
                entries: Vec::new(),
                count: 0,
                error: Some(message.clone()),
            },
        }
    }
}

impl WalkReport {
    /// Human-readable rendering: one "oid = value" line per entry, then a
    /// summary count.
    pub fn render_text(&self) -> String {
        if let Some(error) = &self.error {
            return format!("Error: {error}");
        }
        if self.entries.is_empty() {
            return "No results found".to_string();
        }
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&format!("{} = {}\n", entry.oid, entry.value));
        }
        out.push_str(&format!("{} result(s)", self.count));
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
