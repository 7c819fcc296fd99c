//! Plan ingestion entry point
//!
//! Sniffs the plan format and routes it: JSON documents carrying a
//! `resource_changes` key go through the extractor and indexer, anything
//! else through the text plan parser. Input that starts like a JSON object
//! but does not parse is an error rather than a transcript.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{PlanError, PlanResult};
use super::extractor::{extract_change, ActionMode};
use super::indexer::ChangeIndexer;
use super::legacy::{parse_text_plan, TextPlan};
use super::types::ChangeIndex;

/// What to do with a resource change record that cannot be extracted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordPolicy {
    /// Skip the record, report it, keep going
    #[default]
    Skip,
    /// Fail the whole ingestion
    Abort,
}

/// Options for plan ingestion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    pub action_mode: ActionMode,
    pub on_malformed_record: RecordPolicy,
}

/// A record left out of the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// Position in `resource_changes`
    pub position: usize,
    pub address: String,
    pub reason: String,
}

/// Result of ingesting a JSON plan
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuredPlan {
    pub index: ChangeIndex,
    pub skipped: Vec<SkippedRecord>,
}

/// Result of ingesting a plan of either format
#[derive(Debug, Clone, PartialEq)]
pub enum IngestedPlan {
    Structured(StructuredPlan),
    Text(TextPlan),
}

/// Parses raw plan output into a change index
#[derive(Debug, Clone, Default)]
pub struct PlanIngestor {
    options: IngestOptions,
}

impl PlanIngestor {
    pub fn new(options: IngestOptions) -> Self {
        Self { options }
    }

    /// Ingest a plan, detecting its format
    pub fn ingest(&self, input: &str) -> PlanResult<IngestedPlan> {
        if looks_like_json(input) {
            let document: Value = serde_json::from_str(input)?;
            if document.get("resource_changes").is_some() {
                return self.ingest_document(&document).map(IngestedPlan::Structured);
            }
        }

        Ok(IngestedPlan::Text(parse_text_plan(input)))
    }

    /// Ingest an already parsed plan document
    pub fn ingest_document(&self, document: &Value) -> PlanResult<StructuredPlan> {
        if !document.is_object() {
            return Err(PlanError::InvalidDocument(
                "expected a JSON object at the top level".to_string(),
            ));
        }

        // No-op plans may leave resource_changes out entirely
        let records = match document.get("resource_changes") {
            None | Some(Value::Null) => &[][..],
            Some(Value::Array(records)) => records.as_slice(),
            Some(_) => {
                return Err(PlanError::InvalidDocument(
                    "resource_changes is not an array".to_string(),
                ));
            }
        };

        let mut indexer = ChangeIndexer::new();
        let mut skipped = Vec::new();

        for (position, record) in records.iter().enumerate() {
            if let Some(resource_type) = record.get("type").and_then(|t| t.as_str()) {
                indexer.register(resource_type);
            }

            match extract_change(record, self.options.action_mode) {
                Ok((resource_type, change)) => indexer.push(&resource_type, change),
                Err(PlanError::MalformedRecord { address, reason }) => {
                    match self.options.on_malformed_record {
                        RecordPolicy::Skip => skipped.push(SkippedRecord {
                            position,
                            address,
                            reason,
                        }),
                        RecordPolicy::Abort => return Err(PlanError::Aborted { address, reason }),
                    }
                }
                Err(other) => return Err(other),
            }
        }

        Ok(StructuredPlan {
            index: indexer.finish(),
            skipped,
        })
    }
}

/// JSON plans are objects; everything else is treated as a transcript
fn looks_like_json(input: &str) -> bool {
    input.trim_start().starts_with('{')
}
