//! Plan ingestion and diffing
//!
//! This module turns OpenTofu/Terraform plan output into a change index
//! grouped by resource type, and computes the minimal "what changed" view
//! of each resource.
//!
//! # Features
//!
//! - **JSON plans**: `show -json` documents are normalized record by record
//! - **Text plans**: human-readable transcripts are parsed as a fallback
//! - **Structural diff**: only the changed part of each resource's attributes
//! - **View model**: deterministic groups and rows for rendering
//!
//! # Example
//!
//! ```ignore
//! use crate::plan::{IngestedPlan, PlanIngestor, PlanView};
//!
//! let ingestor = PlanIngestor::new(options);
//! if let IngestedPlan::Structured(plan) = ingestor.ingest(&plan_output)? {
//!     let view = PlanView::from_index(&plan.index);
//! }
//! ```

mod differ;
mod error;
mod extractor;
mod indexer;
mod ingest;
mod legacy;
mod report;
mod types;
mod view;

pub use differ::updated_values;
pub use extractor::ActionMode;
pub use ingest::{IngestOptions, IngestedPlan, PlanIngestor, RecordPolicy, SkippedRecord, StructuredPlan};
pub use legacy::TextPlan;
pub use report::{PlanReport, ReportOptions, TextReport};
pub use types::ChangeAction;
pub use view::PlanView;
