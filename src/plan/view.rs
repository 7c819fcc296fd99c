//! View model handed to renderers
//!
//! One group per resource type (index order), one row per resource with
//! the columns a plan table shows: name, address, action and the delta of
//! changed attributes.

use serde::Serialize;
use serde_json::{Map, Value};

use super::differ::updated_values;
use super::types::{ChangeAction, ChangeIndex, TerraformChange};

/// Summary statistics for the plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub to_add: usize,
    pub to_change: usize,
    pub to_destroy: usize,
    pub to_replace: usize,
    pub to_read: usize,
    pub unchanged: usize,
    pub unknown: usize,
}

impl PlanSummary {
    fn record(&mut self, action: &ChangeAction) {
        match action {
            ChangeAction::Create => self.to_add += 1,
            ChangeAction::Update => self.to_change += 1,
            ChangeAction::Delete => self.to_destroy += 1,
            ChangeAction::Replace => self.to_replace += 1,
            ChangeAction::Read => self.to_read += 1,
            ChangeAction::NoOp => self.unchanged += 1,
            ChangeAction::Unknown(_) => self.unknown += 1,
        }
    }
}

/// One resource row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceRow {
    pub name: String,
    pub address: String,
    pub action: ChangeAction,
    /// Changed attributes only; empty when nothing differs
    pub updated_values: Map<String, Value>,
}

impl ResourceRow {
    pub fn from_change(change: &TerraformChange) -> Self {
        Self {
            name: change.name.clone(),
            address: change.address.clone(),
            action: change.action.clone(),
            updated_values: updated_values(&change.before, &change.after),
        }
    }

    pub fn has_delta(&self) -> bool {
        !self.updated_values.is_empty()
    }
}

/// Rows of one resource type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceGroup {
    pub resource_type: String,
    pub rows: Vec<ResourceRow>,
}

/// Everything a renderer needs to draw a plan
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanView {
    pub summary: PlanSummary,
    pub groups: Vec<ResourceGroup>,
}

impl PlanView {
    pub fn from_index(index: &ChangeIndex) -> Self {
        let mut summary = PlanSummary::default();

        let groups = index
            .iter()
            .map(|(resource_type, changes)| ResourceGroup {
                resource_type: resource_type.to_string(),
                rows: changes
                    .iter()
                    .inspect(|change| summary.record(&change.action))
                    .map(ResourceRow::from_change)
                    .collect(),
            })
            .collect();

        Self { summary, groups }
    }
}
