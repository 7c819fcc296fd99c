//! Resource change extraction
//!
//! Normalizes one `resource_changes` record of a machine-readable plan
//! (`tofu show -json` / `terraform show -json`) into a [`TerraformChange`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{PlanError, PlanResult};
use super::types::{ChangeAction, TerraformChange};

/// How a record listing several actions is reduced to one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionMode {
    /// Keep only the first action code (e.g. `["delete", "create"]` → delete)
    #[default]
    First,
    /// Report a delete/create pair as a single replace action
    Compound,
}

impl ActionMode {
    /// Reduce a record's action list; `None` when the list is empty
    pub fn resolve(&self, actions: &[String]) -> Option<ChangeAction> {
        let first = actions.first()?;

        if *self == ActionMode::Compound && actions.len() == 2 {
            let has = |code: &str| actions.iter().any(|a| a == code);
            if has("delete") && has("create") {
                return Some(ChangeAction::Replace);
            }
        }

        Some(ChangeAction::from_code(first))
    }
}

impl std::str::FromStr for ActionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(ActionMode::First),
            "compound" => Ok(ActionMode::Compound),
            other => Err(format!(
                "unknown action mode '{}' (expected 'first' or 'compound')",
                other
            )),
        }
    }
}

#[derive(Deserialize)]
struct RawResourceChange {
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    address: String,
    change: RawChange,
}

#[derive(Deserialize)]
struct RawChange {
    actions: Vec<String>,
    #[serde(default)]
    before: Option<Map<String, Value>>,
    #[serde(default)]
    after: Option<Map<String, Value>>,
}

/// Address of a raw record, for error reporting
pub fn record_address(record: &Value) -> &str {
    record
        .get("address")
        .and_then(|a| a.as_str())
        .unwrap_or("(no address)")
}

/// Normalize one raw record, returning its resource type and the change
pub fn extract_change(record: &Value, mode: ActionMode) -> PlanResult<(String, TerraformChange)> {
    let address = record_address(record);

    let raw = RawResourceChange::deserialize(record)
        .map_err(|e| PlanError::malformed(address, e.to_string()))?;

    let action = mode
        .resolve(&raw.change.actions)
        .ok_or_else(|| PlanError::malformed(address, "change.actions is empty"))?;

    let change = TerraformChange {
        name: raw.name,
        address: raw.address,
        action,
        before: raw.change.before.unwrap_or_default(),
        after: raw.change.after.unwrap_or_default(),
    };

    Ok((raw.resource_type, change))
}
