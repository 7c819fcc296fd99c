//! Data types for plan ingestion and diffing
//!
//! This module defines the value objects produced while ingesting a plan:
//! the structured (JSON) change model, the ordered change index, and the
//! legacy text-plan model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Action of a resource change in a machine-readable plan
///
/// Serialized as its plan action code, unknown codes included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ChangeAction {
    /// Resource will be created
    Create,
    /// Resource will be updated in-place
    Update,
    /// Resource will be destroyed
    Delete,
    /// Data source read
    Read,
    /// No changes
    NoOp,
    /// Delete and create as a single compound action
    Replace,
    /// Action code not known to this version
    Unknown(String),
}

impl ChangeAction {
    /// Map a plan action code (`"create"`, `"no-op"`, ...) to an action
    pub fn from_code(code: &str) -> Self {
        match code {
            "create" => ChangeAction::Create,
            "update" => ChangeAction::Update,
            "delete" => ChangeAction::Delete,
            "read" => ChangeAction::Read,
            "no-op" => ChangeAction::NoOp,
            other => ChangeAction::Unknown(other.to_string()),
        }
    }

    /// Plan action code for this action
    pub fn as_str(&self) -> &str {
        match self {
            ChangeAction::Create => "create",
            ChangeAction::Update => "update",
            ChangeAction::Delete => "delete",
            ChangeAction::Read => "read",
            ChangeAction::NoOp => "no-op",
            ChangeAction::Replace => "replace",
            ChangeAction::Unknown(code) => code,
        }
    }

    /// Get the symbol used to represent this action
    pub fn symbol(&self) -> &'static str {
        match self {
            ChangeAction::Create => "+",
            ChangeAction::Update => "~",
            ChangeAction::Replace => "±",
            ChangeAction::Delete => "-",
            ChangeAction::Read => "≤",
            ChangeAction::NoOp => " ",
            ChangeAction::Unknown(_) => "?",
        }
    }

    /// Get RGB color tuple for this action
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            ChangeAction::Create => (152, 225, 152),     // Pastel mint green
            ChangeAction::Update => (255, 230, 160),     // Pastel cream/yellow
            ChangeAction::Replace => (181, 174, 254),    // Pastel lavender
            ChangeAction::Delete => (255, 160, 160),     // Pastel coral
            ChangeAction::Read => (160, 200, 255),       // Pastel sky blue
            ChangeAction::NoOp => (160, 160, 160),       // Grey
            ChangeAction::Unknown(_) => (255, 180, 100), // Orange, stands out
        }
    }
}

impl From<ChangeAction> for String {
    fn from(action: ChangeAction) -> Self {
        action.as_str().to_string()
    }
}

impl From<String> for ChangeAction {
    fn from(code: String) -> Self {
        match code.as_str() {
            "replace" => ChangeAction::Replace,
            other => ChangeAction::from_code(other),
        }
    }
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resource entry of a structured plan, normalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerraformChange {
    /// Resource name (e.g., "web")
    pub name: String,

    /// Full resource address (e.g., "module.vpc.aws_subnet.main")
    pub address: String,

    /// Action for this resource
    pub action: ChangeAction,

    /// Attributes before the change (empty when there is no prior state)
    pub before: Map<String, Value>,

    /// Attributes after the change (empty when the resource is deleted)
    pub after: Map<String, Value>,
}

/// Insertion-ordered mapping from resource type to its changes
///
/// Built by [`ChangeIndexer`](super::indexer::ChangeIndexer); an index
/// handed out never contains an empty bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeIndex {
    pub(crate) buckets: Vec<(String, Vec<TerraformChange>)>,
}

impl ChangeIndex {
    /// Changes recorded for a resource type
    #[allow(dead_code)]
    pub fn get(&self, resource_type: &str) -> Option<&[TerraformChange]> {
        self.buckets
            .iter()
            .find(|(ty, _)| ty == resource_type)
            .map(|(_, changes)| changes.as_slice())
    }

    /// Iterate over `(type, changes)` in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TerraformChange])> {
        self.buckets
            .iter()
            .map(|(ty, changes)| (ty.as_str(), changes.as_slice()))
    }

    /// Resource types in first-seen order
    #[allow(dead_code)]
    pub fn types(&self) -> Vec<&str> {
        self.buckets.iter().map(|(ty, _)| ty.as_str()).collect()
    }

    /// Number of resource types
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of changes across all types
    pub fn total_changes(&self) -> usize {
        self.buckets.iter().map(|(_, changes)| changes.len()).sum()
    }

    /// Find a change by its full address
    pub fn find_by_address(&self, address: &str) -> Option<&TerraformChange> {
        self.buckets
            .iter()
            .flat_map(|(_, changes)| changes.iter())
            .find(|change| change.address == address)
    }
}

/// Resource address split into its dotted components
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceId {
    /// Last segment of the address
    pub name: String,

    /// Second-to-last segment, if any
    #[serde(rename = "type")]
    pub resource_type: Option<String>,

    /// Every segment before the type, left to right (e.g. module path)
    pub prefixes: Vec<String>,
}

impl ResourceId {
    /// Split a dotted address; purely syntactic, never fails
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::empty();
        }

        let mut segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
        // split always yields at least one segment
        let name = segments.pop().unwrap_or_default();
        let resource_type = segments.pop().filter(|ty| !ty.is_empty());

        Self {
            name,
            resource_type,
            prefixes: segments,
        }
    }

    /// Fallback id for addresses that could not be decomposed
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            resource_type: None,
            prefixes: Vec::new(),
        }
    }
}

/// Change marker of the legacy text format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceAction {
    #[serde(rename = "-")]
    Destroy,
    #[serde(rename = "+")]
    Create,
    #[serde(rename = "~")]
    Update,
    #[serde(rename = "<=")]
    Read,
    #[serde(rename = "-/+")]
    Recreate,
}

impl ResourceAction {
    /// Parse a leading marker off a line, returning the action and the rest
    pub fn split_marker(line: &str) -> Option<(Self, &str)> {
        // Longest markers first so "-/+" is not read as "-"
        const MARKERS: [(&str, ResourceAction); 5] = [
            ("-/+", ResourceAction::Recreate),
            ("<=", ResourceAction::Read),
            ("+", ResourceAction::Create),
            ("-", ResourceAction::Destroy),
            ("~", ResourceAction::Update),
        ];

        MARKERS.iter().find_map(|(marker, action)| {
            line.strip_prefix(*marker)
                .filter(|rest| rest.starts_with(char::is_whitespace))
                .map(|rest| (*action, rest.trim_start()))
        })
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ResourceAction::Destroy => "-",
            ResourceAction::Create => "+",
            ResourceAction::Update => "~",
            ResourceAction::Read => "<=",
            ResourceAction::Recreate => "-/+",
        }
    }
}

/// One attribute line of a legacy text plan resource block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceChange {
    /// Attribute name
    pub key: String,

    /// Parsed value; `None` when the plan marks it sensitive
    pub value: Option<Value>,

    /// Change marker of the line
    pub action: ResourceAction,

    /// Nested changes of a composite value; `None` for leaves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_changes: Option<Vec<ResourceChange>>,
}

/// A `resource "<type>" "<name>" { ... }` block of a text plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceBlock {
    pub resource_type: String,
    pub name: String,
    pub action: ResourceAction,
    pub changes: Vec<ResourceChange>,
}

/// Change category of the legacy text format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Destroy,
    Create,
    Update,
    Read,
    Recreate,
    Unknown,
}

impl ChangeType {
    /// Map one of the five literal change markers; anything else is `Unknown`
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "-" => ChangeType::Destroy,
            "+" => ChangeType::Create,
            "~" => ChangeType::Update,
            "<=" => ChangeType::Read,
            "-/+" => ChangeType::Recreate,
            _ => ChangeType::Unknown,
        }
    }

    /// Get the label for this change type
    pub fn label(&self) -> &'static str {
        match self {
            ChangeType::Create => "will be created",
            ChangeType::Update => "will be updated",
            ChangeType::Recreate => "must be replaced",
            ChangeType::Destroy => "will be destroyed",
            ChangeType::Read => "will be read",
            ChangeType::Unknown => "unrecognized change",
        }
    }
}

/// Sentinel for values only known after apply
pub const COMPUTED: &str = "<computed>";

/// One property comparison of a legacy text plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    pub property: String,

    /// Previous value; absent for pure creations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<String>,

    /// New value, or [`COMPUTED`]
    pub new: String,

    pub forces_new_resource: bool,
}

impl Diff {
    /// Whether the new value is only known after apply
    pub fn is_computed(&self) -> bool {
        self.new == COMPUTED
    }
}

/// One resource action of a legacy text plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanAction {
    pub id: ResourceId,
    pub change_type: ChangeType,
    pub changes: Vec<Diff>,
}

/// A warning emitted in a text plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub id: ResourceId,
    pub detail: String,
}
