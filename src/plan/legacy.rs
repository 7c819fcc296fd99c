//! Text plan parsing
//!
//! Handles the human-readable transcript printed by `plan`. Two layouts
//! are understood:
//!
//! - the older attribute layout, where a resource header such as
//!   `~ aws_instance.web` is followed by `property: "old" => "new"` lines
//! - the block layout, where each resource is printed as
//!   `+ resource "aws_instance" "web" { ... }` with `key = value` lines
//!
//! Nothing here is used for JSON plans.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use super::types::{
    ChangeType, Diff, PlanAction, ResourceAction, ResourceBlock, ResourceChange, ResourceId,
    Warning, COMPUTED,
};

/// Header printed before the list of planned actions
pub const ACTIONS_HEADER: &str = "Terraform will perform the following actions:";

/// Start of the summary line closing the list of planned actions
pub const SUMMARY_MARKER: &str = "Plan:";

const NEW_RESOURCE_REQUIRED: &str = " (new resource required)";

lazy_static! {
    // ~ aws_instance.web
    // -/+ aws_instance.db (new resource required)
    static ref CHANGE_HEADER: Regex =
        Regex::new(r"(?m)(-/\+|[~+-]|<=) (.*)$").expect("Invalid change header regex");

    // ami: "ami-123"
    // id: <computed>
    static ref SINGLE_VALUE_DIFF: Regex =
        Regex::new(r#"\s*(.*?): *(?:<computed>|"((?:[\S\s]*?[^\\])??)")"#)
            .expect("Invalid single value diff regex");

    // ami: "ami-1" => "ami-2" (forces new resource)
    static ref OLD_AND_NEW_VALUE_DIFF: Regex = Regex::new(
        r#"\s*(.*?): *"((?:[\S\s]*?[^\\])??)"[\S\s]*?=> *(?:<computed>|"((?:[\S\s]*?[^\\])??)")( \(forces new resource\))?"#
    )
    .expect("Invalid old and new value diff regex");

    // Warning: aws_instance.web: deprecated attribute
    static ref WARNING: Regex =
        Regex::new(r"Warning: (.*:)(.*)").expect("Invalid warning regex");

    // + resource "aws_instance" "web" {
    static ref RESOURCE_BLOCK_HEADER: Regex = Regex::new(
        r#"^(-/\+|<=|[~+-])\s+(?:resource|data)\s+"([^"]+)"\s+"([^"]+)"\s*\{$"#
    )
    .expect("Invalid resource block header regex");
}

/// Everything recovered from a text plan
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextPlan {
    /// Slice of the input holding the planned actions
    pub span: String,

    pub warnings: Vec<Warning>,

    /// Per-resource actions of the attribute layout
    pub actions: Vec<PlanAction>,

    /// Resource blocks of the block layout
    pub resources: Vec<ResourceBlock>,
}

/// Parse a text plan transcript
pub fn parse_text_plan(text: &str) -> TextPlan {
    let span = extract_action_block(text);
    let resources = parse_resource_blocks(span);

    // Block-layout attribute lines carry change markers too; only the
    // attribute layout is split into per-resource chunks
    let actions = if resources.is_empty() {
        split_changes(span).iter().map(|chunk| parse_change(chunk)).collect()
    } else {
        Vec::new()
    };

    TextPlan {
        span: span.to_string(),
        warnings: parse_warnings(text),
        actions,
        resources,
    }
}

/// Slice the planned-actions section out of a transcript
///
/// The section starts after [`ACTIONS_HEADER`] (or at the beginning when the
/// header is missing) and ends at the first [`SUMMARY_MARKER`] after it (or
/// at the end of input). With neither marker present the whole input is
/// returned.
pub fn extract_action_block(text: &str) -> &str {
    let start = text
        .find(ACTIONS_HEADER)
        .map(|idx| idx + ACTIONS_HEADER.len())
        .unwrap_or(0);

    let rest = &text[start..];
    let end = rest.find(SUMMARY_MARKER).unwrap_or(rest.len());

    rest[..end].trim()
}

/// Split an attribute-layout action block into one chunk per resource
pub fn split_changes(block: &str) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for line in block.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with(SUMMARY_MARKER) {
            break;
        }

        if ResourceAction::split_marker(trimmed).is_some() {
            if let Some(chunk) = current.take() {
                chunks.push(chunk);
            }
            current = Some(format!("{}\n", trimmed));
        } else if let Some(chunk) = current.as_mut() {
            chunk.push_str(line);
            chunk.push('\n');
        }
    }

    if let Some(chunk) = current {
        chunks.push(chunk);
    }

    chunks
}

/// Parse one attribute-layout chunk into a plan action
pub fn parse_change(change: &str) -> PlanAction {
    let Some(caps) = CHANGE_HEADER.captures(change) else {
        return PlanAction {
            id: ResourceId::empty(),
            change_type: ChangeType::Unknown,
            changes: Vec::new(),
        };
    };

    let symbol = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let mut resource_id = caps.get(2).map(|m| m.as_str()).unwrap_or("").trim().to_string();
    let mut change_type = ChangeType::from_symbol(symbol);

    // Recreations can show up with a plain "+" marker
    if resource_id.contains("new resource required") {
        change_type = ChangeType::Recreate;
        resource_id = resource_id.replace(NEW_RESOURCE_REQUIRED, "");
    }

    let changes = match change_type {
        ChangeType::Create | ChangeType::Read => parse_diffs(change),
        _ => parse_new_and_old_value_diffs(change),
    };

    PlanAction {
        id: ResourceId::parse(resource_id.trim()),
        change_type,
        changes,
    }
}

/// Extract `property: "value"` pairs (creations and reads)
pub fn parse_diffs(change: &str) -> Vec<Diff> {
    SINGLE_VALUE_DIFF
        .captures_iter(change)
        .map(|caps| Diff {
            property: caps.get(1).map(|m| m.as_str().trim()).unwrap_or("").to_string(),
            old: None,
            new: caps
                .get(2)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| COMPUTED.to_string()),
            forces_new_resource: false,
        })
        .collect()
}

/// Extract `property: "old" => "new"` pairs (updates, destroys, recreations)
pub fn parse_new_and_old_value_diffs(change: &str) -> Vec<Diff> {
    OLD_AND_NEW_VALUE_DIFF
        .captures_iter(change)
        .map(|caps| Diff {
            property: caps.get(1).map(|m| m.as_str().trim()).unwrap_or("").to_string(),
            old: caps.get(2).map(|m| m.as_str().to_string()),
            new: caps
                .get(3)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| COMPUTED.to_string()),
            forces_new_resource: caps.get(4).is_some(),
        })
        .collect()
}

/// Extract `Warning: <address>: <detail>` lines
pub fn parse_warnings(text: &str) -> Vec<Warning> {
    WARNING
        .captures_iter(text)
        .map(|caps| {
            let id = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            Warning {
                id: ResourceId::parse(id.trim().trim_end_matches(':')),
                detail: caps.get(2).map(|m| m.as_str().trim()).unwrap_or("").to_string(),
            }
        })
        .collect()
}

/// Parse the first block-layout resource of a text plan
pub fn parse_resource_block(block: &str) -> Option<ResourceBlock> {
    parse_resource_blocks(block).into_iter().next()
}

/// Parse every block-layout resource of a text plan, in order
pub fn parse_resource_blocks(text: &str) -> Vec<ResourceBlock> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(caps) = RESOURCE_BLOCK_HEADER.captures(lines[i].trim()) else {
            i += 1;
            continue;
        };

        let action = ResourceAction::split_marker(lines[i].trim())
            .map(|(action, _)| action)
            .unwrap_or(ResourceAction::Update);
        let close = find_close(&lines, i);

        blocks.push(ResourceBlock {
            resource_type: caps[2].to_string(),
            name: caps[3].to_string(),
            action,
            changes: parse_resource_changes(&lines[i + 1..close], false),
        });

        i = close + 1;
    }

    blocks
}

/// Parse a single attribute line such as `+ ami = "ami-123"`
///
/// Returns `None` for lines without a change marker.
pub fn parse_resource_change(line: &str) -> Option<ResourceChange> {
    parse_resource_changes(&[line], false).into_iter().next()
}

fn parse_resource_changes(lines: &[&str], in_list: bool) -> Vec<ResourceChange> {
    let mut changes = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if line.is_empty() || line.starts_with('#') {
            i += 1;
            continue;
        }

        let opens = opens_composite(line);
        let close = if opens.is_some() { find_close(lines, i) } else { i };

        if let Some((action, rest)) = ResourceAction::split_marker(line) {
            let (key, value_text) = split_assignment(rest, in_list, changes.len());

            let change = match opens {
                Some(open) => {
                    let children = parse_resource_changes(&lines[i + 1..close.min(lines.len())], open == '[');
                    ResourceChange {
                        key,
                        value: Some(composite_value(&children, open)),
                        action,
                        child_changes: Some(children),
                    }
                }
                None => ResourceChange {
                    key,
                    value: parse_value(value_text),
                    action,
                    child_changes: None,
                },
            };

            changes.push(change);
        }

        i = close + 1;
    }

    changes
}

/// Split `key = value`; list elements and nested blocks have no `=`
fn split_assignment(rest: &str, in_list: bool, position: usize) -> (String, &str) {
    if let Some((key, value)) = rest.split_once(" = ") {
        return (key.trim().trim_matches('"').to_string(), value.trim());
    }

    if in_list {
        return (position.to_string(), rest.trim());
    }

    // Nested block: `+ ingress {`
    let key = rest.trim_end_matches(['{', '[']).trim();
    (key.trim_matches('"').to_string(), "")
}

fn opens_composite(line: &str) -> Option<char> {
    let line = strip_trailing_comment(line).trim_end();
    match line.chars().last() {
        Some(c @ ('{' | '[')) => Some(c),
        _ => None,
    }
}

/// Index of the line closing the composite opened at `open`
fn find_close(lines: &[&str], open: usize) -> usize {
    let mut depth = 0usize;

    for (offset, line) in lines[open..].iter().enumerate() {
        let line = strip_trailing_comment(line.trim()).trim_end();

        if offset > 0 && (line.starts_with('}') || line.starts_with(']')) {
            depth = depth.saturating_sub(1);
        }
        if line.ends_with('{') || line.ends_with('[') {
            depth += 1;
        }
        if depth == 0 {
            return open + offset;
        }
    }

    lines.len()
}

fn composite_value(children: &[ResourceChange], open: char) -> Value {
    let values = children
        .iter()
        .map(|child| (child.key.clone(), child.value.clone().unwrap_or(Value::Null)));

    if open == '[' {
        Value::Array(values.map(|(_, value)| value).collect())
    } else {
        Value::Object(values.collect::<Map<String, Value>>())
    }
}

/// Value of an attribute line; `None` when sensitive
fn parse_value(text: &str) -> Option<Value> {
    let text = strip_trailing_comment(text).trim().trim_end_matches(',');

    if text == "(sensitive value)" || text == "(sensitive)" {
        return None;
    }

    // Updates print `old -> new`; keep the planned value
    let text = text.rsplit_once(" -> ").map(|(_, new)| new.trim()).unwrap_or(text);

    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

/// Drop a trailing `# forces replacement` style annotation outside quotes
fn strip_trailing_comment(text: &str) -> &str {
    let mut in_quotes = false;
    let mut previous = '\0';

    for (idx, c) in text.char_indices() {
        match c {
            '"' if previous != '\\' => in_quotes = !in_quotes,
            '#' if !in_quotes && idx > 0 => return text[..idx].trim_end(),
            _ => {}
        }
        previous = c;
    }

    text
}
