//! Terminal report for ingested plans
//!
//! Renders a [`PlanView`] (or a parsed text plan) as plain text: a
//! summary, then one section per resource type with one line per
//! resource and its changed attributes underneath.

use serde::Deserialize;
use serde_json::Value;

use super::legacy::TextPlan;
use super::view::{PlanSummary, PlanView, ResourceRow};

/// Options for report rendering
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    /// Maximum width for values before truncation
    pub max_value_width: usize,

    /// Note resources whose attributes did not change
    pub show_unchanged: bool,

    /// Use compact output (no blank line between groups)
    pub compact_mode: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            max_value_width: 60,
            show_unchanged: false,
            compact_mode: false,
        }
    }
}

/// Trait for plan reports
pub trait PlanReport {
    /// Render the plan view to a string
    fn render(&self, view: &PlanView, options: &ReportOptions) -> String;
}

/// Plain-text report for terminal output
pub struct TextReport;

impl Default for TextReport {
    fn default() -> Self {
        Self::new()
    }
}

impl TextReport {
    pub fn new() -> Self {
        Self
    }

    /// Render summary section
    fn render_summary(&self, summary: &PlanSummary) -> String {
        let mut output = String::new();

        output.push_str("Plan Summary:\n");

        let mut parts = Vec::new();

        if summary.to_add > 0 {
            parts.push(format!("+{} to add", summary.to_add));
        }

        if summary.to_change > 0 {
            parts.push(format!("~{} to change", summary.to_change));
        }

        if summary.to_replace > 0 {
            parts.push(format!("±{} to replace", summary.to_replace));
        }

        if summary.to_destroy > 0 {
            parts.push(format!("-{} to destroy", summary.to_destroy));
        }

        if summary.to_read > 0 {
            parts.push(format!("≤{} to read", summary.to_read));
        }

        if parts.is_empty() {
            output.push_str("  No changes.\n");
        } else {
            output.push_str(&format!("  {}\n", parts.join(", ")));
        }

        if summary.unknown > 0 {
            output.push_str(&format!(
                "  ?{} with an unrecognized action\n",
                summary.unknown
            ));
        }

        output.push('\n');
        output
    }

    fn render_row(&self, row: &ResourceRow, options: &ReportOptions) -> String {
        let mut output = format!(
            "  {} {}  {}  ({})\n",
            row.action.symbol(),
            row.name,
            row.address,
            row.action
        );

        for (key, value) in &row.updated_values {
            output.push_str(&format!(
                "      {} = {}\n",
                key,
                format_value(value, options.max_value_width)
            ));
        }

        if !row.has_delta() && options.show_unchanged {
            output.push_str("      (no changes)\n");
        }

        output
    }

    /// Render a plan parsed from a text transcript
    pub fn render_text_plan(&self, plan: &TextPlan, options: &ReportOptions) -> String {
        let mut output = String::new();

        for warning in &plan.warnings {
            output.push_str(&format!("Warning: {}: {}\n", warning.id.name, warning.detail));
        }
        if !plan.warnings.is_empty() {
            output.push('\n');
        }

        for action in &plan.actions {
            let address = action
                .id
                .prefixes
                .iter()
                .map(String::as_str)
                .chain(action.id.resource_type.as_deref())
                .chain(std::iter::once(action.id.name.as_str()))
                .collect::<Vec<_>>()
                .join(".");
            output.push_str(&format!("{} ({})\n", address, action.change_type.label()));

            for diff in &action.changes {
                let new = if diff.is_computed() {
                    "(known after apply)"
                } else {
                    diff.new.as_str()
                };
                let mut line = match &diff.old {
                    Some(old) => format!("    {} = {} -> {}", diff.property, old, new),
                    None => format!("    {} = {}", diff.property, new),
                };
                if diff.forces_new_resource {
                    line.push_str(" # forces replacement");
                }
                output.push_str(&truncate_str(&line, options.max_value_width.saturating_add(40)));
                output.push('\n');
            }
        }

        for block in &plan.resources {
            output.push_str(&format!(
                "{} {}.{}\n",
                block.action.symbol(),
                block.resource_type,
                block.name
            ));
            for change in &block.changes {
                let value = change
                    .value
                    .as_ref()
                    .map(|v| format_value(v, options.max_value_width))
                    .unwrap_or_else(|| "(sensitive)".to_string());
                output.push_str(&format!(
                    "    {} {} = {}\n",
                    change.action.symbol(),
                    change.key,
                    value
                ));
            }
        }

        if plan.actions.is_empty() && plan.resources.is_empty() {
            output.push_str("No resource changes found in plan output.\n");
        }

        output
    }
}

impl PlanReport for TextReport {
    fn render(&self, view: &PlanView, options: &ReportOptions) -> String {
        let mut output = String::new();

        output.push_str(&self.render_summary(&view.summary));

        for group in &view.groups {
            output.push_str(&format!("{} ({})\n", group.resource_type, group.rows.len()));

            for row in &group.rows {
                output.push_str(&self.render_row(row, options));
            }

            if !options.compact_mode {
                output.push('\n');
            }
        }

        output
    }
}

/// Compact JSON for a value, truncated for display
fn format_value(value: &Value, max_width: usize) -> String {
    truncate_str(&value.to_string(), max_width)
}

/// Helper function to truncate a string to a maximum number of characters
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max_len).collect()
    }
}
