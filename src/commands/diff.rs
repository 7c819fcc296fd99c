use crate::config::Settings;
use crate::context::Context;
use crate::plan::{updated_values, IngestedPlan, PlanIngestor};
use anyhow::{Context as AnyhowContext, Result};
use serde_json::Value;
use std::path::Path;

/// Handles the 'diff' command - prints what changed for one resource
pub struct DiffCommand;

impl DiffCommand {
    pub fn execute(ctx: &Context, plan: &Path, address: &str, config: Option<&Path>) -> Result<()> {
        let settings = Settings::load(&*ctx.fs, config)?;

        let input = ctx
            .fs
            .read_input(plan)
            .with_context(|| format!("Failed to read plan: {:?}", plan))?;

        let IngestedPlan::Structured(structured) = PlanIngestor::new(settings.ingest).ingest(&input)? else {
            anyhow::bail!("Resource diffs need a JSON plan (tofu show -json / terraform show -json)");
        };

        let change = structured
            .index
            .find_by_address(address)
            .with_context(|| format!("No resource change with address '{}' in plan", address))?;

        ctx.output.action(
            &change.action,
            &format!("{} {} ({})", change.action.symbol(), change.address, change.action),
        );

        let delta = updated_values(&change.before, &change.after);
        if delta.is_empty() {
            ctx.output.info("No changes");
        } else {
            ctx.output
                .plain(&serde_json::to_string_pretty(&Value::Object(delta))?);
        }

        Ok(())
    }
}
