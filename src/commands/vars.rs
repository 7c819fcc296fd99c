use crate::context::Context;
use crate::vars::{parse_vars, write_vars, VarValue};
use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;

/// Handles the 'vars' command - inspects and edits .tfvars files
pub struct VarsCommand;

impl VarsCommand {
    /// List the variables of a file with their inferred types
    pub fn execute_show(ctx: &Context, file: &Path) -> Result<()> {
        let content = ctx
            .fs
            .read_to_string(file)
            .with_context(|| format!("Failed to read variables file: {:?}", file))?;
        let vars = parse_vars(&content);

        ctx.output.section(&format!("Variables in {}", file.display()));

        let mut count = 0;
        for (name, value) in vars.variables() {
            let kind = match value {
                VarValue::Bool(_) => "bool",
                VarValue::Number(_) => "number",
                VarValue::Text(_) => "string",
            };
            ctx.output
                .key_value(name, &format!("{} ({})", value.display(), kind));
            count += 1;
        }

        if count == 0 {
            ctx.output.dimmed("No variables defined");
        }

        Ok(())
    }

    /// Set `NAME=VALUE` assignments and rewrite the file
    pub fn execute_set(ctx: &Context, file: &Path, assignments: &[String]) -> Result<()> {
        let pairs = assignments
            .iter()
            .map(|assignment| {
                assignment
                    .split_once('=')
                    .map(|(name, value)| (name.trim(), value))
                    .filter(|(name, _)| !name.is_empty())
                    .with_context(|| format!("Expected NAME=VALUE, got '{}'", assignment))
            })
            .collect::<Result<Vec<_>>>()?;

        // A missing file is created
        let content = if ctx.fs.exists(file) {
            ctx.fs
                .read_to_string(file)
                .with_context(|| format!("Failed to read variables file: {:?}", file))?
        } else {
            String::new()
        };

        let mut vars = parse_vars(&content);
        for (name, value) in &pairs {
            let verb = if vars.get(name).is_some() { "Updated" } else { "Added" };
            vars.set(name, value);
            ctx.output.dimmed(&format!("{} {}", verb, name));
        }

        ctx.fs.write(file, &write_vars(&vars))?;

        ctx.output.success(&format!(
            "Wrote {} variable(s) to {}",
            pairs.len(),
            file.display()
        ));

        Ok(())
    }
}
