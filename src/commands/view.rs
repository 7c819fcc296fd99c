use crate::config::Settings;
use crate::context::Context;
use crate::plan::{
    ActionMode, IngestedPlan, PlanIngestor, PlanReport, PlanView, RecordPolicy, SkippedRecord,
    StructuredPlan, TextPlan, TextReport,
};
use anyhow::{Context as AnyhowContext, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Output format for the view command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ViewFormat {
    #[default]
    Text,
    Json,
}

/// Arguments of the view command
#[derive(Debug, Clone, Default)]
pub struct ViewArgs {
    pub plan: PathBuf,
    pub format: ViewFormat,
    pub actions: Option<ActionMode>,
    pub strict: bool,
    pub show_unchanged: bool,
    pub config: Option<PathBuf>,
}

/// JSON document printed by `view --format json`
#[derive(Serialize)]
struct ViewDocument<'a> {
    #[serde(flatten)]
    view: &'a PlanView,
    skipped: &'a [SkippedRecord],
}

/// Handles the 'view' command - ingests a plan and prints the grouped changes
pub struct ViewCommand;

impl ViewCommand {
    pub fn execute(ctx: &Context, args: &ViewArgs) -> Result<()> {
        let mut settings = Settings::load(&*ctx.fs, args.config.as_deref())?;

        if let Some(mode) = args.actions {
            settings.ingest.action_mode = mode;
        }
        if args.strict {
            settings.ingest.on_malformed_record = RecordPolicy::Abort;
        }
        if args.show_unchanged {
            settings.report.show_unchanged = true;
        }

        let input = ctx
            .fs
            .read_input(&args.plan)
            .with_context(|| format!("Failed to read plan: {:?}", args.plan))?;

        let ingested = PlanIngestor::new(settings.ingest).ingest(&input)?;

        match ingested {
            IngestedPlan::Structured(plan) => Self::show_structured(ctx, &plan, args.format, &settings),
            IngestedPlan::Text(plan) => Self::show_text(ctx, &plan, args.format, &settings),
        }
    }

    fn show_structured(
        ctx: &Context,
        plan: &StructuredPlan,
        format: ViewFormat,
        settings: &Settings,
    ) -> Result<()> {
        let view = PlanView::from_index(&plan.index);

        if format == ViewFormat::Json {
            let document = ViewDocument {
                view: &view,
                skipped: &plan.skipped,
            };
            ctx.output.plain(&serde_json::to_string_pretty(&document)?);
            return Ok(());
        }

        for skipped in &plan.skipped {
            ctx.output.warning(&format!(
                "Skipped resource change #{} ({}): {}",
                skipped.position, skipped.address, skipped.reason
            ));
        }

        if plan.index.is_empty() {
            ctx.output.info("No resource changes in plan");
            return Ok(());
        }

        ctx.output.dimmed(&format!(
            "{} resource change(s) across {} resource type(s)",
            plan.index.total_changes(),
            plan.index.len()
        ));

        let report = TextReport::new().render(&view, &settings.report);
        for line in report.lines() {
            ctx.output.plain(line);
        }

        Ok(())
    }

    fn show_text(
        ctx: &Context,
        plan: &TextPlan,
        format: ViewFormat,
        settings: &Settings,
    ) -> Result<()> {
        if format == ViewFormat::Json {
            ctx.output.plain(&serde_json::to_string_pretty(plan)?);
            return Ok(());
        }

        ctx.output
            .dimmed("Input is not a JSON plan; showing the parsed text transcript.");

        let report = TextReport::new().render_text_plan(plan, &settings.report);
        for line in report.lines() {
            ctx.output.plain(line);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockFileSystem, MockOutput, OutputMessage};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn plan_json() -> String {
        json!({
            "format_version": "1.2",
            "resource_changes": [
                {
                    "address": "aws_instance.web",
                    "type": "aws_instance",
                    "name": "web",
                    "change": {
                        "actions": ["delete", "create"],
                        "before": {"ami": "ami-1", "instance_type": "t2.micro"},
                        "after": {"ami": "ami-2", "instance_type": "t2.micro"}
                    }
                },
                {
                    "address": "aws_iam_role.broken",
                    "type": "aws_iam_role",
                    "name": "broken"
                }
            ]
        })
        .to_string()
    }

    fn context(fs: MockFileSystem) -> (Context, Arc<MockOutput>) {
        let output = Arc::new(MockOutput::new());
        (Context::test_with(Arc::new(fs), output.clone()), output)
    }

    fn args(plan: &str) -> ViewArgs {
        ViewArgs {
            plan: PathBuf::from(plan),
            ..Default::default()
        }
    }

    #[test]
    fn test_view_text_report() {
        let (ctx, output) = context(MockFileSystem::new().with_file("plan.json", &plan_json()));

        ViewCommand::execute(&ctx, &args("plan.json")).unwrap();

        let text = output.to_text();
        assert!(text.contains("- web  aws_instance.web  (delete)"));
        assert!(text.contains("ami = \"ami-2\""));
        assert!(!text.contains("instance_type = "));
        assert_eq!(output.get_warnings().len(), 1);
        assert!(output.get_warnings()[0].contains("aws_iam_role.broken"));
    }

    #[test]
    fn test_view_counts_changes_and_types() {
        let (ctx, output) = context(MockFileSystem::new().with_file("plan.json", &plan_json()));

        ViewCommand::execute(&ctx, &args("plan.json")).unwrap();

        assert!(output.contains_message(&OutputMessage::Dimmed(
            "1 resource change(s) across 1 resource type(s)".to_string()
        )));
    }

    #[test]
    fn test_view_empty_plan() {
        let (ctx, output) = context(
            MockFileSystem::new().with_file("plan.json", r#"{"resource_changes": []}"#),
        );

        ViewCommand::execute(&ctx, &args("plan.json")).unwrap();

        assert!(output.contains_message(&OutputMessage::Info(
            "No resource changes in plan".to_string()
        )));
    }

    #[test]
    fn test_view_json_includes_skipped_records() {
        let (ctx, output) = context(MockFileSystem::new().with_file("plan.json", &plan_json()));

        let args = ViewArgs {
            format: ViewFormat::Json,
            ..args("plan.json")
        };
        ViewCommand::execute(&ctx, &args).unwrap();

        let messages = output.get_messages();
        let OutputMessage::Plain(printed) = &messages[0] else {
            panic!("expected plain JSON output, got {:?}", messages);
        };
        let document: Value = serde_json::from_str(printed).unwrap();

        assert_eq!(document["groups"][0]["rows"][0]["updated_values"], json!({"ami": "ami-2"}));
        assert_eq!(document["skipped"][0]["address"], json!("aws_iam_role.broken"));
        assert_eq!(document["summary"]["to_destroy"], json!(1));
    }

    #[test]
    fn test_view_compound_actions_flag() {
        let (ctx, output) = context(MockFileSystem::new().with_file("plan.json", &plan_json()));

        let args = ViewArgs {
            actions: Some(ActionMode::Compound),
            ..args("plan.json")
        };
        ViewCommand::execute(&ctx, &args).unwrap();

        assert!(output.to_text().contains("(replace)"));
    }

    #[test]
    fn test_view_strict_flag_aborts() {
        let (ctx, _output) = context(MockFileSystem::new().with_file("plan.json", &plan_json()));

        let args = ViewArgs {
            strict: true,
            ..args("plan.json")
        };
        let err = ViewCommand::execute(&ctx, &args).unwrap_err();

        assert!(err.to_string().contains("aws_iam_role.broken"));
    }

    #[test]
    fn test_view_config_file_is_applied() {
        let fs = MockFileSystem::new()
            .with_file("plan.json", &plan_json())
            .with_file("/cfg.yaml", "ingest:\n  on_malformed_record: abort\n");
        let (ctx, _output) = context(fs);

        let args = ViewArgs {
            config: Some(PathBuf::from("/cfg.yaml")),
            ..args("plan.json")
        };

        assert!(ViewCommand::execute(&ctx, &args).is_err());
    }

    #[test]
    fn test_view_reads_stdin() {
        let (ctx, output) = context(MockFileSystem::new().with_stdin(&plan_json()));

        ViewCommand::execute(&ctx, &args("-")).unwrap();

        assert!(output.to_text().contains("aws_instance (1)"));
    }

    #[test]
    fn test_view_text_transcript() {
        let transcript = "Terraform will perform the following actions:\n\n  ~ aws_instance.web\n      instance_type: \"t2.micro\" => \"t3.micro\"\n\nPlan: 0 to add, 1 to change, 0 to destroy.\n";
        let (ctx, output) = context(MockFileSystem::new().with_file("plan.txt", transcript));

        ViewCommand::execute(&ctx, &args("plan.txt")).unwrap();

        let text = output.to_text();
        assert!(text.contains("aws_instance.web (will be updated)"));
        assert!(text.contains("instance_type = t2.micro -> t3.micro"));
    }

    #[test]
    fn test_view_missing_plan_file() {
        let (ctx, _output) = context(MockFileSystem::new());

        let err = ViewCommand::execute(&ctx, &args("missing.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read plan"));
    }

    #[test]
    fn test_view_invalid_json() {
        let (ctx, _output) = context(MockFileSystem::new().with_file("plan.json", "{ nope"));

        let err = ViewCommand::execute(&ctx, &args("plan.json")).unwrap_err();
        assert!(err.to_string().contains("Invalid plan document"));
    }
}
