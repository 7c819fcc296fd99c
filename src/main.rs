mod commands;
mod config;
mod context;
mod output;
mod plan;
mod traits;
mod vars;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{DiffCommand, VarsCommand, ViewArgs, ViewCommand, ViewFormat};
use context::Context;
use plan::ActionMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "planview")]
#[command(about = "Browse OpenTofu/Terraform plans grouped by resource type, showing only what changed", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the changes of a plan grouped by resource type
    View {
        /// Plan file (`show -json` output or a plan transcript); `-` reads stdin
        plan: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ViewFormat::Text)]
        format: ViewFormat,

        /// How records with several actions are reported (first, compound)
        #[arg(long)]
        actions: Option<ActionMode>,

        /// Fail on the first malformed resource change instead of skipping it
        #[arg(long)]
        strict: bool,

        /// Also note resources whose attributes did not change
        #[arg(long)]
        show_unchanged: bool,

        /// Settings file (defaults to ./.planview.yaml, then ~/.planview.yaml)
        #[arg(short, long, env = "PLANVIEW_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Show the changed attributes of a single resource
    Diff {
        /// Plan file in `show -json` format; `-` reads stdin
        plan: PathBuf,

        /// Resource address (e.g., module.vpc.aws_subnet.private)
        address: String,

        /// Settings file (defaults to ./.planview.yaml, then ~/.planview.yaml)
        #[arg(short, long, env = "PLANVIEW_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Inspect or edit a .tfvars file
    Vars {
        #[command(subcommand)]
        command: VarsCommands,
    },
}

#[derive(Subcommand)]
enum VarsCommands {
    /// List variables with their inferred types
    Show {
        /// Variables file
        file: PathBuf,
    },

    /// Set one or more variables (NAME=VALUE) and rewrite the file
    Set {
        /// Variables file (created if missing)
        file: PathBuf,

        /// Assignments
        #[arg(required = true)]
        assignments: Vec<String>,
    },
}

fn run(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::View {
            plan,
            format,
            actions,
            strict,
            show_unchanged,
            config,
        } => {
            let args = ViewArgs {
                plan,
                format,
                actions,
                strict,
                show_unchanged,
                config,
            };
            ViewCommand::execute(ctx, &args)?;
        }
        Commands::Diff {
            plan,
            address,
            config,
        } => {
            DiffCommand::execute(ctx, &plan, &address, config.as_deref())?;
        }
        Commands::Vars { command } => match command {
            VarsCommands::Show { file } => VarsCommand::execute_show(ctx, &file)?,
            VarsCommands::Set { file, assignments } => {
                VarsCommand::execute_set(ctx, &file, &assignments)?
            }
        },
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let ctx = Context::new();

    if let Err(err) = run(&ctx, cli.command) {
        ctx.output.error(&format!("{:#}", err));
        std::process::exit(1);
    }
}
