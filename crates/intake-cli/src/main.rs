//! `case-intake` - run the case intake pipeline locally

mod commands;
mod records;

use clap::{Parser, Subcommand, ValueEnum};
use intake_automation::BundleSelection;
use intake_core::{CaseId, DocumentId, TaskId};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "case-intake", version, about = "Case onboarding and document pipeline")]
struct Cli {
    /// Pipeline configuration (TOML or YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Which tier table to resolve against
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TableKind {
    Documents,
    Checklists,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the templates that apply to a case category and quality
    Resolve {
        #[arg(long)]
        category: String,
        #[arg(long)]
        quality: String,
        #[arg(long, value_enum, default_value = "documents")]
        table: TableKind,
    },
    /// Parse a checklist file, or a catalog checklist with --template
    ParseChecklist {
        #[arg(required_unless_present = "template")]
        file: Option<PathBuf>,
        #[arg(long, conflicts_with = "file")]
        template: Option<String>,
    },
    /// Render a template for the case described in a TOML file
    Render {
        template: String,
        #[arg(long)]
        case: PathBuf,
    },
    /// Lay a markdown file onto the letterhead and write a PDF
    Compose {
        input: PathBuf,
        #[arg(long)]
        letterhead: Option<PathBuf>,
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Onboard the case described in a TOML file
    Intake {
        case: PathBuf,
        #[command(flatten)]
        data: DataDir,
    },
    /// List a case's tasks
    Tasks {
        case_id: CaseId,
        #[command(flatten)]
        data: DataDir,
    },
    /// Run a task's automation
    Dispatch {
        task_id: TaskId,
        #[command(flatten)]
        data: DataDir,
    },
    /// Regenerate a stored document in place
    Regenerate {
        document_id: DocumentId,
        #[command(flatten)]
        data: DataDir,
    },
    /// Zip a case's documents, or the documents given with --document
    Bundle {
        #[arg(long = "case", required_unless_present = "documents", conflicts_with = "documents")]
        case_id: Option<CaseId>,
        #[arg(long = "document")]
        documents: Vec<DocumentId>,
        /// Archive path, defaults to the bundle's own filename
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[command(flatten)]
        data: DataDir,
    },
}

#[derive(Debug, clap::Args)]
struct DataDir {
    /// Directory holding records and generated documents
    #[arg(long, default_value = "intake-data")]
    data_dir: PathBuf,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let config = commands::load_config(cli.config.as_deref()).await?;

    match cli.command {
        Command::Resolve {
            category,
            quality,
            table,
        } => commands::resolve(&config, &category, &quality, table == TableKind::Checklists),
        Command::ParseChecklist { file, template } => {
            commands::parse_checklist(&config, file.as_deref(), template.as_deref()).await
        }
        Command::Render { template, case } => commands::render(&config, &template, &case).await,
        Command::Compose {
            input,
            letterhead,
            output,
        } => commands::compose(&config, &input, letterhead.as_deref(), &output).await,
        Command::Intake { case, data } => commands::intake(config, &case, &data.data_dir).await,
        Command::Tasks { case_id, data } => commands::tasks(config, case_id, &data.data_dir).await,
        Command::Dispatch { task_id, data } => {
            commands::dispatch(config, task_id, &data.data_dir).await
        }
        Command::Regenerate { document_id, data } => {
            commands::regenerate(config, document_id, &data.data_dir).await
        }
        Command::Bundle {
            case_id,
            documents,
            output,
            data,
        } => {
            let selection = match case_id {
                Some(case_id) => BundleSelection::Case(case_id),
                None => BundleSelection::Documents(documents),
            };
            commands::bundle(config, selection, output.as_deref(), &data.data_dir).await
        }
    }
}
