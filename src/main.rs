use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{debug, error};

use terracost::config::WorkspaceConfig;
use terracost::cost::estimate_workflow_cost;
use terracost::firecloud::{FireCloudClient, MetadataSource};
use terracost::report::{Cell, TableReport};
use terracost::workflows::get_all_workflows;

/// Estimate Google Cloud costs for Terra workflow submissions
#[derive(Parser)]
#[command(name = "terracost")]
#[command(about = "Estimate Google Cloud costs for Terra workflow submissions", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Workspace name (falls back to TERRA_WORKSPACE)
    #[arg(long, global = true)]
    workspace: Option<String>,

    /// Workspace namespace, the Terra billing project (falls back to
    /// TERRA_WORKSPACE_NAMESPACE)
    #[arg(long, global = true)]
    workspace_namespace: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List workflow submissions in chronological order
    ListSubmissions,
    /// Show a submission, including member workflows
    GetSubmission {
        #[arg(long)]
        submission_id: String,
    },
    /// Show Cromwell metadata for a single workflow
    GetWorkflow {
        #[arg(long)]
        submission_id: String,
        #[arg(long)]
        workflow_id: String,
    },
    /// Estimate costs for all workflows in a submission
    EstimateSubmissionCost {
        #[arg(long)]
        submission_id: String,
        /// Output in TSV format
        #[arg(long)]
        tsv: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace,hyper=debug",
    };

    // Diagnostics go to stderr so table and TSV output stay clean.
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .with_writer(std::io::stderr)
        .init();

    debug!("terracost started with verbosity level: {}", cli.verbose);

    if let Err(e) = run_command(cli).await {
        error!("Fatal error: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = WorkspaceConfig::resolve(cli.workspace, cli.workspace_namespace)?;
    let client = Arc::new(FireCloudClient::new(&config));

    match cli.command {
        Commands::ListSubmissions => {
            let mut listing = client.list_submissions().await?;
            listing.sort_by(|a, b| a.submission_date.cmp(&b.submission_date));
            for submission in listing {
                println!(
                    "{} {} {}",
                    submission.submission_id, submission.submission_date, submission.status
                );
            }
        }
        Commands::GetSubmission { submission_id } => {
            let submission = client.get_submission(&submission_id).await?;
            println!("{}", serde_json::to_string_pretty(&*submission)?);
        }
        Commands::GetWorkflow {
            submission_id,
            workflow_id,
        } => {
            let metadata = client.get_workflow(&submission_id, &workflow_id).await?;
            println!("{}", serde_json::to_string_pretty(&*metadata)?);
        }
        Commands::EstimateSubmissionCost { submission_id, tsv } => {
            run_estimate(client, &submission_id, tsv).await?;
        }
    }

    Ok(())
}

async fn run_estimate(
    client: Arc<FireCloudClient>,
    submission_id: &str,
    tsv: bool,
) -> anyhow::Result<()> {
    let source: Arc<dyn MetadataSource> = client;
    let workflows = get_all_workflows(&source, submission_id).await?;

    let report = TableReport::new(vec![
        ("workflow_id", 37),
        ("task", 10),
        ("cpus", 5),
        ("memory_gb", 12),
        ("duration_h", 13),
        ("call_cached", 12),
        ("cost", 8),
        ("preempted", 10),
        ("machine_type", 18),
    ]);

    if tsv {
        println!("{}", report.tsv_header());
    } else {
        println!("{}", report.header());
    }

    // Stable row order across runs: sort workflow ids, records within a
    // workflow are already deterministic.
    let mut workflow_ids: Vec<&String> = workflows.keys().collect();
    workflow_ids.sort_unstable();

    let mut total = 0.0;
    for workflow_id in workflow_ids {
        let metadata = &workflows[workflow_id];
        for record in estimate_workflow_cost(workflow_id, metadata) {
            let cells = [
                Cell::text(workflow_id.as_str()),
                Cell::text(record.task_name.as_str()),
                Cell::Int(i64::from(record.number_of_cpus)),
                Cell::Float(record.memory_gb),
                Cell::Float(record.duration_seconds / 3600.0),
                Cell::text(record.call_cached.to_string()),
                Cell::Float(record.cost),
                Cell::text(record.preempted.to_string()),
                Cell::text(record.machine_type.as_str()),
            ];
            if tsv {
                println!("{}", report.tsv_row(&cells));
            } else {
                println!("{}", report.row(&cells));
            }
            total += record.cost;
        }
    }

    if !tsv {
        println!("{}", report.divider());
        let empty = || Cell::text("");
        let totals = [
            empty(),
            empty(),
            empty(),
            empty(),
            empty(),
            empty(),
            Cell::Float(total),
            empty(),
            empty(),
        ];
        println!("{}", report.row(&totals));
    }

    Ok(())
}
