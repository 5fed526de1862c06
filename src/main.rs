mod doctor;

use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use scout_agent::{ExecutionResult, GraphStructure, NodeStatus, ResearchWorkflow, WorkflowState};
use scout_core::config::AppConfig;
use scout_providers::{BrightDataReddit, BrightDataSerp};

#[derive(Parser)]
#[command(name = "scout", version, about = "Multi-source research agent")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "scout.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive REPL mode
    Repl,
    /// Answer a single question and exit
    Ask {
        /// The question to research (reads stdin when omitted)
        #[arg(trailing_var_arg = true)]
        question: Vec<String>,
        /// Print the full final state and per-node report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the workflow graph
    Graph,
    /// Show current configuration (credentials redacted)
    Config,
    /// Run configuration health checks
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scout=info,warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Some(Commands::Config) => {
            println!("{}", toml::to_string_pretty(&config.redacted())?);
        }
        Some(Commands::Doctor) => {
            println!("Scout Doctor");
            println!("============");
            doctor::run_doctor(&config);
        }
        Some(Commands::Graph) => print_graph(&ResearchWorkflow::topology()?),
        Some(Commands::Ask { question, json }) => {
            let workflow = build_workflow(&config)?;
            let mut question = question.join(" ");
            if question.trim().is_empty() {
                io::stdin()
                    .read_to_string(&mut question)
                    .context("failed to read question from stdin")?;
            }
            let result = workflow.run(&question).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report(&result))?);
            } else {
                println!("{}", answer_or_notice(&result.state));
            }
        }
        Some(Commands::Repl) | None => run_repl(&build_workflow(&config)?).await?,
    }

    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    if path.exists() {
        info!(path = %path.display(), "Loading config");
        return Ok(AppConfig::load(path)?);
    }

    let home_config = std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".scout").join("config.toml"));
    if let Some(path) = home_config.filter(|p| p.exists()) {
        info!(path = %path.display(), "Loading config from home directory");
        return Ok(AppConfig::load(&path)?);
    }

    eprintln!("Warning: No config file found. Reading ANTHROPIC_API_KEY, BRIGHT_DATA_API_KEY and BRIGHT_DATA_API_URL from the environment.");
    Ok(AppConfig::from_env())
}

fn build_workflow(config: &AppConfig) -> anyhow::Result<ResearchWorkflow> {
    let reasoner = scout_llm::create_engine(&config.model)?;
    let search = BrightDataSerp::from_config(&config.search)
        .context("search provider is not configured (run `scout doctor`)")?;
    let social = BrightDataReddit::from_config(&config.social);

    info!(
        provider = %config.model.provider,
        model = %config.model.model_id,
        "Research workflow ready"
    );
    Ok(ResearchWorkflow::new(
        Arc::new(search),
        Arc::new(social),
        reasoner,
    )?)
}

fn print_graph(structure: &GraphStructure) {
    println!("Execution order:");
    for (i, node) in structure.nodes.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, node);
    }
    println!();
    println!("Edges:");
    for edge in &structure.edges {
        println!("  {}", edge);
    }
}

fn answer_or_notice(state: &WorkflowState) -> &str {
    match state.final_answer.as_deref() {
        Some(answer) if !answer.is_empty() => answer,
        _ => "No answer could be produced from the available sources.",
    }
}

fn report(result: &ExecutionResult<WorkflowState>) -> serde_json::Value {
    let nodes: Vec<serde_json::Value> = result
        .node_results
        .iter()
        .map(|r| {
            let (status, reason) = match &r.status {
                NodeStatus::Completed => ("completed", None),
                NodeStatus::Degraded { reason } => ("degraded", Some(reason.as_str())),
            };
            serde_json::json!({
                "node": r.node_id,
                "status": status,
                "reason": reason,
                "elapsed_ms": r.elapsed_ms,
            })
        })
        .collect();

    serde_json::json!({
        "state": result.state,
        "nodes": nodes,
        "total_elapsed_ms": result.total_elapsed_ms,
        "finished_at": chrono::Utc::now().to_rfc3339(),
    })
}

async fn run_repl(workflow: &ResearchWorkflow) -> anyhow::Result<()> {
    println!("Scout v{}", env!("CARGO_PKG_VERSION"));
    println!("Ask a question, or type 'exit' to quit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break; // EOF
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            println!("Goodbye!");
            break;
        }

        match workflow.run(input).await {
            Ok(result) => {
                println!("\n{}\n", answer_or_notice(&result.state));
                let degraded = result.degraded_nodes();
                if !degraded.is_empty() {
                    println!("(degraded: {})\n", degraded.join(", "));
                }
            }
            Err(e) => error!(error = %e, "Workflow run failed"),
        }
    }

    Ok(())
}
