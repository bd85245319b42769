use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ragpipe::pipeline::{Pipeline, PipelineConfig};
use ragpipe::toolloop::{LoopOutcome, ToolLoop, ToolLoopConfig, ToolRegistry};
use ragpipe_core::ToolDescriptor;
use ragpipe_local::anthropic::AnthropicClient;
use ragpipe_local::extract::PageExtractor;
use ragpipe_local::jsonrpc::ToolEndpointClient;
use ragpipe_local::search::SearxngSearchProvider;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ragpipe", version, about = "Search-augmented question answering")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a query through the full search/rank/scrape/critique pipeline.
    Ask(AskCmd),
    /// Run a prompt through the bounded tool-invocation loop.
    Tools(ToolsCmd),
}

#[derive(Args)]
struct AskCmd {
    /// The query to answer. Prompts interactively when omitted.
    query: Option<String>,

    /// Number of web search results to retrieve.
    #[arg(long, default_value_t = 5)]
    results: usize,

    /// Maximum number of results to scrape for context.
    #[arg(long, default_value_t = 3)]
    context_results: usize,

    /// Skip the self-critique pass and keep the first synthesized answer.
    #[arg(long)]
    no_critique: bool,

    /// Emit the full pipeline result as JSON instead of the readable report.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ToolsCmd {
    /// The prompt to run against the tool-equipped model.
    prompt: String,

    /// Path to a JSON file with the tool manifest
    /// (array of {name, description, endpoint}).
    #[arg(long)]
    manifest: PathBuf,

    /// Upper bound on completion turns.
    #[arg(long, default_value_t = 8)]
    max_iterations: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ragpipe=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Ask(cmd) => ask(cmd).await,
        Command::Tools(cmd) => tools(cmd).await,
    }
}

async fn ask(cmd: AskCmd) -> anyhow::Result<()> {
    let query = match cmd.query {
        Some(q) => q,
        None => read_query()?,
    };

    let client = ragpipe_local::default_client().context("building http client")?;
    let completion =
        AnthropicClient::from_env(client.clone()).context("configuring completion client")?;
    let search =
        SearxngSearchProvider::from_env(client.clone()).context("configuring search provider")?;
    let extractor = PageExtractor::new(client);

    let pipeline = Pipeline::new(
        Arc::new(completion),
        Arc::new(search),
        Arc::new(extractor),
        PipelineConfig {
            num_search_results: cmd.results,
            max_context_results: cmd.context_results,
            critique: !cmd.no_critique,
        },
    );

    let result = pipeline.process_query(&query).await;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("\n==== Final Answer ====\n");
    println!("{}", result.answer);

    if !result.follow_up_questions.is_empty() {
        println!("\n==== Follow-up Questions ====\n");
        for q in result.follow_up_questions.iter().take(3) {
            println!("- {}", q.question);
            println!("  Priority: {}", q.priority);
            println!("  Rationale: {}", q.rationale);
        }
    }

    if let Some(eval) = &result.evaluation {
        println!("\n==== Answer Evaluation ====\n");
        println!("Accuracy:     {}/10", eval.accuracy);
        println!("Completeness: {}/10", eval.completeness);
        println!("Clarity:      {}/10", eval.clarity);
        println!("Conciseness:  {}/10", eval.conciseness);
        println!("Evidence:     {}/10", eval.evidence);
    }

    Ok(())
}

async fn tools(cmd: ToolsCmd) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&cmd.manifest)
        .with_context(|| format!("reading {}", cmd.manifest.display()))?;
    let descriptors: Vec<ToolDescriptor> =
        serde_json::from_str(&raw).context("parsing tool manifest")?;
    let registry = ToolRegistry::new(descriptors).context("registering tools")?;

    let client = ragpipe_local::default_client().context("building http client")?;
    let completion =
        AnthropicClient::from_env(client.clone()).context("configuring completion client")?;
    let dispatcher = ToolEndpointClient::new(client);

    let tool_loop = ToolLoop::new(
        Arc::new(completion),
        Arc::new(dispatcher),
        registry,
        ToolLoopConfig {
            max_iterations: cmd.max_iterations,
            ..ToolLoopConfig::default()
        },
    );

    match tool_loop.run(&cmd.prompt).await? {
        LoopOutcome::Completed { text, iterations } => {
            tracing::info!(iterations, "tool loop completed");
            println!("{text}");
        }
        LoopOutcome::Exhausted {
            last_text,
            iterations,
        } => {
            tracing::warn!(iterations, "tool loop hit its iteration cap");
            println!("{last_text}");
        }
    }

    Ok(())
}

fn read_query() -> anyhow::Result<String> {
    print!("Enter a query: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let query = line.trim().to_string();
    anyhow::ensure!(!query.is_empty(), "empty query");
    Ok(query)
}
