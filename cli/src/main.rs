//! Docgraph CLI: command-line interface for the docgraph ingestion engine
//!
//! Each command loads the graph snapshot, runs one call against it, and
//! writes the snapshot back when the graph changed.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use docgraph::graph::{GraphStore, MemoryGraph};
use docgraph::ingest::{self, install_key_indices, IngestOutcome};
use docgraph::{load_snapshot, main_graph_view, save_snapshot, DocgraphConfig, GraphView};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docgraph", version, about = "Idempotent document graph ingestion")]
struct Cli {
    /// YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Graph snapshot file (overrides config and DOCGRAPH_SNAPSHOT)
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (overrides config and DOCGRAPH_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest one document JSON object
    IngestDocument {
        /// Path to the document JSON
        file: PathBuf,
    },
    /// Ingest a JSON array of agency profiles
    IngestEntities { file: PathBuf },
    /// Ingest a JSON array of organizational units
    IngestOrgs { file: PathBuf },
    /// Ingest a JSON array of roles
    IngestRoles { file: PathBuf },
    /// Link document citations, creating placeholders for unknown ones
    ResolveReferences,
    /// Show documents with their references, entities and topics
    View {
        /// Document ids (`doc_id`)
        #[arg(required = true)]
        doc_ids: Vec<String>,
    },
    /// Show node and relationship counts
    Stats,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = DocgraphConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(snapshot) = cli.snapshot {
        config.snapshot_path = snapshot;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    init_tracing(&config.log_level);

    let graph = open_graph(&config.snapshot_path)?;
    let version_before = graph.version()?;

    match cli.command {
        Commands::IngestDocument { file } => {
            let outcome = ingest::ingest_document_json(&graph, &read_input(&file)?)?;
            print_outcome(&outcome, &cli.format)?;
        }
        Commands::IngestEntities { file } => {
            let outcome = ingest::ingest_entities_json(&graph, &read_input(&file)?)?;
            print_outcome(&outcome, &cli.format)?;
        }
        Commands::IngestOrgs { file } => {
            let outcome = ingest::ingest_orgs_json(&graph, &read_input(&file)?)?;
            print_outcome(&outcome, &cli.format)?;
        }
        Commands::IngestRoles { file } => {
            let outcome = ingest::ingest_roles_json(&graph, &read_input(&file)?)?;
            print_outcome(&outcome, &cli.format)?;
        }
        Commands::ResolveReferences => {
            let outcome = ingest::resolve_references(&graph)?;
            print_outcome(&outcome, &cli.format)?;
        }
        Commands::View { doc_ids } => {
            let view = main_graph_view(&graph, &doc_ids)?;
            print_view(&view, &cli.format)?;
        }
        Commands::Stats => print_stats(&graph, &cli.format)?,
    }

    if graph.version()? != version_before {
        save_snapshot(&graph.snapshot()?, &config.snapshot_path)
            .with_context(|| format!("Failed to save snapshot {:?}", config.snapshot_path))?;
    }
    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the snapshot and make sure every natural key is indexed
fn open_graph(path: &Path) -> Result<MemoryGraph> {
    let mut store: GraphStore =
        load_snapshot(path).with_context(|| format!("Failed to load snapshot {:?}", path))?;
    install_key_indices(&mut store);
    info!("Graph has {} nodes and {} edges", store.node_count(), store.edge_count());
    Ok(MemoryGraph::with_store(store))
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

fn print_outcome(outcome: &IngestOutcome, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_header(vec!["nodesCreated", "relationshipsCreated", "propertiesSet"]);
            table.add_row(vec![
                outcome.nodes_created.to_string(),
                outcome.relationships_created.to_string(),
                outcome.properties_set.to_string(),
            ]);
            println!("{}", table);
        }
    }
    Ok(())
}

fn print_view(view: &GraphView, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Table => {
            if view.is_empty() {
                println!("(no results)");
                return Ok(());
            }

            let mut nodes = Table::new();
            nodes.set_content_arrangement(ContentArrangement::Dynamic);
            nodes.set_header(vec!["id", "label", "key"]);
            for node in &view.nodes {
                let key = node
                    .properties
                    .get("doc_id")
                    .or_else(|| node.properties.get("name"))
                    .map(format_table_value)
                    .unwrap_or_default();
                nodes.add_row(vec![node.id.as_u64().to_string(), node.label.clone(), key]);
            }
            println!("{}", nodes);

            let mut rels = Table::new();
            rels.set_content_arrangement(ContentArrangement::Dynamic);
            rels.set_header(vec!["id", "source", "type", "target", "properties"]);
            for rel in &view.relationships {
                rels.add_row(vec![
                    rel.id.as_u64().to_string(),
                    rel.source.as_u64().to_string(),
                    rel.rel_type.clone(),
                    rel.target.as_u64().to_string(),
                    serde_json::to_string(&rel.properties)?,
                ]);
            }
            println!("{}", rels);
            println!("{} node(s), {} relationship(s)", view.nodes.len(), view.relationships.len());
        }
    }
    Ok(())
}

fn print_stats(graph: &MemoryGraph, format: &OutputFormat) -> Result<()> {
    let stats = graph.statistics()?;
    match format {
        OutputFormat::Json => {
            let labels: serde_json::Map<String, serde_json::Value> = stats
                .label_counts
                .iter()
                .map(|(label, count)| (label.as_str().to_string(), (*count).into()))
                .collect();
            let types: serde_json::Map<String, serde_json::Value> = stats
                .edge_type_counts
                .iter()
                .map(|(edge_type, count)| (edge_type.as_str().to_string(), (*count).into()))
                .collect();
            let json = serde_json::json!({
                "nodes": stats.node_count,
                "relationships": stats.edge_count,
                "labels": labels,
                "relationshipTypes": types,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_header(vec!["kind", "name", "count"]);
            for (label, count) in &stats.label_counts {
                table.add_row(vec!["label".to_string(), label.to_string(), count.to_string()]);
            }
            for (edge_type, count) in &stats.edge_type_counts {
                table.add_row(vec!["relationship".to_string(), edge_type.to_string(), count.to_string()]);
            }
            println!("{}", table);
            println!("Nodes: {}", stats.node_count);
            println!("Edges: {}", stats.edge_count);
        }
    }
    Ok(())
}

fn format_table_value(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
