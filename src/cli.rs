//! `ontoseed` command line.
//!
//! Results are printed to stdout as JSON; warnings and errors go to stderr.

use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use crate::{
    config::Config,
    enrichment::{Query, QueryOptions},
    errors::Result,
    logger,
    ontology::{SlimLookup, TermValidator},
    sparql::{http::HttpSparqlClient, ClientHandle},
};

#[derive(Parser)]
#[command(name = "ontoseed", version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that seed CURIEs exist and report obsoleted ones
    Validate {
        #[arg(required = true)]
        seeds: Vec<String>,
    },
    /// Enrich a seed list with relationships from the ontology
    Enrich {
        #[arg(required = true)]
        seeds: Vec<String>,
        #[arg(long, value_enum, default_value_t = Mode::Simple)]
        mode: Mode,
        /// Slim whose members extend the object set (minimal and full modes)
        #[arg(long = "slim")]
        slims: Vec<String>,
        /// Anatomical context CURIE (contextual mode)
        #[arg(long)]
        context: Vec<String>,
        /// Superclass steps (ancestor mode)
        #[arg(long, default_value_t = 1)]
        hops: usize,
        /// Relationship to query, repeatable; defaults to the configured ones
        #[arg(long = "property")]
        properties: Vec<String>,
        /// Fail on invalid or obsoleted seeds
        #[arg(long)]
        strict: bool,
        /// Replace obsoleted seeds by their successors before enriching
        #[arg(long)]
        update_obsoleted: bool,
        /// Drop rows whose edge is implied by a longer path
        #[arg(long)]
        non_redundant: bool,
    },
    /// List synonyms of the seeds
    Synonyms {
        #[arg(required = true)]
        seeds: Vec<String>,
    },
    /// List the slims of an ontology
    Slims {
        /// Ontology title, e.g. "Cell Ontology"
        #[arg(long)]
        ontology: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Simple,
    Minimal,
    Full,
    Contextual,
    Ancestor,
    Parent,
}

#[derive(Serialize)]
struct EnrichmentOutput<'a> {
    table: &'a crate::enrichment::table::TripleTable,
    graph: Vec<(String, String, String)>,
    report: &'a crate::graph::ReductionReport,
}

/// Parses arguments and runs the requested command.
pub async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    logger::init(&config.logger);

    let client: Arc<ClientHandle> = Arc::new(HttpSparqlClient::try_new(&config.sparql)?);

    match cli.command {
        Commands::Validate { seeds } => {
            let validator = TermValidator::new(client).with_chunk_size(config.query.chunk_size);
            let terms = validator.construct_terms(&seeds).await?;
            if let Err(err) = TermValidator::validation_report(&terms) {
                eprintln!("{}", err.to_string().yellow());
            }
            print_json(&terms)
        }
        Commands::Enrich {
            seeds,
            mode,
            slims,
            context,
            hops,
            properties,
            strict,
            update_obsoleted,
            non_redundant,
        } => {
            let options = QueryOptions::from_settings(config.query.clone())
                .with_properties(properties)
                .strict(strict);
            let mut query = Query::new(client, &seeds, options).await?;
            if update_obsoleted {
                query.update_obsoleted_terms();
            }
            let enrichment = match mode {
                Mode::Simple => query.simple_enrichment().await?,
                Mode::Minimal => query.minimal_slim_enrichment(&slims).await?,
                Mode::Full => query.full_slim_enrichment(&slims).await?,
                Mode::Contextual => query.contextual_slim_enrichment(&context).await?,
                Mode::Ancestor => query.ancestor_enrichment(hops).await?,
                Mode::Parent => query.parent_enrichment().await?,
            };
            if !enrichment.report.invalid_predicates.is_empty() {
                eprintln!(
                    "{} {}",
                    "not reduced:".yellow(),
                    enrichment.report.invalid_predicates.join(", ")
                );
            }
            let table = if non_redundant {
                enrichment.non_redundant_table()
            } else {
                enrichment.table.clone()
            };
            print_json(&EnrichmentOutput {
                table: &table,
                graph: enrichment.graph_edges(),
                report: &enrichment.report,
            })
        }
        Commands::Synonyms { seeds } => {
            let query = Query::new(client, &seeds, QueryOptions::from_settings(config.query.clone())).await?;
            print_json(&query.synonym_lookup().await?)
        }
        Commands::Slims { ontology } => {
            let slims = SlimLookup::new(client).list_slims(&ontology).await?;
            print_json(&slims)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
