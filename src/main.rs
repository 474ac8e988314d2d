use clap::{Parser, Subcommand};

use graphloom::config::LoaderConfig;
use graphloom::graph_store::{MemoryStore, Neo4jStore};
use graphloom::materializer;
use graphloom::source::ClickHouseSource;
use graphloom::taxonomy;

/// Graphloom - materializes hierarchical relational data as a labeled graph
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the SES taxonomy table into the graph store
    Taxonomy {
        /// Taxonomy table path (overrides GRAPHLOOM_TAXONOMY_FILE)
        #[arg(long)]
        file: Option<String>,

        /// Materialize into the in-memory store and only report the summary
        #[arg(long)]
        dry_run: bool,
    },

    /// Expand the object schema against the relational source and persist
    /// the resulting node trees
    Build {
        /// Object schema table path (overrides GRAPHLOOM_OBJECTS_FILE)
        #[arg(long)]
        objects: Option<String>,

        /// Element schema table path (overrides GRAPHLOOM_ELEMENTS_FILE)
        #[arg(long)]
        elements: Option<String>,

        /// Query returning the virtual parent records that seed the traversal
        #[arg(long)]
        root_query: Option<String>,

        /// Skip the full store reset at run start
        #[arg(long)]
        keep_store: bool,

        /// Materialize into the in-memory store and only report the summary
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    // Defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match LoaderConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Taxonomy { file, dry_run } => {
            if let Some(file) = file {
                config.taxonomy_file = file;
            }

            let outcome = if dry_run {
                let store = MemoryStore::new();
                taxonomy::run_taxonomy(&config, &store).await
            } else {
                let store = connect_neo4j(&config).await;
                taxonomy::run_taxonomy(&config, &store).await
            };

            match outcome {
                Ok(summary) => log::info!("Taxonomy loaded: {summary}"),
                Err(e) => {
                    log::error!("Taxonomy load failed: {e}");
                    std::process::exit(1);
                }
            }
        }

        Command::Build {
            objects,
            elements,
            root_query,
            keep_store,
            dry_run,
        } => {
            if let Some(objects) = objects {
                config.objects_file = objects;
            }
            if let Some(elements) = elements {
                config.elements_file = elements;
            }
            if let Some(root_query) = root_query {
                config.root_query = root_query;
            }

            let source = ClickHouseSource::new(&config.clickhouse);

            let outcome = if dry_run {
                let store = MemoryStore::new();
                materializer::run_build(&config, &source, &store, keep_store).await
            } else {
                let store = connect_neo4j(&config).await;
                materializer::run_build(&config, &source, &store, keep_store).await
            };

            match outcome {
                Ok(summary) => log::info!("Build complete: {summary}"),
                Err(e) => {
                    log::error!("Build failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

async fn connect_neo4j(config: &LoaderConfig) -> Neo4jStore {
    match Neo4jStore::connect(&config.neo4j).await {
        Ok(store) => store,
        Err(e) => {
            log::error!("Neo4j connection failed: {e}");
            std::process::exit(1);
        }
    }
}
