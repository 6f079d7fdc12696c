use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;

use lecture_store::config::StoreConfig;
use lecture_store::domain::value_objects::EmbeddingDimension;
use lecture_store::infrastructure::StoreContainer;
use lecture_store::infrastructure::database::{get_database_connection, run_migrations};

#[derive(Parser)]
#[command(name = "lecture-store")]
#[command(about = "Maintain the dimension-partitioned lecture chunk store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// List supported embedding widths and how each table is indexed
    Dimensions,

    /// Show per-dimension chunk statistics
    Stats {
        /// Also show graph-RAG document statistics
        #[arg(long)]
        documents: bool,
    },

    /// Empty chunk tables and restart their ids
    Clear(ClearArgs),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ClearArgs {
    /// Clear every dimension table
    #[arg(long)]
    all: bool,

    /// Clear a single dimension table (384, 768, 1024, 1536 or 3072)
    #[arg(long)]
    dimension: Option<EmbeddingDimension>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate => {
            let config = StoreConfig::from_env()?;
            let mut conn = get_database_connection(&config)?;
            let applied = run_migrations(&mut conn)?;

            if applied.is_empty() {
                println!("Schema is up to date");
            }
            for version in applied {
                println!("Applied {}", version);
            }
        }

        Commands::Dimensions => {
            println!("{:<10} {:<20} {:<16} MODEL", "DIMENSION", "TABLE", "INDEX");
            for dimension in EmbeddingDimension::ALL {
                println!(
                    "{:<10} {:<20} {:<16} {}",
                    dimension.width(),
                    dimension.table_name(),
                    dimension.index_strategy().to_string(),
                    dimension.model_hint()
                );
            }
        }

        Commands::Stats { documents } => {
            let container = StoreContainer::from_env()?;

            println!(
                "{:<10} {:>8} {:>10} {:>8} {:>12}",
                "DIMENSION", "CHUNKS", "EMBEDDED", "SOURCES", "AVG_LENGTH"
            );
            for stats in container.chunk_repository.stats().await? {
                println!(
                    "{:<10} {:>8} {:>10} {:>8} {:>12}",
                    stats.dimension.width(),
                    stats.total_chunks,
                    stats.chunks_with_embeddings,
                    stats.unique_source_files,
                    stats
                        .avg_content_length
                        .map(|avg| format!("{:.1}", avg))
                        .unwrap_or_else(|| "-".to_string())
                );
            }

            if documents {
                let stats = container.document_repository.stats().await?;
                println!();
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
        }

        Commands::Clear(args) => {
            let container = StoreContainer::from_env()?;

            match args.dimension {
                Some(dimension) => {
                    container.chunk_repository.clear(dimension).await?;
                    println!("Cleared {}", dimension.table_name());
                }
                None => {
                    container.chunk_repository.clear_all().await?;
                    println!("Cleared all chunk tables");
                }
            }
        }
    }

    Ok(())
}
