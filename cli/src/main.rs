use anyhow::Result;
use bookrec_core::ArtifactStore;
use clap::{Parser, Subcommand};
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

mod pack;

#[derive(Parser)]
#[command(name = "bookrec")]
#[command(about = "Pack and query book recommendation artifacts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert JSON exports (popular, pt, books, similarity) into artifact files
    Pack {
        /// Directory holding popular.json, pt.json, books.json and similarity.json
        #[arg(long)]
        input: String,
        /// Output artifact directory
        #[arg(long, default_value = "./data")]
        output: String,
    },
    /// Print the most popular books
    Popular {
        #[arg(long, default_value = "./data")]
        data: String,
        #[arg(short, default_value_t = 25)]
        n: usize,
    },
    /// Print the books most similar to a title
    Recommend {
        #[arg(long, default_value = "./data")]
        data: String,
        #[arg(long)]
        title: String,
        #[arg(short, default_value_t = 5)]
        k: usize,
    },
    /// List titles that can be recommended from, optionally filtered
    Titles {
        #[arg(long, default_value = "./data")]
        data: String,
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Pack { input, output } => {
            let created_at = time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "".into());
            pack::pack(Path::new(&input), Path::new(&output), created_at)
        }
        Commands::Popular { data, n } => {
            let artifacts = ArtifactStore::new(&data).get()?;
            print_json(&artifacts.popular(n)?)
        }
        Commands::Recommend { data, title, k } => {
            let recs = ArtifactStore::new(&data).recommend(&title, k)?;
            print_json(&recs)
        }
        Commands::Titles { data, query, limit } => {
            let artifacts = ArtifactStore::new(&data).get()?;
            print_json(&artifacts.search_titles(&query, limit))
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
