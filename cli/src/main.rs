use anyhow::{Context, Result};
use birs_core::persist::load_meta;
use birs_core::{open_or_build, rebuild, EngineConfig, QueryResult, Searcher};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "birs")]
#[command(about = "Boolean and proximity retrieval over a local text corpus", long_about = None)]
struct Cli {
    #[command(flatten)]
    paths: PathArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PathArgs {
    /// Index file (default: indexes.json, or BIRS_INDEX_PATH)
    #[arg(long, global = true)]
    index: Option<PathBuf>,
    /// Corpus directory, used when the index must be built (or BIRS_CORPUS_DIR)
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,
    /// Newline-delimited stopword list (or BIRS_STOPWORDS)
    #[arg(long, global = true)]
    stopwords: Option<PathBuf>,
    /// Corpus file extension (default: txt, or BIRS_EXTENSION)
    #[arg(long, global = true)]
    extension: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from the corpus, replacing any stored index
    Build,
    /// Evaluate a boolean query, e.g. "cat and not dog"
    Boolean { query: String },
    /// Evaluate a proximity query, e.g. "data mining /3"
    Proximity { query: String },
    /// Print statistics about the stored index
    Stats,
    /// Read queries from stdin: "b <query>", "p <query>", "q" to quit
    Shell,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let config = engine_config(cli.paths);

    match cli.command {
        Commands::Build => {
            let searcher = rebuild(&config).context("building index")?;
            let stats = searcher.index().stats();
            println!(
                "Indexed {} documents, {} terms -> {}",
                stats.num_docs,
                stats.num_terms,
                config.index_path.display()
            );
            Ok(())
        }
        Commands::Boolean { query } => {
            let searcher = open(&config)?;
            print_result(&searcher.evaluate_boolean(query.trim()));
            Ok(())
        }
        Commands::Proximity { query } => {
            let searcher = open(&config)?;
            print_result(&searcher.evaluate_proximity(query.trim()));
            Ok(())
        }
        Commands::Stats => {
            let searcher = open(&config)?;
            let stats = searcher.index().stats();
            if let Ok(meta) = load_meta(&config.index_path) {
                println!("created_at: {}", meta.created_at);
            }
            println!("documents:  {}", stats.num_docs);
            println!("terms:      {}", stats.num_terms);
            println!("postings:   {}", stats.num_postings);
            println!("positions:  {}", stats.num_positions);
            Ok(())
        }
        Commands::Shell => {
            let searcher = open(&config)?;
            shell(&searcher)
        }
    }
}

fn engine_config(paths: PathArgs) -> EngineConfig {
    let mut config = EngineConfig::from_env();
    if let Some(index) = paths.index { config.index_path = index; }
    if let Some(corpus) = paths.corpus { config.corpus_dir = Some(corpus); }
    if let Some(stopwords) = paths.stopwords { config.stopwords_path = Some(stopwords); }
    if let Some(ext) = paths.extension { config.extension = ext.trim_start_matches('.').to_string(); }
    config
}

fn open(config: &EngineConfig) -> Result<Searcher> {
    open_or_build(config).with_context(|| format!("opening index {}", config.index_path.display()))
}

fn shell(searcher: &Searcher) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        match line.split_once(char::is_whitespace) {
            _ if line == "q" => break,
            Some(("b", query)) => print_result(&searcher.evaluate_boolean(query.trim())),
            Some(("p", query)) => print_result(&searcher.evaluate_proximity(query.trim())),
            _ if line.is_empty() => {}
            _ => println!("usage: b <boolean query> | p <word1 word2 /k> | q"),
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_result(result: &QueryResult) {
    println!("{} results returned in {}", result.count, format_elapsed(result.elapsed));
    println!("Matching Documents:");
    for doc in &result.docs {
        println!("• Document {doc}");
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 0.001 {
        format!("{secs:.6} sec")
    } else {
        format!("{:.2} μs", secs * 1_000_000.0)
    }
}
