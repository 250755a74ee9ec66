//! RAG CLI - Command-line interface for the hybrid retrieval engine.
//!
//! Documents are indexed in memory on every run; nothing is persisted.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rag_chunk::{AdaptiveChunker, ContextualAugmenter};
use rag_core::{ChunkStrategy, Chunker, Embedder, Judge, RagConfig, RankedResult};
use rag_embed::{HashingEmbedder, TopicEmbedder};
use rag_llm::AnthropicJudge;
use rag_query::{HybridRetriever, LlmReranker, RagPipeline};

/// RAG - Hybrid (dense + BM25) document retrieval
#[derive(Parser)]
#[command(name = "rag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: user config dir, then ./rag.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index files and run a hybrid search
    Search {
        /// Search query
        query: String,

        /// Files or directories to index
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Maximum number of results (default: search.default_top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Re-rank the fused results with the judging model
        #[arg(long)]
        rerank: bool,

        /// Prepend model-generated context to each chunk before indexing
        #[arg(long)]
        contextual: bool,

        /// Chunking strategy (section, paragraph, sentence, fixed)
        #[arg(short, long)]
        strategy: Option<ChunkStrategy>,

        /// Embedding provider
        #[arg(short, long, value_enum, default_value_t = EmbedderKind::Hashing)]
        embedder: EmbedderKind,

        /// Recursively process directories
        #[arg(short, long)]
        recursive: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how a file would be chunked
    Chunk {
        /// File to chunk
        path: PathBuf,

        /// Chunking strategy (section, paragraph, sentence, fixed)
        #[arg(short, long)]
        strategy: Option<ChunkStrategy>,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum EmbedderKind {
    /// Feature-hashed bag of tokens
    Hashing,
    /// Keyword-family distribution
    Topic,
}

impl EmbedderKind {
    fn build(self) -> Arc<dyn Embedder> {
        match self {
            Self::Hashing => Arc::new(HashingEmbedder::new()),
            Self::Topic => Arc::new(TopicEmbedder::new()),
        }
    }
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn load_config(path: Option<&Path>) -> rag_core::Result<RagConfig> {
    match path {
        Some(path) => RagConfig::load(path),
        None => RagConfig::load_default(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Search {
            query,
            paths,
            top_k,
            rerank,
            contextual,
            strategy,
            embedder,
            recursive,
            json,
        } => {
            if let Some(strategy) = strategy {
                config.chunking.strategy = strategy;
            }
            let options = SearchOptions {
                top_k: top_k.unwrap_or(config.search.default_top_k),
                rerank,
                contextual,
                json,
            };
            search(&config, embedder.build(), &query, &paths, recursive, options).await?;
        }
        Commands::Chunk { path, strategy } => {
            if let Some(strategy) = strategy {
                config.chunking.strategy = strategy;
            }
            chunk(&config, &path)?;
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

struct SearchOptions {
    top_k: usize,
    rerank: bool,
    contextual: bool,
    json: bool,
}

async fn search(
    config: &RagConfig,
    embedder: Arc<dyn Embedder>,
    query: &str,
    paths: &[PathBuf],
    recursive: bool,
    options: SearchOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let judge: Option<Arc<dyn Judge>> = if options.rerank || options.contextual {
        Some(Arc::new(AnthropicJudge::from_env(&config.judge)?))
    } else {
        None
    };

    let mut retriever = HybridRetriever::from_config(config);
    if let (true, Some(judge)) = (options.rerank, &judge) {
        retriever = retriever.with_reranker(LlmReranker::new(judge.clone(), config.rerank.clone()));
    }

    let mut pipeline = RagPipeline::new(embedder, retriever)
        .with_chunker(AdaptiveChunker::from_config(&config.chunking));
    if let (true, Some(judge)) = (options.contextual, &judge) {
        pipeline = pipeline.with_augmenter(ContextualAugmenter::new(
            judge.clone(),
            config.augment.clone(),
        ));
    }

    let files = collect_files(paths, recursive)?;
    if files.is_empty() {
        eprintln!("No supported files found");
        std::process::exit(1);
    }

    for file_path in &files {
        let content = match fs::read_to_string(file_path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Skipping {}: {}", file_path.display(), e);
                continue;
            }
        };
        pipeline.ingest(&file_path.display().to_string(), &content).await?;
    }

    info!("Index ready: {:?}", pipeline.retriever().stats()?);

    let results = if options.rerank {
        pipeline.query_with_reranking(query, options.top_k).await?
    } else {
        pipeline.query(query, options.top_k).await?
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(&results);
    }

    Ok(())
}

fn print_results(results: &[RankedResult]) {
    if results.is_empty() {
        println!("No results found.");
        return;
    }

    for (rank, result) in results.iter().enumerate() {
        let chunk = &result.chunk;
        let source = chunk.metadata_str("source").unwrap_or("-");
        println!("{}. [{:.4}] {}", rank + 1, result.score, source);
        if let Some(header) = chunk.metadata_str("header") {
            println!("   # {}", header);
        }
        let text = chunk.metadata_str("original_content").unwrap_or(&chunk.content);
        println!("   {}\n", preview(text, 200));
    }
}

fn chunk(config: &RagConfig, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let chunker = AdaptiveChunker::from_config(&config.chunking);
    let chunks = chunker.chunk(&content)?;

    println!("{} chunk(s) using {} strategy\n", chunks.len(), chunker.strategy());
    for (i, chunk) in chunks.iter().enumerate() {
        match &chunk.header {
            Some(header) => println!("--- {} [{}] ---", i, header),
            None => println!("--- {} ---", i),
        }
        println!("{}\n", chunk.content);
    }

    Ok(())
}

/// First `max_chars` characters of `text` on one line.
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{}...", cut)
}

fn collect_files(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            for entry in fs::read_dir(path)? {
                let entry_path = entry?.path();

                if entry_path.is_file() && is_supported_file(&entry_path) {
                    files.push(entry_path);
                } else if entry_path.is_dir() && recursive {
                    files.extend(collect_files(&[entry_path], recursive)?);
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

fn is_supported_file(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(ext, "md" | "markdown" | "txt" | "text" | "rst")
}
