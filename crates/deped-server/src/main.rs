//! DepEd assistant: single-binary document Q&A server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use deped_core::AssistantConfig;
use deped_ingest::{parse_tags, Ingester};
use deped_server::{build_router, AppState};
use deped_store::{DocumentType, SqliteStore};

fn resolve_data_dir() -> PathBuf {
    std::env::var("DEPED_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

fn print_help() {
    println!("DepEd assistant: answers questions from DepEd issuances");
    println!();
    println!("Usage: deped-assistant [command]");
    println!();
    println!("Commands:");
    println!("  (none)                                        Start the server");
    println!("  import <file> --title <t> [--type <type>] [--tags a,b]");
    println!("                                                Ingest a plain-text document");
    println!("  help                                          Show this help message");
    println!();
    println!("Document types: {}", type_names());
}

fn type_names() -> String {
    DocumentType::ALL
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Arguments of the `import` subcommand.
struct ImportArgs {
    file: PathBuf,
    title: String,
    document_type: DocumentType,
    tags: Vec<String>,
}

fn parse_import_args(args: &[String]) -> anyhow::Result<ImportArgs> {
    let mut file = None;
    let mut title = None;
    let mut document_type = DocumentType::default();
    let mut tags = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--title" => title = iter.next().cloned(),
            "--type" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--type needs a value"))?;
                document_type = value.parse().map_err(|e: String| {
                    anyhow::anyhow!("{} (expected one of: {})", e, type_names())
                })?;
            }
            "--tags" => {
                if let Some(value) = iter.next() {
                    tags = parse_tags(value);
                }
            }
            other if file.is_none() && !other.starts_with("--") => {
                file = Some(PathBuf::from(other));
            }
            other => anyhow::bail!("Unexpected argument: {}", other),
        }
    }

    Ok(ImportArgs {
        file: file.ok_or_else(|| anyhow::anyhow!("Missing <file>"))?,
        title: title.ok_or_else(|| anyhow::anyhow!("Missing --title"))?,
        document_type,
        tags,
    })
}

fn run_import(data_dir: &Path, args: &[String]) -> anyhow::Result<()> {
    let import = parse_import_args(args)?;
    let config = AssistantConfig::from_env(data_dir)?;
    let store = SqliteStore::open(&config.data_paths.db_dir)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;

    let outcome = Ingester::new(&store)
        .ingest_file(&import.file, &import.title, import.document_type, import.tags)
        .map_err(|e| anyhow::anyhow!("Import failed: {}", e))?;

    println!("Imported document {}", outcome.document_id);
    if !outcome.metadata.is_empty() {
        println!("{}", serde_json::to_string_pretty(&outcome.metadata)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "import" => {
                if let Err(e) = run_import(&resolve_data_dir(), &args[2..]) {
                    eprintln!("{}", e);
                    eprintln!("Usage: deped-assistant import <file> --title <t> [--type <type>] [--tags a,b]");
                    std::process::exit(1);
                }
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            "serve" => {}
            _ => {
                eprintln!(
                    "Unknown command: {}. Use 'deped-assistant help' for usage.",
                    args[1]
                );
                std::process::exit(1);
            }
        }
    }

    // Normal server startup
    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = AssistantConfig::from_env(&data_dir)?;
    let port = config.port;

    let store = SqliteStore::open(&config.data_paths.db_dir)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;

    let state = Arc::new(AppState::new(config, Arc::new(store)));

    // Warm the index; on failure the first query retries the load.
    if !state.assistant.reload() {
        warn!("Starting with an empty index");
    }

    let app = build_router(state.clone());

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("DepEd assistant listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
