//! ChunkPipe CLI — uploads files into an object store through the
//! chunked pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chunkpipe_core::config::UploadConfig;
use chunkpipe_core::types::file::SourceFile;
use chunkpipe_store::LocalObjectStore;
use chunkpipe_upload::{LargeFileUploader, UploadHooks};

/// ChunkPipe — chunked large-file uploads into an object store
#[derive(Debug, Parser)]
#[command(name = "chunkpipe", version, about, long_about = None)]
struct Cli {
    /// Configuration environment overlay (config/<env>.toml)
    #[arg(short, long, default_value = "default")]
    env: String,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Upload a file into a local object store
    Upload(UploadArgs),
    /// Print the effective pipeline configuration
    Config,
}

#[derive(Debug, clap::Args)]
struct UploadArgs {
    /// File to upload
    file: PathBuf,

    /// Destination object path within the store
    dest: String,

    /// Root directory of the local object store
    #[arg(long, default_value = "./data/objects")]
    root: PathBuf,

    /// Override the configured chunk size in bytes
    #[arg(long)]
    chunk_size: Option<u64>,

    /// MIME type of the file, if known
    #[arg(long)]
    mime: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = UploadConfig::load(&cli.env)?;

    match cli.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Upload(args) => upload(config, args).await,
    }
}

async fn upload(mut config: UploadConfig, args: UploadArgs) -> anyhow::Result<()> {
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size_bytes = chunk_size;
    }

    let name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.dest.clone());
    let data = Bytes::from(std::fs::read(&args.file)?);
    let file = SourceFile::new(name, args.mime.clone(), data);

    let store = Arc::new(LocalObjectStore::new(args.root).await?);
    let uploader = LargeFileUploader::new(store, config)?;

    let hooks = UploadHooks::with_progress(|progress| {
        eprint!(
            "\r{:<10} {:>5.1}%  ({}/{} chunks)",
            progress.stage, progress.percent, progress.chunks_completed, progress.total_chunks
        );
    });

    let result = uploader.upload(file, &args.dest, hooks).await?;
    eprintln!();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Uploaded {} ({} bytes, {} chunks) in {:.2?} -> {}",
            result.file_name, result.size_bytes, result.chunks, result.elapsed, result.url
        );
    }
    Ok(())
}
