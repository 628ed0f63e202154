// crates/console/src/cli.rs

use clap::{builder::ValueHint, Parser, Subcommand};
use models::mql::CompiledQuery;
use models::{create_factory, MemoryBackend, ModelBackend, ModelDefinition, ModelFactory, SearchResult};
use serde::de::DeserializeOwned;
use serde_json::Value as Json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info};

use crate::error::{ConsoleError, Result};
use crate::logging;
use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "modelq", version, about = "Run compiled model queries against the memory backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Seed a fresh backend from a records file and run one query against it
    Search(SearchCmd),
    /// Print a fresh `memory://` connection string
    ConnectionString,
}

#[derive(Parser, Debug)]
pub struct SearchCmd {
    /// Directory holding settings.toml (or set MODELQ_DIR)
    #[arg(
        long,
        value_name = "DIR",
        env = "MODELQ_DIR",
        value_hint = ValueHint::DirPath,
        value_parser = dir_must_exist
    )]
    pub dir: PathBuf,

    /// JSON array of records to create before searching
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub records: PathBuf,

    /// Compiled query: {"query": [...], "sort": ..., "take": ..., "page": ...}
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub query: PathBuf,
}

fn dir_must_exist(s: &str) -> std::result::Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if !p.exists() {
        return Err(format!("Not found: {}", p.display()));
    }
    if !p.is_dir() {
        return Err(format!("Not a directory: {}", p.display()));
    }
    Ok(p)
}

pub fn start(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Commands::Search(cmd) => do_search(&cmd),
        Commands::ConnectionString => {
            logging::init(None);
            println!("{}", MemoryBackend::create_unique_connection_string());
            Ok(())
        }
    };

    result.map_or_else(
        |e| {
            error!("modelq failed: {}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        },
        |_| ExitCode::SUCCESS,
    )
}

fn do_search(cmd: &SearchCmd) -> Result<()> {
    let settings = Settings::load(&cmd.dir)?;
    logging::init(settings.log_filter());
    info!(model = %settings.model, "settings loaded");

    let result = run_search(cmd, &settings)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Resolve a backend for the configured model, seed it, and run the query.
#[tracing::instrument(skip_all, fields(model = %settings.model))]
pub fn run_search(cmd: &SearchCmd, settings: &Settings) -> Result<SearchResult> {
    let model = &settings.model;
    let mut backend = create_factory().backend_for(model);

    let records: Vec<Json> = read_json(&cmd.records)?;
    let created = seed(backend.as_mut(), model, records)?;
    debug!(created, "backend seeded");

    let query: CompiledQuery = read_json(&cmd.query)?;
    let result = backend.search(model, &query)?;
    info!(hits = result.instances.len(), "search complete");

    backend.dispose()?;
    Ok(result)
}

/// `create` every record in order. Entries must be JSON objects.
pub fn seed(
    backend: &mut dyn ModelBackend,
    model: &ModelDefinition,
    records: Vec<Json>,
) -> Result<usize> {
    let mut created = 0;
    for (i, record) in records.into_iter().enumerate() {
        let Json::Object(data) = record else {
            return Err(ConsoleError::Config(format!(
                "record {i} is not a JSON object"
            )));
        };
        backend.create(model, data)?;
        created += 1;
    }
    Ok(created)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|source| ConsoleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}
