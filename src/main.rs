mod cli;

use vlib::{
    config::{self, Config},
    metadata::{EnrichmentQueue, HttpMetadataLookup},
    server::{self, AppContext},
    Library,
};
use vlib_db::pool::init_pool;
use vlib_db::store::{CatalogStore, SqliteCatalogStore};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// How long `vlib scan` waits for queued lookups before exiting.
const SCAN_ENRICHMENT_WAIT: Duration = Duration::from_secs(300);

/// Grace period for the enrichment worker once no more jobs will arrive.
const ENRICHMENT_SHUTDOWN_WAIT: Duration = Duration::from_secs(5);

/// Stop the enrichment worker once the library has released its handle.
async fn shutdown_enrichment(queue: Arc<EnrichmentQueue>) {
    match Arc::try_unwrap(queue) {
        Ok(queue) => {
            if !queue.shutdown(ENRICHMENT_SHUTDOWN_WAIT).await {
                tracing::warn!("Enrichment worker aborted with lookups unfinished");
            }
        }
        Err(_) => tracing::debug!("Enrichment queue still shared, leaving worker to runtime"),
    }
}

/// Load config from the given path or the default locations, remembering
/// which file was used.
fn load(config_path: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    let resolved = config_path
        .map(Path::to_path_buf)
        .or_else(config::find_default_config);
    let config = config::load_config_or_default(resolved.as_deref())?;
    Ok((config, resolved))
}

/// Open the catalog database: `[database] path`, else `vlib.db` next to the
/// config file, else in the current directory.
fn open_store(config: &Config, config_path: Option<&Path>) -> Result<Arc<dyn CatalogStore>> {
    let db_path = match &config.database.path {
        Some(path) => PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref()),
        None => {
            let data_dir = config_path
                .and_then(|p| p.parent())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
            data_dir.join("vlib.db")
        }
    };

    let db_path_str = db_path.to_string_lossy();
    tracing::info!("Initializing database at {}", db_path_str);
    let pool = init_pool(&db_path_str)
        .with_context(|| format!("Failed to open database {}", db_path_str))?;
    Ok(Arc::new(SqliteCatalogStore::new(pool)))
}

/// Build the library, attaching an enrichment queue when metadata lookup is
/// enabled. Must run inside the Tokio runtime.
fn build_library(
    config: &Config,
    store: Arc<dyn CatalogStore>,
) -> Result<(Arc<Library>, Option<Arc<EnrichmentQueue>>)> {
    let library = Library::new(store.clone(), config);

    if !config.metadata.enabled {
        tracing::info!("Metadata enrichment disabled");
        return Ok((Arc::new(library), None));
    }

    let lookup = HttpMetadataLookup::new(&config.metadata)?;
    let queue = Arc::new(EnrichmentQueue::new(
        Arc::new(lookup),
        store,
        config.metadata.lookup_timeout(),
    ));
    let library = library.with_enrichment(queue.clone());
    tracing::info!("Metadata enrichment enabled");

    Ok((Arc::new(library), Some(queue)))
}

async fn serve(host: Option<String>, port: Option<u16>, config_path: Option<&Path>) -> Result<()> {
    let (mut config, config_path) = load(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting vlib server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    let store = open_store(&config, config_path.as_deref())?;
    let (library, queue) = build_library(&config, store)?;

    if config.library.scan_on_startup {
        let library = library.clone();
        tokio::spawn(async move {
            match library.clone().scan_blocking().await {
                Ok(result) => tracing::info!(
                    created = result.created,
                    updated = result.updated,
                    unavailable = result.unavailable,
                    "Startup scan complete"
                ),
                Err(e) => tracing::error!("Startup scan failed: {}", e),
            }
            if let Err(e) = library.queue_missing_metadata() {
                tracing::warn!("Failed to queue entries missing metadata: {}", e);
            }
        });
    }

    let served = server::start_server(AppContext::new(library, config)).await;
    if let Some(queue) = queue {
        shutdown_enrichment(queue).await;
    }
    served
}

async fn scan(config_path: Option<&Path>) -> Result<()> {
    let (config, config_path) = load(config_path)?;
    let store = open_store(&config, config_path.as_deref())?;
    let (library, queue) = build_library(&config, store)?;

    if library.roots().is_empty() {
        println!("No library roots configured");
    }

    let result = library.scan_blocking().await?;
    println!(
        "Scan complete: {} created, {} updated, {} unavailable",
        result.created, result.updated, result.unavailable
    );
    if result.failed > 0 {
        println!("  {} entries could not be saved", result.failed);
    }

    if let Some(queue) = queue {
        if result.enrichment_queued > 0 {
            println!("Waiting for {} metadata lookups...", result.enrichment_queued);
            if !queue.wait_idle(SCAN_ENRICHMENT_WAIT).await {
                println!("  {} lookups still pending, giving up", queue.pending());
            }
        }
        shutdown_enrichment(queue).await;
    }

    Ok(())
}

fn list(config_path: Option<&Path>, available: bool) -> Result<()> {
    let (config, config_path) = load(config_path)?;
    let store = open_store(&config, config_path.as_deref())?;

    let entries = if available {
        store.find_available()?
    } else {
        store.find_all()?
    };

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vlib=trace,vlib_db=debug,vlib_common=debug,tower_http=debug".to_string()
        } else {
            "vlib=info,vlib_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(host, port, cli.config.as_deref()))
        }
        Commands::Scan => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(scan(cli.config.as_deref()))
        }
        Commands::List { available } => list(cli.config.as_deref(), available),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Library roots: {}", config.library.roots.len());
            for root in &config.library.roots {
                let status = if root.is_dir() { "ok" } else { "missing" };
                println!("    {} ({})", root.display(), status);
            }
            println!("  Extensions: {}", config.library.extensions.join(", "));
            println!("  Chunk size: {} bytes", config.streaming.chunk_size);
            println!("  Metadata enabled: {}", config.metadata.enabled);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
