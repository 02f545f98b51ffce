use anyhow::{anyhow, Context, Result};
use axum::Router;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit::{DbModule, Module, ModuleCtx, ModuleCtxBuilder, RestfulModule};
use modkit_db::{ConnectOpts, DbHandle};
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use api_ingress::ApiIngress;
use foodgram::Foodgram;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MEMORY_DSN: &str = "sqlite::memory:";

/// Exposes the `modules` section of the app config to modkit.
struct ModulesConfig(AppConfig);

impl modkit::ConfigProvider for ModulesConfig {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.module_config(module_name)
    }
}

/// Foodgram Server - recipe sharing backend
#[derive(Parser)]
#[command(name = "foodgram-server")]
#[command(about = "Foodgram Server - recipe sharing backend")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Import ingredients from a JSON file of {"name", "measurement_unit"} records
    LoadIngredients {
        /// Path to the JSON file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Foodgram Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, cli.mock).await,
        Commands::Check => check_config(config, cli.mock).await,
        Commands::LoadIngredients { file } => load_ingredients(config, cli.mock, &file).await,
    }
}

/// SQLite is always available, Postgres with the `pg` feature.
fn check_backend(cfg: &DatabaseConfig) -> Result<()> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    if raw.eq_ignore_ascii_case(MEMORY_DSN) {
        return Ok(());
    }
    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;
    match url.scheme() {
        "sqlite" | "sqlite3" => Ok(()),
        "postgres" | "postgresql" if cfg!(feature = "pg") => Ok(()),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

async fn connect_db(config: &AppConfig, mock: bool) -> Result<Arc<DbHandle>> {
    let db_config = config.database.as_ref();
    let dsn = match db_config {
        _ if mock => MEMORY_DSN.to_string(),
        Some(db_config) => {
            check_backend(db_config)?;
            // Relative SQLite paths live under home_dir
            modkit_db::sqlite::absolutize_dsn(
                db_config.url.trim(),
                Path::new(&config.server.home_dir),
            )
        }
        None => return Err(anyhow!("Database configuration is required (or pass --mock)")),
    };

    let defaults = ConnectOpts::default();
    let opts = ConnectOpts {
        max_conns: db_config.and_then(|c| c.max_conns).or(defaults.max_conns),
        acquire_timeout: Some(Duration::from_secs(5)),
        busy_timeout: db_config
            .and_then(|c| c.busy_timeout_ms)
            .map(|ms| Duration::from_millis(u64::from(ms)))
            .unwrap_or(defaults.busy_timeout),
        create_sqlite_dirs: true,
    };

    let db = DbHandle::connect(&dsn, opts).await?;
    tracing::info!(
        "Connected to {:?} database: {}",
        db.engine(),
        db.redacted_dsn()
    );
    Ok(Arc::new(db))
}

fn base_ctx(config: &AppConfig, db: Arc<DbHandle>, cancel: CancellationToken) -> ModuleCtx {
    ModuleCtxBuilder::new(cancel)
        .with_db(db)
        .with_config_provider(Arc::new(ModulesConfig(config.clone())))
        .with_home_dir(&config.server.home_dir)
        .build()
}

/// Init the foodgram module and bring its schema up to date.
async fn start_foodgram(ctx: &ModuleCtx, db: &DbHandle) -> Result<Foodgram> {
    let foodgram = Foodgram::default();
    foodgram
        .init(ctx)
        .await
        .context("foodgram module init failed")?;
    foodgram
        .migrate(db)
        .await
        .context("foodgram migrations failed")?;
    Ok(foodgram)
}

async fn run_server(config: AppConfig, mock: bool) -> Result<()> {
    tracing::info!("Initializing modules...");

    let cancel = CancellationToken::new();
    let db = connect_db(&config, mock).await?;

    let served = {
        let ctx = base_ctx(&config, db.clone(), cancel.clone());

        let ingress = ApiIngress::default();
        ingress
            .init(&ctx.clone().for_module(api_ingress::MODULE_NAME))
            .await?;

        let foodgram_ctx = ctx.for_module(foodgram::module::MODULE_NAME);
        let foodgram = start_foodgram(&foodgram_ctx, &db).await?;

        let router = ingress.rest_prepare(Router::new());
        let router = foodgram.register_rest(&foodgram_ctx, router, &ingress)?;
        ingress.rest_finalize(router)?;
        ingress.set_default_bind_addr(format!("{}:{}", config.server.host, config.server.port));

        let signals = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = modkit::runtime::wait_for_shutdown().await {
                tracing::warn!("Signal handler failed: {}", e);
            }
            signals.cancel();
        });

        ingress.serve(cancel).await
    };

    match Arc::try_unwrap(db) {
        Ok(db) => db.close().await,
        Err(_) => tracing::debug!("Database handle still shared, leaving pool to drop"),
    }
    tracing::info!("Foodgram Server stopped");
    served
}

async fn check_config(config: AppConfig, mock: bool) -> Result<()> {
    tracing::info!("Checking configuration...");

    // --mock replaces the configured database, so its URL is irrelevant
    match &config.database {
        Some(db) if !mock => check_backend(db)?,
        _ => {}
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn load_ingredients(config: AppConfig, mock: bool, file: &Path) -> Result<()> {
    let items = foodgram::infra::seed::read_ingredients(file).await?;
    tracing::info!("Read {} ingredient records from {}", items.len(), file.display());

    let db = connect_db(&config, mock).await?;
    let ctx = base_ctx(&config, db.clone(), CancellationToken::new())
        .for_module(foodgram::module::MODULE_NAME);
    let foodgram = start_foodgram(&ctx, &db).await?;

    let inserted = foodgram.client()?.import_ingredients(items).await?;
    println!("Loaded {inserted} new ingredients");
    Ok(())
}
