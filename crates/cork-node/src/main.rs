mod client;

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use tokio::sync::watch;

use cork_random::{GeneratorFactory, SeedValue};
use cork_server::{serve, FixtureService, MockContext, MockService, RandomService};
use cork_state::MemStateStore;
use cork_types::CorkError;

use client::{parse_assignments, StateClient};

#[derive(clap::Parser, Debug)]
#[command(name = "cork", about = "Mock network services with shared, resettable state")]
struct Cli {
    #[arg(long)]
    config: Option<PathBuf>,
    /// Address to bind (server) or connect to (state commands).
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    /// Directory fixture paths resolve against.
    #[arg(long)]
    fixtures: Option<PathBuf>,
    /// Base seed for generated data; unset means entropy.
    #[arg(long)]
    seed: Option<i64>,
    /// Log at debug level.
    #[arg(long, short)]
    verbose: bool,
    /// Log at trace level.
    #[arg(long, short)]
    debug: bool,
    /// Print state from a running server: everything, or the given keys.
    #[arg(long, num_args = 0.., value_name = "KEY", conflicts_with = "set_state")]
    get_state: Option<Vec<String>>,
    /// Write state on a running server.
    #[arg(long, num_args = 1.., value_name = "KEY=VALUE")]
    set_state: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    host: String,
    port: u16,
    fixtures_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct GeneratorConfig {
    seed: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ClientConfig {
    timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
struct ObservabilityConfig {
    log_level: String,
    log_format: String,
}

#[derive(Debug, Deserialize)]
struct Config {
    server: ServerConfig,
    generator: GeneratorConfig,
    client: ClientConfig,
    observability: ObservabilityConfig,
}

impl Config {
    fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut figment =
            Figment::new().merge(Toml::string(include_str!("../../../config/default.toml")));

        if let Some(ref config_path) = cli.config {
            figment = figment.merge(Toml::file_exact(config_path));
        }

        let mut config: Config = figment
            .merge(Env::prefixed("CORK_").split("__"))
            .extract()
            .context("failed to load configuration")?;

        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref dir) = cli.fixtures {
            config.server.fixtures_dir = dir.clone();
        }
        if cli.seed.is_some() {
            config.generator.seed = cli.seed;
        }
        if cli.debug {
            config.observability.log_level = "trace".to_string();
        } else if cli.verbose {
            config.observability.log_level = "debug".to_string();
        }
        Ok(config)
    }
}

fn init_tracing(config: &ObservabilityConfig) {
    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt().json().with_env_filter(&config.log_level).init();
        }
        _ => {
            tracing_subscriber::fmt().pretty().with_env_filter(&config.log_level).init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    use clap::Parser;
    let cli = Cli::parse();
    let config = Config::load(&cli)?;
    init_tracing(&config.observability);

    if let Some(keys) = &cli.get_state {
        get_state(&config, keys).await?;
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(tokens) = &cli.set_state {
        let assignments = match parse_assignments(tokens) {
            Ok(a) => a,
            Err(e @ CorkError::MalformedInput(_)) => {
                eprintln!("{e}");
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => return Err(e.into()),
        };
        set_state(&config, &assignments).await?;
        return Ok(ExitCode::SUCCESS);
    }

    run_server(config).await?;
    Ok(ExitCode::SUCCESS)
}

fn state_client(config: &Config) -> anyhow::Result<StateClient> {
    StateClient::new(
        &config.server.host,
        config.server.port,
        Duration::from_millis(config.client.timeout_ms),
    )
    .context("failed to build HTTP client")
}

async fn get_state(config: &Config, keys: &[String]) -> anyhow::Result<()> {
    let client = state_client(config)?;
    if keys.is_empty() {
        if let Some(all) = client.get_all().await? {
            println!("{all}");
        }
        return Ok(());
    }
    for key in keys {
        println!("{}", client.get(key).await?);
    }
    Ok(())
}

async fn set_state(config: &Config, assignments: &[(String, String)]) -> anyhow::Result<()> {
    let client = state_client(config)?;
    for (key, value) in assignments {
        if !client.set(key, value).await? {
            println!("error POSTing {key}={value}");
        }
    }
    Ok(())
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = (config.server.host.as_str(), config.server.port)
        .to_socket_addrs()
        .with_context(|| format!("invalid address: {}:{}", config.server.host, config.server.port))?
        .next()
        .with_context(|| format!("no address for {}", config.server.host))?;

    let fixtures = std::fs::canonicalize(&config.server.fixtures_dir).with_context(|| {
        format!("fixture directory {} not found", config.server.fixtures_dir.display())
    })?;

    let generators = match config.generator.seed {
        Some(seed) => GeneratorFactory::new(vec![SeedValue::Int(seed)]),
        None => GeneratorFactory::entropy(),
    };

    tracing::info!(
        %addr,
        fixtures = %fixtures.display(),
        seed = ?config.generator.seed,
        "cork starting"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let store = Arc::new(MemStateStore::with_shutdown(shutdown_tx));
    let ctx = MockContext::new(store, generators, fixtures);
    let services: Vec<Box<dyn MockService<MemStateStore>>> =
        vec![Box::new(FixtureService), Box::new(RandomService)];

    serve(addr, ctx, services, shutdown_rx).await?;
    tracing::info!("cork stopped");
    Ok(())
}
