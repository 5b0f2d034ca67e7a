//! slist - health-aware upstream server list
//!
//! Loads the configured servers and sources into a pool, then lists the
//! pool or prints selections from it.

use clap::{Parser, Subcommand};
use log::{error, info};

use slist_config::validator::validate as validate_config;
use slist_pool::Pool;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print endpoints in rotation and banned endpoints
    List,
    /// Print endpoints chosen by the configured selection mode
    Pick {
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(|| "./config/config.yaml".to_string());

    let config = match slist_config::loader::read_config(&config_path) {
        Ok(cfg) => cfg,
        Err(err_msg) => {
            eprintln!("Error loading config: {}", err_msg);
            std::process::exit(1);
        }
    };

    if let Err(err_msg) =
        slist_utils::logger::init_logger(&config.log.level, config.log.file.as_deref())
    {
        eprintln!("Error initialising logger: {}", err_msg);
        std::process::exit(1);
    }

    if !validate_config(&config) {
        error!("Configuration validation failed. Exiting...");
        std::process::exit(1);
    }

    let pool = match config.pool.builder() {
        Ok(builder) => builder.build(),
        Err(err) => {
            error!("Failed to build pool: {}", err);
            std::process::exit(1);
        }
    };

    for server in &config.servers {
        pool.add(server);
    }
    for source in &config.sources {
        if let Err(err) = slist_ingest::load_source(&pool, source).await {
            error!("Failed to load {}: {}", source, err);
            std::process::exit(1);
        }
    }
    info!(
        "Pool ready: {} endpoint(s), mode {}",
        pool.count(),
        pool.mode()
    );

    let reconciler = match pool.spawn_reconciler(config.pool.restore_interval()) {
        Ok(handle) => handle,
        Err(err) => {
            error!("Failed to start reconciler: {}", err);
            std::process::exit(1);
        }
    };

    let ok = match cli.command.unwrap_or(Command::List) {
        Command::List => {
            print_list(&pool);
            true
        }
        Command::Pick { count } => pick(&pool, count),
    };

    reconciler.shutdown().await;

    if !ok {
        std::process::exit(1);
    }
}

fn print_list(pool: &Pool) {
    for endpoint in pool.list() {
        println!("{}", endpoint.address());
    }
    for endpoint in pool.banned() {
        println!("{} (banned)", endpoint.address());
    }
}

fn pick(pool: &Pool, count: usize) -> bool {
    for _ in 0..count {
        match pool.select() {
            Ok(endpoint) => println!("{}", endpoint.address()),
            Err(err) => {
                error!("Selection failed: {}", err);
                return false;
            }
        }
    }
    true
}
