use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kombucha_tracker::{api, config::ServerConfig, store::JarStore};

#[derive(Parser)]
#[command(name = "kombucha")]
#[command(about = "Track fermentation of home-brewed kombucha jars")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port for HTTP API
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite database file (":memory:" for a throwaway database)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Create a demo jar if there are none
        #[arg(long)]
        seed: bool,
    },
    /// Print all jars with their current measurements as JSON
    List {
        /// SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "kombucha_tracker=debug,tower_http=debug".into()),
    );

    // Logs go to stderr so `list` output stays clean JSON.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(config: ServerConfig, seed: bool) -> anyhow::Result<()> {
    let db = config.open_database()?;
    let store = JarStore::new(Arc::new(db));

    if seed {
        if let Some(id) = store.seed_demo_jar()? {
            tracing::info!("Seeded demo jar {}", id);
        }
    }

    let app = api::create_router(store, api::cors_layer(config.cors_origins.as_deref()));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Kombucha server listening on http://{}", address);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = ServerConfig::from_env()?;

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            db,
            seed,
        }) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if db.is_some() {
                config.database_path = db;
            }
            serve(config, seed).await?;
        }
        Some(Commands::List { db }) => {
            if db.is_some() {
                config.database_path = db;
            }
            let store = JarStore::new(Arc::new(config.open_database()?));
            println!("{}", serde_json::to_string_pretty(&store.list()?)?);
        }
        None => serve(config, false).await?,
    }

    Ok(())
}
