use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use podcaster::Config;

/// Host podcast episodes and syndicate them as RSS
#[derive(Parser, Debug)]
#[command(name = "podcaster")]
#[command(about = "Host podcast episodes and syndicate them as RSS")]
#[command(version)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long, default_value = "podcaster.toml")]
    config: PathBuf,

    /// Address to listen on, overrides the config file
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Directory holding the catalog document
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory holding uploaded media
    #[arg(long)]
    uploads_dir: Option<PathBuf>,

    /// Log level or filter directive, e.g. "debug" or "podcaster=trace"
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(listen) = self.listen {
            config.http.listen = listen;
        }
        if let Some(data_dir) = self.data_dir {
            config.storage.data_dir = data_dir;
        }
        if let Some(uploads_dir) = self.uploads_dir {
            config.storage.uploads_dir = uploads_dir;
        }
        if let Some(level) = self.log_level {
            config.log.level = level;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(Some(&args.config)).context("Failed to load configuration")?;
    args.apply(&mut config);

    podcaster::log::init(&config.log.level);

    let listen = config.http.listen;
    let app = podcaster::server::build(config)
        .await
        .context("Failed to start server")?;

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {listen}"))?;
    info!("Server listening on {}", listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(podcaster::server::shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}
