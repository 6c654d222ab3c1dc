//! bookmarkd server binary.
//!
//! Opens (or creates) the SQLite store and serves the HTTP API.
//!
//! Configuration comes from the environment:
//! - `BOOKMARKD_DATA_DIR` - store directory, default next to the executable
//! - `BOOKMARKD_ADDR` - bind address, default `127.0.0.1:8732`
//! - `RUST_LOG` - log filter, default `bookmarkd=info,tower_http=warn`

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookmarkd::database::Database;
use bookmarkd::http::{create_router, AppState};

fn db_path() -> PathBuf {
    if let Ok(dir) = std::env::var("BOOKMARKD_DATA_DIR") {
        PathBuf::from(dir).join("bookmarkd.db")
    } else if let Ok(exe) = std::env::current_exe() {
        exe.parent()
            .unwrap_or(Path::new("."))
            .join("bookmarkd.db")
    } else {
        PathBuf::from("bookmarkd.db")
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bookmarkd=info,tower_http=warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = db_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::open(&path)?;
    info!(path = %path.display(), "Store opened");

    let addr: SocketAddr = std::env::var("BOOKMARKD_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8732".to_string())
        .parse()?;

    let app = create_router(AppState::new(db));

    info!(%addr, version = env!("CARGO_PKG_VERSION"), "bookmarkd listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
