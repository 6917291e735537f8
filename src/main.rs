use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod dto;
mod error;
mod handlers;
mod models;
mod services;
mod store;

use config::Config;
use store::adapter::EntryStore;
use store::blob::HttpBlobStore;
use store::local::LocalCache;
use store::remote::HttpRemoteStore;
use store::{BlobStore, RemoteStore};

const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub entries: Arc<EntryStore>,
    pub blobs: Option<Arc<dyn BlobStore>>,
    pub ws_tx: Option<broadcast::Sender<String>>,
}

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/ws", get(handlers::ws::ws_handler));

    let journal_routes = Router::new()
        .route("/api/me", get(handlers::profile::me))
        // Day selection, save, edit, delete
        .route(
            "/api/entries/:date",
            put(handlers::entries::save_entry)
                .get(handlers::entries::get_entry)
                .patch(handlers::entries::edit_note)
                .delete(handlers::entries::delete_entry),
        )
        // History & calendar
        .route("/api/history", get(handlers::history::get_history))
        .route("/api/calendar", get(handlers::history::get_calendar))
        .route("/api/moods", get(handlers::history::list_moods))
        // Profile
        .route(
            "/api/profile/photo",
            post(handlers::profile::upload_photo).layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES)),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::resolve_user,
        ));

    Router::new()
        .merge(public_routes)
        .merge(journal_routes)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodboard=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    let local = Arc::new(LocalCache::open(&config.local_cache_path).await);

    let remote: Option<Arc<dyn RemoteStore>> = match &config.remote_store_url {
        Some(url) => {
            tracing::info!(url = %url, "Remote entry store configured");
            let remote = HttpRemoteStore::new(
                url.clone(),
                config.remote_api_key.clone(),
                config.remote_timeout(),
            )?;
            Some(Arc::new(remote) as Arc<dyn RemoteStore>)
        }
        None => {
            tracing::info!("No remote entry store configured, running local-only");
            None
        }
    };

    let blobs: Option<Arc<dyn BlobStore>> = match &config.blob_store_url {
        Some(url) => {
            let blobs = HttpBlobStore::new(
                url.clone(),
                config.remote_api_key.clone(),
                config.remote_timeout(),
            )?;
            Some(Arc::new(blobs) as Arc<dyn BlobStore>)
        }
        None => None,
    };

    if config.auth_secret.is_none() {
        tracing::warn!("AUTH_SECRET not set, sign-in is disabled");
    }

    // Re-render broadcast channel
    let (ws_tx, _) = broadcast::channel::<String>(256);

    let state = AppState {
        config: config.clone(),
        entries: Arc::new(EntryStore::new(remote, local, config.retry_policy())),
        blobs,
        ws_tx: Some(ws_tx),
    };

    let allowed_origins: Vec<axum::http::HeaderValue> = {
        let mut origins = vec![config.frontend_url.parse::<axum::http::HeaderValue>()?];
        if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
            for o in extra.split(',') {
                if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                    origins.push(hv);
                }
            }
        }
        origins
    };
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    let app = build_router(state)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
impl AppState {
    /// State backed by an ephemeral cache and, optionally, an in-memory remote.
    pub fn for_tests(
        remote: Option<Arc<store::memory::MemoryRemoteStore>>,
        auth_secret: Option<&str>,
    ) -> Self {
        let config = Config::for_tests(auth_secret);
        let remote = remote.map(|r| r as Arc<dyn RemoteStore>);
        let (ws_tx, _) = broadcast::channel::<String>(16);

        Self {
            entries: Arc::new(EntryStore::new(
                remote,
                Arc::new(LocalCache::ephemeral()),
                config.retry_policy(),
            )),
            config: Arc::new(config),
            blobs: None,
            ws_tx: Some(ws_tx),
        }
    }
}
