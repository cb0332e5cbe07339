mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use chrono::FixedOffset;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use vows_api::live::LiveLink;
use vows_api::{AppState, AppStateInner, Pages};
use vows_db::google::{GoogleAuth, GoogleSheet, ServiceAccount};
use vows_db::{Database, Guestbook, RsvpBook, Worksheet};
use vows_types::content::Content;

use crate::config::{Config, StoreConfig};

/// Upper bound for outbound calls (Sheets API, token exchange, live document).
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vows=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let content_json = std::fs::read_to_string(&config.content_path)
        .with_context(|| format!("Cannot read {}", config.content_path.display()))?;
    let content = Content::from_json(&content_json)
        .with_context(|| format!("Invalid content file {}", config.content_path.display()))?;

    let offset = FixedOffset::east_opt(config.utc_offset_hours * 3600)
        .ok_or_else(|| anyhow!("Invalid UTC offset: {}", config.utc_offset_hours))?;

    let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
    let (talk_sheet, rsvp_sheet) = open_sheets(&config.store, http.clone()).await?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        guestbook: Guestbook::new(talk_sheet, offset),
        rsvp: RsvpBook::new(rsvp_sheet, offset),
        content,
        live: LiveLink::new(config.live_source_url.clone(), http),
        pages: Pages::new()?,
        secure_cookies: config.secure_cookies,
    });

    let app = vows_api::router(state)
        .nest_service("/photos", ServeDir::new(&config.photos_dir))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Vows server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn open_sheets(
    store: &StoreConfig,
    http: reqwest::Client,
) -> anyhow::Result<(Arc<dyn Worksheet>, Arc<dyn Worksheet>)> {
    match store {
        StoreConfig::Sqlite { path } => {
            let db = Database::open(path)?;
            Ok((Arc::new(db.sheet("talk")), Arc::new(db.sheet("rsvp"))))
        }
        StoreConfig::Google {
            guestbook_sheet_id,
            guestbook_sheet_index,
            rsvp_sheet_id,
            rsvp_sheet_index,
            client_email,
            private_key,
        } => {
            let auth = Arc::new(GoogleAuth::new(
                ServiceAccount {
                    client_email: client_email.clone(),
                    private_key: private_key.clone(),
                },
                http.clone(),
            ));
            let talk = GoogleSheet::open_by_index(
                auth.clone(),
                http.clone(),
                guestbook_sheet_id,
                *guestbook_sheet_index,
            )
            .await?;
            let rsvp =
                GoogleSheet::open_by_index(auth, http, rsvp_sheet_id, *rsvp_sheet_index).await?;
            Ok((Arc::new(talk), Arc::new(rsvp)))
        }
    }
}
