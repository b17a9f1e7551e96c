use hideaway_api::{build_router, state::AppState};
use hideaway_config::{Settings, StoreBackend};
use hideaway_db::{connect, indexes::ensure_indexes};
use hideaway_services::Stores;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "hideaway_api=debug,hideaway_services=debug,hideaway_db=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    info!("Starting Hideaway API on {}:{}", settings.app.host, settings.app.port);
    info!(
        backend = ?settings.database.backend,
        identity = ?settings.identity.provider,
        utc_offset_minutes = settings.venue.utc_offset_minutes,
        push = settings.line.channel_access_token.is_some(),
        "Runtime config"
    );
    if settings.venue.owner_subject_id.is_empty() {
        warn!("venue.owner_subject_id is not set; no one can register as owner");
    }

    let stores = match settings.database.backend {
        StoreBackend::Mongo => {
            let db = connect(&settings.database).await?;
            ensure_indexes(&db).await?;
            Stores::mongo(&db)
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            Stores::memory()
        }
    };

    let app_state = AppState::new(stores, settings.clone());
    let app = build_router(app_state);

    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
