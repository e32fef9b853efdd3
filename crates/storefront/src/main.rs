//! Doorstep Storefront - headless smoke run.
//!
//! Boots the client core the way the mobile shell does: resolve the
//! persisted session, enter the matching navigation flow, and (when
//! authenticated) load the catalog and categories. Useful for verifying
//! configuration and connectivity without a device.
//!
//! # Architecture
//!
//! - Session token persisted in a single file (see `DOORSTEP_TOKEN_PATH`)
//! - Catalog and auth services reached over REST with a bounded timeout
//! - All user-facing failures surface as notices, never as a crash

#![cfg_attr(not(test), forbid(unsafe_code))]

use doorstep_storefront::config::AppConfig;
use doorstep_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AppConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "doorstep_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Build application state
    let state = AppState::new(config).expect("Failed to initialize application state");

    // Resolve the persisted session and enter the matching flow
    let nav = state.navigation().start().await;
    let Some(graph) = nav.graph() else {
        // start() always resolves; Resolving here would be a logic error
        tracing::error!("navigation failed to resolve");
        return;
    };

    if !graph.is_authenticated() {
        tracing::info!("no session token present; login required");
        return;
    }

    // Authenticated: load the catalog the way the home screen does
    if let Err(e) = state.load_catalog().await {
        let notice = e.into_notice();
        tracing::warn!(kind = ?notice.kind, "{}", notice.message);
        return;
    }
    if let Err(e) = state.load_categories().await {
        // Category failure never blocks the product view
        let notice = e.into_notice();
        tracing::warn!(kind = ?notice.kind, "{}", notice.message);
    }

    let catalog = state.catalog();
    let bounds = catalog.bounds();
    tracing::info!(
        products = catalog.products().len(),
        visible = catalog.filtered().len(),
        categories = catalog.categories().len(),
        price_min = %bounds.min,
        price_max = %bounds.max,
        "catalog loaded"
    );
}
