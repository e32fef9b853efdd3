//! Application state shared across screens.
//!
//! One instance per process. Screens and the shell hold clones (cheap, via
//! `Arc`) and drive the core through the accessors here. The cart and the
//! catalog store are single shared mutable resources: mutations are
//! synchronous, run on the orchestration layer only, and the guards are
//! never held across a suspension point, so every read observes the latest
//! committed mutation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::ApiClient;
use crate::cart::CartLedger;
use crate::catalog::CatalogStore;
use crate::config::AppConfig;
use crate::error::Result;
use crate::navigation::NavigationController;
use crate::services::auth::AuthService;
use crate::session::{FileTokenStore, SessionGate, TokenStore};

/// Application state shared across all screens.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// API client, the session gate, the navigation controller, and the mutable
/// cart/catalog stores.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    api: ApiClient,
    gate: SessionGate,
    navigation: NavigationController,
    auth: AuthService,
    cart: Mutex<CartLedger>,
    catalog: Mutex<CatalogStore>,
}

impl AppState {
    /// Create application state with the file-backed token store from the
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = Arc::new(FileTokenStore::new(config.token_path.clone()));
        Self::with_token_store(config, store)
    }

    /// Create application state over an explicit token store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_token_store(config: AppConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        let gate = SessionGate::new(store);
        let navigation = NavigationController::new(gate.clone());
        let auth = AuthService::new(api.clone(), gate.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                gate,
                navigation,
                auth,
                cart: Mutex::new(CartLedger::new()),
                catalog: Mutex::new(CatalogStore::new()),
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the session gate.
    #[must_use]
    pub fn session(&self) -> &SessionGate {
        &self.inner.gate
    }

    /// Get a reference to the navigation controller.
    #[must_use]
    pub fn navigation(&self) -> &NavigationController {
        &self.inner.navigation
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Lock the cart ledger for a synchronous mutation or read.
    ///
    /// Do not hold the guard across an await.
    #[must_use]
    pub fn cart(&self) -> MutexGuard<'_, CartLedger> {
        self.inner.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the catalog store for a synchronous mutation or read.
    ///
    /// Do not hold the guard across an await.
    #[must_use]
    pub fn catalog(&self) -> MutexGuard<'_, CatalogStore> {
        self.inner
            .catalog
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Catalog orchestration
    // =========================================================================

    /// Fetch the product catalog and commit it to the store.
    ///
    /// A failed fetch leaves the previously committed catalog untouched; a
    /// fetch that resolves after the store was reset is discarded.
    ///
    /// # Errors
    ///
    /// Returns the fetch error for the caller to surface as a notice.
    pub async fn load_catalog(&self) -> Result<()> {
        let token = self.catalog().begin_load();
        let products = self.inner.api.fetch_products().await?;
        self.catalog().commit_products(token, products);
        Ok(())
    }

    /// Fetch the category list and commit it to the store.
    ///
    /// Independent of [`load_catalog`](Self::load_catalog): a failure here
    /// neither blocks nor invalidates the product load.
    ///
    /// # Errors
    ///
    /// Returns the fetch error for the caller to surface as a notice.
    pub async fn load_categories(&self) -> Result<()> {
        let token = self.catalog().begin_load();
        let categories = self.inner.api.fetch_categories().await?;
        self.catalog().commit_categories(token, categories);
        Ok(())
    }
}
