//! Vitrine Core - storefront and admin client logic
//!
//! This crate implements the client side of a small shop following
//! hexagonal architecture:
//!
//! - **domain**: Core entities (Product, User, Cart, session token, routes)
//! - **ports**: Trait definitions for external dependencies (StoreApi, SessionStore)
//! - **services**: View logic (catalog, admin grids, auth)
//! - **adapters**: Concrete implementations (reqwest gateway, session files)
//! - **telemetry**: Logging bootstrap and span export

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
pub mod telemetry;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use adapters::http::HttpGateway;
use adapters::session_file::FileSessionStore;
use config::Config;
use ports::{SessionStore, StoreApi};
use services::*;
use telemetry::Tracer;

// Re-export commonly used types at crate root
pub use domain::{Cart, CartHandle, CartLine, Product, ProductDraft, Route, User, UserDraft};
pub use domain::result::{Error, OperationResult};

/// Main context for Vitrine operations
///
/// Owns the process-wide pieces (session token store, cart, tracer) and
/// hands the same instances to every service.
pub struct VitrineContext {
    pub vitrine_dir: PathBuf,
    pub config: Config,
    pub session: Arc<dyn SessionStore>,
    pub tracer: Arc<Tracer>,
    pub api: Arc<dyn StoreApi>,
    pub cart: CartHandle,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub product_admin: ProductAdmin,
    pub user_admin: UserAdmin,
}

impl VitrineContext {
    /// Create a new Vitrine context backed by the HTTP gateway
    pub fn new(vitrine_dir: &Path) -> Result<Self> {
        let config = Config::load(vitrine_dir)?;
        let tracer = Arc::new(Tracer::from_config(&config.telemetry)?);
        let session: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(vitrine_dir));
        let api: Arc<dyn StoreApi> = Arc::new(HttpGateway::new(
            &config,
            Arc::clone(&session),
            Arc::clone(&tracer),
        )?);

        Ok(Self::with_api(vitrine_dir, config, session, tracer, api))
    }

    /// Assemble a context around an existing gateway
    pub fn with_api(
        vitrine_dir: &Path,
        config: Config,
        session: Arc<dyn SessionStore>,
        tracer: Arc<Tracer>,
        api: Arc<dyn StoreApi>,
    ) -> Self {
        let cart = CartHandle::new();

        let auth_service = AuthService::new(
            Arc::clone(&api),
            Arc::clone(&session),
            cart.clone(),
            config.admin_email.clone(),
        );
        let catalog_service = CatalogService::new(Arc::clone(&api), cart.clone());
        let product_admin = ProductAdmin::new(Arc::clone(&api));
        let user_admin = UserAdmin::new(Arc::clone(&api));

        Self {
            vitrine_dir: vitrine_dir.to_path_buf(),
            config,
            session,
            tracer,
            api,
            cart,
            auth_service,
            catalog_service,
            product_admin,
            user_admin,
        }
    }
}
