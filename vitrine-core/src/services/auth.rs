//! Auth service - login, registration, logout

use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::{landing_route, CartHandle, Credentials, Registration, Route};
use crate::ports::{SessionStore, StoreApi};

/// Who the logged-in user is, as far as the client can tell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub email: String,
    pub role: Role,
    pub route: Route,
}

/// Token-based authentication against the backend
pub struct AuthService {
    api: Arc<dyn StoreApi>,
    session: Arc<dyn SessionStore>,
    cart: CartHandle,
    admin_email: String,
}

impl AuthService {
    pub fn new(
        api: Arc<dyn StoreApi>,
        session: Arc<dyn SessionStore>,
        cart: CartHandle,
        admin_email: impl Into<String>,
    ) -> Self {
        Self {
            api,
            session,
            cart,
            admin_email: admin_email.into(),
        }
    }

    /// Log in, store the token and pick the landing screen
    ///
    /// The admin screen is chosen by comparing the submitted address with
    /// the configured admin address; the backend still decides what that
    /// account may actually do.
    pub fn login(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        credentials.validate()?;

        let token = self.api.login(credentials)?;
        self.session.save(&token)?;

        let route = landing_route(&credentials.email, &self.admin_email);
        let role = if route.is_admin() {
            Role::Admin
        } else {
            Role::Customer
        };
        tracing::info!(route = route.path(), "logged in");

        Ok(LoginOutcome {
            email: credentials.email.clone(),
            role,
            route,
        })
    }

    /// Create an account; success leads back to the login screen
    pub fn register(&self, registration: &Registration) -> Result<Route> {
        registration.validate()?;
        self.api.register(registration)?;
        tracing::info!("account registered");
        Ok(Route::Login)
    }

    /// Forget the token and empty the cart
    pub fn logout(&self) -> Result<()> {
        self.session.clear()?;
        self.cart.clear();
        tracing::info!("logged out");
        Ok(())
    }

    /// Whether a session token is stored
    pub fn current_session(&self) -> Result<bool> {
        Ok(self.session.load()?.is_some())
    }
}
