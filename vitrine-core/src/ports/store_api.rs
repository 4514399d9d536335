//! Store API port
//!
//! One method per backend operation. Views and services only see this
//! trait; the HTTP adapter is one implementation, test fakes are another.

use crate::domain::result::Result;
use crate::domain::{
    Credentials, Product, ProductDraft, ProductId, ProductImage, Registration, SessionToken, User,
    UserDraft, UserId,
};

/// Remote storefront/admin backend
///
/// Implementations perform exactly one backend call per method: no
/// retries, no batching. Authenticated methods fail with
/// `Error::NotAuthenticated` before any I/O when no session token is stored.
pub trait StoreApi: Send + Sync {
    // === Auth ===

    /// Exchange credentials for a session token
    ///
    /// Does not persist the token; that is the caller's decision.
    fn login(&self, credentials: &Credentials) -> Result<SessionToken>;

    /// Create an account
    fn register(&self, registration: &Registration) -> Result<()>;

    // === Products ===

    fn list_products(&self) -> Result<Vec<Product>>;

    fn create_product(&self, draft: &ProductDraft) -> Result<()>;

    fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<()>;

    fn delete_product(&self, id: ProductId) -> Result<()>;

    /// Binary image attached to a product
    fn product_image(&self, id: ProductId) -> Result<ProductImage>;

    // === Users ===

    fn list_users(&self) -> Result<Vec<User>>;

    fn create_user(&self, draft: &UserDraft) -> Result<()>;

    fn update_user(&self, id: UserId, draft: &UserDraft) -> Result<()>;

    fn delete_user(&self, id: UserId) -> Result<()>;
}
