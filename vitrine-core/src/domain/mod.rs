//! Core domain entities
//!
//! Pure data structures with validation logic - no I/O or external dependencies.

pub mod auth;
pub mod cart;
pub mod filter;
mod product;
pub mod result;
mod session;
mod user;
mod wire;

pub use auth::{landing_route, Credentials, LoginResponse, Registration, Route};
pub use cart::{Cart, CartHandle, CartLine};
pub use filter::filter_by_name;
pub use product::{ImageUpload, Product, ProductDraft, ProductId, ProductImage};
pub use session::SessionToken;
pub use user::{User, UserDraft, UserId};
