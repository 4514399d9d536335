//! Service layer - view logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! backs one screen of the application.

mod admin;
mod auth;
mod catalog;
pub mod view;

pub use admin::{ProductAdmin, UserAdmin};
pub use auth::{AuthService, LoginOutcome, Role};
pub use catalog::CatalogService;
pub use view::{CollectionView, ViewHandle, ViewState};
