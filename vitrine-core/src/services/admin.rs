//! Admin services - product and user management grids
//!
//! Each mutation validates its draft locally, issues exactly one backend
//! call and then refetches the full list. Nothing is patched in place.

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::{Product, ProductDraft, ProductId, User, UserDraft, UserId};
use crate::ports::StoreApi;

use super::view::CollectionView;

/// Product management grid
pub struct ProductAdmin {
    api: Arc<dyn StoreApi>,
    view: CollectionView<Product>,
}

impl ProductAdmin {
    pub fn new(api: Arc<dyn StoreApi>) -> Self {
        Self {
            api,
            view: CollectionView::new("products"),
        }
    }

    pub fn view(&self) -> &CollectionView<Product> {
        &self.view
    }

    pub fn load(&self) -> Result<Vec<Product>> {
        self.view.refresh(|| self.api.list_products())
    }

    pub fn create(&self, draft: &ProductDraft) -> Result<Vec<Product>> {
        draft.validate()?;
        self.view.mutate(
            || self.api.create_product(draft),
            || self.api.list_products(),
        )
    }

    pub fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<Vec<Product>> {
        draft.validate()?;
        self.view.mutate(
            || self.api.update_product(id, draft),
            || self.api.list_products(),
        )
    }

    pub fn delete(&self, id: ProductId) -> Result<Vec<Product>> {
        self.view
            .mutate(|| self.api.delete_product(id), || self.api.list_products())
    }

    /// Row from the current snapshot, used to prefill the edit form
    pub fn find(&self, id: ProductId) -> Option<Product> {
        self.view.rows().into_iter().find(|p| p.id == id)
    }
}

/// User management grid
pub struct UserAdmin {
    api: Arc<dyn StoreApi>,
    view: CollectionView<User>,
}

impl UserAdmin {
    pub fn new(api: Arc<dyn StoreApi>) -> Self {
        Self {
            api,
            view: CollectionView::new("users"),
        }
    }

    pub fn view(&self) -> &CollectionView<User> {
        &self.view
    }

    pub fn load(&self) -> Result<Vec<User>> {
        self.view.refresh(|| self.api.list_users())
    }

    pub fn create(&self, draft: &UserDraft) -> Result<Vec<User>> {
        draft.validate()?;
        self.view
            .mutate(|| self.api.create_user(draft), || self.api.list_users())
    }

    pub fn update(&self, id: UserId, draft: &UserDraft) -> Result<Vec<User>> {
        draft.validate()?;
        self.view
            .mutate(|| self.api.update_user(id, draft), || self.api.list_users())
    }

    pub fn delete(&self, id: UserId) -> Result<Vec<User>> {
        self.view
            .mutate(|| self.api.delete_user(id), || self.api.list_users())
    }

    pub fn find(&self, id: UserId) -> Option<User> {
        self.view.rows().into_iter().find(|u| u.id == id)
    }
}
