//! Catalog service - storefront product grid and cart actions

use std::sync::{Arc, Mutex};

use crate::domain::result::{Error, Result};
use crate::domain::{filter_by_name, CartHandle, CartLine, Product, ProductId, ProductImage};
use crate::ports::StoreApi;

use super::view::CollectionView;

/// Storefront view: product snapshot, search projection, cart
pub struct CatalogService {
    api: Arc<dyn StoreApi>,
    cart: CartHandle,
    view: CollectionView<Product>,
    term: Mutex<String>,
}

impl CatalogService {
    pub fn new(api: Arc<dyn StoreApi>, cart: CartHandle) -> Self {
        Self {
            api,
            cart,
            view: CollectionView::new("catalog"),
            term: Mutex::new(String::new()),
        }
    }

    pub fn view(&self) -> &CollectionView<Product> {
        &self.view
    }

    pub fn cart(&self) -> &CartHandle {
        &self.cart
    }

    /// Fetch the product list; returns the visible subset for the current search
    pub fn load(&self) -> Result<Vec<Product>> {
        self.view.refresh(|| self.api.list_products())?;
        Ok(self.visible())
    }

    /// Set the search term and return the matching products
    pub fn search(&self, term: &str) -> Vec<Product> {
        *self.term.lock().unwrap_or_else(|p| p.into_inner()) = term.to_string();
        self.visible()
    }

    pub fn term(&self) -> String {
        self.term.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Current projection, recomputed from the latest snapshot
    pub fn visible(&self) -> Vec<Product> {
        filter_by_name(&self.view.rows(), &self.term())
    }

    pub fn image(&self, id: ProductId) -> Result<ProductImage> {
        self.api.product_image(id)
    }

    /// Add one unit of a loaded product to the cart
    pub fn add_to_cart(&self, id: ProductId) -> Result<Vec<CartLine>> {
        let product = self
            .view
            .rows()
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::validation(format!("Product not found: {}", id)))?;
        tracing::debug!(product_id = id, "added to cart");
        Ok(self.cart.add(product))
    }

    /// Take one unit off the cart; unknown ids are ignored
    pub fn remove_from_cart(&self, id: ProductId) -> Vec<CartLine> {
        self.cart.remove(id)
    }
}
