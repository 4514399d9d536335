//! Shopping cart
//!
//! Lines are kept in insertion order and never persisted. A line's quantity
//! is at least 1: removing the last unit removes the line.

use std::sync::{Arc, Mutex, MutexGuard};

use rust_decimal::Decimal;
use serde::Serialize;

use super::product::{Product, ProductId};

/// A product together with how many units were selected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Items selected by the current user
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product`, merging with an existing line of the same id
    pub fn add(&mut self, product: Product) -> &[CartLine] {
        match self.lines.iter_mut().find(|line| line.product.id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine {
                product,
                quantity: 1,
            }),
        }
        &self.lines
    }

    /// Remove one unit of `product_id`; unknown ids are ignored
    pub fn remove(&mut self, product_id: ProductId) -> &[CartLine] {
        if let Some(pos) = self.lines.iter().position(|line| line.product.id == product_id) {
            if self.lines[pos].quantity > 1 {
                self.lines[pos].quantity -= 1;
            } else {
                self.lines.remove(pos);
            }
        }
        &self.lines
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines
            .iter()
            .find(|line| line.product.id == product_id)
            .map_or(0, |line| line.quantity)
    }

    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Shared cart handed to every view of a session
///
/// Clones point at the same cart.
#[derive(Debug, Clone, Default)]
pub struct CartHandle {
    inner: Arc<Mutex<Cart>>,
}

impl CartHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        // Cart mutations cannot panic halfway
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add(&self, product: Product) -> Vec<CartLine> {
        self.lock().add(product).to_vec()
    }

    pub fn remove(&self, product_id: ProductId) -> Vec<CartLine> {
        self.lock().remove(product_id).to_vec()
    }

    /// Current lines in insertion order
    pub fn snapshot(&self) -> Cart {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
