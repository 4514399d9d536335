//! Product domain model

use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::wire::{deserialize_amount, deserialize_id, deserialize_optional_date};

/// Backend identifier of a product
pub type ProductId = i64;

/// A product as returned by `GET /products`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub expiration_date: Option<NaiveDate>,
    /// Image reference as stored by the backend (file name or URL)
    #[serde(default)]
    pub image: Option<String>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            expiration_date: None,
            image: None,
        }
    }

    /// Whether the product is past its expiration date on `today`
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiration_date.is_some_and(|d| d < today)
    }
}

/// Fields submitted when creating or updating a product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: Decimal,
    pub expiration_date: Option<NaiveDate>,
    pub image: Option<ImageUpload>,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
            expiration_date: None,
            image: None,
        }
    }

    pub fn with_expiration_date(mut self, date: NaiveDate) -> Self {
        self.expiration_date = Some(date);
        self
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }

    /// Start an edit from an existing row; the image is only re-sent when replaced
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            expiration_date: product.expiration_date,
            image: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Product name cannot be empty"));
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(Error::validation("Product price cannot be negative"));
        }
        Ok(())
    }

    /// `expirationDate` form value; the backend expects an empty string when unset
    pub fn expiration_date_field(&self) -> String {
        self.expiration_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// An image file attached to a product form
#[derive(Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = guess_mime(&file_name).to_string();
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    /// Read an image from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::validation(format!("Invalid image path: {}", path.display())))?;
        Ok(Self::new(file_name, bytes))
    }
}

fn guess_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Binary image returned by `GET /products/:id/image`
#[derive(Clone)]
pub struct ProductImage {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ProductImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductImage")
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_product() {
        let json = r#"{"id": 7, "name": "Produit A", "price": 12.5, "expirationDate": "2025-06-30", "image": "a.png"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 7);
        assert_eq!(product.price, Decimal::new(125, 1));
        assert_eq!(product.expiration_date, NaiveDate::from_ymd_opt(2025, 6, 30));
        assert_eq!(product.image.as_deref(), Some("a.png"));
    }

    #[test]
    fn test_deserialize_string_fields_and_missing_optionals() {
        let json = r#"{"id": "3", "name": "Lait", "price": "1.20", "expirationDate": ""}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 3);
        assert_eq!(product.price, Decimal::new(120, 2));
        assert!(product.expiration_date.is_none());
        assert!(product.image.is_none());
    }

    #[test]
    fn test_deserialize_timestamp_date() {
        let json = r#"{"id": 1, "name": "X", "price": 1, "expirationDate": "2025-01-02T00:00:00.000+00:00"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.expiration_date, NaiveDate::from_ymd_opt(2025, 1, 2));
    }

    #[test]
    fn test_draft_validation() {
        assert!(ProductDraft::new("Pain", Decimal::new(150, 2)).validate().is_ok());
        assert!(ProductDraft::new("  ", Decimal::ONE).validate().is_err());
        assert!(ProductDraft::new("Pain", Decimal::new(-1, 0)).validate().is_err());
        assert!(ProductDraft::new("Free sample", Decimal::ZERO).validate().is_ok());
    }

    #[test]
    fn test_expiration_date_field() {
        let draft = ProductDraft::new("Pain", Decimal::ONE);
        assert_eq!(draft.expiration_date_field(), "");

        let draft = draft.with_expiration_date(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(draft.expiration_date_field(), "2024-12-01");
    }

    #[test]
    fn test_draft_from_product_does_not_resend_image() {
        let mut product = Product::new(1, "Pain", Decimal::ONE);
        product.image = Some("pain.png".to_string());
        let draft = ProductDraft::from_product(&product);
        assert_eq!(draft.name, "Pain");
        assert!(draft.image.is_none());
    }

    #[test]
    fn test_image_mime_guess() {
        assert_eq!(ImageUpload::new("a.PNG", vec![]).mime, "image/png");
        assert_eq!(ImageUpload::new("b.jpeg", vec![]).mime, "image/jpeg");
        assert_eq!(ImageUpload::new("noext", vec![]).mime, "application/octet-stream");
    }

    #[test]
    fn test_is_expired() {
        let mut product = Product::new(1, "Yaourt", Decimal::ONE);
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert!(!product.is_expired(today));
        product.expiration_date = NaiveDate::from_ymd_opt(2024, 5, 9);
        assert!(product.is_expired(today));
    }
}
