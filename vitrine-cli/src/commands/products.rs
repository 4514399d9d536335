//! Products command - manage the product catalog

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::{Confirm, Input};
use rust_decimal::Decimal;

use vitrine_core::domain::{ImageUpload, Product, ProductDraft};
use vitrine_core::OperationResult;

use super::get_context;
use crate::output::{self, create_table, format_price, with_spinner};

#[derive(Subcommand)]
pub enum ProductCommands {
    /// List products
    List {
        /// Only show products whose name contains this text
        #[arg(long, short)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a product
    Add {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
        /// Expiration date (YYYY-MM-DD)
        #[arg(long)]
        expires: Option<String>,
        /// Image file to upload
        #[arg(long)]
        image: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a product (prompts for every field when no option is given)
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
        /// Expiration date (YYYY-MM-DD)
        #[arg(long)]
        expires: Option<String>,
        /// Remove the expiration date
        #[arg(long, conflicts_with = "expires")]
        no_expiration: bool,
        /// Replace the image
        #[arg(long)]
        image: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a product
    Delete {
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Download a product image
    Image {
        id: i64,
        /// Where to write the image
        #[arg(long, short)]
        output: PathBuf,
    },
}

pub fn run(command: ProductCommands) -> Result<()> {
    match command {
        ProductCommands::List { search, json } => list(search, json),
        ProductCommands::Add {
            name,
            price,
            expires,
            image,
            json,
        } => add(name, price, expires, image, json),
        ProductCommands::Edit {
            id,
            name,
            price,
            expires,
            no_expiration,
            image,
            json,
        } => edit(id, name, price, expires, no_expiration, image, json),
        ProductCommands::Delete { id, force, json } => delete(id, force, json),
        ProductCommands::Image { id, output } => image(id, output),
    }
}

fn list(search: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let catalog = &ctx.catalog_service;

    let result = with_spinner("Loading products...", || catalog.load());
    let products = result.map(|_| catalog.search(search.as_deref().unwrap_or("")));

    if json {
        return output::print_envelope(OperationResult::from(products));
    }

    print_products(&products?);
    Ok(())
}

fn add(
    name: Option<String>,
    price: Option<String>,
    expires: Option<String>,
    image: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;

    let name = match name {
        Some(n) => n,
        None => Input::new().with_prompt("Name").interact_text()?,
    };
    let price = match price {
        Some(p) => p,
        None => Input::new().with_prompt("Price").interact_text()?,
    };

    let mut draft = ProductDraft::new(name, parse_price(&price)?);
    if let Some(date) = expires {
        draft = draft.with_expiration_date(parse_date(&date)?);
    }
    if let Some(path) = image {
        draft = draft.with_image(ImageUpload::from_path(&path)?);
    }

    let result = with_spinner("Saving product...", || ctx.product_admin.create(&draft));
    if json {
        return output::print_envelope(OperationResult::from(result));
    }

    result?;
    output::success(&format!("Product '{}' added", draft.name));
    Ok(())
}

fn edit(
    id: i64,
    name: Option<String>,
    price: Option<String>,
    expires: Option<String>,
    no_expiration: bool,
    image: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let admin = &ctx.product_admin;

    with_spinner("Loading products...", || admin.load())?;
    let existing = admin
        .find(id)
        .with_context(|| format!("Product not found: {}", id))?;
    let mut draft = ProductDraft::from_product(&existing);

    let interactive = name.is_none()
        && price.is_none()
        && expires.is_none()
        && !no_expiration
        && image.is_none()
        && !json;

    if interactive {
        draft.name = Input::new()
            .with_prompt("Name")
            .default(draft.name.clone())
            .interact_text()?;
        let raw_price: String = Input::new()
            .with_prompt("Price")
            .default(format_price(draft.price))
            .interact_text()?;
        draft.price = parse_price(&raw_price)?;
        let raw_date: String = Input::new()
            .with_prompt("Expiration date (YYYY-MM-DD, empty for none)")
            .default(draft.expiration_date_field())
            .allow_empty(true)
            .interact_text()?;
        draft.expiration_date = if raw_date.trim().is_empty() {
            None
        } else {
            Some(parse_date(&raw_date)?)
        };
    } else {
        if let Some(n) = name {
            draft.name = n;
        }
        if let Some(p) = price {
            draft.price = parse_price(&p)?;
        }
        if let Some(d) = expires {
            draft.expiration_date = Some(parse_date(&d)?);
        }
        if no_expiration {
            draft.expiration_date = None;
        }
        if let Some(path) = image {
            draft.image = Some(ImageUpload::from_path(&path)?);
        }
    }

    let result = with_spinner("Saving product...", || admin.update(id, &draft));
    if json {
        return output::print_envelope(OperationResult::from(result));
    }

    result?;
    output::success(&format!("Product {} updated", id));
    Ok(())
}

fn delete(id: i64, force: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete product {}?", id))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let result = with_spinner("Deleting product...", || ctx.product_admin.delete(id));
    if json {
        return output::print_envelope(OperationResult::from(result));
    }

    result?;
    output::success(&format!("Product {} deleted", id));
    Ok(())
}

fn image(id: i64, output_path: PathBuf) -> Result<()> {
    let ctx = get_context()?;

    let image = with_spinner("Downloading image...", || ctx.catalog_service.image(id))?;
    std::fs::write(&output_path, &image.bytes)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    output::success(&format!(
        "Saved {} bytes to {}",
        image.bytes.len(),
        output_path.display()
    ));
    if let Some(content_type) = image.content_type {
        println!("  Type: {}", content_type);
    }
    Ok(())
}

pub fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }

    let today = chrono::Local::now().date_naive();
    let mut table = create_table();
    table.set_header(vec!["ID", "Name", "Price", "Expires", "Image"]);

    for product in products {
        let expires = match product.expiration_date {
            Some(date) if product.is_expired(today) => {
                format!("{} (expired)", date).red().to_string()
            }
            Some(date) => date.to_string(),
            None => "-".to_string(),
        };
        table.add_row(vec![
            product.id.to_string(),
            product.name.clone(),
            format_price(product.price),
            expires,
            product.image.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }

    println!("{}", table);
}

fn parse_price(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim().replace(',', ".").as_str())
        .with_context(|| format!("Invalid price: {}", raw))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {}", raw))
}
