//! Shop command - interactive storefront
//!
//! The cart lives as long as this session; quitting or logging out empties it.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Select};

use vitrine_core::domain::Cart;
use vitrine_core::services::CatalogService;

use super::get_context;
use super::products::print_products;
use crate::output::{self, create_table, format_price, with_spinner};

const ACTIONS: &[&str] = &[
    "Search",
    "Add to cart",
    "Remove from cart",
    "View cart",
    "Reload products",
    "Quit",
];

pub fn run() -> Result<()> {
    let ctx = get_context()?;
    let catalog = &ctx.catalog_service;

    let result = session(catalog);

    // The storefront view is gone once the session ends, whatever the outcome
    catalog.view().handle().teardown();
    let cart = ctx.cart.snapshot();
    if !cart.is_empty() {
        output::info(&format!(
            "Leaving with {} item(s), total {}",
            cart.total_quantity(),
            format_price(cart.total_price())
        ));
    }
    ctx.cart.clear();
    result
}

fn session(catalog: &CatalogService) -> Result<()> {
    with_spinner("Loading products...", || catalog.load())?;
    println!("{}", "Vitrine".bold());
    print_products(&catalog.visible());

    loop {
        println!();
        let choice = Select::new()
            .with_prompt(cart_summary(&catalog.cart().snapshot()))
            .items(ACTIONS)
            .default(0)
            .interact_opt()?;

        match choice {
            Some(0) => {
                let term: String = Input::new()
                    .with_prompt("Search")
                    .default(catalog.term())
                    .allow_empty(true)
                    .interact_text()?;
                print_products(&catalog.search(&term));
            }
            Some(1) => add_to_cart(catalog)?,
            Some(2) => remove_from_cart(catalog)?,
            Some(3) => print_cart(&catalog.cart().snapshot()),
            Some(4) => {
                with_spinner("Loading products...", || catalog.load())?;
                print_products(&catalog.visible());
            }
            _ => return Ok(()),
        }
    }
}

fn add_to_cart(catalog: &CatalogService) -> Result<()> {
    let products = catalog.visible();
    if products.is_empty() {
        output::warning("No products match the current search.");
        return Ok(());
    }

    let labels: Vec<String> = products
        .iter()
        .map(|p| format!("{} ({})", p.name, format_price(p.price)))
        .collect();
    let Some(index) = Select::new()
        .with_prompt("Add which product?")
        .items(&labels)
        .default(0)
        .interact_opt()?
    else {
        return Ok(());
    };

    let product = &products[index];
    let lines = catalog.add_to_cart(product.id)?;
    let quantity = lines
        .iter()
        .find(|l| l.product.id == product.id)
        .map(|l| l.quantity)
        .unwrap_or(0);
    output::success(&format!("{} in cart: {}", product.name, quantity));
    Ok(())
}

fn remove_from_cart(catalog: &CatalogService) -> Result<()> {
    let lines = catalog.cart().snapshot().lines().to_vec();
    if lines.is_empty() {
        output::warning("Your cart is empty.");
        return Ok(());
    }

    let labels: Vec<String> = lines
        .iter()
        .map(|l| format!("{} x{}", l.product.name, l.quantity))
        .collect();
    let Some(index) = Select::new()
        .with_prompt("Remove one of which product?")
        .items(&labels)
        .default(0)
        .interact_opt()?
    else {
        return Ok(());
    };

    let removed = &lines[index].product;
    catalog.remove_from_cart(removed.id);
    output::success(&format!("Removed one {}", removed.name));
    Ok(())
}

fn cart_summary(cart: &Cart) -> String {
    if cart.is_empty() {
        "Cart is empty".to_string()
    } else {
        format!("Cart: {} item(s)", cart.total_quantity())
    }
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    let mut table = create_table();
    table.set_header(vec!["Product", "Unit price", "Qty", "Subtotal"]);
    for line in cart.lines() {
        table.add_row(vec![
            line.product.name.clone(),
            format_price(line.product.price),
            line.quantity.to_string(),
            format_price(line.subtotal()),
        ]);
    }
    println!("{}", table);
    println!("Total: {}", format_price(cart.total_price()).bold());
}
