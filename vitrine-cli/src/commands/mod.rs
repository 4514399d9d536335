//! CLI command implementations

pub mod auth;
pub mod products;
pub mod shop;
pub mod status;
pub mod users;

use std::path::PathBuf;

use anyhow::{Context, Result};
use vitrine_core::VitrineContext;

/// Get the vitrine directory from environment or default
pub fn get_vitrine_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("VITRINE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".vitrine"))
        .context("Could not find home directory; set VITRINE_DIR")
}

/// Get or create vitrine context
pub fn get_context() -> Result<VitrineContext> {
    let vitrine_dir = get_vitrine_dir()?;

    // Create directory if it doesn't exist
    std::fs::create_dir_all(&vitrine_dir)
        .with_context(|| format!("Failed to create vitrine directory: {:?}", vitrine_dir))?;

    VitrineContext::new(&vitrine_dir).context("Failed to initialize vitrine context")
}
