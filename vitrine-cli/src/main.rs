//! Vitrine CLI - storefront and shop admin in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{auth, products, shop, status, users};

/// Vitrine - storefront and shop admin in your terminal
#[derive(Parser)]
#[command(name = "vt", version, about, long_about = None)]
struct Cli {
    /// Show debug logs (same as VITRINE_LOG=debug)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long, env = "VITRINE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an account
    Register {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, env = "VITRINE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget the session token and empty the cart
    Logout,

    /// Show session and configuration
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage products
    Products {
        #[command(subcommand)]
        command: products::ProductCommands,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        command: users::UserCommands,
    },

    /// Browse the storefront and fill a cart
    Shop,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    vitrine_core::telemetry::init_logging(filter);

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login { email, password, json } => auth::run_login(email, password, json),
        Commands::Register { name, age, email, password, json } => {
            auth::run_register(name, age, email, password, json)
        }
        Commands::Logout => auth::run_logout(),
        Commands::Status { json } => status::run(json),
        Commands::Products { command } => products::run(command),
        Commands::Users { command } => users::run(command),
        Commands::Shop => shop::run(),
    }
}

fn report(e: &anyhow::Error) {
    match e.downcast_ref::<vitrine_core::Error>() {
        Some(core) if core.is_not_authenticated() => {
            output::error("Please log in first: run 'vt login'");
        }
        Some(vitrine_core::Error::Cancelled) => {}
        _ => output::error(&format!("Error: {:#}", e)),
    }
}
