//! Auth commands - login, register, logout

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Input, Password};

use vitrine_core::domain::{Credentials, Registration};
use vitrine_core::OperationResult;

use super::get_context;
use crate::output::{self, with_spinner};

pub fn run_login(email: Option<String>, password: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;

    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let password = match password {
        Some(p) => p,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let credentials = Credentials::new(email, password);
    let result = with_spinner("Logging in...", || ctx.auth_service.login(&credentials));

    if json {
        return output::print_envelope(OperationResult::from(result));
    }

    let outcome = result?;
    println!("{} Logged in as {}", "Success!".green(), outcome.email.bold());
    if outcome.route.is_admin() {
        println!(
            "Admin dashboard ({}). Manage the shop with 'vt products' and 'vt users'.",
            outcome.route.path()
        );
    } else {
        println!(
            "Storefront ({}). Start shopping with 'vt shop'.",
            outcome.route.path()
        );
    }
    Ok(())
}

pub fn run_register(
    name: Option<String>,
    age: Option<u32>,
    email: Option<String>,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;

    let name = match name {
        Some(n) => n,
        None => Input::new().with_prompt("Name").interact_text()?,
    };
    let age = match age {
        Some(a) => a,
        None => {
            let raw: String = Input::new().with_prompt("Age").interact_text()?;
            raw.trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid age: {}", raw))?
        }
    };
    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    let registration = Registration {
        name,
        age,
        email: email.trim().to_string(),
        password,
    };
    let result = with_spinner("Creating account...", || {
        ctx.auth_service.register(&registration)
    });

    if json {
        return output::print_envelope(OperationResult::from(result));
    }

    result?;
    println!("{} Account created for {}", "Success!".green(), registration.email);
    println!("Run 'vt login' to sign in.");
    Ok(())
}

pub fn run_logout() -> Result<()> {
    let ctx = get_context()?;
    ctx.auth_service.logout()?;
    output::success("Logged out");
    Ok(())
}
