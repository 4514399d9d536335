//! Status command - show configuration and session state

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use super::get_context;
use crate::output::create_table;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusSummary {
    vitrine_dir: String,
    api_url: String,
    admin_email: String,
    logged_in: bool,
    service_name: String,
    zipkin_url: Option<String>,
    console_spans: bool,
}

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;

    let status = StatusSummary {
        vitrine_dir: ctx.vitrine_dir.display().to_string(),
        api_url: ctx.config.api_url.clone(),
        admin_email: ctx.config.admin_email.clone(),
        logged_in: ctx.auth_service.current_session()?,
        service_name: ctx.config.telemetry.service_name.clone(),
        zipkin_url: ctx.config.telemetry.zipkin_url.clone(),
        console_spans: ctx.config.telemetry.console,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Vitrine Status".bold());
    println!();

    let mut table = create_table();
    let session = if status.logged_in {
        "logged in".green().to_string()
    } else {
        "not logged in".yellow().to_string()
    };
    table.add_row(vec!["Session", session.as_str()]);
    table.add_row(vec!["API", status.api_url.as_str()]);
    table.add_row(vec!["Admin email", status.admin_email.as_str()]);
    table.add_row(vec!["Directory", status.vitrine_dir.as_str()]);
    table.add_row(vec![
        "Span export",
        status.zipkin_url.as_deref().unwrap_or("off"),
    ]);
    println!("{}", table);

    if !status.logged_in {
        println!();
        println!("Run 'vt login' to sign in.");
    }
    Ok(())
}
