//! Users command - manage shop accounts

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use dialoguer::{Confirm, Input};

use vitrine_core::domain::{User, UserDraft};
use vitrine_core::OperationResult;

use super::get_context;
use crate::output::{self, create_table, with_spinner};

/// Editable user fields
#[derive(Args, Default)]
pub struct UserFields {
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    age: Option<u32>,
    #[arg(long)]
    role: Option<String>,
}

impl UserFields {
    fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.age.is_none()
            && self.role.is_none()
    }

    fn apply(self, draft: &mut UserDraft) {
        if let Some(email) = self.email {
            draft.email = email;
        }
        if self.first_name.is_some() {
            draft.first_name = self.first_name;
        }
        if self.last_name.is_some() {
            draft.last_name = self.last_name;
        }
        if self.age.is_some() {
            draft.age = self.age;
        }
        if self.role.is_some() {
            draft.role = self.role;
        }
    }
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a user
    Add {
        #[command(flatten)]
        fields: UserFields,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a user (prompts for every field when no option is given)
    Edit {
        id: i64,
        #[command(flatten)]
        fields: UserFields,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a user
    Delete {
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: UserCommands) -> Result<()> {
    match command {
        UserCommands::List { json } => list(json),
        UserCommands::Add { fields, json } => add(fields, json),
        UserCommands::Edit { id, fields, json } => edit(id, fields, json),
        UserCommands::Delete { id, force, json } => delete(id, force, json),
    }
}

fn list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = with_spinner("Loading users...", || ctx.user_admin.load());

    if json {
        return output::print_envelope(OperationResult::from(result));
    }

    print_users(&result?);
    Ok(())
}

fn add(fields: UserFields, json: bool) -> Result<()> {
    let ctx = get_context()?;

    let mut draft = UserDraft::default();
    if fields.is_empty() && !json {
        prompt_fields(&mut draft)?;
    } else {
        fields.apply(&mut draft);
    }

    let result = with_spinner("Saving user...", || ctx.user_admin.create(&draft));
    if json {
        return output::print_envelope(OperationResult::from(result));
    }

    result?;
    output::success(&format!("User {} added", draft.email));
    Ok(())
}

fn edit(id: i64, fields: UserFields, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let admin = &ctx.user_admin;

    with_spinner("Loading users...", || admin.load())?;
    let existing = admin
        .find(id)
        .with_context(|| format!("User not found: {}", id))?;

    let mut draft = UserDraft::from_user(&existing);
    if fields.is_empty() && !json {
        prompt_fields(&mut draft)?;
    } else {
        fields.apply(&mut draft);
    }

    let result = with_spinner("Saving user...", || admin.update(id, &draft));
    if json {
        return output::print_envelope(OperationResult::from(result));
    }

    result?;
    output::success(&format!("User {} updated", id));
    Ok(())
}

fn delete(id: i64, force: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete user {}?", id))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let result = with_spinner("Deleting user...", || ctx.user_admin.delete(id));
    if json {
        return output::print_envelope(OperationResult::from(result));
    }

    result?;
    output::success(&format!("User {} deleted", id));
    Ok(())
}

fn prompt_optional(prompt: &str, current: Option<String>) -> Result<Option<String>> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .default(current.unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    let value = value.trim().to_string();
    Ok(if value.is_empty() { None } else { Some(value) })
}

fn prompt_fields(draft: &mut UserDraft) -> Result<()> {
    draft.email = Input::new()
        .with_prompt("Email")
        .default(draft.email.clone())
        .interact_text()?;
    draft.first_name = prompt_optional("First name", draft.first_name.take())?;
    draft.last_name = prompt_optional("Last name", draft.last_name.take())?;
    draft.age = match prompt_optional("Age", draft.age.map(|a| a.to_string()))? {
        Some(raw) => Some(raw.parse().with_context(|| format!("Invalid age: {}", raw))?),
        None => None,
    };
    draft.role = prompt_optional("Role", draft.role.take())?;
    Ok(())
}

fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }

    let mut table = create_table();
    table.set_header(vec!["ID", "Name", "Email", "Age", "Role"]);

    for user in users {
        table.add_row(vec![
            user.id.to_string(),
            user.display_name(),
            user.email.clone(),
            user.age.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string()),
            user.role.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }

    println!("{}", table);
}
