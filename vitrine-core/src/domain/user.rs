//! User domain model (admin-managed accounts)

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::wire::{deserialize_id, deserialize_optional_u32};

/// Backend identifier of a user
pub type UserId = i64;

/// A user row as returned by `GET /users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: UserId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Single-field name used by the registration endpoint
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_u32")]
    pub age: Option<u32>,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl User {
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            first_name: None,
            last_name: None,
            name: None,
            age: None,
            email: email.into(),
            role: None,
        }
    }

    /// First + last name, then the single name field, then the email
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if !parts.is_empty() {
            return parts.join(" ");
        }
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.email.clone(),
        }
    }
}

/// Fields submitted when creating or updating a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl UserDraft {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    /// Start an edit from an existing row
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            age: user.age,
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(Error::validation("Email cannot be empty"));
        }
        if !email.contains('@') {
            return Err(Error::validation(format!("Invalid email address: {}", email)));
        }
        if let Some(age) = self.age {
            if age > 150 {
                return Err(Error::validation(format!("Invalid age: {}", age)));
            }
        }
        Ok(())
    }
}
