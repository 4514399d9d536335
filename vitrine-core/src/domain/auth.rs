//! Authentication payloads and post-login routing

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Login form
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(Error::validation("Email is required"));
        }
        if self.password.is_empty() {
            return Err(Error::validation("Password is required"));
        }
        Ok(())
    }
}

/// Registration form, as accepted by `POST /auth/register`
#[derive(Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub age: u32,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("age", &self.age)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl Registration {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Name is required"));
        }
        if !self.email.contains('@') {
            return Err(Error::validation(format!("Invalid email address: {}", self.email)));
        }
        if self.password.is_empty() {
            return Err(Error::validation("Password is required"));
        }
        if self.age > 150 {
            return Err(Error::validation(format!("Invalid age: {}", self.age)));
        }
        Ok(())
    }
}

/// Body of a successful login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Application screens reachable after an auth action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Register,
    AdminDashboard,
    UserDashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Register => "/register",
            Route::AdminDashboard => "/dashboard",
            Route::UserDashboard => "/user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Route::AdminDashboard)
    }
}

/// Where a freshly logged-in user lands
///
/// The administrator is recognised by email address alone; the comparison
/// ignores ASCII case and surrounding whitespace.
pub fn landing_route(email: &str, admin_email: &str) -> Route {
    if email.trim().eq_ignore_ascii_case(admin_email.trim()) {
        Route::AdminDashboard
    } else {
        Route::UserDashboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: &str = "admin@vitrine.local";

    #[test]
    fn test_admin_email_lands_on_dashboard() {
        assert_eq!(landing_route(ADMIN, ADMIN), Route::AdminDashboard);
        assert_eq!(landing_route(" Admin@Vitrine.local ", ADMIN), Route::AdminDashboard);
        assert_eq!(Route::AdminDashboard.path(), "/dashboard");
    }

    #[test]
    fn test_other_email_lands_on_user_dashboard() {
        let route = landing_route("marie.martin@example.com", ADMIN);
        assert_eq!(route, Route::UserDashboard);
        assert_eq!(route.path(), "/user");
        assert!(!route.is_admin());
    }

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::new("a@b.c", "pw").validate().is_ok());
        assert!(Credentials::new("  ", "pw").validate().is_err());
        assert!(Credentials::new("a@b.c", "").validate().is_err());
        assert_eq!(Credentials::new(" a@b.c ", "pw").email, " a@b.c ");
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("a@b.c", "hunter2");
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }

    #[test]
    fn test_registration_validation() {
        let mut reg = Registration {
            name: "Jean Dupont".to_string(),
            age: 30,
            email: "jean.dupont@example.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(reg.validate().is_ok());

        reg.email = "jean".to_string();
        assert!(reg.validate().is_err());
    }
}
