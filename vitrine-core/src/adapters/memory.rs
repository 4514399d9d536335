//! In-memory session store

use std::sync::RwLock;

use crate::domain::result::{Error, Result};
use crate::domain::SessionToken;
use crate::ports::SessionStore;

/// Session store that lives as long as the process
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<SessionToken>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(SessionToken::new(token))),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionToken>> {
        self.token
            .read()
            .map(|t| t.clone())
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))
    }

    fn save(&self, token: &SessionToken) -> Result<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        *slot = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        *slot = None;
        Ok(())
    }
}
