//! Session store port - durable storage for the auth token

use crate::domain::result::Result;
use crate::domain::SessionToken;

/// Holds the current session token
///
/// Read before every authenticated request, written on successful login,
/// cleared on logout.
pub trait SessionStore: Send + Sync {
    /// The stored token, if any
    fn load(&self) -> Result<Option<SessionToken>>;

    /// Replace the stored token
    fn save(&self, token: &SessionToken) -> Result<()>;

    /// Forget the stored token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}
