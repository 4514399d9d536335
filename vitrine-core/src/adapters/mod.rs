//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - Blocking reqwest client for the StoreApi port
//! - JSON file with an advisory lock for the SessionStore port
//! - In-memory session store for tests and throwaway sessions

pub mod http;
pub mod memory;
pub mod session_file;

#[cfg(test)]
pub mod mock_backend;
