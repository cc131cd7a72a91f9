//! Secret backend implementations
//!
//! This module provides the write abstraction used by the sync loop and the
//! HashiCorp Vault implementation of it.

mod secret_backend;
mod vault;

pub use secret_backend::SecretBackend;
pub use vault::VaultClient;
