//! CSV to Vault Library
//!
//! Loads password rows from a CSV file and writes each one into HashiCorp
//! Vault under `<mount>/<branch>/<id>/<sub_id>`.

pub mod backends;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod sync;

pub use backends::{SecretBackend, VaultClient};
pub use config::Config;
pub use error::{Error, Result};
pub use loader::{load_csv, CsvData, CsvRow};
pub use sync::{sync_rows, SecretPath, SyncOptions, SyncReport};
