use std::collections::HashMap;

use crate::error::Result;
use crate::sync::SecretPath;

/// Key under which each row's secret value is stored
pub const PASSWORD_KEY: &str = "password";

/// Trait for secret stores the sync loop can write into
#[async_trait::async_trait]
pub trait SecretBackend: Send + Sync {
    /// Write a secret to the backend, replacing whatever is stored at `path`
    async fn write_secret(&self, path: &str, data: HashMap<String, String>) -> Result<()>;

    /// Get the backend type name for display purposes
    fn backend_type(&self) -> &'static str;

    /// Store `password` as the only key under `path`
    async fn write_password(&self, path: &SecretPath, password: &str) -> Result<()> {
        let mut data = HashMap::new();
        data.insert(PASSWORD_KEY.to_string(), password.to_string());
        self.write_secret(&path.to_string(), data).await
    }
}
