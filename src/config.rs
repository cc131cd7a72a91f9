use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Connection parameters for the Vault server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_mount")]
    pub mount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
    #[serde(default)]
    pub insecure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_server_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_mount() -> String {
    "secret".to_string()
}

fn default_branch() -> String {
    "db".to_string()
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            token: String::new(),
            mount: default_mount(),
            ca_cert: None,
            insecure: false,
            tls_server_name: None,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            branch: default_branch(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Create a sample configuration file
    pub fn create_sample<P: AsRef<Path>>(path: P) -> Result<()> {
        let sample = Self {
            vault: VaultConfig {
                address: "https://127.0.0.1:8200".to_string(),
                token: "your-vault-token-here".to_string(),
                ca_cert: Some(PathBuf::from("/etc/vault/ca.pem")),
                ..VaultConfig::default()
            },
            sync: SyncConfig::default(),
        };

        let toml_string =
            toml::to_string_pretty(&sample).context("Failed to serialize sample config")?;
        fs::write(path.as_ref(), toml_string)
            .with_context(|| format!("Failed to write sample config to {:?}", path.as_ref()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_tables_missing() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.vault.mount, "secret");
        assert!(config.vault.address.is_empty());
        assert!(!config.vault.insecure);
        assert_eq!(config.sync.branch, "db");
    }

    #[test]
    fn test_from_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[vault]
address = "https://vault.internal:8200"
token = "s.abc"
ca_cert = "/tmp/ca.pem"
tls_server_name = "vault.example.com"

[sync]
branch = "staging"
"#,
        )?;

        let config = Config::from_file(&path)?;
        assert_eq!(config.vault.address, "https://vault.internal:8200");
        assert_eq!(config.vault.token, "s.abc");
        assert_eq!(config.vault.ca_cert, Some(PathBuf::from("/tmp/ca.pem")));
        assert_eq!(
            config.vault.tls_server_name.as_deref(),
            Some("vault.example.com")
        );
        assert_eq!(config.vault.mount, "secret");
        assert_eq!(config.sync.branch, "staging");
        Ok(())
    }

    #[test]
    fn test_from_file_missing() {
        assert!(Config::from_file("/nonexistent/csv-to-vault.toml").is_err());
    }

    #[test]
    fn test_create_sample_is_loadable() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("sample.toml");
        Config::create_sample(&path)?;

        let config = Config::from_file(&path)?;
        assert_eq!(config.vault.address, "https://127.0.0.1:8200");
        assert_eq!(config.sync.branch, "db");
        Ok(())
    }
}
