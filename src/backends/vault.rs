use reqwest::tls::{Certificate, Version};
use reqwest::{Client, ClientBuilder, Url};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use super::secret_backend::SecretBackend;
use crate::config::VaultConfig;
use crate::error::{Error, Result};

/// Bound on TCP connect plus TLS handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Bound on a whole request, including reading the response.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HashiCorp Vault client bound to a single token
#[derive(Clone)]
pub struct VaultClient {
    client: Client,
    address: String,
    token: String,
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default, Deserialize)]
struct VaultErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

fn user_agent() -> String {
    format!("csv-to-vault/{}", env!("CARGO_PKG_VERSION"))
}

/// Read a PEM bundle and return every certificate in it.
fn load_ca_certs(path: &Path) -> Result<Vec<Certificate>> {
    let ca_error = |reason: String| Error::CaCert {
        path: path.to_path_buf(),
        reason,
    };

    let pem = fs::read(path).map_err(|e| ca_error(e.to_string()))?;
    let certs = Certificate::from_pem_bundle(&pem).map_err(|e| ca_error(e.to_string()))?;
    if certs.is_empty() {
        return Err(ca_error("no PEM certificates found".to_string()));
    }
    Ok(certs)
}

/// Percent-encode a single URL path segment.
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for b in segment.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

impl VaultClient {
    /// Build an authenticated client from connection settings.
    ///
    /// Fails without producing a client when the address is empty or
    /// invalid, or when a configured CA bundle cannot be loaded.
    pub async fn new(config: &VaultConfig) -> Result<Self> {
        if config.address.trim().is_empty() {
            return Err(Error::Config(
                "Vault address is not set. Use --vault-addr, VAULT_ADDR or [vault].address"
                    .to_string(),
            ));
        }

        let mut base = Url::parse(config.address.trim()).map_err(|e| {
            Error::Config(format!("invalid Vault address {:?}: {}", config.address, e))
        })?;

        let mut builder = ClientBuilder::new()
            .user_agent(user_agent())
            .min_tls_version(Version::TLS_1_2)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT);

        if let Some(ref ca_path) = config.ca_cert {
            let certs = load_ca_certs(ca_path)?;
            debug!(
                "Trusting {} CA certificate(s) from {}",
                certs.len(),
                ca_path.display()
            );
            builder = builder.tls_built_in_root_certs(false);
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }

        if config.insecure {
            warn!("TLS certificate verification is disabled for {}", base);
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(server_name) = config.tls_server_name.as_deref().filter(|n| !n.is_empty()) {
            // Connect to the configured address but present and verify `server_name`.
            let host = base
                .host_str()
                .unwrap_or_default()
                .trim_start_matches('[')
                .trim_end_matches(']')
                .to_string();
            let port = base.port_or_known_default().ok_or_else(|| {
                Error::Config(format!("Vault address {:?} has no port", config.address))
            })?;
            let addrs: Vec<_> = tokio::net::lookup_host((host.as_str(), port))
                .await
                .map_err(|source| Error::Resolve {
                    host: host.clone(),
                    source,
                })?
                .collect();
            builder = builder.resolve_to_addrs(server_name, &addrs);
            base.set_host(Some(server_name)).map_err(|e| {
                Error::Config(format!("invalid TLS server name {:?}: {}", server_name, e))
            })?;
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            address: base.as_str().trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/v1/{}", self.address, encode_path(path))
    }
}

#[async_trait::async_trait]
impl SecretBackend for VaultClient {
    async fn write_secret(&self, path: &str, data: HashMap<String, String>) -> Result<()> {
        let url = self.url_for(path);
        debug!("Writing secret to: {}", url);

        let response = self
            .client
            .put(&url)
            .header("X-Vault-Token", &self.token)
            .json(&data)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!("Wrote secret to {}", path);
            return Ok(());
        }

        match status.as_u16() {
            401 | 403 => Err(Error::Unauthorized {
                path: path.to_string(),
                status: status.as_u16(),
            }),
            code => {
                let body = response.text().await.unwrap_or_default();
                let errors = serde_json::from_str::<VaultErrorResponse>(&body)
                    .map(|r| r.errors)
                    .unwrap_or_default();
                let message = if errors.is_empty() {
                    body
                } else {
                    errors.join("; ")
                };
                Err(Error::Store {
                    path: path.to_string(),
                    status: code,
                    message,
                })
            }
        }
    }

    fn backend_type(&self) -> &'static str {
        "HashiCorp Vault"
    }
}
