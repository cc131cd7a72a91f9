//! CLI parsing and command execution
//!
//! This module handles command-line argument parsing and routes commands to the appropriate handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::backends::VaultClient;
use crate::config::Config;
use crate::loader;
use crate::sync::{self, SyncOptions};

#[derive(Parser)]
#[command(name = "csv-to-vault")]
#[command(about = "Sync password rows from a CSV file into HashiCorp Vault", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "CSV_TO_VAULT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Vault address (overrides config file)
    #[arg(long, env = "VAULT_ADDR")]
    pub vault_addr: Option<String>,

    /// Vault token (overrides config file)
    #[arg(long, env = "VAULT_TOKEN", hide_env_values = true)]
    pub vault_token: Option<String>,

    /// PEM bundle of CA certificates to trust instead of the system roots
    #[arg(long, env = "VAULT_CACERT")]
    pub vault_cacert: Option<PathBuf>,

    /// Skip TLS certificate verification
    #[arg(
        long,
        env = "VAULT_SKIP_VERIFY",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub vault_skip_verify: bool,

    /// Name to use for TLS verification when it differs from the address host.
    /// Requests are sent to this name (also used as the HTTP Host header),
    /// pinned to the IP addresses of the Vault address
    #[arg(long, env = "VAULT_TLS_SERVER_NAME")]
    pub vault_tls_server_name: Option<String>,

    /// Path prefix secrets are written under (overrides config file)
    #[arg(long, env = "VAULT_MOUNT")]
    pub vault_mount: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a sample configuration file
    Init {
        /// Output path for the configuration file
        #[arg(short, long, default_value = "csv-to-vault.toml")]
        output: PathBuf,
    },

    /// Sync a CSV file to Vault
    Sync {
        /// CSV file with a header row and `id,sub_id,password` rows
        #[arg(long)]
        csv_file: PathBuf,

        /// Branch segment of the secret path, defaults to `db`: --branch db -> /secret/db/...
        #[arg(long)]
        branch: Option<String>,

        /// Dry run - only show what would be written
        #[arg(long)]
        dry_run: bool,
    },
}

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    if let Commands::Init { output } = cli.command {
        Config::create_sample(&output)
            .with_context(|| format!("Failed to create sample config at {:?}", output))?;
        info!("Sample configuration created at {:?}", output);
        return Ok(());
    }

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Init { .. } => unreachable!(), // Handled above

        Commands::Sync {
            csv_file,
            branch,
            dry_run,
        } => {
            let branch = branch.unwrap_or_else(|| config.sync.branch.clone());
            run_sync(&config, &csv_file, branch, dry_run).await?;
        }
    }

    Ok(())
}

/// Load the config file (if any) and apply CLI/environment overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config {
        Some(ref config_path) => Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?,
        None => Config::default(),
    };

    if let Some(ref addr) = cli.vault_addr {
        config.vault.address = addr.clone();
    }
    if let Some(ref token) = cli.vault_token {
        config.vault.token = token.clone();
    }
    if let Some(ref ca_cert) = cli.vault_cacert {
        config.vault.ca_cert = Some(ca_cert.clone());
    }
    if cli.vault_skip_verify {
        config.vault.insecure = true;
    }
    if let Some(ref server_name) = cli.vault_tls_server_name {
        config.vault.tls_server_name = Some(server_name.clone());
    }
    if let Some(ref mount) = cli.vault_mount {
        config.vault.mount = mount.clone();
    }

    Ok(config)
}

async fn run_sync(config: &Config, csv_file: &Path, branch: String, dry_run: bool) -> Result<()> {
    let data = loader::load_csv(csv_file)
        .with_context(|| format!("Failed to load CSV file {:?}", csv_file))?;
    info!("Loaded {} row(s) from {:?}", data.rows.len(), csv_file);

    let client = VaultClient::new(&config.vault)
        .await
        .context("Failed to create Vault client")?;

    let options = SyncOptions {
        mount: config.vault.mount.clone(),
        branch,
        dry_run,
    };
    let report = sync::sync_rows(&client, &data.rows, &options, &mut std::io::stdout())
        .await
        .context("Failed to sync CSV rows")?;

    if dry_run {
        println!("[DRY RUN] {} secret(s) would be written", report.total - report.failures.len());
    } else {
        println!("\n{} of {} secret(s) written", report.written, report.total);
    }

    if !report.is_success() {
        anyhow::bail!(
            "{} of {} row(s) failed to sync",
            report.failures.len(),
            report.total
        );
    }

    Ok(())
}
