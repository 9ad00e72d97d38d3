// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Command-line front end for the document vault.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use finguard_vault::config::VaultConfig;
use finguard_vault::error::VaultError;
use finguard_vault::hash::HASH_ALGORITHM;
use finguard_vault::logging::{self, LogFormat};
use finguard_vault::models::{SavedDocument, WalletAddress};
use finguard_vault::report::{self, format_file_size, format_timestamp, ReportFormat};
use finguard_vault::vault::{DocumentVault, MirrorStatus};

#[derive(Parser, Debug)]
#[command(author, version, about = "Document hash verification vault", long_about = None)]
struct Cli {
    /// Vault data directory (overrides DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Remote document API base URL (overrides VAULT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Owner key for saved documents (overrides VAULT_OWNER)
    #[arg(long, global = true)]
    owner: Option<String>,

    /// `json` or `pretty` (overrides LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the SHA-256 hash of a file
    Hash {
        file: PathBuf,
        #[arg(long)]
        mime_type: Option<String>,
    },
    /// Hash a file and save it to the vault
    Save {
        file: PathBuf,
        #[arg(long)]
        mime_type: Option<String>,
    },
    /// List the owner's saved documents, newest first
    List,
    /// Show one saved document
    Show { id: String },
    /// Delete a saved document
    Delete { id: String },
    /// Verify a hash against the vault and the remote API.
    ///
    /// Exits with status 1 when the hash does not match.
    Verify {
        hash: String,
        /// Re-check this file against the given hash
        #[arg(long)]
        file: Option<PathBuf>,
        /// `plain` or `structured`
        #[arg(long, default_value = "plain")]
        format: String,
        /// Write the report to a file (default: DATA_DIR/reports/)
        #[arg(long, num_args = 0..=1)]
        export: Option<Option<PathBuf>>,
    },
    /// Retry mirroring documents the remote API has not received yet
    Sync,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            if let Some(hint) = retry_hint(&err) {
                eprintln!("{hint}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Advice printed after a failed command, based on the underlying vault error.
fn retry_hint(err: &anyhow::Error) -> Option<&'static str> {
    let vault_err = err.downcast_ref::<VaultError>()?;
    Some(if vault_err.is_retryable() {
        "Retrying the command may succeed."
    } else {
        "The file was rejected; retrying with the same file will fail again."
    })
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = VaultConfig::from_env().context("invalid environment configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(url) = cli.api_url {
        config.api_url = Some(url);
    }
    if let Some(owner) = cli.owner {
        config.owner = WalletAddress::from(owner);
    }
    if let Some(format) = cli.log_format {
        config.log_format = format.parse::<LogFormat>()?;
    }
    logging::init(config.log_format);

    let vault = DocumentVault::open(&config)
        .with_context(|| format!("failed to open vault at {}", config.data_dir.display()))?;

    match cli.command {
        Commands::Hash { file, mime_type } => {
            let hashed = vault.hash_file(&file, mime_type.as_deref()).await?;
            println!("{HASH_ALGORITHM} ({}) = {}", hashed.candidate.name, hashed.hash);
        }
        Commands::Save { file, mime_type } => {
            let outcome = vault
                .save_file(&file, mime_type.as_deref(), &config.owner)
                .await?;
            println!("Saved {} ({})", outcome.document.filename, outcome.document.id);
            println!("Hash: {}", outcome.document.hash);
            match outcome.mirror {
                MirrorStatus::Mirrored => println!("Remote: mirrored"),
                MirrorStatus::Pending { error } => {
                    println!("Remote: pending ({error}); run `sync` to retry")
                }
                MirrorStatus::Unqueued { error, queue_error } => {
                    println!("Remote: failed ({error}); not queued for retry ({queue_error})")
                }
                MirrorStatus::Disabled => println!("Remote: disabled"),
            }
        }
        Commands::List => {
            let documents = vault.list(&config.owner)?;
            if documents.is_empty() {
                println!("No documents saved for {}", config.owner);
            }
            for doc in documents {
                println!(
                    "{}  {}  {}  {}  {}",
                    doc.id,
                    format_timestamp(doc.timestamp),
                    format_file_size(doc.size),
                    doc.mime_type,
                    doc.filename
                );
            }
        }
        Commands::Show { id } => {
            let Some(doc) = vault.get(&id)? else {
                bail!("no document with id {id}");
            };
            print_document(&doc);
        }
        Commands::Delete { id } => {
            let doc = vault.delete(&id)?;
            println!("Deleted {} ({})", doc.filename, doc.id);
        }
        Commands::Verify {
            hash,
            file,
            format,
            export,
        } => {
            let format: ReportFormat = format.parse()?;
            let verifier = vault.verifier();
            let result = match file {
                Some(path) => {
                    let current = vault.hash_file(&path, None).await?;
                    verifier.verify_current(&hash, &current.hash).await?
                }
                None => verifier.verify(&hash).await?,
            };
            let Some(result) = result else {
                bail!("hash must not be empty");
            };

            print!("{}", report::generate(&result, format)?);
            if format == ReportFormat::Structured {
                println!();
            }
            if let Some(destination) = export {
                let path = vault.export_report(&result, format, destination.as_deref())?;
                eprintln!("Report written to {}", path.display());
            }
            if !result.is_match {
                return Ok(ExitCode::from(1));
            }
        }
        Commands::Sync => {
            if !vault.remote_enabled() {
                bail!("remote sync is disabled; set VAULT_API_URL or pass --api-url");
            }
            let summary = vault.retry_pending_mirrors().await?;
            println!(
                "Mirrored: {}  Still pending: {}  Dropped: {}",
                summary.mirrored, summary.still_pending, summary.dropped
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_document(doc: &SavedDocument) {
    println!("ID:       {}", doc.id);
    println!("Name:     {}", doc.filename);
    println!("Hash:     {}", doc.hash);
    println!("Size:     {} ({} bytes)", format_file_size(doc.size), doc.size);
    println!("Type:     {}", doc.mime_type);
    println!("Wallet:   {}", doc.wallet_address);
    println!("Saved At: {}", format_timestamp(doc.timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;
    use finguard_vault::hash::ValidationError;
    use finguard_vault::storage::StorageError;

    #[test]
    fn retry_hint_follows_error_kind() {
        let storage = anyhow::Error::from(VaultError::from(StorageError::NotFound(
            "Document doc-1".to_string(),
        )));
        assert!(retry_hint(&storage).unwrap().starts_with("Retrying the command"));

        let invalid = anyhow::Error::from(VaultError::from(ValidationError::EmptyName))
            .context("failed to save");
        assert!(retry_hint(&invalid).unwrap().starts_with("The file was rejected"));

        assert!(retry_hint(&anyhow::anyhow!("hash must not be empty")).is_none());
    }
}
