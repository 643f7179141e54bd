use std::io::BufRead;
use std::io::Write;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::FmtSubscriber;
use wallet_vault::application::config::cli_args::Args;
use wallet_vault::application::config::cli_args::Command;
use wallet_vault::application::config::data_directory::DataDirectory;
use wallet_vault::state::wallet::encryption::PasswordManager;
use wallet_vault::state::wallet::encryption::VAULT_PASSWORD_ENV_VAR;
use wallet_vault::FileStore;
use wallet_vault::SecretStore;
use zeroize::Zeroizing;

pub fn main() -> Result<()> {
    let tokio_runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build()
        .context("Could not create tokio runtime")?;

    let args = Args::parse();
    set_up_logger();

    tokio_runtime.block_on(run(args))
}

/// Configure logger to use ISO-8601, of which rfc3339 is a subset. Install
/// global collector configured based on RUST_LOG env var. Accepted `RUST_LOG`
/// values are `trace`, `debug`, `info`, `warn`, and `error`.
fn set_up_logger() {
    let subscriber = FmtSubscriber::builder()
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Unable to set global default subscriber");
    }
}

async fn run(args: Args) -> Result<()> {
    let data_directory = DataDirectory::get(args.data_dir.clone())?;
    let vault_path = data_directory.vault_file_path();
    let store = FileStore::open(&vault_path)
        .await
        .with_context(|| format!("Could not open vault at {}", vault_path.display()))?;
    let vault = SecretStore::new(store, args.vault_config())?;

    let mut stdout = std::io::stdout().lock();
    match args.command {
        Command::List => {
            for record in vault.list_wallets().await {
                writeln!(
                    stdout,
                    "{}\t{}\tcreated {}\tlast used {}\t{}",
                    record.filename,
                    record.network,
                    record.created_at.to_rfc3339(),
                    record.last_used.to_rfc3339(),
                    if record.has_mnemonic { "phrase saved" } else { "no phrase" },
                )?;
            }
        }
        Command::Register { filename } => {
            let record = vault
                .upsert_wallet(&filename, args.network.as_str(), false)
                .await?;
            writeln!(stdout, "registered {} on {}", record.filename, record.network)?;
        }
        Command::Remove { filename } => {
            vault.remove_wallet(&filename).await?;
            writeln!(stdout, "removed {filename}")?;
        }
        Command::Store { filename } => {
            if vault.get_wallet(&filename).await.is_none() {
                bail!(
                    "Wallet {filename} is not registered. \
                     Run `wallet-vault register {filename}` first."
                );
            }

            let mnemonic = read_mnemonic()?;
            let password = new_password()?;
            vault.store_mnemonic(&filename, &mnemonic, &password).await?;
            writeln!(stdout, "saved encrypted phrase for {filename}")?;
        }
        Command::Retrieve { filename } => {
            if !vault.has_mnemonic_stored(&filename).await? {
                bail!("No phrase saved for wallet {filename}");
            }

            let password = unlock_password()?;
            match vault.retrieve_mnemonic(&filename, &password).await? {
                Some(mnemonic) => writeln!(stdout, "{}", mnemonic.as_str())?,
                None => bail!("Failed to decrypt the phrase for {filename}, try again"),
            }
        }
        Command::Has { filename } => {
            writeln!(stdout, "{}", vault.has_mnemonic_stored(&filename).await?)?;
        }
        Command::ClearMnemonic { filename } => {
            vault.clear_mnemonic(&filename).await?;
            writeln!(stdout, "cleared phrase of {filename}")?;
        }
        Command::ClearAll { yes } => {
            if !yes {
                bail!("Refusing to delete every saved phrase without --yes");
            }
            vault.clear_all().await?;
            writeln!(stdout, "vault cleared")?;
        }
        Command::Usage => {
            let usage = vault.storage_usage().await?;
            writeln!(
                stdout,
                "{} wallets, about {} bytes",
                usage.wallet_count, usage.total_size_estimate
            )?;
        }
    }

    Ok(())
}

fn read_mnemonic() -> Result<Zeroizing<String>> {
    eprintln!("Enter recovery phrase, then press enter:");
    let mut line = Zeroizing::new(String::new());
    std::io::stdin().lock().read_line(&mut line)?;

    let mnemonic = Zeroizing::new(line.split_whitespace().collect::<Vec<_>>().join(" "));
    if mnemonic.is_empty() {
        bail!("Recovery phrase cannot be empty");
    }
    Ok(mnemonic)
}

fn new_password() -> Result<Zeroizing<String>> {
    let Some(password) = PasswordManager::from_env_var(VAULT_PASSWORD_ENV_VAR) else {
        return PasswordManager::prompt_new_password();
    };

    warn!("Using password from environment variable {VAULT_PASSWORD_ENV_VAR} (INSECURE!)");
    let strength = PasswordManager::analyze_strength(&password);
    if !strength.is_acceptable() {
        bail!(
            "Password from environment is too weak: {}. Minimum: 12 characters with mixed case, numbers, and symbols.",
            strength.description()
        );
    }
    Ok(password)
}

fn unlock_password() -> Result<Zeroizing<String>> {
    match PasswordManager::from_env_var(VAULT_PASSWORD_ENV_VAR) {
        Some(password) => {
            warn!("Using password from environment variable {VAULT_PASSWORD_ENV_VAR} (INSECURE!)");
            Ok(password)
        }
        None => PasswordManager::prompt_unlock_password(),
    }
}
