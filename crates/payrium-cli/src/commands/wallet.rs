//! Wallet commands.
//!
//! Each invocation opens the wallet file, performs one operation and
//! exits. A freshly created or imported phrase is therefore staged and
//! given its PIN within the same command.

use clap::Subcommand;
use payrium_crypto::checksum::{format_address, to_checksum_address};
use payrium_storage::FileStore;
use payrium_types::{PayriumError, Result, WalletStatus};
use payrium_wallet::backup::BackupFlow;
use payrium_wallet::AsyncWalletSession;

use crate::output;
use crate::prompt;
use crate::GlobalOpts;

#[derive(Subcommand)]
pub enum WalletCommand {
    /// Show whether a wallet exists on this device.
    Status,
    /// Generate a new recovery phrase and protect it with a PIN.
    Create {
        /// PIN for the new wallet (prompted if omitted).
        #[arg(long)]
        pin: Option<String>,
        /// Skip re-typing the phrase to confirm the backup.
        #[arg(long)]
        skip_confirm: bool,
    },
    /// Restore a wallet from an existing recovery phrase.
    Import {
        /// Recovery phrase (prompted without echo if omitted).
        #[arg(long)]
        phrase: Option<String>,
        /// PIN for the restored wallet (prompted if omitted).
        #[arg(long)]
        pin: Option<String>,
    },
    /// Check a PIN without decrypting the wallet.
    VerifyPin {
        #[arg(long)]
        pin: Option<String>,
    },
    /// Decrypt the wallet to confirm the PIN and record integrity.
    Unlock {
        #[arg(long)]
        pin: Option<String>,
    },
    /// Re-encrypt the wallet under a new PIN.
    ChangePin {
        /// Current PIN (prompted if omitted).
        #[arg(long)]
        current: Option<String>,
        /// New PIN (prompted twice if omitted).
        #[arg(long = "new")]
        new_pin: Option<String>,
    },
    /// Show the recovery phrase.
    Export {
        #[arg(long)]
        pin: Option<String>,
    },
    /// Print the wallet address.
    Address {
        /// Shorten to 0x1234...abcd.
        #[arg(long)]
        short: bool,
    },
    /// Show wallet metadata.
    Info,
    /// Change the wallet's display name.
    Rename { name: String },
    /// Permanently delete the wallet from this device.
    #[command(alias = "logout")]
    Reset {
        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(cmd: WalletCommand, opts: &GlobalOpts) -> Result<()> {
    let session = opts.open_session()?;
    match cmd {
        WalletCommand::Status => status(&session, opts).await,
        WalletCommand::Create { pin, skip_confirm } => {
            create(&session, opts, pin, skip_confirm).await
        }
        WalletCommand::Import { phrase, pin } => import(&session, opts, phrase, pin).await,
        WalletCommand::VerifyPin { pin } => verify_pin(&session, opts, pin).await,
        WalletCommand::Unlock { pin } => unlock(&session, opts, pin).await,
        WalletCommand::ChangePin { current, new_pin } => {
            change_pin(&session, opts, current, new_pin).await
        }
        WalletCommand::Export { pin } => export(&session, opts, pin).await,
        WalletCommand::Address { short } => address(&session, opts, short).await,
        WalletCommand::Info => info(&session, opts).await,
        WalletCommand::Rename { name } => rename(&session, opts, &name).await,
        WalletCommand::Reset { yes } => reset(&session, opts, yes).await,
    }
}

type Session = AsyncWalletSession<FileStore>;

async fn status(session: &Session, opts: &GlobalOpts) -> Result<()> {
    let status = session.status().await?;
    let address = session.get_address().await?.map(|a| to_checksum_address(&a));

    if opts.json {
        output::print_json_value(&serde_json::json!({
            "status": status.to_string(),
            "address": address,
            "path": opts.config.wallet_path().display().to_string(),
        }));
    } else {
        output::print_kv("Status", &status.to_string());
        if let Some(address) = address {
            output::print_kv("Address", &address);
        }
        output::print_kv("File", &opts.config.wallet_path().display().to_string());
    }
    Ok(())
}

async fn create(
    session: &Session,
    opts: &GlobalOpts,
    pin: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    if session.status().await? == WalletStatus::Locked {
        return Err(PayriumError::InvalidState {
            reason: "a wallet already exists; run `payrium reset` first".into(),
        });
    }

    let seed = session.create_wallet().await?;
    let mut flow = BackupFlow::new(&seed);

    if opts.json {
        // Machine callers get the phrase once, in the final JSON object.
        let pin = prompt::new_pin(pin)?;
        let address = session.set_initial_pin(&pin).await?;
        output::print_json_value(&serde_json::json!({
            "address": to_checksum_address(&address),
            "mnemonic": seed.phrase(),
        }));
        return Ok(());
    }
    drop(seed);

    output::print_warning("write these words down in order and keep them offline");
    output::print_mnemonic(&flow.mnemonic()?.split(' ').collect::<Vec<_>>());
    flow.acknowledge_shown()?;

    if !skip_confirm {
        let typed = prompt::read_line("Re-enter the recovery phrase to confirm: ")?;
        flow.confirm(&typed)?;
    }

    let pin = prompt::new_pin(pin)?;
    let address = session.set_initial_pin(&pin).await?;
    output::print_success("wallet created", false);
    output::print_kv("Address", &to_checksum_address(&address));
    Ok(())
}

async fn import(
    session: &Session,
    opts: &GlobalOpts,
    phrase: Option<String>,
    pin: Option<String>,
) -> Result<()> {
    let phrase = prompt::secret_or_prompt(phrase, "Recovery phrase: ")?;
    session.import_wallet(&phrase).await?;
    drop(phrase);

    let pin = prompt::new_pin(pin)?;
    let address = to_checksum_address(&session.set_initial_pin(&pin).await?);

    if opts.json {
        output::print_json_value(&serde_json::json!({ "address": address }));
    } else {
        output::print_success("wallet imported", false);
        output::print_kv("Address", &address);
    }
    Ok(())
}

async fn verify_pin(session: &Session, opts: &GlobalOpts, pin: Option<String>) -> Result<()> {
    let pin = prompt::secret_or_prompt(pin, "PIN: ")?;
    if !session.verify_pin(&pin).await? {
        return Err(PayriumError::InvalidPin);
    }
    output::print_success("PIN is correct", opts.json);
    Ok(())
}

async fn unlock(session: &Session, opts: &GlobalOpts, pin: Option<String>) -> Result<()> {
    let pin = prompt::secret_or_prompt(pin, "PIN: ")?;
    let words = session.unlock(&pin).await?.word_count();
    let address = session
        .get_address()
        .await?
        .map(|a| to_checksum_address(&a))
        .unwrap_or_default();

    if opts.json {
        output::print_json_value(&serde_json::json!({
            "status": "ok",
            "address": address,
            "words": words,
        }));
    } else {
        output::print_success("wallet unlocked", false);
        output::print_kv("Address", &address);
    }
    Ok(())
}

async fn change_pin(
    session: &Session,
    opts: &GlobalOpts,
    current: Option<String>,
    new_pin: Option<String>,
) -> Result<()> {
    let current = prompt::secret_or_prompt(current, "Current PIN: ")?;
    let new_pin = prompt::new_pin(new_pin)?;
    session.change_pin(&current, &new_pin).await?;
    output::print_success("PIN changed", opts.json);
    Ok(())
}

async fn export(session: &Session, opts: &GlobalOpts, pin: Option<String>) -> Result<()> {
    let pin = prompt::secret_or_prompt(pin, "PIN: ")?;
    let seed = session.export_seed(&pin).await?;

    if opts.json {
        output::print_json_value(&serde_json::json!({ "mnemonic": seed.phrase() }));
    } else {
        output::print_warning("anyone with these words controls the wallet");
        output::print_mnemonic(&seed.words());
    }
    Ok(())
}

async fn address(session: &Session, opts: &GlobalOpts, short: bool) -> Result<()> {
    let address = session
        .get_address()
        .await?
        .ok_or(PayriumError::NoWalletFound)?;
    let mut text = to_checksum_address(&address);
    if short {
        text = format_address(&text, 4);
    }

    if opts.json {
        output::print_json_value(&serde_json::json!({ "address": text }));
    } else {
        println!("{text}");
    }
    Ok(())
}

async fn info(session: &Session, opts: &GlobalOpts) -> Result<()> {
    let metadata = session
        .get_metadata()
        .await?
        .ok_or(PayriumError::NoWalletFound)?;

    if opts.json {
        output::print_json_value(&serde_json::json!({
            "name": metadata.name,
            "address": metadata.address,
            "createdAt": metadata.created_at.as_millis(),
            "lastUnlockedAt": metadata.last_unlocked_at.map(|t| t.as_millis()),
        }));
    } else {
        output::print_kv("Name", &metadata.name);
        output::print_kv("Address", &metadata.address);
        output::print_kv("Created", &metadata.created_at.to_string());
        let last = metadata
            .last_unlocked_at
            .map(|t| t.to_string())
            .unwrap_or_else(|| "never".into());
        output::print_kv("Last unlocked", &last);
    }
    Ok(())
}

async fn rename(session: &Session, opts: &GlobalOpts, name: &str) -> Result<()> {
    let metadata = session.rename(name).await?;
    output::print_success(&format!("wallet renamed to \"{}\"", metadata.name), opts.json);
    Ok(())
}

async fn reset(session: &Session, opts: &GlobalOpts, yes: bool) -> Result<()> {
    if !yes {
        if opts.json {
            return Err(PayriumError::InvalidState {
                reason: "pass --yes to reset in --json mode".into(),
            });
        }
        output::print_warning(
            "this deletes the encrypted wallet; only the recovery phrase can restore it",
        );
        if !prompt::confirm("Delete the wallet from this device?")? {
            output::print_success("reset cancelled", false);
            return Ok(());
        }
    }

    session.reset().await?;
    output::print_success("wallet removed from this device", opts.json);
    Ok(())
}
