use autowithdraw::application::notifier::WithdrawalEvent;
use autowithdraw::application::service::AutoWithdrawService;
use autowithdraw::config::{ServiceConfig, WalletTimeouts};
use autowithdraw::domain::amount::Sats;
use autowithdraw::domain::mint::MintUrl;
use autowithdraw::domain::ports::KeyValueStoreRef;
use autowithdraw::domain::quote::QuoteState;
use autowithdraw::domain::settings::AutoWithdrawSettings;
use autowithdraw::infrastructure::in_memory::InMemoryKeyValueStore;
#[cfg(feature = "storage-rocksdb")]
use autowithdraw::infrastructure::rocksdb::RocksDBStore;
use autowithdraw::infrastructure::settings_store::KvSettingsStore;
use autowithdraw::infrastructure::simulated_wallet::SimulatedWallet;
use autowithdraw::interfaces::csv::history_writer::HistoryWriter;
use autowithdraw::interfaces::csv::payment_reader::PaymentReader;
use autowithdraw::logging::init_logging;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Replays incoming payments against a simulated wallet and prints the
/// resulting auto-withdrawal history as CSV.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input payments CSV file (`mint,amount`)
    input: PathBuf,

    /// Auto-withdraw settings JSON document to load before replaying
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// State every melt quote settles into
    #[arg(long, default_value = "PAID")]
    quote_state: QuoteState,

    /// Fee reserve quoted by the simulated mint, in sats
    #[arg(long, default_value_t = 0)]
    fee_reserve: u64,

    /// Balance held before the first payment, as `MINT=SATS` (repeatable)
    #[arg(long, value_parser = parse_balance)]
    initial_balance: Vec<InitialBalance>,

    /// Upper bound for each wallet round trip, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[derive(Debug, Clone)]
struct InitialBalance {
    mint: MintUrl,
    amount: Sats,
}

fn parse_balance(raw: &str) -> std::result::Result<InitialBalance, String> {
    let (mint, amount) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected MINT=SATS, got '{raw}'"))?;
    let mint = MintUrl::new(mint).map_err(|err| err.to_string())?;
    let amount = amount
        .trim()
        .parse::<u64>()
        .map_err(|err| format!("invalid amount '{amount}': {err}"))?;
    Ok(InitialBalance {
        mint,
        amount: Sats(amount),
    })
}

fn open_store(db_path: Option<PathBuf>) -> Result<KeyValueStoreRef> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => Ok(Arc::new(RocksDBStore::open(path).into_diagnostic()?)),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Arc::new(InMemoryKeyValueStore::new()))
        }
        None => Ok(Arc::new(InMemoryKeyValueStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let store = open_store(cli.db_path)?;
    let settings = Arc::new(KvSettingsStore::new(store.clone()));
    if let Some(path) = cli.settings {
        let file = File::open(path).into_diagnostic()?;
        let document: AutoWithdrawSettings =
            serde_json::from_reader(BufReader::new(file)).into_diagnostic()?;
        settings.replace(document).await.into_diagnostic()?;
    }

    let wallet = SimulatedWallet::new()
        .with_fee_reserve(Sats(cli.fee_reserve))
        .with_settle_state(cli.quote_state);
    for balance in &cli.initial_balance {
        wallet.credit(&balance.mint, balance.amount).await;
    }

    let config = ServiceConfig {
        timeouts: WalletTimeouts::uniform(Duration::from_secs(cli.timeout_secs)),
        ..ServiceConfig::default()
    };
    let service = AutoWithdrawService::new(Arc::new(wallet.clone()), store, settings, config)
        .into_diagnostic()?;

    let mut events = service.subscribe();
    let listener = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                WithdrawalEvent::Started { mint, amount, .. } => {
                    info!(%mint, %amount, "Withdrawal started")
                }
                WithdrawalEvent::Progress { step, detail, .. } => info!(%step, %detail, "Progress"),
                WithdrawalEvent::Completed { mint, amount, fee, .. } => {
                    info!(%mint, %amount, %fee, "Withdrawal completed")
                }
                WithdrawalEvent::Failed { mint, error, .. } => {
                    warn!(%mint, %error, "Withdrawal failed")
                }
            }
        }
    });

    let file = File::open(cli.input).into_diagnostic()?;
    for payment in PaymentReader::new(file).payments() {
        match payment {
            Ok(payment) => {
                wallet.credit(&payment.mint, payment.amount).await;
                service.on_payment_completed(Some(payment.mint));
                // One payment at a time keeps the replay deterministic.
                service.wait_idle().await;
            }
            Err(err) => error!(error = %err, "Error reading payment"),
        }
    }

    service.shutdown().await;
    let history = service.history().await.into_diagnostic()?;
    drop(service);
    listener.await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = HistoryWriter::new(stdout.lock());
    writer.write_attempts(&history).into_diagnostic()?;

    Ok(())
}
