//! Procura command-line driver.
//!
//! Replays a purchase scenario through the reconciliation engine and prints
//! the commit-ready snapshot, or every validation error, as JSON.
//!
//! Exit codes: 0 on success, 2 when the scenario itself must change, 3 when
//! the store failed or refused the snapshot for a reason outside the input.

mod scenario;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use procura_core::purchase::{EngineContext, PurchaseError, PurchaseService, PurchaseTransaction};
use procura_core::units::UnitConversionResolver;
use procura_shared::{AppConfig, AppError, AppResult, LoggingConfig};
use procura_store::{InMemoryPurchaseStore, PurchaseStore, Receipt, commit_with_retry};
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::scenario::Scenario;

#[derive(Parser)]
#[clap(name = "procura", version, about = "Purchase transaction reconciliation")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Pretty-print JSON output.
    #[clap(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay and validate a scenario.
    Reconcile(ScenarioOpts),
    /// Replay, validate, and commit a scenario to an in-memory store.
    Commit(CommitOpts),
    /// List the units of a family, or the sale units allowed for a purchase unit.
    Units(UnitsOpts),
}

#[derive(Args)]
struct ScenarioOpts {
    /// Path to a scenario JSON file.
    scenario: PathBuf,
}

#[derive(Args)]
struct CommitOpts {
    #[clap(flatten)]
    scenario: ScenarioOpts,

    /// Total commit attempts on retryable storage failures.
    #[clap(long, default_value = "3", env = "PROCURA_COMMIT_ATTEMPTS")]
    attempts: u32,

    /// Submit the commit twice to show the second is a no-op.
    #[clap(long)]
    resubmit: bool,
}

#[derive(Args)]
struct UnitsOpts {
    /// Unit family (e.g. `weight`).
    family: String,

    /// Purchase unit; lists the permissible sale units instead.
    #[clap(long = "purchase-unit")]
    purchase_unit: Option<String>,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print(value: &Value, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

/// Process exit status for a failure.
fn exit_status(err: &AppError) -> u8 {
    if err.status_code() < 500 { 2 } else { 3 }
}

fn failure_report(err: &AppError, details: Vec<Value>) -> Value {
    json!({
        "code": err.error_code(),
        "status": err.status_code(),
        "retryable": err.is_retryable(),
        "message": err.to_string(),
        "errors": details,
    })
}

/// Reports a failed replay, keeping each validation error's own code and field.
fn purchase_failure(err: PurchaseError) -> (AppError, Value) {
    let details = match &err {
        PurchaseError::Invalid(errors) => errors
            .iter()
            .map(|e| {
                json!({
                    "code": e.error_code(),
                    "field": e.field_path(),
                    "message": e.to_string(),
                })
            })
            .collect(),
        PurchaseError::Reconcile(e) => vec![json!({
            "code": e.error_code(),
            "event": e.event,
            "message": e.to_string(),
        })],
    };
    let err = AppError::from(err);
    let report = failure_report(&err, details);
    (err, report)
}

async fn commit(
    store: &InMemoryPurchaseStore,
    transaction: &PurchaseTransaction,
    attempts: u32,
    resubmit: bool,
) -> AppResult<Receipt> {
    let mut receipt = commit_with_retry(store, transaction, attempts).await?;
    if resubmit {
        receipt = store.commit(transaction).await?;
    }
    Ok(receipt)
}

async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<ExitCode> {
    let (opts, commit_opts) = match cli.command {
        Commands::Units(opts) => {
            let registry = procura_core::units::UnitRegistry::standard();
            let resolver = UnitConversionResolver::new(&registry);
            let units = match opts.purchase_unit.as_deref() {
                Some(purchase_unit) => resolver.available_sale_units(&opts.family, purchase_unit)?,
                None => resolver.available_units(&opts.family)?,
            };
            print(&json!({ "family": opts.family, "units": units }), cli.pretty)?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Reconcile(opts) => (opts, None),
        Commands::Commit(opts) => {
            let commit = (opts.attempts, opts.resubmit);
            (opts.scenario, Some(commit))
        }
    };

    let scenario = Scenario::load(&opts.scenario)?;
    let registry = scenario.registry();
    let supplier = scenario.supplier.as_ref().map(scenario::SupplierRecord::account);
    let mut ctx = EngineContext::new(&registry, &config.engine);
    if let Some(account) = supplier.as_ref() {
        ctx = ctx.with_supplier(account);
    }
    debug!(events = scenario.events.len(), "scenario loaded");

    let built = PurchaseService::build(scenario.purchase_id, &scenario.events, &ctx, |id| {
        scenario.accounts.get(&id).copied()
    });
    let transaction = match built {
        Ok(transaction) => transaction,
        Err(err) => {
            let (err, report) = purchase_failure(err);
            print(&report, cli.pretty)?;
            return Ok(ExitCode::from(exit_status(&err)));
        }
    };

    let Some((attempts, resubmit)) = commit_opts else {
        print(&json!({ "transaction": transaction }), cli.pretty)?;
        return Ok(ExitCode::SUCCESS);
    };

    let mut store = InMemoryPurchaseStore::new().with_units(registry.clone());
    if let Some(account) = supplier {
        store = store.with_supplier(account);
    }
    for (account_id, balance) in &scenario.accounts {
        store = store.with_account(*account_id, *balance);
    }

    let receipt = match commit(&store, &transaction, attempts, resubmit).await {
        Ok(receipt) => receipt,
        Err(err) => {
            warn!(purchase_id = %transaction.id(), code = err.error_code(), "commit failed");
            print(&failure_report(&err, Vec::new()), cli.pretty)?;
            return Ok(ExitCode::from(exit_status(&err)));
        }
    };
    info!(purchase_id = %receipt.purchase_id, replayed = receipt.replayed, "commit finished");

    let supplier = store.supplier(transaction.supplier_id()).await;
    print(
        &json!({
            "transaction": transaction,
            "receipt": receipt,
            "supplier": supplier,
            "accounts": store.account_balances().await,
        }),
        cli.pretty,
    )?;
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    let cli = Cli::parse();
    run(cli, &config).await
}
