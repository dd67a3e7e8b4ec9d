//! stakewise-rewards CLI: vault registry, defaults, rewards retrieval, export.

use clap::{Parser, Subcommand};
use stakewise_rewards::rewards::dates::{
    date_to_epoch_ms, format_iso_date, now_epoch_ms, parse_iso_date,
};
use stakewise_rewards::{App, Network, RewardsClient, RewardsQuery, SqliteStore};
use stakewise_rewards_export::{export_filename, write_rewards_csv};
use std::path::{Path, PathBuf};
use time::UtcOffset;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();
    let cli = Cli::parse();
    match cli.command {
        Command::Vault(args) => run_vault(args),
        Command::Defaults(args) => run_defaults(args),
        Command::Rewards(args) => run_rewards(args),
        Command::Export(args) => run_export(args),
    }
}

#[derive(Parser)]
#[command(name = "stakewise-rewards")]
#[command(author = "hwatson <hw.stakeops@outlook.com>")]
#[command(about = "Track and export StakeWise vault staking rewards")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage the registered vault list.
    Vault(VaultArgs),
    /// Save default user address and from-date.
    Defaults(DefaultsArgs),
    /// Retrieve rewards for a vault/user pair and print them.
    Rewards(RewardsArgs),
    /// Retrieve rewards and write them to a CSV spreadsheet.
    Export(ExportArgs),
}

#[derive(Parser)]
struct VaultArgs {
    #[command(subcommand)]
    action: VaultAction,
    #[arg(long, default_value = "./data/prefs.sqlite")]
    store: PathBuf,
}

#[derive(Subcommand)]
enum VaultAction {
    /// List registered vaults, optionally for one network.
    List {
        #[arg(long)]
        network: Option<Network>,
    },
    /// Register a vault. Duplicate names/addresses are permitted, but an
    /// exact duplicate of an existing tuple is refused.
    Add {
        #[arg(long)]
        network: Network,
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
    },
    /// Remove the first exact (network, name, address) match.
    Delete {
        #[arg(long)]
        network: Network,
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
    },
}

#[derive(Parser)]
struct DefaultsArgs {
    #[arg(long)]
    user_address: Option<String>,
    /// ISO date, e.g. 2023-11-29.
    #[arg(long)]
    from_date: Option<String>,
    #[arg(long, default_value = "./data/prefs.sqlite")]
    store: PathBuf,
}

#[derive(Parser)]
struct FetchOpts {
    #[arg(long)]
    network: Network,
    /// Vault address to query; defaults to the first vault on the network.
    #[arg(long)]
    vault: Option<String>,
    /// Overrides the saved default user address.
    #[arg(long)]
    user_address: Option<String>,
    /// Window start, ISO date; defaults to the saved from-date.
    #[arg(long)]
    from: Option<String>,
    /// Window end, ISO date; defaults to now.
    #[arg(long)]
    to: Option<String>,
    #[arg(long, default_value = "./data/prefs.sqlite")]
    store: PathBuf,
}

#[derive(Parser)]
struct RewardsArgs {
    #[command(flatten)]
    opts: FetchOpts,
}

#[derive(Parser)]
struct ExportArgs {
    #[command(flatten)]
    opts: FetchOpts,
    #[arg(long, default_value = "./exports")]
    out_dir: PathBuf,
}

fn open_app(store_path: &Path) -> Result<App, Box<dyn std::error::Error>> {
    let store = SqliteStore::open(store_path)?;
    Ok(App::initialize(Box::new(store)))
}

fn run_vault(args: VaultArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_app(&args.store)?;
    match args.action {
        VaultAction::List { network } => {
            for vault in app.registry().vaults() {
                if network.is_some_and(|n| n != vault.network) {
                    continue;
                }
                println!("{}\t{}: {}", vault.network, vault.name, vault.address);
            }
        }
        VaultAction::Add {
            network,
            name,
            address,
        } => {
            app.set_network(network);
            app.set_form_name(name.clone());
            app.set_form_address(address.clone());
            app.add_vault()?;
            println!("registered {} ({}) on {}", name, address, network);
        }
        VaultAction::Delete {
            network,
            name,
            address,
        } => {
            app.set_network(network);
            app.set_form_name(name.clone());
            app.set_form_address(address);
            if app.delete_vault()? {
                println!("deleted {} on {}", name, network);
            } else {
                println!("no matching vault; nothing deleted");
            }
        }
    }
    Ok(())
}

fn run_defaults(args: DefaultsArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.user_address.is_none() && args.from_date.is_none() {
        return Err("nothing to save: pass --user-address and/or --from-date".into());
    }
    let mut app = open_app(&args.store)?;
    if let Some(address) = args.user_address {
        app.save_user_address(address);
        println!("default user address saved");
    }
    if let Some(raw) = args.from_date {
        let date = parse_iso_date(&raw)?;
        app.save_from_date(date);
        println!("default from-date saved: {}", format_iso_date(date));
    }
    Ok(())
}

/// Resolve query parameters against saved defaults, run one fetch, and
/// leave the results in the app's session.
fn fetch_into_session(app: &mut App, opts: &FetchOpts) -> Result<(), Box<dyn std::error::Error>> {
    app.set_network(opts.network);
    if let Some(vault) = &opts.vault {
        let view = app.view();
        let index = view
            .options
            .iter()
            .position(|o| o.address.eq_ignore_ascii_case(vault))
            .ok_or_else(|| format!("vault {} is not registered on {}", vault, opts.network))?;
        app.select_option(index)?;
    }
    let selected = app
        .view()
        .selected
        .ok_or_else(|| format!("no vault registered for {}", opts.network))?;

    let user_address = opts
        .user_address
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| app.user_address().to_string());
    if user_address.is_empty() {
        return Err(
            "no user address given and none saved; see `stakewise-rewards defaults`".into(),
        );
    }

    let from = match &opts.from {
        Some(raw) => parse_iso_date(raw)?,
        None => app.from_date(),
    };
    let date_to_ms = match &opts.to {
        Some(raw) => date_to_epoch_ms(parse_iso_date(raw)?),
        None => now_epoch_ms(),
    };
    let query = RewardsQuery {
        date_from_ms: date_to_epoch_ms(from),
        date_to_ms,
        user_address,
        vault_address: selected.address.clone(),
    };

    // Grab the local offset before the runtime spawns worker threads.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let client = RewardsClient::for_network(opts.network, offset)?;
    app.begin_fetch()?;
    let rt = tokio::runtime::Runtime::new()?;
    match rt.block_on(client.fetch_rewards(&query)) {
        Ok(records) => {
            info!(count = records.len(), vault = %selected.address, "rewards retrieved");
            app.complete_fetch(records);
            Ok(())
        }
        Err(e) => {
            app.abort_fetch();
            Err(e.into())
        }
    }
}

fn run_rewards(args: RewardsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_app(&args.opts.store)?;
    fetch_into_session(&mut app, &args.opts)?;
    println!(
        "{:<12}  {:>16}  {:>20}",
        "Date", "Daily Rewards", "Daily Rewards (GBP)"
    );
    for record in app.session().records() {
        println!(
            "{:<12}  {:>16}  {:>20}",
            format_iso_date(record.date),
            record.daily_reward,
            record.daily_reward_gbp
        );
    }
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_app(&args.opts.store)?;
    fetch_into_session(&mut app, &args.opts)?;
    let selected = app
        .view()
        .selected
        .ok_or("no vault selected after fetch")?;
    std::fs::create_dir_all(&args.out_dir)?;
    let out_path = args
        .out_dir
        .join(export_filename(app.network(), &selected.name));
    write_rewards_csv(app.session().records(), &out_path)?;
    info!(?out_path, rows = app.session().records().len(), "export complete");
    println!("{}", out_path.display());
    Ok(())
}
