//! Steam Inventory - command line front-end
//!
//! Scans one game, or every known game, of a public Steam inventory and
//! prints the priced items with summary statistics.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use steam_inventory::export::export_to_path;
use steam_inventory::{
    Game, InventoryError, MultiGameReport, PricedItem, ScanConfig, ScanReport, Scanner, SteamId,
    KNOWN_GAMES,
};
use tokio_util::sync::CancellationToken;

/// Estimate the market value of a public Steam inventory
#[derive(Parser, Debug)]
#[command(name = "steam_inventory")]
#[command(version, about, long_about = None)]
struct Args {
    /// Steam ID, profile URL or custom profile name (prompted when missing)
    #[arg(env = "STEAM_INVENTORY_ID")]
    identity: Option<String>,

    /// Application id to scan, e.g. 730 for Counter-Strike 2
    #[arg(env = "STEAM_INVENTORY_APP_ID")]
    app_id: Option<u32>,

    /// Verbose output with skip counters and error kinds
    #[arg(long, env = "STEAM_INVENTORY_DEBUG", default_value_t = false)]
    debug: bool,

    /// Scan every known game instead of one application
    #[arg(long, env = "STEAM_INVENTORY_ALL_GAMES", default_value_t = false)]
    all_games: bool,

    /// Write priced items to this CSV file
    #[arg(long, env = "STEAM_INVENTORY_CSV")]
    csv: Option<PathBuf>,

    /// Give up and cancel the scan after this many seconds
    #[arg(long, env = "STEAM_INVENTORY_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Minimum spacing between market price lookups in milliseconds
    #[arg(long, env = "STEAM_INVENTORY_PRICE_INTERVAL_MS", default_value_t = 3000)]
    price_interval_ms: u64,

    /// Price only the first N assets
    #[arg(long, env = "STEAM_INVENTORY_MAX_ASSETS")]
    max_assets: Option<usize>,

    /// Number of most valuable items to list
    #[arg(long, env = "STEAM_INVENTORY_TOP", default_value_t = 5)]
    top: usize,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let (identity, app_id, all_games) = match args.identity.clone() {
        Some(identity) => (identity, args.app_id, args.all_games),
        None => match prompt_identity() {
            Ok(answers) => answers,
            Err(e) => {
                log::error!("Failed to read input: {}", e);
                std::process::exit(1);
            }
        },
    };

    let config = ScanConfig {
        price_interval: Duration::from_millis(args.price_interval_ms),
        max_priced_assets: args.max_assets,
        ..ScanConfig::default()
    };

    let scanner = match Scanner::new(config) {
        Ok(scanner) => scanner,
        Err(e) => {
            log::error!("Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let steam_id = match scanner.resolve(&identity).await {
        Ok(steam_id) => steam_id,
        Err(e) => {
            report_error(&e, args.debug);
            std::process::exit(1);
        }
    };
    println!("Steam ID: {}", steam_id);

    let timeout = args.timeout_secs.map(Duration::from_secs);

    let items = if all_games {
        match run_all_games(&scanner, &steam_id, timeout).await {
            Ok(report) => {
                print_multi_report(&report, &args);
                report.games.into_iter().flat_map(|r| r.items).collect()
            }
            Err(e) => {
                report_error(&e, args.debug);
                std::process::exit(1);
            }
        }
    } else {
        let game = Game::from_app_id(app_id.unwrap_or(steam_inventory::DEFAULT_APP_ID));
        match run_single(&scanner, &steam_id, game, timeout).await {
            Ok(report) => {
                print_report(&report, &args);
                report.items
            }
            Err(e) => {
                report_error(&e, args.debug);
                std::process::exit(1);
            }
        }
    };

    if let Some(path) = &args.csv {
        if let Err(e) = export_to_path(path, &items) {
            report_error(&e, args.debug);
            std::process::exit(1);
        }
        println!("Saved {} items to {}", items.len(), path.display());
    }
}

/// Asks for the profile and game when none were given on the command line.
/// An empty application id selects every known game.
fn prompt_identity() -> io::Result<(String, Option<u32>, bool)> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    print!("Steam ID, profile URL or custom name: ");
    io::stdout().flush()?;
    let identity = lines.next().transpose()?.unwrap_or_default();

    println!("Known games:");
    for game in KNOWN_GAMES {
        println!("  {:>7}  {}", game.app_id, game.name);
    }
    print!("Application id (empty for all games): ");
    io::stdout().flush()?;
    let answer = lines.next().transpose()?.unwrap_or_default();

    let answer = answer.trim();
    if answer.is_empty() {
        return Ok((identity, None, true));
    }

    match answer.parse::<u32>() {
        Ok(app_id) => Ok((identity, Some(app_id), false)),
        Err(_) => {
            log::warn!("'{}' is not an application id, scanning all games", answer);
            Ok((identity, None, true))
        }
    }
}

async fn run_single(
    scanner: &Scanner,
    steam_id: &SteamId,
    game: Game,
    timeout: Option<Duration>,
) -> Result<ScanReport, InventoryError> {
    match timeout {
        Some(budget) => scanner.scan_with_timeout(steam_id, game, budget).await,
        None => {
            scanner
                .scan(steam_id, game, &CancellationToken::new())
                .await
        }
    }
}

async fn run_all_games(
    scanner: &Scanner,
    steam_id: &SteamId,
    timeout: Option<Duration>,
) -> Result<MultiGameReport, InventoryError> {
    let cancel = CancellationToken::new();
    let scan = scanner.scan_all_games(steam_id, &KNOWN_GAMES, &cancel);

    match timeout {
        Some(budget) => match tokio::time::timeout(budget, scan).await {
            Ok(result) => result,
            Err(_) => {
                cancel.cancel();
                Err(InventoryError::Timeout(budget))
            }
        },
        None => scan.await,
    }
}

fn print_item(item: &PricedItem) {
    println!("  {} | {} | {}", item.name, item.item_type, item.price);
}

fn print_report(report: &ScanReport, args: &Args) {
    println!();
    println!("== {} ==", report.game);
    if let Some(cached_at) = report.cached_at {
        println!("(cached result from {})", cached_at.format("%Y-%m-%d %H:%M:%S"));
    }

    for item in &report.items {
        print_item(item);
    }

    if let Some(total) = report.total_count {
        println!("Items in inventory: {}", total);
    }
    if report.truncated {
        if let Some(limit) = args.max_assets {
            println!("Only the first {} assets were priced", limit);
        }
    }
    if let Some(cause) = &report.stopped_by {
        println!("Inventory read stopped early: {}", cause);
        if args.debug {
            println!("  kind: {}", cause.kind());
        }
    }

    if args.debug {
        println!(
            "Skipped: {} without description, {} not marketable, {} without market name, {} without price",
            report.skipped.no_description,
            report.skipped.not_marketable,
            report.skipped.no_market_hash,
            report.skipped.unpriced
        );
        println!("Price lookups: {}", report.price_lookups);
    }

    let stats = &report.stats;
    println!("Priced items: {}", stats.count);
    println!("Total value: {:.2}", stats.total_value);
    if let (Some(min), Some(max)) = (&stats.min, &stats.max) {
        println!("Cheapest: {} ({:.2})", min.name, min.value);
        println!("Most expensive: {} ({:.2})", max.name, max.value);
    }

    let top = report.top_items(args.top);
    if !top.is_empty() {
        println!("Top {}:", top.len());
        for (rank, item) in top.iter().enumerate() {
            println!("  {}. {} - {}", rank + 1, item.name, item.price);
        }
    }

    println!("Finished in {:.1}s", report.elapsed.as_secs_f64());
}

fn print_multi_report(report: &MultiGameReport, args: &Args) {
    if report.games.is_empty() {
        println!("No items found in any known game");
    }
    for game_report in &report.games {
        print_report(game_report, args);
    }

    println!();
    println!("== All games ==");
    for game_report in &report.games {
        println!(
            "  {}: {} items, {:.2}",
            game_report.game, game_report.stats.count, game_report.stats.total_value
        );
    }
    println!("Total: {} items, {:.2}", report.total_items, report.total_value);
    println!("Finished in {:.1}s", report.elapsed.as_secs_f64());
}

fn report_error(error: &InventoryError, debug: bool) {
    if debug {
        eprintln!("Error ({}): {}", error.kind(), error);
    } else {
        eprintln!("Error: {}", error);
    }
}
