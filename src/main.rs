//! Idea Journal
//!
//! Record account risk settings, size positions from entry and stop,
//! journal trade ideas and export them as CSV.

mod app;
mod config;
mod db;
mod export;
mod journal;
mod models;
mod sizing;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use crate::app::{App, CommitOutcome};
use crate::config::JournalConfig;
use crate::db::Database;
use crate::journal::{Confirmation, JournalError};
use crate::models::numeric::fmt2;
use crate::models::IdeaRecord;

/// Trading idea journal CLI.
#[derive(Parser)]
#[command(name = "idea-journal")]
#[command(about = "Plan trades, size positions and keep a journal of ideas", long_about = None)]
struct Cli {
    /// Database file path
    #[arg(
        short,
        long,
        env = "IDEA_JOURNAL_DB",
        default_value = "sqlite:./idea_journal.db?mode=rwc"
    )]
    database: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "IDEA_JOURNAL_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or edit the account profile
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Show or edit the idea being prepared
    Idea {
        #[command(subcommand)]
        action: IdeaAction,
    },

    /// Add the current idea to the journal
    Add,

    /// List journal entries
    List {
        /// Only show entries containing every word (case-insensitive)
        #[arg(short, long, default_value = "")]
        filter: String,
    },

    /// Show one journal entry
    Show {
        /// Entry id
        id: Uuid,
    },

    /// Delete a journal entry
    Remove {
        /// Entry id
        id: Uuid,
    },

    /// Delete all journal entries
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Export the journal as CSV
    Export {
        /// Directory to write the file into
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Write the CSV to stdout instead of a file
        #[arg(long)]
        stdout: bool,
    },

    /// Show default settings
    Config,
}

#[derive(Subcommand)]
enum AccountAction {
    /// Show account settings and sizing for the current idea
    Show,

    /// Change account settings
    Set(AccountArgs),
}

#[derive(Args)]
struct AccountArgs {
    /// Account balance
    #[arg(long)]
    balance: Option<Decimal>,

    /// Risk per trade in percent
    #[arg(long)]
    risk_percent: Option<Decimal>,

    /// Default instrument
    #[arg(long)]
    pair: Option<String>,

    /// Price distance of one point
    #[arg(long)]
    point_size: Option<Decimal>,

    /// Value of one point per lot
    #[arg(long)]
    tick_value: Option<Decimal>,
}

#[derive(Subcommand)]
enum IdeaAction {
    /// Show the idea with reward:risk and lot size
    Show,

    /// Change idea fields
    Set(IdeaArgs),

    /// Start a fresh idea for today
    Reset,
}

#[derive(Args)]
struct IdeaArgs {
    /// Idea date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    pair: Option<String>,

    /// Higher-timeframe bias
    #[arg(long)]
    bias: Option<String>,

    /// Zones / S&D / Fib levels
    #[arg(long)]
    zones: Option<String>,

    #[arg(long)]
    entry: Option<String>,

    /// Stop loss
    #[arg(long)]
    sl: Option<String>,

    /// Take profit
    #[arg(long)]
    tp: Option<String>,

    /// Average true range
    #[arg(long)]
    atr: Option<String>,

    #[arg(long)]
    notes: Option<String>,

    /// High-impact news today
    #[arg(long)]
    high_impact_today: Option<bool>,

    /// High-impact news within 30 minutes
    #[arg(long = "within-30m")]
    within_30m: Option<bool>,

    /// Avoid trading during news
    #[arg(long)]
    avoid_news: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let today = Local::now().date_naive();
    let db = Database::new(&cli.database).await?;
    let mut app = App::load(JournalConfig::default(), db, today).await;

    match cli.command {
        Commands::Account { action } => match action {
            AccountAction::Show => print_account(&app),
            AccountAction::Set(args) => {
                app.update_account(|a| {
                    if let Some(v) = args.balance {
                        a.balance = v;
                    }
                    if let Some(v) = args.risk_percent {
                        a.risk_percent = v;
                    }
                    if let Some(v) = args.pair {
                        a.pair = v;
                    }
                    if let Some(v) = args.point_size {
                        a.point_size = v;
                    }
                    if let Some(v) = args.tick_value {
                        a.tick_value = v;
                    }
                })
                .await?;
                print_account(&app);
            }
        },

        Commands::Idea { action } => match action {
            IdeaAction::Show => print_idea(&app),
            IdeaAction::Set(args) => {
                app.update_draft(|d| {
                    if let Some(v) = args.date {
                        d.date = v;
                    }
                    if let Some(v) = args.pair {
                        d.pair = v;
                    }
                    if let Some(v) = args.bias {
                        d.bias_timeframe = v;
                    }
                    if let Some(v) = args.zones {
                        d.zones = v;
                    }
                    if let Some(v) = args.entry {
                        d.entry = v;
                    }
                    if let Some(v) = args.sl {
                        d.stop_loss = v;
                    }
                    if let Some(v) = args.tp {
                        d.take_profit = v;
                    }
                    if let Some(v) = args.atr {
                        d.atr = v;
                    }
                    if let Some(v) = args.notes {
                        d.notes = v;
                    }
                    if let Some(v) = args.high_impact_today {
                        d.news_guard.high_impact_today = v;
                    }
                    if let Some(v) = args.within_30m {
                        d.news_guard.within_30m = v;
                    }
                    if let Some(v) = args.avoid_news {
                        d.news_guard.avoid_news = v;
                    }
                })
                .await?;
                print_idea(&app);
            }
            IdeaAction::Reset => {
                app.reset_draft(today).await?;
                print_idea(&app);
            }
        },

        Commands::Add => match app.commit_idea().await? {
            CommitOutcome::Committed(record) => {
                println!(
                    "Added idea {} ({} R:R {} Lot {})",
                    record.id,
                    record.idea.pair,
                    fmt2(record.reward_risk_ratio),
                    fmt2(record.lot_size)
                );
                println!("{} ideas", app.state().journal.len());
            }
            CommitOutcome::Rejected(e) => {
                eprintln!("Please fill Entry, SL, and TP ({})", e);
                std::process::exit(1);
            }
        },

        Commands::List { filter } => {
            let view = app.filter(&filter);

            println!(
                "\n{:<10} {:<8} {:<16} {:<24} {:>9} {:>9} {:>9} {:>6} {:>6} {:>6} {:<6} {:<28} {}",
                "DATE", "PAIR", "BIAS", "ZONES", "ENTRY", "SL", "TP", "R:R", "LOT", "ATR", "NEWS", "NOTES", "ID"
            );
            println!("{}", "-".repeat(180));

            for r in &view {
                let news = format!(
                    "{}/{}",
                    if r.idea.news_guard.high_impact_today { "High" } else { "-" },
                    if r.idea.news_guard.within_30m { "30m" } else { "-" }
                );
                println!(
                    "{:<10} {:<8} {:<16} {:<24} {:>9} {:>9} {:>9} {:>6} {:>6} {:>6} {:<6} {:<28} {}",
                    r.idea.date.format("%Y-%m-%d"),
                    truncate(&r.idea.pair, 8),
                    truncate(&r.idea.bias_timeframe, 16),
                    truncate(&r.idea.zones, 24),
                    r.idea.entry,
                    r.idea.stop_loss,
                    r.idea.take_profit,
                    fmt2(r.reward_risk_ratio),
                    fmt2(r.lot_size),
                    r.idea.atr,
                    news,
                    truncate(&r.idea.notes.replace('\n', " "), 28),
                    r.id
                );
            }

            let shown = view.iter().count();
            let total = app.state().journal.len();
            if shown == total {
                println!("\n{} ideas", total);
            } else {
                println!("\n{} of {} ideas", shown, total);
            }
        }

        Commands::Show { id } => {
            let record = app
                .state()
                .journal
                .get(id)
                .ok_or(JournalError::NotFound(id))?;
            print_record(record);
        }

        Commands::Remove { id } => match app.remove_idea(id).await? {
            Some(_) => println!("Removed idea {}", id),
            None => println!("No idea with id {}", id),
        },

        Commands::Clear { yes } => {
            let count = app.state().journal.len();
            if count == 0 {
                println!("Journal is already empty.");
                return Ok(());
            }

            let confirmation = if yes {
                Confirmation::Granted
            } else {
                ask_confirmation(&format!("Clear all {} saved ideas? [y/N] ", count))?
            };

            match confirmation {
                Confirmation::Granted => {
                    let removed = app.clear_ideas(confirmation).await?;
                    println!("Cleared {} ideas.", removed);
                }
                Confirmation::Declined => println!("Nothing cleared."),
            }
        }

        Commands::Export { dir, stdout } => {
            let records = app.state().journal.records();
            if stdout {
                print!("{}", export::to_csv(records));
                io::stdout().flush()?;
            } else {
                let name = app.config().export_file_name(today);
                let path = export::write_csv(&dir, &name, records).await?;
                println!("Exported {} ideas to {}", records.len(), path.display());
            }
        }

        Commands::Config => {
            let config = app.config();

            println!("\n=== Default Account ===\n");
            println!("  Balance:              {}", config.account.balance);
            println!("  Risk per Trade:       {}%", config.account.risk_percent);
            println!("  Pair:                 {}", config.account.pair);
            println!("  Point Size:           {}", config.account.point_size);
            println!("  Value/Point/Lot:      {}", config.account.tick_value);

            println!("\n=== New Idea Template ===\n");
            println!("  Pair:                 {}", config.idea_pair);
            println!("  Bias:                 {}", config.idea_bias);
            println!("  Zones:                {}", config.idea_zones);
            println!("  Avoid News:           {}", yes_no(config.news_guard.avoid_news));

            println!("\n=== Storage ===\n");
            println!("  Database:             {}", cli.database);
            println!("  Export File:          {}", config.export_file_name(today));
        }
    }

    Ok(())
}

fn print_account<S: db::KeyValueStore>(app: &App<S>) {
    let account = &app.state().account;
    let sizing = app.metrics().sizing;

    println!("\n=== Account & Risk ===");
    println!("Balance:          {}", account.balance);
    println!("Risk per Trade:   {}%", account.risk_percent);
    println!("Pair:             {}", account.pair);
    println!("Point Size:       {}", account.point_size);
    println!("Value/Point/Lot:  {}", account.tick_value);

    println!("\n--- Sizing (current idea) ---");
    println!("Risk $:           ${}", fmt2(Some(sizing.risk_money)));
    println!("Stop Distance:    {} pts", fmt2(Some(sizing.stop_distance)));
    println!("Points @stop:     {}", fmt2(Some(sizing.points)));
    println!("Lot size:         {}", fmt2(Some(sizing.lot_size)));
}

fn print_idea<S: db::KeyValueStore>(app: &App<S>) {
    let draft = &app.state().draft;
    let metrics = app.metrics();

    println!("\n=== Idea Builder ===");
    println!("Date:             {}", draft.date.format("%Y-%m-%d"));
    println!("Pair:             {}", draft.pair);
    println!("Bias (D1/H4):     {}", draft.bias_timeframe);
    println!("Zones:            {}", draft.zones);
    println!("ATR:              {}", draft.atr);
    println!("Entry:            {}", draft.entry);
    println!("Stop Loss:        {}", draft.stop_loss);
    println!("Take Profit:      {}", draft.take_profit);
    println!("Notes:            {}", draft.notes);

    println!("\n--- News Guard ---");
    println!("High-impact today:  {}", yes_no(draft.news_guard.high_impact_today));
    println!("Within 30 minutes:  {}", yes_no(draft.news_guard.within_30m));
    println!("Avoid news:         {}", yes_no(draft.news_guard.avoid_news));

    let rr = if metrics.reward_risk.is_zero() {
        "-".to_string()
    } else {
        fmt2(Some(metrics.reward_risk))
    };
    println!("\n--- Calculated ---");
    println!("R : R:            {}", rr);
    println!("Lot (calc):       {}", fmt2(Some(metrics.sizing.lot_size)));

    if draft.news_guard.should_wait() {
        println!("\nTip: news within 30 minutes and avoiding news is on, skip entries until volatility settles.");
    }
}

fn print_record(record: &IdeaRecord) {
    let idea = &record.idea;

    println!("\n=== Idea {} ===", record.id);
    println!("Created:          {}", record.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Date:             {}", idea.date.format("%Y-%m-%d"));
    println!("Pair:             {}", idea.pair);
    println!("Bias:             {}", idea.bias_timeframe);
    println!("Zones:            {}", idea.zones);
    println!("Entry:            {}", idea.entry);
    println!("Stop Loss:        {}", idea.stop_loss);
    println!("Take Profit:      {}", idea.take_profit);
    println!("R:R:              {}", fmt2(record.reward_risk_ratio));
    println!("Lot:              {}", fmt2(record.lot_size));
    println!("ATR:              {}", idea.atr);
    println!(
        "News:             high-impact {}, within 30m {}, avoid {}",
        yes_no(idea.news_guard.high_impact_today),
        yes_no(idea.news_guard.within_30m),
        yes_no(idea.news_guard.avoid_news)
    );
    println!("Notes:            {}", idea.notes);
}

/// Prompt on stdout and read a yes/no answer from stdin.
fn ask_confirmation(prompt: &str) -> Result<Confirmation> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    info!(answer = %answer.trim(), "Clear confirmation");

    Ok(Confirmation::from_answer(&answer))
}

fn yes_no(on: bool) -> &'static str {
    if on {
        "Yes"
    } else {
        "No"
    }
}

/// Truncate a string with ellipsis if too long.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
