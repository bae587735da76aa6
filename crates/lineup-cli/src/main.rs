// Fantasy lineup CLI entry point.
//
// Startup sequence:
// 1. Load config (copies defaults/ into config/ on first run)
// 2. Initialize tracing (log to file, stdout is for prompts)
// 3. Load the catalog once for the session
// 4. Build the label codec
// 5. Run the requested command

mod catalog_source;
mod prompt;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use lineup_core::catalog::Catalog;
use lineup_core::codec::{self, LabelCodec};
use lineup_core::config::{self, Config};
use lineup_core::player::Position;
use lineup_core::roster;
use lineup_core::store::{self, SubmissionStore};
use lineup_core::submission::{self, LineupEntry, SubmissionContext, SubmitError};
use lineup_core::validate::Rules;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "lineup", version, about = "Build and submit fantasy lineups")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the labels offered for a position (Portero, Defensa, Mediocentro, Delantero)
    Options { position: String },
    /// Build a lineup interactively and submit it
    Pick,
    /// Submit a lineup file
    Submit {
        file: PathBuf,
        /// Validate only; nothing is written to the store
        #[arg(long)]
        dry_run: bool,
    },
    /// Print stored lineups
    Entries {
        /// Only show rows for this round
        #[arg(long)]
        round: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Load config
    let config = config::load_config().context("failed to load configuration")?;

    // 2. Initialize tracing
    init_tracing(&config.log_dir)?;
    info!(
        "Config loaded: league={}, round={}, cap={}",
        config.league.name,
        config.league.round,
        config.league.budget_cap_price()
    );

    if let Command::Entries { round } = &cli.command {
        return print_entries(&config, round.as_deref());
    }

    // 3. Load the catalog
    let catalog = catalog_source::load(&config.catalog).await?;

    // 4. Build the codec
    let codec = codec::build(config.league.label_codec, &catalog)
        .context("failed to build label codec")?;

    // 5. Run the command
    match cli.command {
        Command::Options { position } => print_options(&catalog, codec.as_ref(), &position),
        Command::Pick => {
            let stdin = io::stdin();
            let mut prompter = prompt::Prompter::new(stdin.lock(), io::stdout());
            let entry = prompt::pick_lineup(
                &mut prompter,
                &catalog,
                codec.as_ref(),
                config.league.budget_cap_price(),
                config.predictions.as_ref(),
            )?;
            let answer = prompter.ask("Submit this lineup? [y/N]")?;
            if !answer.eq_ignore_ascii_case("y") {
                println!("Not submitted.");
                return Ok(());
            }
            submit_entry(&config, &catalog, codec.as_ref(), &entry, false)
        }
        Command::Submit { file, dry_run } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read lineup file {}", file.display()))?;
            let entry: LineupEntry = toml::from_str(&text)
                .with_context(|| format!("failed to parse lineup file {}", file.display()))?;
            submit_entry(&config, &catalog, codec.as_ref(), &entry, dry_run)
        }
        Command::Entries { .. } => Ok(()),
    }
}

fn print_options(catalog: &Catalog, codec: &dyn LabelCodec, position: &str) -> anyhow::Result<()> {
    let Some(position) = Position::from_str_pos(position) else {
        bail!("unknown position '{position}'");
    };
    for (i, label) in roster::choices(catalog, codec, position).iter().enumerate() {
        println!("{:>3}) {}", i + 1, label);
    }
    Ok(())
}

fn submit_entry(
    config: &Config,
    catalog: &Catalog,
    codec: &dyn LabelCodec,
    entry: &LineupEntry,
    dry_run: bool,
) -> anyhow::Result<()> {
    let ctx = SubmissionContext {
        round_label: &config.league.round,
        catalog,
        codec,
        rules: Rules {
            budget_cap: config.league.budget_cap_price(),
            predictions: config.predictions.as_ref(),
        },
    };

    if dry_run {
        let record = submission::prepare(entry, &ctx).map_err(report)?;
        let filled = record.names.iter().filter(|n| !n.is_empty()).count();
        println!(
            "Lineup is valid ({filled} players, value {}). Nothing was stored.",
            record.total
        );
        return Ok(());
    }

    let store = store::open(&config.store).context("failed to open submission store")?;
    let record = submission::submit(store.as_ref(), entry, &ctx).map_err(report)?;
    println!(
        "Lineup {} stored for {} ({}, value {}).",
        record.id, record.user, record.round_label, record.total
    );
    Ok(())
}

/// Turn a submission failure into the message shown to the user.
fn report(err: SubmitError) -> anyhow::Error {
    match err {
        SubmitError::Invalid(e) => anyhow::anyhow!("lineup not accepted: {e}"),
        SubmitError::Roster(e) => anyhow::anyhow!("lineup not accepted: {e}"),
        SubmitError::StoreWriteFailed { id, source } => {
            error!("store write failed for {}: {}", id, source);
            anyhow::Error::new(source)
                .context(format!("lineup {id} was valid but could not be saved; submit it again"))
        }
    }
}

fn print_entries(config: &Config, round: Option<&str>) -> anyhow::Result<()> {
    let store = store::open(&config.store).context("failed to open submission store")?;
    let rows = store.rows().context("failed to read stored lineups")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut shown = 0usize;
    for row in &rows {
        if let Some(round) = round {
            if row.get(2).map(String::as_str) != Some(round) {
                continue;
            }
        }
        writeln!(out, "{}", row.join(" | "))?;
        shown += 1;
    }
    writeln!(out, "{shown} lineup(s)")?;
    Ok(())
}

/// Initialize tracing to log to a file (stdout is used for prompts).
fn init_tracing(log_dir: &std::path::Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("lineup.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lineup_cli=info,lineup_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
