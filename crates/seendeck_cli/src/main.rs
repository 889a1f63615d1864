//! Command-line host for the empty-decks report.
//!
//! Stands in for the flashcard application: opens a collection database,
//! registers the menu action, dispatches it and prints the modal text.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use seendeck_core::db::open_db;
use seendeck_core::{
    default_log_level, init_logging, run_empty_decks_action, CardQueue, CardRepository, DeckId,
    DeckRepository, HostMenu, HostUi, MenuCommand, MenuRegistry, ReportConfig, ReportService,
    SqliteCardRepository, SqliteDeckRepository, SystemClock, EMPTY_DECKS_ACTION_ID,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "seendeck")]
#[command(about = "Lists decks that have no unseen cards left")]
#[command(version)]
struct Args {
    /// Path to the collection database (created when missing)
    #[arg(long)]
    db: PathBuf,

    /// Absolute directory for rotating log files; logging stays off without it
    #[arg(long)]
    log_dir: Option<String>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    /// Deck id to leave out of the report; repeatable. The Default deck is always
    /// left out unless `--include-default` is given
    #[arg(long = "exclude")]
    exclude: Vec<DeckId>,

    /// Report the Default deck like any other deck
    #[arg(long)]
    include_default: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the "Empty decks" menu action
    Report {
        /// Print the report as JSON instead of the modal text
        #[arg(long)]
        json: bool,
    },
    /// List registered Tools menu actions
    Menu,
    /// Create a deck (and any missing parents)
    AddDeck { name: String },
    /// Add one card to a deck
    AddCard {
        deck: String,
        /// Queue label, e.g. new|learning|review|suspended
        #[arg(long, default_value = "new")]
        queue: String,
        /// Home deck when the card sits in a filtered deck
        #[arg(long)]
        original: Option<String>,
    },
}

struct StdoutUi;

impl HostUi for StdoutUi {
    fn show_warning(&self, message: &str) {
        println!("{message}");
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Some(log_dir) = args.log_dir.as_deref() {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(|err| eyre!("{err}"))?;
    }

    let conn = open_db(&args.db)
        .wrap_err_with(|| format!("failed to open collection `{}`", args.db.display()))?;
    let decks = SqliteDeckRepository::new(&conn);
    let cards = SqliteCardRepository::new(&conn);

    let mut registry = MenuRegistry::new();
    registry.register_empty_decks()?;

    match args.command.unwrap_or(Command::Report { json: false }) {
        Command::Report { json } => {
            let config = ReportConfig::excluding(args.exclude, args.include_default);
            let mut service = ReportService::with_config(decks, cards, SystemClock, config);

            match registry.resolve(EMPTY_DECKS_ACTION_ID)? {
                MenuCommand::EmptyDecksReport if json => {
                    let report = service.build_report()?;
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                MenuCommand::EmptyDecksReport => {
                    run_empty_decks_action(&mut service, &StdoutUi)?;
                }
            }
        }
        Command::Menu => {
            for action in registry.actions_in(HostMenu::Tools) {
                println!("{}\t{}", action.id, action.label);
            }
        }
        Command::AddDeck { name } => {
            let deck = decks.create_deck(&name)?;
            println!("{}\t{}", deck.id, deck.name);
        }
        Command::AddCard {
            deck,
            queue,
            original,
        } => {
            let queue = CardQueue::parse(&queue).ok_or_else(|| eyre!("unknown queue `{queue}`"))?;
            let deck_id = resolve_deck(&decks, &deck)?;
            let original_deck_id = original
                .as_deref()
                .map(|name| resolve_deck(&decks, name))
                .transpose()?;
            let card = cards.add_card(deck_id, original_deck_id, queue)?;
            println!("{}\t{}\t{}", card.id, deck, card.queue.as_str());
        }
    }

    Ok(())
}

fn resolve_deck(decks: &impl DeckRepository, name: &str) -> Result<DeckId> {
    decks
        .deck_id_by_name(name)?
        .ok_or_else(|| eyre!("deck not found: `{name}`"))
}
