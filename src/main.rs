use anyhow::{Context, Result};
use clap::Parser;
use nbnotes::storage::codec;
use nbnotes::{
    reconcile, Cli, Command, Config, Console, ExternalLauncher, InvertedIndex, NoteStore,
    TerminalSession,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = Config::from_env().context("failed to resolve the notes directory")?;
    config
        .init()
        .with_context(|| format!("failed to create {}", config.notes_dir.display()))?;

    match cli.command() {
        Command::Reindex => handle_reindex(&config),
        Command::Create { text } => handle_create(&config, &text),
        Command::Console { query } => handle_console(&config, query),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("NB_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_reindex(config: &Config) -> Result<()> {
    let mut index = InvertedIndex::new();
    reconcile(&config.notes_dir, &mut index).context("failed to read the notes directory")?;
    codec::save(&index, &config.index_path)
        .with_context(|| format!("failed to save {}", config.index_path.display()))?;

    println!(
        "Indexed {} notes ({} distinct words).",
        index.note_count(),
        index.word_count()
    );
    Ok(())
}

fn handle_create(config: &Config, text: &str) -> Result<()> {
    let mut index = load_index(config)?;
    let store = NoteStore::from_config(config);
    let note = store.create(text).context("failed to write the new note")?;
    index.add_document(text, &note.note_id, note.modified);
    codec::save(&index, &config.index_path)
        .with_context(|| format!("failed to save {}", config.index_path.display()))?;

    println!("{}", note.note_id);
    Ok(())
}

fn handle_console(config: &Config, query: String) -> Result<()> {
    let index = load_index(config)?;
    let mut console = Console::new(
        NoteStore::from_config(config),
        index,
        config.index_path.clone(),
        ExternalLauncher::from_config(config),
        query,
    );

    let mut session = TerminalSession::acquire().context("failed to set up the terminal")?;
    let outcome = console.run(&mut session);
    drop(session);
    outcome.context("console failed")
}

/// Load the persisted index and bring it up to date with the notes on disk
fn load_index(config: &Config) -> Result<InvertedIndex> {
    let mut index = codec::load(&config.index_path)
        .with_context(|| format!("failed to load {}", config.index_path.display()))?;
    let report =
        reconcile(&config.notes_dir, &mut index).context("failed to read the notes directory")?;
    if !report.is_empty() {
        codec::save(&index, &config.index_path)
            .with_context(|| format!("failed to save {}", config.index_path.display()))?;
    }
    Ok(index)
}
