use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use palaver_core::{Config, EntryParser, count_lines, find_transcript, logging};
use palaver_store::EntryStore;
use palaver_ui::{App, WindowOptions};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const PROGRESS_BAR_WIDTH: usize = 40;

/// Palaver - terminal viewer for exported chat transcripts
#[derive(Parser, Debug)]
#[command(name = "palaver")]
#[command(about = "Browse an exported chat transcript in the terminal", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the extracted chat folder
    #[arg(value_name = "FOLDER")]
    folder: PathBuf,

    /// Your display name, for right-aligned messages
    #[arg(long, value_name = "NAME")]
    me: Option<String>,

    /// Path to palaver.toml (default: built-in defaults)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print a transcript summary and exit without opening the viewer
    #[arg(long)]
    info: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let _log_guard = logging::init_logging(Some(config.logging.clone())).context("failed to initialize logging")?;

    let transcript = find_transcript(&cli.folder).context("could not locate a transcript")?;
    if cli.verbose {
        println!("{} Transcript: {}", "Info:".blue().bold(), transcript.display());
        println!("{} Batch size: {}", "Info:".blue().bold(), config.window.batch_size);
        println!("{} Visible cap: {}", "Info:".blue().bold(), config.window.visible_cap);
        if let Some(me) = &cli.me {
            println!("{} Local participant: {}", "Info:".blue().bold(), me.cyan());
        }
    }

    let store = parse_transcript(&transcript)?;
    info!(total = store.total(), "transcript parsed");

    if cli.info {
        print_info(&transcript, &store);
        return Ok(());
    }

    let media_root = transcript.parent().unwrap_or(Path::new(".")).to_path_buf();
    let options = WindowOptions {
        batch_size: config.window.batch_size,
        visible_cap: config.window.visible_cap,
        unit_spacing: config.window.unit_spacing,
        local_participant: cli.me,
    };

    let mut app = App::new(store, options, media_root);
    app.run().context("viewer failed")?;

    Ok(())
}

/// Load the config file when one was given; defaults otherwise.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            Config::from_file(path).with_context(|| format!("failed to load config from {}", path.display()))
        }
        None => Ok(Config::default()),
    }
}

/// Drain the parser to completion with a terminal progress bar.
fn parse_transcript(path: &Path) -> Result<EntryStore> {
    let total_lines = count_lines(path).context("could not read the transcript")?;
    let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;

    println!("Parsing chat file...");
    let parser = EntryParser::new(BufReader::new(file)).with_progress(total_lines, show_progress);
    let store = EntryStore::from_entries(parser);
    println!();

    Ok(store)
}

/// 40-column progress bar, redrawn in place.
fn show_progress(consumed: usize, total: usize) {
    if total == 0 || (consumed % 64 != 0 && consumed != total) {
        return;
    }
    print!("\r{}", render_progress(consumed, total));
    let _ = std::io::stdout().flush();
}

fn render_progress(consumed: usize, total: usize) -> String {
    let filled = if total == 0 { 0 } else { PROGRESS_BAR_WIDTH * consumed / total };
    let bar: String =
        "█".repeat(filled.min(PROGRESS_BAR_WIDTH)) + &"-".repeat(PROGRESS_BAR_WIDTH.saturating_sub(filled));
    format!("Parsing chat: [{bar}] {consumed}/{total}")
}

/// Print a transcript summary without opening the viewer.
fn print_info(transcript: &Path, store: &EntryStore) {
    println!("{}", "Transcript".green().bold().underline());
    println!("  File: {}", transcript.display().cyan());
    println!("  Messages: {}", store.total().to_string().cyan());

    if let Some((first, last)) = store.date_range() {
        println!("  From: {}", first.format("%d %B %Y").to_string().cyan());
        println!("  To:   {}", last.format("%d %B %Y").to_string().cyan());
    }

    let senders = store.senders();
    println!("  Participants: {}", senders.len().to_string().cyan());
    for sender in senders {
        println!("    - {}", sender.cyan());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_requires_folder() {
        assert!(Cli::try_parse_from(["palaver"]).is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["palaver", "/chats/holiday"]).unwrap();
        assert_eq!(cli.folder, PathBuf::from("/chats/holiday"));
        assert!(cli.me.is_none());
        assert!(cli.config.is_none());
        assert!(!cli.info);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_with_me() {
        let cli = Cli::try_parse_from(["palaver", "/chats", "--me", "Alice"]).unwrap();
        assert_eq!(cli.me, Some("Alice".to_string()));
    }

    #[test]
    fn test_cli_with_config_and_flags() {
        let cli = Cli::try_parse_from(["palaver", "/chats", "--config", "/tmp/p.toml", "--info", "--verbose"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.toml")));
        assert!(cli.info);
        assert!(cli.verbose);
    }

    #[test]
    fn test_load_config_default_when_absent() {
        let config = load_config(None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("palaver.toml");
        std::fs::write(&path, "[window]\nbatch_size = 10\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.window.batch_size, 10);
    }

    #[test]
    fn test_load_config_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        assert!(load_config(Some(&temp.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_render_progress() {
        assert_eq!(render_progress(0, 100), format!("Parsing chat: [{}] 0/100", "-".repeat(40)));
        assert_eq!(render_progress(100, 100), format!("Parsing chat: [{}] 100/100", "█".repeat(40)));

        let half = render_progress(50, 100);
        assert!(half.contains(&"█".repeat(20)));
        assert!(half.contains("50/100"));
    }

    #[test]
    fn test_parse_transcript_end_to_end() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("_chat.txt");
        std::fs::write(&path, "[3/4/25, 10:00] Alice: hi\n[3/4/25, 10:05] Bob: hey\n").unwrap();

        let store = parse_transcript(&path).unwrap();
        assert_eq!(store.total(), 2);
        assert_eq!(store.senders(), vec!["Alice", "Bob"]);
    }
}
