use std::{
    io::{self, Write},
    panic,
    path::PathBuf,
    str::FromStr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    style::ResetColor,
    terminal::{LeaveAlternateScreen, disable_raw_mode},
};
use tracing::{info, warn};
use tuirealm::{
    PollStrategy,
    terminal::{CrosstermTerminalAdapter, TerminalBridge},
};

use dnd_kanban::{
    app::App,
    cli::{self, RootCommand},
    logging::{init_logging, print_log_location},
    persistence::{FileStore, PersistenceGateway},
    realm::{RootId, apply_message, init_application, should_quit},
    settings::Settings,
    theme::ThemeMode,
};

#[derive(Parser, Debug)]
#[command(
    name = "dnd-kanban",
    about = "Terminal kanban board with mouse drag-and-drop",
    long_about = "A TUI kanban board: drag cards between columns and reorder columns with the mouse. The board is saved locally after every change.",
    version,
    author
)]
struct Cli {
    /// Board store file; overrides `storage_path` from settings.
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Start in this theme without changing the saved preference.
    #[arg(long, value_name = "light|dark")]
    theme: Option<String>,

    #[command(subcommand)]
    command: Option<RootCommand>,
}

enum RunOutcome {
    Continue,
    Exit(i32),
}

static TERMINAL_RESTORED: AtomicBool = AtomicBool::new(false);

fn main() -> Result<()> {
    let log_path = match init_logging() {
        Ok(path) => Some(path),
        Err(err) => {
            eprintln!("warning: failed to initialize logging: {err}");
            None
        }
    };
    if let Some(path) = log_path.as_ref() {
        install_panic_hook_with_log(path.clone());
    }

    match run_app() {
        Ok(RunOutcome::Continue) => {
            if let Some(path) = log_path.as_ref() {
                print_log_location(path);
            }
            Ok(())
        }
        Ok(RunOutcome::Exit(code)) => {
            std::process::exit(code);
        }
        Err(err) => {
            if let Some(path) = log_path.as_ref() {
                print_log_location(path);
            }
            Err(err)
        }
    }
}

fn run_app() -> Result<RunOutcome> {
    let cli = Cli::parse();

    let mut settings = Settings::load();
    if let Some(store) = cli.store {
        settings.storage_path = Some(store);
    }
    let store = open_store(&settings)?;
    info!("using board store at {}", store.path().display());
    let mut gateway = PersistenceGateway::new(store);

    if let Some(command) = cli.command {
        let stdout = io::stdout();
        let code = cli::run(command, &mut gateway, &mut stdout.lock());
        return Ok(RunOutcome::Exit(code));
    }

    let theme_override = cli.theme.as_deref().and_then(|value| {
        let parsed = ThemeMode::from_str(value).ok();
        if parsed.is_none() {
            warn!("ignoring unknown theme '{value}'");
        }
        parsed
    });

    let _guard = TerminalGuard;
    let mut terminal = setup_terminal()?;

    let app = Arc::new(Mutex::new(App::new(gateway, settings, theme_override)));
    let mut realm = init_application(Arc::clone(&app))?;

    let mut redraw = true;
    while !should_quit(&app)? {
        if redraw {
            terminal
                .draw(|frame| realm.view(&RootId::Board, frame, frame.area()))
                .context("failed to render frame")?;
            redraw = false;
        }

        let messages = realm
            .tick(PollStrategy::UpTo(16))
            .context("failed to process tui-realm tick")?;

        if !messages.is_empty() {
            redraw = true;
        }

        for message in messages {
            apply_message(&app, message)?;
        }
    }

    let _ = restore_terminal();

    Ok(RunOutcome::Continue)
}

fn open_store(settings: &Settings) -> Result<FileStore> {
    settings
        .storage_path
        .clone()
        .or_else(FileStore::default_path)
        .map(FileStore::new)
        .context("unable to determine a data directory for the board store; pass --store")
}

fn setup_terminal() -> Result<TerminalBridge<CrosstermTerminalAdapter>> {
    TERMINAL_RESTORED.store(false, Ordering::SeqCst);

    let mut terminal =
        TerminalBridge::new_crossterm().context("failed to initialize terminal bridge")?;

    terminal
        .enable_raw_mode()
        .context("failed to enable raw mode")?;
    terminal
        .enter_alternate_screen()
        .context("failed to enter alternate screen")?;
    execute!(io::stdout(), EnableMouseCapture).context("failed to enable mouse capture")?;

    Ok(terminal)
}

fn install_panic_hook_with_log(log_path: PathBuf) {
    let previous_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        eprintln!();
        eprintln!("  Log file: {}", log_path.display());
        eprintln!();
        previous_hook(panic_info);
    }));
}

fn restore_terminal() -> Result<()> {
    if TERMINAL_RESTORED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let _ = disable_raw_mode();

    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        DisableMouseCapture,
        LeaveAlternateScreen,
        Show,
        ResetColor
    );
    let _ = stdout.flush();

    Ok(())
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}
