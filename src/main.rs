use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use typer::{
    app::{App, Flow},
    app_dirs::AppDirs,
    bridge,
    config::{Config, FileConfigStore},
    runtime::{AppEvent, Runner, TerminalEventSource, Ticker},
    GameStatus, SessionEngine, Snapshot, TextSource,
};

/// typing practice with correctness gating and a progressive text bank
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Practice typing through a bank of texts ordered from short to long. Mistakes block progress until corrected, and every completed text is scored for speed and accuracy."
)]
pub struct Cli {
    /// bank file to draw texts from (JSON array of strings or string groups)
    #[clap(short = 'b', long)]
    bank: Option<PathBuf>,

    /// custom text to practice instead of the bank
    #[clap(short = 'p', long, conflicts_with = "file")]
    prompt: Option<String>,

    /// practice the contents of a text file
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// milliseconds between live metric refreshes
    #[clap(long)]
    tick_rate: Option<u64>,

    /// answer JSON-lines commands on stdin/stdout instead of drawing a UI
    #[clap(long)]
    serve: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let store = FileConfigStore::new();
    let config = store.load_or_create();
    let _log_guard = init_logging(&config, cli.serve);
    info!(path = %store.path().display(), "config loaded");

    let mut engine = SessionEngine::new(config.text_source(cli.bank.as_deref()));

    if cli.serve {
        info!("serving bridge protocol on stdio");
        bridge::serve(&mut engine, io::stdin().lock(), io::stdout().lock())?;
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty (use --serve for piped input)")
            .exit();
    }

    let snapshot = initial_snapshot(&mut engine, &cli)?;
    let ticker = Ticker::from_millis(cli.tick_rate.unwrap_or(config.tick_rate_ms));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(engine, snapshot);
    let result = start_tui(&mut terminal, &mut app, ticker);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

/// The terminal belongs to the UI, so logs go to a file there; the bridge logs to stderr.
/// Logging failures are reported once and the program runs without logs.
fn init_logging(config: &Config, serve: bool) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let (writer, guard) = if serve {
        tracing_appender::non_blocking(io::stderr())
    } else {
        let log_dir = AppDirs::log_dir();
        if let Err(err) = std::fs::create_dir_all(&log_dir) {
            eprintln!("logging disabled: cannot create {}: {err}", log_dir.display());
            return None;
        }
        tracing_appender::non_blocking(tracing_appender::rolling::never(&log_dir, "typer.log"))
    };

    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Some(guard),
        Err(err) => {
            eprintln!("logging disabled: {err}");
            None
        }
    }
}

fn initial_snapshot<S: TextSource>(
    engine: &mut SessionEngine<S>,
    cli: &Cli,
) -> typer::Result<Snapshot> {
    if let Some(ref prompt) = cli.prompt {
        return Ok(engine.set_text(prompt));
    }
    if let Some(ref path) = cli.file {
        return engine.load_text_file(path);
    }
    Ok(engine.current())
}

fn start_tui<B: Backend, S: TextSource>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
    ticker: Ticker,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(TerminalEventSource::new(), ticker);
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let event = runner.step();
        // idle ticks need no redraw
        let redraw = event != AppEvent::Tick || app.snapshot.metrics.status == GameStatus::Running;

        if app.handle_event(event) == Flow::Quit {
            break;
        }
        if redraw {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }
    }

    info!(completed = app.engine.history().len(), "exiting");
    Ok(())
}
