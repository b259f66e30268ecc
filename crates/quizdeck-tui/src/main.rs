//! Quizdeck - a terminal front-end for a quiz backend.
//!
//! Shows the signed-in user's quizzes as a grid of cards, with delete,
//! edit and open actions on each card, and links out to the web views
//! for adding and uploading quizzes.

mod app;
mod ui;
mod utils;

#[cfg(test)]
mod test_support;

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quizdeck_core::auth::{ClientStorage, MemoryStorage};
use quizdeck_core::{ApiClient, Config, Route, Session};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name inside the data directory
const LOG_FILE: &str = "quizdeck.log";

/// Command line options
#[derive(Debug, Default, PartialEq)]
struct Options {
    /// Keep the credential in memory only
    ephemeral: bool,
    /// Route to open after mounting the list
    route: Option<Route>,
    /// Print quiz names to stdout and exit
    list: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options> {
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--ephemeral" => options.ephemeral = true,
            "--list" => options.list = true,
            "--route" => {
                let path = args.next().context("--route needs a path, e.g. /upload")?;
                let route = Route::parse(&path)
                    .with_context(|| format!("Unknown route: {}", path))?;
                options.route = Some(route);
            }
            other => anyhow::bail!("Unknown argument: {}", other),
        }
    }

    Ok(options)
}

/// Initialize the tracing subscriber for logging.
///
/// The TUI owns the terminal, so logs go to a file in the data directory;
/// `--list` mode logs to stderr. Use RUST_LOG to control the level
/// (e.g. RUST_LOG=quizdeck=debug).
fn init_tracing(config: &Config, to_stderr: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = config
        .data_dir()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());

    match log_dir {
        Some(dir) if !to_stderr => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        _ => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

fn open_storage(config: &Config, options: &Options) -> Result<Box<dyn ClientStorage>> {
    if options.ephemeral {
        return Ok(Box::new(MemoryStorage::new()));
    }
    config.open_storage()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let options = parse_args(std::env::args().skip(1))?;

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // Initialize logging
    let _log_guard = init_tracing(&config, options.list);
    if let Some(e) = config_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    info!(api = %config.api_url(), "Quizdeck starting");

    let session = Session::load(open_storage(&config, &options)?);
    let api = ApiClient::new(config.api_url(), config.request_timeout())?;

    if options.list {
        return list_quizzes(config, session, api).await;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and mount the quiz list
    let mut app = App::new(config, session, Arc::new(api));
    app.mount();
    if let Some(route) = options.route {
        app.navigate(route);
    }

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Quizdeck shutting down");
    Ok(())
}

/// Print the quiz names to stdout, signing in at the prompt if needed
async fn list_quizzes(mut config: Config, mut session: Session, api: ApiClient) -> Result<()> {
    if !session.is_authenticated() {
        let username = prompt_username(config.last_username.as_deref())?;
        let password = rpassword::prompt_password("Password: ")?;

        let token = api
            .authenticate(&username, &password)
            .await
            .context("Login failed")?;
        if let Err(e) = session.sign_in(token) {
            warn!(error = %e, "Failed to persist credential");
        }

        config.last_username = Some(username);
        if let Err(e) = config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    api.set_token(session.token().map(str::to_string));
    let quizzes = api
        .fetch_quizzes()
        .await
        .context("Không thể tải danh sách quiz.")?;

    let mut stdout = io::stdout().lock();
    for quiz in &quizzes {
        writeln!(stdout, "{}", quiz.quiz_name)?;
    }
    Ok(())
}

fn prompt_username(default: Option<&str>) -> Result<String> {
    let mut stderr = io::stderr();
    match default {
        Some(name) => write!(stderr, "Username [{}]: ", name)?,
        None => write!(stderr, "Username: ")?,
    }
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let entered = line.trim();

    match (entered.is_empty(), default) {
        (true, Some(name)) => Ok(name.to_string()),
        (true, None) => anyhow::bail!("Username required"),
        (false, _) => Ok(entered.to_string()),
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_defaults() {
        assert_eq!(parse_args(args(&[])).unwrap(), Options::default());
    }

    #[test]
    fn test_parse_args_flags() {
        let options = parse_args(args(&["--ephemeral", "--route", "/quiz/math-101"])).unwrap();
        assert!(options.ephemeral);
        assert!(!options.list);
        assert_eq!(options.route, Some(Route::QuizDetail("math-101".to_string())));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(args(&["--route"])).is_err());
        assert!(parse_args(args(&["--route", "/nowhere"])).is_err());
        assert!(parse_args(args(&["--verbose"])).is_err());
    }
}
