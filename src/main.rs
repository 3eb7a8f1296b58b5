use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use timekeep_core::app::AppState;
use timekeep_core::input::{Key, KeyPress};
use timekeep_core::tracker::DEFAULT_TICK_MS;
use timekeep_core::ui;
use timekeep_core::{JsonFileStore, ResumePolicy, SystemClock, TimeTracker, TrackerOptions};

/// Poll timeout while no timer is running.
const IDLE_POLL: Duration = Duration::from_secs(1);

/// How often running timers are folded into the saved data.
const CHECKPOINT_EVERY: Duration = Duration::from_secs(60);

// ── Key event conversion ─────────────────────────────────────────────────

fn convert_key(key: crossterm::event::KeyEvent) -> KeyPress {
    let code = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => Key::Other,
    };
    KeyPress {
        key: code,
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
    }
}

// ── Config ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CliConfig {
    data_dir: Option<PathBuf>,
    tick_ms: Option<u64>,
    count_offline_gap: Option<bool>,
}

fn config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set; please set HOME")?;
    Ok(Path::new(&home).join(".config/timekeep/config.json"))
}

fn load_config() -> CliConfig {
    let Ok(path) = config_path() else {
        return CliConfig::default();
    };
    fs::read_to_string(&path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

fn persist_config(cfg: &CliConfig) -> Result<()> {
    let path = config_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let content = serde_json::to_string_pretty(cfg)?;
    fs::write(&path, content)?;
    Ok(())
}

fn resolve_data_dir_interactive(preferred: Option<PathBuf>, cfg: &CliConfig) -> Result<PathBuf> {
    if let Some(path) = preferred.or_else(|| cfg.data_dir.clone()) {
        return Ok(path);
    }
    println!("Data folder not set. Enter a path to use (will be created if missing):");
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        bail!("Data folder not provided");
    }
    let path = PathBuf::from(trimmed);
    fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(path)
}

// ── Logging ──────────────────────────────────────────────────────────────

/// Logs go to a file: the terminal belongs to the UI.
fn init_tracing(log_file: &Path) -> Result<()> {
    if let Some(dir) = log_file.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!("Failed to install logger: {err}"))?;
    Ok(())
}

// ── Main ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "timekeep")]
#[command(about = "Track time spent on personal projects", long_about = None)]
struct Args {
    /// Folder holding projects.json (useful for testing)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Refresh interval of running timers, in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Also count the time the app was closed for timers left running
    #[arg(long)]
    count_offline_gap: bool,

    /// Log file, defaults to timekeep.log in the data folder
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn tracker_options(args: &Args, cfg: &CliConfig) -> TrackerOptions {
    let tick_interval_ms = args
        .tick_ms
        .or(cfg.tick_ms)
        .map(|ms| ms.clamp(1, 60_000) as i64)
        .unwrap_or(DEFAULT_TICK_MS);
    let resume = if args.count_offline_gap || cfg.count_offline_gap.unwrap_or(false) {
        ResumePolicy::CountGap
    } else {
        ResumePolicy::Restart
    };
    TrackerOptions {
        tick_interval_ms,
        resume,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = load_config();
    let data_dir = resolve_data_dir_interactive(args.data_dir.clone(), &cfg)?;

    if args.data_dir.is_none() && cfg.data_dir.is_none() {
        let updated = CliConfig {
            data_dir: Some(data_dir.clone()),
            ..cfg.clone()
        };
        persist_config(&updated).ok();
    }

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(|| data_dir.join("timekeep.log"));
    init_tracing(&log_file)?;

    let options = tracker_options(&args, &cfg);
    let store = JsonFileStore::new(&data_dir);
    let header = format!("Data: {}", store.path().display());
    info!(path = %store.path().display(), ?options, "starting timekeep");
    let tracker = TimeTracker::load(Box::new(store), Box::new(SystemClock), options);
    let mut app = AppState::new(tracker);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &header);
    app.tracker.checkpoint();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(err) = app.tracker.last_persist_error() {
        warn!(error = err, "last save failed, changes since then are lost");
        eprintln!("Warning: last save failed: {err}");
    }
    if let Err(err) = res {
        error!(error = %err, "event loop failed");
        eprintln!("Error: {err}");
    }
    info!("stopped");
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    header: &str,
) -> Result<()> {
    let mut needs_redraw = true;
    let mut last_checkpoint = Instant::now();
    loop {
        needs_redraw |= app.tick();
        if last_checkpoint.elapsed() >= CHECKPOINT_EVERY {
            app.tracker.checkpoint();
            last_checkpoint = Instant::now();
        }
        if needs_redraw {
            terminal.draw(|f| ui::ui(f, app, header))?;
            needs_redraw = false;
        }

        let timeout = app
            .tracker
            .next_tick_in()
            .map_or(IDLE_POLL, |due| due.min(IDLE_POLL));
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(convert_key(key)) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
    }
    Ok(())
}
