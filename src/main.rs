pub mod animator;
pub mod config;
pub mod estimator;
pub mod history;
pub mod layout;
pub mod passage;
pub mod runtime;
pub mod session;
pub mod ui;
pub mod util;

use crate::{
    animator::IdlePulse,
    config::{Config, ConfigStore, FileConfigStore},
    history::{HistoryDb, RunRecord},
    layout::{hit_test, layout_words},
    passage::Passage,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session::Session,
};
use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

pub const TICK_RATE_MS: u64 = 100;

/// measure your actual reading speed by tapping along in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Shows a paragraph and times you while you read it. Tap the word you are \
currently on (left-click it, or press space for the next word) and readrate derives \
words-per-minute from the intervals between taps. Tapping the last word ends the run."
)]
pub struct Cli {
    /// disable the idle word-pulse animation
    #[clap(long)]
    no_pulse: bool,

    /// skip recording this run into the history database
    #[clap(long)]
    no_history: bool,

    /// write the run history as CSV to PATH and exit
    #[clap(long, value_name = "PATH")]
    export_history: Option<PathBuf>,
}

/// Effective settings after layering CLI overrides on the config file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub show_pulse: bool,
    pub record_history: bool,
}

impl Settings {
    fn from_sources(cfg: &Config, cli: &Cli) -> Self {
        Self {
            show_pulse: cfg.show_pulse && !cli.no_pulse,
            record_history: cfg.record_history && !cli.no_history,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Reading,
    Results,
}

/// Reading phase shown in the header
#[derive(Debug, Clone, Copy, PartialEq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Idle,
    Reading,
    Done,
}

#[derive(Debug)]
pub struct App {
    pub passage: Passage,
    pub session: Session,
    pub pulse: IdlePulse,
    pub settings: Settings,
    pub state: AppState,
    pub history: Option<HistoryDb>,
    pub history_note: Option<String>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let passage = Passage::default();
        let session = Session::new(passage.word_count());
        let history = if settings.record_history {
            HistoryDb::new().ok()
        } else {
            None
        };

        Self {
            passage,
            session,
            pulse: IdlePulse::new(),
            settings,
            state: AppState::Reading,
            history,
            history_note: None,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.session.is_running() {
            Phase::Reading
        } else if self.session.has_completed() {
            Phase::Done
        } else {
            Phase::Idle
        }
    }

    /// One 100 ms tick: while running it advances the clock, while idle on the
    /// reading screen it advances the pulse. Both branches re-read current
    /// state, so a tick scheduled before a transition cannot act on stale
    /// assumptions.
    pub fn on_tick(&mut self, now: SystemTime) {
        if self.session.is_running() {
            self.session.on_tick(now);
        } else if self.state == AppState::Reading && self.settings.show_pulse {
            let mut rng = rand::thread_rng();
            self.pulse
                .on_tick(TICK_RATE_MS, self.passage.word_count(), &mut rng);
        }
    }

    /// Start the timer; a no-op while running or after a completed run that
    /// has not been reset.
    pub fn start(&mut self, now: SystemTime) {
        if self.state != AppState::Reading || self.session.is_running() || self.session.has_completed()
        {
            return;
        }
        self.session.start(now);
        self.pulse.suspend();
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.pulse.suspend();
        self.history_note = None;
        self.state = AppState::Reading;
    }

    /// Tap the word at `index`; switches to the results screen when it was
    /// the final word.
    pub fn tap(&mut self, index: usize) {
        if !self.session.is_running() {
            return;
        }
        self.session.tap(index);
        if self.session.has_completed() {
            self.finish_run();
        }
    }

    /// Tap the word right after the bookmark (the space-key path).
    pub fn tap_next(&mut self) {
        let next = self.session.bookmark().word_index;
        if next < self.passage.word_count() {
            self.tap(next);
        }
    }

    fn finish_run(&mut self) {
        let wpm = self.session.wpm();
        if let Some(db) = &self.history {
            self.history_note = db.delta_summary(wpm).ok();
            let _ = db.record_run(&RunRecord {
                finished_at: Local::now(),
                total_words: self.passage.word_count(),
                elapsed_secs: self.session.elapsed_secs(),
                wpm,
            });
        }
        self.state = AppState::Results;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = cli.export_history.as_deref() {
        return export_history(path);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config = FileConfigStore::new().load();
    let settings = Settings::from_sources(&config, &cli);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    res
}

fn export_history(path: &Path) -> Result<(), Box<dyn Error>> {
    let db = HistoryDb::new()?;
    let file = std::fs::File::create(path)?;
    db.export_csv(file)?;
    println!("wrote {} runs to {}", db.run_count()?, path.display());
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let events = CrosstermEventSource::new();
    let ticker = FixedTicker::new(Duration::from_millis(TICK_RATE_MS));
    let runner = Runner::new(events, ticker);

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                app.on_tick(SystemTime::now());

                // redraw only while something on screen is moving
                let animating = app.session.is_running()
                    || (app.state == AppState::Reading && app.settings.show_pulse);
                if animating {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Mouse(mouse) => {
                if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                    if app.state == AppState::Reading {
                        let size = terminal.size()?;
                        let chunks =
                            ui::reading_chunks(Rect::new(0, 0, size.width, size.height));
                        let cells = layout_words(app.passage.words(), chunks.passage);
                        if let Some(index) = hit_test(&cells, mouse.column, mouse.row) {
                            app.tap(index);
                        }
                        terminal.draw(|f| ui(app, f))?;
                    }
                }
            }
            AppEvent::Key(key) => {
                match key.code {
                    KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Char('s') => app.start(SystemTime::now()),
                    KeyCode::Char('r') => app.reset(),
                    KeyCode::Char(' ') => app.tap_next(),
                    _ => {}
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
