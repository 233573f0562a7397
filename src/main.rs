mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};

use tapr::config::{Config, ConfigStore, FileConfigStore};
use tapr::export::{self, ExportOutcome};
use tapr::feedback::{Feedback, TerminalBell};
use tapr::input::{self, InputKind};
use tapr::records::{FileRecordStore, LoadOutcome, RecordSet, RecordStore};
use tapr::runtime::{CrosstermEventSource, FixedTicker, Runner, TapEvent};
use tapr::session::{Effect, Session, SessionMsg};
use tapr::share::{self, SharePayload};
use tapr::TICK_RATE_MS;

pub const SUPPORTED_DURATIONS: [u64; 6] = [0, 5, 10, 15, 30, 60];

const WAITING_STATUS: &str = "Waiting for first input...";

/// terminal input-speed tester
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Measures left clicks, right clicks, and key presses with live CPS statistics, a performance graph, personal records, and macro detection."
)]
pub struct Cli {
    /// number of seconds to run the test (0 = free mode)
    #[clap(short = 's', long, value_parser = parse_secs)]
    number_of_secs: Option<u64>,

    /// disable the feedback bell
    #[clap(long)]
    no_sound: bool,

    /// decode a shared result payload, print it, and exit
    #[clap(long, value_name = "ENCODED")]
    show_shared: Option<String>,
}

fn parse_secs(raw: &str) -> Result<u64, String> {
    let secs: u64 = raw
        .parse()
        .map_err(|_| "expected a number of seconds".to_string())?;
    if SUPPORTED_DURATIONS.contains(&secs) {
        Ok(secs)
    } else {
        Err(format!("supported durations: {SUPPORTED_DURATIONS:?}"))
    }
}

pub struct App {
    pub session: Session,
    pub bell: TerminalBell,
    pub status: String,
    pub notice: Option<String>,
    record_store: FileRecordStore,
}

impl App {
    pub fn new(
        duration_secs: u64,
        sound: bool,
        records: RecordSet,
        record_store: FileRecordStore,
    ) -> Self {
        Self {
            session: Session::new(duration_secs, records),
            bell: TerminalBell::new(sound),
            status: WAITING_STATUS.to_string(),
            notice: None,
            record_store,
        }
    }

    pub fn on_input(&mut self, kind: InputKind, label: String, now: Instant) {
        let effect = self
            .session
            .handle(SessionMsg::InputOccurred { kind, label }, now);
        self.apply_effect(effect);
    }

    pub fn on_tick(&mut self, now: Instant) {
        let effect = self.session.handle(SessionMsg::TimerTick, now);
        self.apply_effect(effect);
    }

    pub fn reset(&mut self) {
        self.session
            .handle(SessionMsg::ResetRequested, Instant::now());
        self.status = WAITING_STATUS.to_string();
        self.notice = None;
    }

    /// Step to the next supported duration; refused while a test is in flight.
    pub fn cycle_duration(&mut self) {
        let current = self.session.duration_secs;
        let idx = SUPPORTED_DURATIONS
            .iter()
            .position(|&d| d == current)
            .unwrap_or(0);
        let next = SUPPORTED_DURATIONS[(idx + 1) % SUPPORTED_DURATIONS.len()];

        if self.session.set_duration(next) {
            self.notice = Some(if next > 0 {
                format!("Timer: {next}s")
            } else {
                "Timer: free mode".to_string()
            });
        } else {
            self.notice = Some("Duration is locked while a test is in flight".to_string());
        }
    }

    pub fn export(&mut self) {
        match export::export_history(&self.session.history) {
            Ok(ExportOutcome::Empty) => self.notice = Some("No data to export!".to_string()),
            Ok(ExportOutcome::Written(path)) => {
                self.notice = Some(format!("Exported to {}", path.display()))
            }
            Err(err) => self.notice = Some(format!("Export failed: {err}")),
        }
    }

    pub fn share(&mut self) {
        let payload = SharePayload::new(
            self.session.current_cps,
            self.session.current_count,
            self.session.duration_secs,
            self.session.records.best_cps,
        );
        let url = share::share_url(&payload);
        share::open_in_browser(&url);
        self.notice = Some(format!("Share link: {url}"));
    }

    pub fn toggle_bell(&mut self) {
        let enabled = self.bell.toggle();
        self.notice = Some(if enabled {
            "Bell on".to_string()
        } else {
            "Bell off".to_string()
        });
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::InputAccepted => {
                self.bell.input_accepted();
                if let Some(label) = &self.session.current_label {
                    self.status = format!("Testing: {label}");
                }
            }
            Effect::CountdownStarted => {
                self.status = "Get ready...".to_string();
                self.notice = None;
            }
            Effect::SessionCompleted { new_record } => {
                let cps = self.session.current_cps;
                self.status = if new_record {
                    format!("NEW RECORD! CPS: {cps:.2}")
                } else {
                    format!("Test Complete! CPS: {cps:.2}")
                };
                if self.record_store.save(&self.session.records).is_err() {
                    self.notice =
                        Some("Could not save records; keeping them for this run only".to_string());
                }
            }
            Effect::None => {}
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(encoded) = &cli.show_shared {
        match share::decode(encoded) {
            Some(payload) => println!("{}", payload.summary()),
            None => eprintln!("Invalid shared results"),
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let config = config_store.load();
    let duration_secs = cli.number_of_secs.unwrap_or(config.number_of_secs);
    let sound = if cli.no_sound { false } else { config.sound };

    let record_store = FileRecordStore::new();
    let (records, load_outcome) = record_store.load();

    let mut app = App::new(duration_secs, sound, records, record_store);
    if load_outcome == LoadOutcome::Malformed {
        app.notice = Some("Stored records were unreadable; starting fresh".to_string());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    let _ = config_store.save(&Config {
        number_of_secs: app.session.duration_secs,
        sound: app.bell.enabled,
    });

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let events = CrosstermEventSource::new();
    let ticker = FixedTicker::new(Duration::from_millis(TICK_RATE_MS));
    let runner = Runner::new(events, ticker);

    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            TapEvent::Tick => {
                app.on_tick(Instant::now());
            }
            TapEvent::Resize => {}
            TapEvent::MouseDown(button) => {
                if let Some((kind, label)) = input::from_mouse_button(button) {
                    app.on_input(kind, label, Instant::now());
                }
            }
            TapEvent::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    match key.code {
                        KeyCode::Char('c') => break,
                        KeyCode::Char('r') => app.reset(),
                        KeyCode::Char('e') => app.export(),
                        KeyCode::Char('s') => app.share(),
                        KeyCode::Char('d') => app.cycle_duration(),
                        KeyCode::Char('b') => app.toggle_bell(),
                        _ => {}
                    }
                } else if let Some((kind, label)) = input::from_key_code(key.code) {
                    app.on_input(kind, label, Instant::now());
                }
            }
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_app(duration_secs: u64) -> (App, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = FileRecordStore::with_path(dir.path().join("records.json"));
        let app = App::new(duration_secs, false, RecordSet::default(), store);
        (app, dir)
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["tapr"]);

        assert_eq!(cli.number_of_secs, None);
        assert!(!cli.no_sound);
        assert_eq!(cli.show_shared, None);
    }

    #[test]
    fn test_cli_number_of_secs() {
        let cli = Cli::parse_from(["tapr", "-s", "10"]);
        assert_eq!(cli.number_of_secs, Some(10));

        let cli = Cli::parse_from(["tapr", "--number-of-secs", "0"]);
        assert_eq!(cli.number_of_secs, Some(0));
    }

    #[test]
    fn test_cli_rejects_unsupported_durations() {
        assert!(Cli::try_parse_from(["tapr", "-s", "7"]).is_err());
        assert!(Cli::try_parse_from(["tapr", "-s", "banana"]).is_err());
    }

    #[test]
    fn test_cli_no_sound() {
        let cli = Cli::parse_from(["tapr", "--no-sound"]);
        assert!(cli.no_sound);
    }

    #[test]
    fn test_cli_show_shared() {
        let cli = Cli::parse_from(["tapr", "--show-shared", "abc123"]);
        assert_eq!(cli.show_shared, Some("abc123".to_string()));
    }

    #[test]
    fn test_app_new_defaults() {
        let (app, _dir) = test_app(0);

        assert_eq!(app.status, WAITING_STATUS);
        assert_eq!(app.notice, None);
        assert!(!app.session.is_active());
        assert_eq!(app.session.duration_secs, 0);
    }

    #[test]
    fn test_input_updates_status() {
        let (mut app, _dir) = test_app(0);
        app.on_input(InputKind::LeftClick, "Left Click".to_string(), Instant::now());

        assert!(app.session.is_active());
        assert_eq!(app.status, "Testing: Left Click");
    }

    #[test]
    fn test_timed_input_starts_countdown() {
        let (mut app, _dir) = test_app(5);
        app.on_input(InputKind::LeftClick, "Left Click".to_string(), Instant::now());

        assert!(app.session.is_counting_down());
        assert_eq!(app.status, "Get ready...");
        assert_eq!(app.session.total_count, 0);
    }

    #[test]
    fn test_completed_session_persists_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.json");
        let store = FileRecordStore::with_path(&path);
        let mut app = App::new(5, false, RecordSet::default(), store);

        let t0 = Instant::now();
        app.on_input(InputKind::LeftClick, "Left Click".to_string(), t0);
        app.on_tick(t0 + Duration::from_millis(3500));
        for i in 1..10u64 {
            app.on_input(
                InputKind::LeftClick,
                "Left Click".to_string(),
                t0 + Duration::from_millis(3500 + i * 300),
            );
        }
        app.on_tick(t0 + Duration::from_millis(8500));

        assert!(app.session.is_complete());
        assert!(app.status.starts_with("NEW RECORD!"));

        let (saved, outcome) = FileRecordStore::with_path(&path).load();
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(saved.best_5s, 10);
        assert!(saved.best_cps > 0.0);
    }

    #[test]
    fn test_reset_restores_waiting_status() {
        let (mut app, _dir) = test_app(0);
        app.on_input(InputKind::KeyPress, "a".to_string(), Instant::now());
        assert_ne!(app.status, WAITING_STATUS);

        app.reset();
        assert_eq!(app.status, WAITING_STATUS);
        assert_eq!(app.session.total_count, 0);
    }

    #[test]
    fn test_cycle_duration_walks_the_supported_list() {
        let (mut app, _dir) = test_app(0);

        app.cycle_duration();
        assert_eq!(app.session.duration_secs, 5);
        assert_eq!(app.notice.as_deref(), Some("Timer: 5s"));

        for _ in 0..4 {
            app.cycle_duration();
        }
        assert_eq!(app.session.duration_secs, 60);

        app.cycle_duration();
        assert_eq!(app.session.duration_secs, 0);
        assert_eq!(app.notice.as_deref(), Some("Timer: free mode"));
    }

    #[test]
    fn test_cycle_duration_locked_during_session() {
        let (mut app, _dir) = test_app(0);
        app.on_input(InputKind::LeftClick, "Left Click".to_string(), Instant::now());

        app.cycle_duration();
        assert_eq!(app.session.duration_secs, 0);
        assert_eq!(
            app.notice.as_deref(),
            Some("Duration is locked while a test is in flight")
        );
    }

    #[test]
    fn test_export_with_no_data_is_a_notice() {
        let (mut app, _dir) = test_app(0);
        app.export();
        assert_eq!(app.notice.as_deref(), Some("No data to export!"));
    }

    #[test]
    fn test_share_notice_carries_decodable_link() {
        let (mut app, _dir) = test_app(0);
        app.on_input(InputKind::LeftClick, "Left Click".to_string(), Instant::now());
        app.share();

        let notice = app.notice.clone().unwrap();
        let encoded = notice.split("?results=").nth(1).unwrap();
        let payload = share::decode(encoded).unwrap();
        assert_eq!(payload.clicks, 1);
    }

    #[test]
    fn test_toggle_bell_notices() {
        let (mut app, _dir) = test_app(0);
        app.toggle_bell();
        assert_eq!(app.notice.as_deref(), Some("Bell on"));
        app.toggle_bell();
        assert_eq!(app.notice.as_deref(), Some("Bell off"));
    }

    #[test]
    fn test_ui_renders_waiting_screen() {
        use ratatui::{backend::TestBackend, Terminal};

        let (mut app, _dir) = test_app(0);
        let backend = TestBackend::new(100, 32);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|f| ui(&mut app, f)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Waiting for first input"));
        assert!(content.contains("Records"));
    }

    #[test]
    fn test_ui_renders_active_session() {
        use ratatui::{backend::TestBackend, Terminal};

        let (mut app, _dir) = test_app(0);
        let t0 = Instant::now();
        for i in 0..8u64 {
            app.on_input(
                InputKind::LeftClick,
                "Left Click".to_string(),
                t0 + Duration::from_millis(i * 250),
            );
        }

        let backend = TestBackend::new(100, 32);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(&mut app, f)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Testing: Left Click"));
        assert!(content.contains("Left Click"));
    }

    #[test]
    fn test_ui_renders_countdown_overlay() {
        use ratatui::{backend::TestBackend, Terminal};

        let (mut app, _dir) = test_app(5);
        app.on_input(InputKind::LeftClick, "Left Click".to_string(), Instant::now());
        assert!(app.session.is_counting_down());

        let backend = TestBackend::new(100, 32);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(&mut app, f)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains('3'));
        assert!(content.contains("get ready"));
    }

    #[test]
    fn test_tick_rate_constant() {
        assert_eq!(TICK_RATE_MS, 50);

        const _: () = assert!(TICK_RATE_MS > 0);
        const _: () = assert!(TICK_RATE_MS <= 50); // keeps the countdown and timer display smooth
    }
}
