mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use coordrill::{
    app_dirs::AppDirs,
    board::{GridPos, Perspective, BOARD_SIZE},
    config::{Config, ConfigStore, FileConfigStore, SessionDuration},
    game::{AbandonPolicy, ClickOutcome, GameController, TickOutcome},
    history::{HistoryEntry, HistoryFile, TIMESTAMP_FORMAT},
    logging,
    runtime::{CrosstermEventSource, DrillEvent, FixedTicker, Runner},
};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::{Path, PathBuf},
};

/// chessboard coordinate drill: find the named square before the clock runs out
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal drill for learning chessboard coordinates. A square is named, you click it (or move the cursor and press space) as fast as you can. Sessions are timed and scored on accuracy and speed, and past sessions are charted."
)]
pub struct Cli {
    /// number of seconds per session (5-60)
    #[clap(short = 's', long)]
    number_of_secs: Option<u64>,

    /// side of the board shown at the bottom
    #[clap(short = 'p', long, value_enum)]
    perspective: Option<Side>,

    /// print square names on the board
    #[clap(short = 'c', long)]
    show_coordinates: bool,

    /// keep sessions that are stopped before the timer runs out in the history
    #[clap(long)]
    record_abandoned: bool,

    /// statistics file used by (w)rite and (l)oad
    #[clap(short = 'f', long)]
    stats_file: Option<PathBuf>,

    /// load the statistics file on startup
    #[clap(short = 'l', long)]
    load: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum, strum_macros::Display)]
pub enum Side {
    White,
    Black,
}

impl Side {
    fn as_perspective(&self) -> Perspective {
        match self {
            Side::White => Perspective::White,
            Side::Black => Perspective::Black,
        }
    }
}

impl Cli {
    /// Command line flags win over the stored config
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(secs) = self.number_of_secs {
            cfg.duration_secs = secs;
        }
        if let Some(side) = self.perspective {
            cfg.perspective = side.as_perspective();
        }
        if self.show_coordinates {
            cfg.show_coordinates = true;
        }
        if self.record_abandoned {
            cfg.abandon_policy = AbandonPolicy::Record;
        }
        if let Some(path) = &self.stats_file {
            cfg.history_path = Some(path.clone());
        }
        cfg
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Board,
    History,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

#[derive(Debug)]
pub struct App {
    pub game: GameController,
    pub settings: Config,
    pub duration: SessionDuration,
    pub history_file: HistoryFile,
    pub state: AppState,
    pub cursor: GridPos,
    pub status: Option<Status>,
    pub last_result: Option<HistoryEntry>,
}

impl App {
    pub fn new(settings: Config, duration: SessionDuration) -> Self {
        let mut game = GameController::new();
        game.set_perspective(settings.perspective);
        game.set_abandon_policy(settings.abandon_policy);

        let history_file = match &settings.history_path {
            Some(path) => HistoryFile::with_path(path),
            None => HistoryFile::new(),
        };

        Self {
            game,
            settings,
            duration,
            history_file,
            state: AppState::Board,
            cursor: GridPos::new(0, BOARD_SIZE - 1),
            status: None,
            last_result: None,
        }
    }

    pub fn start(&mut self) {
        let coord = self.game.start(self.duration);
        self.status = Some(Status::Info(format!("Find {}", coord.notation)));
        self.state = AppState::Board;
    }

    pub fn on_tick(&mut self) {
        if let TickOutcome::Finished(entry) = self.game.on_tick() {
            self.finished(entry, "Time's up!");
        }
    }

    pub fn stop(&mut self) {
        if !self.game.is_active() {
            return;
        }
        match self.game.abandon() {
            Some(entry) => self.finished(entry, "Stopped, session recorded"),
            None => self.status = Some(Status::Info("Stopped, session discarded".to_string())),
        }
    }

    fn finished(&mut self, entry: HistoryEntry, message: &str) {
        self.last_result = Some(entry);
        self.status = Some(Status::Info(format!("{message} Score: {}", entry.score)));
    }

    pub fn click(&mut self, pos: GridPos) {
        self.cursor = pos;
        match self.game.handle_click(pos.col, pos.row) {
            ClickOutcome::Correct { next, .. } => {
                self.status = Some(Status::Info(format!("Correct! Now find {}", next.notation)))
            }
            ClickOutcome::Wrong => {
                let clicked = self.game.board().coordinate_to_notation(pos.col, pos.row);
                self.status = Some(Status::Error(format!("That was {clicked}")));
            }
            ClickOutcome::Ignored => {}
        }
    }

    pub fn move_cursor(&mut self, dcol: isize, drow: isize) {
        let last = (BOARD_SIZE - 1) as isize;
        self.cursor = GridPos::new(
            (self.cursor.col as isize + dcol).clamp(0, last) as usize,
            (self.cursor.row as isize + drow).clamp(0, last) as usize,
        );
    }

    pub fn flip(&mut self) {
        self.game.flip_perspective();
        self.settings.perspective = self.game.board().perspective();
    }

    pub fn toggle_coordinates(&mut self) {
        self.settings.show_coordinates = !self.settings.show_coordinates;
    }

    pub fn save_history(&mut self) {
        self.status = Some(match self.game.save_history(&self.history_file) {
            Ok(()) => Status::Info(format!(
                "Statistics saved to {}",
                self.history_file.path().display()
            )),
            Err(e) => {
                tracing::warn!(error = %e, "saving history failed");
                Status::Error(format!("Failed to save statistics: {e}"))
            }
        });
    }

    pub fn load_history(&mut self) {
        self.status = Some(match self.game.load_history(&self.history_file) {
            Ok(Some(saved_at)) => Status::Info(format!(
                "Statistics loaded. Data from: {}",
                saved_at.format(TIMESTAMP_FORMAT)
            )),
            Ok(None) => Status::Info("Statistics loaded".to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "loading history failed");
                Status::Error(format!("Failed to load statistics: {e}"))
            }
        });
    }

    pub fn unload_history(&mut self) {
        self.game.unload_history();
        self.last_result = None;
        self.status = Some(Status::Info("Statistics cleared".to_string()));
    }

    pub fn toggle_history(&mut self) {
        self.state = match self.state {
            AppState::Board => AppState::History,
            AppState::History => AppState::Board,
        };
    }

    /// Map a mouse event to a board square using the same geometry the UI draws with
    pub fn on_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        if self.state != AppState::Board {
            return;
        }
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            let geometry = ui::board_geometry(area);
            if let Some(pos) = geometry.cell_at(mouse.column, mouse.row) {
                self.click(pos);
            }
        }
    }

    /// Returns false when the app should quit
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return false;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return false,
            KeyCode::Char('s') | KeyCode::Enter => self.start(),
            KeyCode::Char('x') => self.stop(),
            KeyCode::Char('f') => self.flip(),
            KeyCode::Char('c') => self.toggle_coordinates(),
            KeyCode::Char('w') => self.save_history(),
            KeyCode::Char('l') => self.load_history(),
            KeyCode::Char('u') => self.unload_history(),
            KeyCode::Char('h') | KeyCode::Tab => self.toggle_history(),
            KeyCode::Left => self.move_cursor(-1, 0),
            KeyCode::Right => self.move_cursor(1, 0),
            KeyCode::Up => self.move_cursor(0, -1),
            KeyCode::Down => self.move_cursor(0, 1),
            KeyCode::Char(' ') => {
                if self.state == AppState::Board {
                    self.click(self.cursor);
                }
            }
            _ => {}
        }
        true
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = FileConfigStore::new();
    let settings = cli.apply(store.load());

    let duration = match settings.session_duration() {
        Ok(d) => d,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, e).exit();
        }
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let log_status = AppDirs::log_path().and_then(|path| init_logging(&path));

    let mut app = App::new(settings, duration);
    if cli.load {
        app.load_history();
    }
    if log_status.is_some() {
        app.status = log_status;
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

    if let Err(e) = store.save(&app.settings) {
        tracing::warn!(error = %e, "could not persist settings");
    }

    result
}

/// Logging failures don't stop the drill; they come back as a status line
fn init_logging(path: &Path) -> Option<Status> {
    match logging::init_file_logging(path) {
        Ok(()) => None,
        Err(e) => Some(Status::Error(format!(
            "Logging disabled, cannot write {}: {e}",
            path.display()
        ))),
    }
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| ui::screen::current_screen(&app.state).render(app, f))?;

        match runner.step() {
            DrillEvent::Tick => {
                app.on_tick();
                if runner.input_closed() {
                    // the terminal reader is gone, so no key can ever quit
                    app.stop();
                    break;
                }
            }
            DrillEvent::Resize => {}
            DrillEvent::Mouse(mouse) => {
                let size = terminal.size()?;
                app.on_mouse(mouse, Rect::new(0, 0, size.width, size.height));
            }
            DrillEvent::Key(key) => {
                if !app.on_key(key) {
                    app.stop();
                    break;
                }
                if matches!(key.code, KeyCode::Char('s') | KeyCode::Enter) {
                    // first countdown tick lands a full second after the start
                    runner.reset_schedule();
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn app() -> App {
        App::new(Config::default(), SessionDuration::default())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["coordrill"]);

        assert_eq!(cli.number_of_secs, None);
        assert_eq!(cli.perspective, None);
        assert!(!cli.show_coordinates);
        assert!(!cli.record_abandoned);
        assert_eq!(cli.stats_file, None);
        assert!(!cli.load);
    }

    #[test]
    fn test_cli_number_of_secs() {
        let cli = Cli::parse_from(["coordrill", "-s", "45"]);
        assert_eq!(cli.number_of_secs, Some(45));

        let cli = Cli::parse_from(["coordrill", "--number-of-secs", "10"]);
        assert_eq!(cli.number_of_secs, Some(10));
    }

    #[test]
    fn test_cli_perspective() {
        let cli = Cli::parse_from(["coordrill", "-p", "black"]);
        assert_eq!(cli.perspective, Some(Side::Black));

        let cli = Cli::parse_from(["coordrill", "--perspective", "white"]);
        assert_eq!(cli.perspective, Some(Side::White));
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "coordrill",
            "-s",
            "15",
            "-p",
            "black",
            "-c",
            "--record-abandoned",
            "-f",
            "/tmp/stats.json",
        ]);
        let cfg = cli.apply(Config::default());

        assert_eq!(cfg.duration_secs, 15);
        assert_eq!(cfg.perspective, Perspective::Black);
        assert!(cfg.show_coordinates);
        assert_eq!(cfg.abandon_policy, AbandonPolicy::Record);
        assert_eq!(cfg.history_path, Some(PathBuf::from("/tmp/stats.json")));
    }

    #[test]
    fn test_cli_keeps_config_when_silent() {
        let stored = Config {
            duration_secs: 50,
            perspective: Perspective::Black,
            show_coordinates: true,
            abandon_policy: AbandonPolicy::Record,
            history_path: None,
        };
        let cfg = Cli::parse_from(["coordrill"]).apply(stored.clone());
        assert_eq!(cfg, stored);
    }

    #[test]
    fn test_out_of_range_duration_rejected() {
        let cfg = Cli::parse_from(["coordrill", "-s", "3"]).apply(Config::default());
        assert!(cfg.session_duration().is_err());
    }

    #[test]
    fn test_side_display() {
        assert_eq!(Side::White.to_string(), "White");
        assert_eq!(Side::Black.to_string(), "Black");
    }

    #[test]
    fn test_app_new_applies_settings() {
        let cfg = Config {
            perspective: Perspective::Black,
            abandon_policy: AbandonPolicy::Record,
            ..Config::default()
        };
        let app = App::new(cfg, SessionDuration::default());

        assert_eq!(app.game.board().perspective(), Perspective::Black);
        assert_eq!(app.game.abandon_policy(), AbandonPolicy::Record);
        assert_eq!(app.state, AppState::Board);
        assert!(!app.game.is_active());
    }

    #[test]
    fn test_start_key_begins_session() {
        let mut app = app();
        assert!(app.on_key(key(KeyCode::Char('s'))));
        assert!(app.game.is_active());
        assert!(app.game.target_notation().is_some());
    }

    #[test]
    fn test_space_clicks_cursor_square() {
        let mut app = app();
        app.start();
        let target = app.game.board().target_on_screen().unwrap();
        app.cursor = target;

        app.on_key(key(KeyCode::Char(' ')));
        assert_eq!(app.game.stats().correct_count(), 1);
    }

    #[test]
    fn test_wrong_click_reports_square() {
        let mut app = app();
        app.start();
        let target = app.game.board().target_on_screen().unwrap();
        let wrong = GridPos::new((target.col + 1) % BOARD_SIZE, target.row);

        app.click(wrong);
        assert_eq!(app.game.stats().wrong_count(), 1);
        assert!(matches!(app.status, Some(Status::Error(_))));
    }

    #[test]
    fn test_cursor_clamped_to_board() {
        let mut app = app();
        app.cursor = GridPos::new(0, 0);
        app.move_cursor(-1, -1);
        assert_eq!(app.cursor, GridPos::new(0, 0));

        app.cursor = GridPos::new(7, 7);
        app.on_key(key(KeyCode::Right));
        app.on_key(key(KeyCode::Down));
        assert_eq!(app.cursor, GridPos::new(7, 7));

        app.on_key(key(KeyCode::Up));
        assert_eq!(app.cursor, GridPos::new(7, 6));
    }

    #[test]
    fn test_flip_and_toggle_update_settings() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('f')));
        assert_eq!(app.settings.perspective, Perspective::Black);
        assert_eq!(app.game.board().perspective(), Perspective::Black);

        app.on_key(key(KeyCode::Char('c')));
        assert!(app.settings.show_coordinates);
    }

    #[test]
    fn test_stop_discards_by_default() {
        let mut app = app();
        app.start();
        app.on_key(key(KeyCode::Char('x')));
        assert!(!app.game.is_active());
        assert!(app.game.history().is_empty());
        assert_eq!(app.last_result, None);
    }

    #[test]
    fn test_timeout_sets_last_result() {
        let cfg = Config::default();
        let mut app = App::new(cfg, SessionDuration::new(5).unwrap());
        app.start();
        for _ in 0..5 {
            app.on_tick();
        }
        assert!(!app.game.is_active());
        assert!(app.last_result.is_some());
        assert_eq!(app.game.history().len(), 1);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert!(!app.on_key(key(KeyCode::Esc)));
        assert!(!app.on_key(key(KeyCode::Char('q'))));
        assert!(!app.on_key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
    }

    #[test]
    fn test_history_toggle() {
        let mut app = app();
        app.on_key(key(KeyCode::Char('h')));
        assert_eq!(app.state, AppState::History);
        app.on_key(key(KeyCode::Tab));
        assert_eq!(app.state, AppState::Board);
    }

    #[test]
    fn test_save_and_load_through_app() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config {
            history_path: Some(dir.path().join("stats.json")),
            ..Config::default()
        };
        let mut app = App::new(cfg, SessionDuration::new(5).unwrap());

        app.save_history();
        assert!(matches!(app.status, Some(Status::Error(_))));

        app.start();
        for _ in 0..5 {
            app.on_tick();
        }
        app.save_history();
        assert!(matches!(app.status, Some(Status::Info(_))));

        app.unload_history();
        assert!(app.game.history().is_empty());

        app.load_history();
        assert_eq!(app.game.history().len(), 1);
    }

    #[test]
    fn test_click_beside_cramped_board_ignored() {
        let mut app = app();
        app.start();
        // too narrow for the board: squares past the board column are clipped
        let area = Rect::new(0, 0, 40, 12);
        let geometry = ui::board_geometry(area);

        app.on_mouse(
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: 10,
                row: geometry.y,
                modifiers: KeyModifiers::NONE,
            },
            area,
        );
        assert_eq!(app.game.stats().total_attempts(), 0);
    }

    #[test]
    fn test_logging_failure_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"").unwrap();

        let status = init_logging(&blocker.join("coordrill.log"));
        assert_matches!(status, Some(Status::Error(msg)) if msg.contains("Logging disabled"));
    }

    #[test]
    fn test_mouse_click_maps_to_square() {
        let mut app = app();
        app.start();
        let area = Rect::new(0, 0, 120, 40);
        let target = app.game.board().target_on_screen().unwrap();
        let cell = ui::board_geometry(area).cell_rect(target.col, target.row);

        app.on_mouse(
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: cell.x,
                row: cell.y,
                modifiers: KeyModifiers::NONE,
            },
            area,
        );
        assert_eq!(app.game.stats().correct_count(), 1);
    }
}
