#![warn(clippy::all, clippy::pedantic)]

mod input;
mod ui;

use std::io;
use std::os::fd::AsRawFd;
use std::time::{Duration, Instant};

use anyhow::Result;
use blockfall::Time;
use blockfall::app::App;
use blockfall::config::{self, ConfigWatcher};
use blockfall::highscore::HighscoreFile;
use blockfall::sound::AudioState;
use crossterm::{
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use input::{Action, KeyTracker};
use log::{debug, error, info, warn};
use ratatui::{Terminal, prelude::*};

// ~60 FPS
const FRAME_TIME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    // Log to a file; stderr would scribble over the alternate screen
    let log_path = "blockfall.log";
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    // Safety: plain POSIX fd duplication onto stderr; both descriptors stay open
    unsafe {
        libc::dup2(log_file.as_raw_fd(), io::stderr().as_raw_fd());
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_module_path(false)
        .init();

    info!("Starting blockfall");

    let config_path = config::loader::get_config_file_path();
    let config = match config::loader::load_config_from(&config_path) {
        Ok(config) => {
            info!("Configuration loaded from {}", config_path.display());
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            config::Config::default()
        }
    };

    let highscore_file = HighscoreFile::default_location();
    let mut app = App::new(config.game.clone());
    app.set_highscore(highscore_file.load());

    let audio = AudioState::new(config.audio.volume, config.audio.sound_enabled);
    let watcher = ConfigWatcher::new(config_path);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let reports_release = supports_keyboard_enhancement().unwrap_or(false);
    if reports_release {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    debug!("Key release reporting: {reports_release}");

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(
        &mut terminal,
        &mut app,
        audio,
        watcher,
        &highscore_file,
        KeyTracker::new(reports_release),
    );

    // Restore terminal
    if reports_release {
        let _ = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    save_highscore(&mut app, &highscore_file);

    if let Err(err) = res {
        error!("Game error: {err:?}");
        return Err(err);
    }

    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut audio: AudioState,
    mut watcher: ConfigWatcher,
    highscore_file: &HighscoreFile,
    mut keys: KeyTracker,
) -> Result<()> {
    let mut time = Time::new();

    // Drop anything typed before the game started
    while event::poll(Duration::ZERO)? {
        let _ = event::read()?;
    }

    loop {
        let frame_start = Instant::now();

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                for action in keys.on_key(key, Instant::now()) {
                    match action {
                        Action::Game(event) => app.handle_input(event),
                        Action::ToggleSound => audio.toggle_sound(),
                        Action::Quit => return Ok(()),
                        Action::None => {}
                    }
                }
            }
        }
        for action in keys.expire(Instant::now()) {
            if let Action::Game(event) = action {
                app.handle_input(event);
            }
        }

        if let Some(config) = watcher.poll() {
            info!("Configuration changed, applying new settings");
            app.apply_settings(config.game);
            audio.set_volume(config.audio.volume);
        }

        time.update();
        app.advance(time.delta_millis());

        for cue in app.drain_cues() {
            audio.play_cue(cue);
        }
        save_highscore(app, highscore_file);

        let view = app.view();
        terminal.draw(|f| ui::render(f, &view))?;

        let spent = frame_start.elapsed();
        if let Some(remaining) = FRAME_TIME.checked_sub(spent) {
            event::poll(remaining)?;
        }
    }
}

fn save_highscore(app: &mut App, highscore_file: &HighscoreFile) {
    if let Some(highscore) = app.take_new_highscore() {
        if let Err(e) = highscore_file.save(highscore) {
            warn!(
                "Failed to save highscore to {}: {e}",
                highscore_file.path().display()
            );
        }
    }
}
