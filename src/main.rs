mod tui;

use std::fs::File;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::terminal;
use log::{info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use soundgrid::audio::{self, AudioHandle};
use soundgrid::audio_api::AudioCommand;
use soundgrid::config::{AppConfig, Cli};
use soundgrid::persistence::{DirStore, SOUNDGRID_DIR};
use soundgrid::{InputEvent, Middle};

use tui::mode::TuiState;

const LOG_FILE: &str = "soundgrid.log";

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("no current directory")?;
    let config = AppConfig::from_cli(Cli::parse(), &cwd);
    init_logging(&config)?;
    info!("project {} at {} bpm", config.project_dir.display(), config.bpm);

    let audio = audio::start_audio()?;
    let store = DirStore::new(&config.project_dir);
    let mut middle = Middle::from_config(&config, Box::new(store), audio.sample_rate());
    send_all(&audio, middle.load_sample_pack(&config.samples_dir));
    send_all(&audio, middle.load_uploads(&config.uploads_dir));

    terminal::enable_raw_mode()?;
    // Enable keyboard enhancement for real press/release detection.
    // Falls back gracefully if the terminal doesn't support it.
    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::PushKeyboardEnhancementFlags(
            crossterm::event::KeyboardEnhancementFlags::REPORT_EVENT_TYPES
        )
    );
    let _guard = RawModeGuard; // auto drops when out of scope

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = Duration::from_millis(16); // ~60fps, also the loop's timing resolution
    let blink_start = Instant::now();
    let mut tui_state = TuiState::default();

    loop {
        // replay due beats before drawing so the cursor matches what is heard
        let now = Instant::now();
        send_all(&audio, middle.tick(now));

        let blink_on = (blink_start.elapsed().as_millis() / 250) % 2 == 0;
        let ds = middle.display_state();
        let lit = tui_state.lit(now);
        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds, &lit, blink_on);
        })?;

        let events = tui::input::poll_input(tick_rate, &mut tui_state)?;
        for event in events {
            if event == InputEvent::Quit {
                // save before quitting
                if let Err(e) = middle.save_session() {
                    warn!("could not save session: {e:#}");
                }
                info!("bye");
                return Ok(());
            }
            send_all(&audio, middle.handle_input(event, Instant::now()));
        }
    }
}

// the terminal is in raw mode, so logs go to <project>/.soundgrid/soundgrid.log
fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    let dir = config.project_dir.join(SOUNDGRID_DIR);
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let file = File::create(dir.join(LOG_FILE)).context("opening log file")?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn send_all(audio: &AudioHandle, cmds: Vec<AudioCommand>) {
    for cmd in cmds {
        if let Err(e) = audio.send(cmd) {
            warn!("dropped audio command: {e}");
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::event::PopKeyboardEnhancementFlags
        );
        let _ = terminal::disable_raw_mode();
    }
}
