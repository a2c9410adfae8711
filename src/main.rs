mod ui;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{fs::OpenOptions, io};
use taskflow::{app::App, config::Config, storage::FileStorage};

fn init_logging(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // Log to a file; stderr belongs to the terminal UI.
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str()))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    config.ensure_dirs()?;
    init_logging(&config)?;
    log::info!("starting with data dir {}", config.data_dir.display());

    let mut app = App::new(FileStorage::new(&config.data_dir));

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("terminal error: {}", err);
        eprintln!("{:?}", err);
    }
    Ok(())
}
