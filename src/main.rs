use anyhow::Result;
use clap::Parser;
use crossbeam_channel::Receiver;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::time::Duration;
use tracing::{error, info};

use tickshare::app::App;
use tickshare::cli::CliArgs;
use tickshare::clock::{Clock, SystemClock};
use tickshare::config::Config;
use tickshare::ticker::{spawn_ticker, TickEvent};

const INPUT_POLL: Duration = Duration::from_millis(50);

fn run<B: Backend, C: Clock>(
    app: &mut App<C>,
    terminal: &mut Terminal<B>,
    ticks: &Receiver<TickEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| app.ui(f))?;

        for tick in ticks.try_iter() {
            app.handle_tick(tick);
        }

        if event::poll(INPUT_POLL)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Run terminal `setup`; if it fails, call `restore` before handing back the error.
fn setup_or_restore<T>(setup: impl FnOnce() -> Result<T>, restore: impl FnOnce()) -> Result<T> {
    setup().inspect_err(|_| restore())
}

/// Log a failed run and pass the result through so the exit status reflects it.
fn report_outcome(res: Result<()>) -> Result<()> {
    if let Err(err) = &res {
        error!("Application error: {:#}", err);
    }
    res
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn main() -> Result<()> {
    // Initialize tracing with env filter; stderr keeps logs off the TUI buffer
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    info!("Starting tickshare");

    let cli_args = CliArgs::parse();
    let config_path = cli_args.config.clone();
    let config = Config::from_cli_and_file(cli_args, config_path)?;

    let mut app = App::new(config, SystemClock)?;

    // The one periodic driver for the shared clock
    let (tick_tx, tick_rx) = crossbeam_channel::unbounded();
    let ticker = spawn_ticker(app.config.tick_interval(), tick_tx)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut terminal = setup_or_restore(setup_terminal, || {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
    })?;

    let res = run(&mut app, &mut terminal, &tick_rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    ticker.stop();

    info!("tickshare stopped after {} ticks", app.last_tick);
    report_outcome(res)
}
