use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use std::io;
use std::panic;
use tracing::{info, warn};

use ferry::app::App;
use ferry::config::{Cli, ConnectionStore, Settings, Target};
use ferry::events::handle_events;
use ferry::logging;
use ferry::session::Session;
use ferry::ui::{render_help_bar, render_mode_popup, render_status_bar};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let settings = Settings::load(&settings_path)?;
    logging::init(&settings.log_path())?;

    let connections = ConnectionStore::new(ConnectionStore::default_path());
    let saved = connections.load()?;

    if cli.list_saved {
        if saved.servers.is_empty() {
            println!("No saved connections in {}", connections.path().display());
        }
        for (i, record) in saved.servers.iter().enumerate() {
            println!("{:>3}  {}", i, record);
        }
        return Ok(());
    }

    let target = cli.target(&saved)?;
    let local_dir = match &cli.local_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Could not determine working directory")?,
    };

    // Connect before taking over the terminal so login errors print plainly
    let session = Session::open(&target, &local_dir, &settings).await?;

    if let Target::Ftp(params) = &target {
        if !cli.no_save {
            match connections.add(params.record()) {
                Ok(true) => info!(record = %params.record(), "connection saved"),
                Ok(false) => {}
                Err(e) => warn!(error = %e, "could not save connection"),
            }
        }
    }

    install_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, target, settings);

    // Main loop
    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.session.close().await;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Restore the terminal before the default hook prints the panic.
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Pane rows plus borders
        let pane_height = (app.settings.viewport_height + 2).min(u16::MAX as usize) as u16;

        let view: &App = app;
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(pane_height), // Panes
                    Constraint::Min(0),              // Filler
                    Constraint::Length(1),           // Status bar
                    Constraint::Length(1),           // Help bar
                ])
                .split(f.area());

            let panes = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[0]);

            view.session.local.render(f, panes[0]);
            view.session.remote.render(f, panes[1]);

            render_status_bar(f, chunks[2], view);
            render_help_bar(f, chunks[3], view);
            render_mode_popup(f, view);
        })?;

        handle_events(app).await?;

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
