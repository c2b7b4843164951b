//! Interactive dashboard TUI.
//!
//! Drives the crawl, files, routes, analytics and predictions views,
//! polling the backend on timers and draining the push channel
//! between keystrokes.

pub mod app;
mod input;
mod ui;

use std::io::{self, stdout};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;

use crate::api::events;
use crate::config::AppConfig;
use app::{DashboardApp, View};

const TICK: Duration = Duration::from_millis(250);

/// Run the TUI against the configured backend.
pub async fn run(config: AppConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Push channel runs for the lifetime of the TUI; dropping the
    // receiver on exit stops the listener.
    let (tx, rx) = mpsc::unbounded_channel();
    let events_url = config.resolved_events_url();
    let listener = tokio::spawn(events::run_listener(events_url, tx));

    let mut app = DashboardApp::new(config);
    let result = run_app(&mut terminal, &mut app, rx).await;

    listener.abort();

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut DashboardApp,
    mut events: mpsc::UnboundedReceiver<crate::api::ServerEvent>,
) -> Result<()> {
    // Initial data fetch
    app.init().await?;

    let status_every = Duration::from_secs(app.config.status_poll_secs);
    let files_every = Duration::from_secs(app.config.files_poll_secs);
    let train_every = Duration::from_secs(app.config.train_poll_secs);

    let mut last_status = Instant::now();
    let mut last_files = Instant::now();
    let mut last_train = Instant::now();

    loop {
        // Drain the push channel before rendering
        while let Ok(event) = events.try_recv() {
            app.on_server_event(event);
        }

        // Render
        terminal.draw(|frame| ui::render(frame, app))?;

        // Check for input with timeout (for polling)
        if event::poll(TICK)? {
            let event = event::read()?;
            if app.prompt.is_some() {
                if let Some(key) = input::handle_prompt_event(event) {
                    app.handle_prompt_key(key).await;
                }
            } else if let Some(action) = input::handle_event(event, &app.view) {
                app.handle_action(action).await;
            }
        }

        // Timed polls. Status runs everywhere so the run badge stays
        // honest even off the crawl tab.
        if last_status.elapsed() >= status_every {
            app.refresh_status().await;
            last_status = Instant::now();
        }
        if matches!(app.view, View::Files { .. }) && last_files.elapsed() >= files_every {
            app.refresh_files().await;
            last_files = Instant::now();
        }
        if app.training_active() && last_train.elapsed() >= train_every {
            app.refresh_training().await;
            last_train = Instant::now();
        }

        if !app.running {
            break;
        }
    }

    Ok(())
}
