//! Terminal lifecycle and the synchronous UI loop.
//!
//! The loop draws, drains completed network calls, polls for input, and
//! ticks on a fixed interval. Network calls themselves run on the tokio
//! runtime and come back through the dispatcher channel.

use std::io;
use std::panic;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Handle;

use radar_api::ApiClient;

use crate::app::App;
use crate::config::TuiConfig;
use crate::net::Dispatcher;
use crate::settings::SettingsStore;
use crate::ui;

/// Run the dashboard, restoring the terminal even on panic.
pub fn run(
    handle: Handle,
    client: ApiClient,
    config: TuiConfig,
    settings: SettingsStore,
) -> Result<()> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;

    let mut terminal =
        Terminal::new(CrosstermBackend::new(stdout)).context("initializing terminal")?;
    terminal.clear().ok();

    let res = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        run_app(&mut terminal, handle, client, config, settings)
    }));

    let _ = terminal.show_cursor();
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);

    match res {
        Ok(res) => res,
        Err(_) => Err(anyhow::anyhow!(
            "the dashboard panicked (terminal state has been restored)"
        )),
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    handle: Handle,
    client: ApiClient,
    config: TuiConfig,
    settings: SettingsStore,
) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let dispatcher = Dispatcher::new(handle, client, tx);
    let mut app = App::new(config.ui.clone(), settings);

    let effects = app.start();
    app.run_effects(&dispatcher, effects);

    let tick_rate = Duration::from_millis(config.ui.tick_ms.max(50));
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, &app)).context("drawing frame")?;

        // Apply every network completion that arrived since the last frame.
        while let Ok(envelope) = rx.try_recv() {
            let effects = app.apply(envelope);
            app.run_effects(&dispatcher, effects);
        }

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout).context("polling input")? {
            if let Event::Key(key) = event::read().context("reading input")? {
                if key.kind == KeyEventKind::Press {
                    let effects = app.handle_key(key);
                    app.run_effects(&dispatcher, effects);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            let effects = app.on_tick();
            app.run_effects(&dispatcher, effects);
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
