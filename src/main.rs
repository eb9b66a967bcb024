//! smnview - SMN Argentina weather fetcher, cache and dashboard
//!
//! Fetches the station feed of Argentina's national weather service, keeps
//! the last good copy in a JSON file, serves it over HTTP and lets it be
//! browsed by province in the terminal.

use std::io;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::signal;
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use smnview::app::App;
use smnview::cache::EnvelopeStore;
use smnview::cli::{Cli, Commands};
use smnview::config::AppConfig;
use smnview::data::{summary, SmnClient};
use smnview::refresh::{RefreshMode, Refresher, Scheduler};
use smnview::server::{self, AppState};
use smnview::ui;

/// Stations listed by `fetch`
const SUMMARY_SAMPLE: usize = 5;
/// How often `watch` reports its status
const STATUS_LOG_PERIOD: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The viewer owns the terminal, so it logs nothing
    if cli.command != Commands::View {
        init_logging(cli.verbose);
    }

    let mut config = AppConfig::load(&cli.config)?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    let store = EnvelopeStore::new(config.cache_path());

    match cli.command {
        Commands::Fetch => run_fetch(&config, &store).await?,
        Commands::Watch { .. } => run_watch(&config, store).await?,
        Commands::Serve { .. } => run_serve(&config, store).await?,
        Commands::View => run_view(store)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "smnview=debug,tower_http=debug"
    } else {
        "smnview=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Completes on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}

fn smn_client(config: &AppConfig) -> smnview::Result<SmnClient> {
    Ok(SmnClient::with_url(
        config.source_url.clone(),
        config.timeout(),
    )?)
}

/// One fetch; the summary goes to stdout and the cache is only replaced on
/// success
async fn run_fetch(config: &AppConfig, store: &EnvelopeStore) -> smnview::Result<()> {
    let envelope = smn_client(config)?.fetch().await;
    println!("{}", summary(&envelope, SUMMARY_SAMPLE));

    if envelope.success {
        store.write_async(envelope).await?;
        info!(path = %store.path().display(), "Saved weather data");
    }
    Ok(())
}

/// Standalone updater: refreshes every interval until interrupted
async fn run_watch(config: &AppConfig, store: EnvelopeStore) -> smnview::Result<()> {
    let refresher = Arc::new(Refresher::new(
        smn_client(config)?,
        store,
        config.refresh_interval(),
    ));
    let (scheduler, _) = Scheduler::default().start(refresher.clone(), RefreshMode::Always);
    info!("Updater running. Press Ctrl+C to stop.");

    let mut status_ticker = tokio::time::interval(STATUS_LOG_PERIOD);
    // The first tick completes immediately
    status_ticker.tick().await;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = status_ticker.tick() => {
                info!("{}", refresher.status(scheduler.is_running()).await);
            }
        }
    }

    let (_, transition) = scheduler.stop();
    info!("{}", transition);
    Ok(())
}

async fn run_serve(config: &AppConfig, store: EnvelopeStore) -> smnview::Result<()> {
    let refresher = Arc::new(Refresher::new(
        smn_client(config)?,
        store,
        config.refresh_interval(),
    ));

    let scheduler = if config.auto_refresh {
        Scheduler::default()
            .start(refresher.clone(), RefreshMode::WhenStale)
            .0
    } else {
        info!("Auto-refresh disabled, serving cached data as is");
        Scheduler::default()
    };

    let state = Arc::new(AppState {
        refresher,
        root: config.server.root.clone(),
        auto_refresh: config.auto_refresh,
        scheduler: Mutex::new(scheduler),
    });
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let result = server::start_server(&addr, state.clone(), shutdown_signal()).await;

    let scheduler = std::mem::take(&mut *state.scheduler.lock().await);
    scheduler.stop();
    result
}

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Renders the station list and, when toggled, the help overlay on top
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    ui::render_station_list(frame, app);
    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

fn run_view(store: EnvelopeStore) -> smnview::Result<()> {
    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store);
    app.load();

    loop {
        terminal.draw(|f| render_ui(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
