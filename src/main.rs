use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sensordash::config::AppConfig;
use sensordash::source::MqttConnector;
use sensordash::ui::Theme;
use sensordash::{events, ui, App, Dashboard};

/// How long to wait for input before running housekeeping.
const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "sensordash")]
#[command(about = "Terminal dashboard for ESP32 sensor nodes publishing over MQTT")]
struct Args {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Broker URL (e.g. wss://broker.hivemq.com:8884/mqtt, mqtt://localhost:1883)
    #[arg(short, long)]
    broker: Option<String>,

    /// Log file (the terminal is owned by the UI)
    #[arg(long, default_value = "sensordash.log")]
    log_file: PathBuf,

    /// Refresh interval in milliseconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Temperature danger threshold
    #[arg(long)]
    temp_warning: Option<f64>,

    /// Gas danger threshold
    #[arg(long)]
    gas_warning: Option<f64>,

    /// Light warning threshold
    #[arg(long)]
    light_low: Option<f64>,
}

impl Args {
    /// Apply command line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(ref url) = self.broker {
            config.broker.url = url.clone();
        }
        if let Some(refresh) = self.refresh {
            config.ui.refresh_ms = refresh;
        }
        if let Some(v) = self.temp_warning {
            config.thresholds.temp_warning = v;
        }
        if let Some(v) = self.gas_warning {
            config.thresholds.gas_warning = v;
        }
        if let Some(v) = self.light_low {
            config.thresholds.light_low = v;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    init_logging(&args.log_file)?;
    info!("Starting sensordash against {}", config.broker.url);

    // The MQTT event loop runs on this runtime while the UI owns the main thread
    let rt = tokio::runtime::Runtime::new()?;
    let connector = MqttConnector::new(
        config.broker.clone(),
        config.topics.clone(),
        rt.handle().clone(),
    );
    let dashboard = Dashboard::new(config.topics.clone(), config.thresholds.clone());
    let app = App::new(Box::new(connector), dashboard, config.ui.clone())
        .with_theme(Theme::auto_detect());

    run_tui(app)
}

/// Route tracing output to a log file.
fn init_logging(path: &std::path::Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// Run the TUI until the user quits
fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    app.connect();

    let result = run_app(&mut terminal, &mut app);

    // Close the broker connection before tearing down the terminal
    app.quit();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let refresh_interval = app.ui.refresh_interval();
    let mut last_refresh = Instant::now();

    while app.running {
        // Apply everything the broker delivered since the last frame
        app.pump(Instant::now());

        terminal.draw(|frame| ui::render(frame, app))?;

        if let Some(event) = events::poll_event(EVENT_POLL_TIMEOUT)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        if last_refresh.elapsed() >= refresh_interval {
            app.tick(Instant::now());
            last_refresh = Instant::now();
        }
    }

    Ok(())
}
