//! PiKite rig controller: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  SysfsPin ─▶ ButtonPanel ─┐        RigHardware               │
//! │  RemoteServer ────────────┤        (Settings · Display ·     │
//! │                           ▼         Power · Camera · Alt ·   │
//! │                      InputQueue     PanTilt · EventSink)     │
//! │                           │                                  │
//! │  ──────────────── Port Trait Boundary ──────────────────     │
//! │                           ▼                                  │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  Controller: InputHandler · Menu · CaptureSession      │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use pikite::adapters::gpio::SysfsPin;
use pikite::adapters::power::SystemPower;
use pikite::adapters::remote::{RemoteEventSink, RemoteServer};
use pikite::adapters::rig::RigHardware;
use pikite::adapters::settings::FileSettings;
use pikite::app::service::Controller;
use pikite::config::SystemConfig;
use pikite::drivers::button::{ButtonDriver, ButtonPanel, ButtonTiming};
use pikite::events::{InputQueue, StatusQueue};
use pikite::input::ButtonId;
use pikite::logging;
use pikite::menu::tree::MenuNode;
use pikite::menu::Menu;
use pikite::timer::Timer;

#[derive(Parser)]
#[command(name = "pikite")]
#[command(about = "PiKite kite aerial photography rig controller")]
#[command(version)]
struct Cli {
    /// System config file (JSON)
    #[arg(short, long, default_value = "pikite.json")]
    config: PathBuf,

    /// Menu definition (JSON), overrides the config file
    #[arg(short, long)]
    menu: Option<PathBuf>,

    /// Log level, overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Do not open the GPIO buttons
    #[arg(long)]
    no_buttons: bool,

    /// Do not start the remote command listener
    #[arg(long)]
    no_remote: bool,

    /// Log shutdown / reboot instead of running them
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── 1. Config + logging ───────────────────────────────────
    let mut config = SystemConfig::load(&cli.config)?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(menu) = cli.menu {
        config.menu_path = Some(menu);
    }
    config.power_dry_run |= cli.dry_run;
    logging::init(&config.log_level);

    info!("PiKite v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Menu ───────────────────────────────────────────────
    let menu = match &config.menu_path {
        Some(path) => {
            Menu::load(path).with_context(|| format!("loading menu {}", path.display()))?
        }
        None => Menu::from_definition(&MenuNode::builtin()).context("building menu")?,
    };
    info!("Menu ready ({} elements)", menu.tree().len());

    // ── 3. Settings + ports ───────────────────────────────────
    let settings = FileSettings::open(&config.settings_path, config.defaults_path.as_deref())
        .with_context(|| format!("opening settings {}", config.settings_path.display()))?;
    let mut hardware = RigHardware::new(settings, SystemPower::new(config.power_dry_run));

    // ── 4. Queues + shutdown flag ─────────────────────────────
    let inbound = InputQueue::new();
    let outbound = StatusQueue::new();
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::SeqCst);
        })
        .context("installing signal handler")?;
    }

    let mut threads: Vec<JoinHandle<()>> = Vec::new();

    // ── 5. Input producers ────────────────────────────────────
    if cli.no_buttons {
        info!("Buttons disabled");
    } else {
        match open_buttons(&config) {
            Ok(panel) => threads.push(panel.spawn(inbound.clone(), shutdown.clone())?),
            Err(e) => warn!("Buttons unavailable ({:#}), continuing without them", e),
        }
    }

    match config.remote_bind.as_deref() {
        Some(addr) if !cli.no_remote => match RemoteServer::bind(addr) {
            Ok(server) => {
                hardware = hardware.with_remote(RemoteEventSink::new(outbound.clone()));
                threads.push(server.spawn(inbound.clone(), outbound, shutdown.clone())?);
            }
            Err(e) => error!("Remote listener on {} failed: {}", addr, e),
        },
        _ => info!("Remote listener disabled"),
    }

    // ── 6. Control loop ───────────────────────────────────────
    let mut controller = Controller::new(menu, hardware, Timer::new(), inbound, &config);
    controller.install_bindings();
    controller.start();
    controller.run(&shutdown);

    // ── 7. Teardown ───────────────────────────────────────────
    shutdown.store(true, Ordering::SeqCst);
    for handle in threads {
        if handle.join().is_err() {
            error!("Worker thread panicked");
        }
    }
    info!("PiKite stopped");
    Ok(())
}

fn open_buttons(config: &SystemConfig) -> Result<ButtonPanel<SysfsPin>> {
    let timing = ButtonTiming::from_config(config);
    let mut panel = ButtonPanel::new(Duration::from_millis(config.button_poll_ms));
    for (id, number) in [
        (ButtonId::Back, config.pin_back),
        (ButtonId::Select, config.pin_select),
        (ButtonId::Next, config.pin_next),
    ] {
        let pin = SysfsPin::open(&config.gpio_root, number)
            .with_context(|| format!("GPIO {number}"))?;
        panel.add(id, ButtonDriver::new(pin, timing));
    }
    Ok(panel)
}
