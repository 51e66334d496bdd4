// Relayout CLI
// Daemon binary: reads keyboards, runs the rule engine, types corrections

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;

use relayout_core::config::Config;
use relayout_core::respawn::{respawn_delay, spawn_replacement};
use relayout_core::window::WaylandFocusProvider;
use relayout_core::{
    list_devices, register_builtin_hooks, spawn_readers, CommandLayout, Engine,
    FocusedWindowProvider, InputEvent, KeySink, LayoutController, MemoryLayout, RecordingSink,
    ScriptedProvider, VirtualDevice,
};

/// How often the main loop wakes up to check for shutdown
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Keyboard layout auto-correction daemon
#[derive(Parser, Debug)]
#[command(name = "relayout")]
#[command(version)]
#[command(about = "Retypes words entered in the wrong keyboard layout", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, value_name = "CONFIG", env = "CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, env = "DEBUG")]
    debug: bool,

    /// Enable informational logging
    #[arg(short, long, env = "VERBOSE")]
    verbose: bool,

    /// Echo key events as rule-grammar tokens instead of running actions
    #[arg(short, long, env = "TEST")]
    test: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    /// List the input devices that would be read
    #[arg(long)]
    list_devices: bool,

    /// Log synthetic key events instead of writing them to a virtual keyboard
    #[arg(long)]
    dry_run: bool,
}

fn init_logging(args: &Args) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.debug {
        builder.filter_level(log::LevelFilter::Debug);
    } else if args.verbose {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder.init();
}

/// Daemon wiring: collaborators, signal handling and the event loop
struct Application {
    config: Config,
    args: Args,
    /// Flag to signal event loop to stop
    running: Arc<AtomicBool>,
}

impl Application {
    fn new(config: Config, args: Args) -> Self {
        Self {
            config,
            args,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    fn list_devices(&self) -> anyhow::Result<()> {
        let devices = list_devices(&self.config.scan_devices.filter)?;
        println!("Found {} device(s):", devices.len());
        for device in &devices {
            println!("  {}: {} ({})", device.kind, device.name, device.path.display());
        }
        Ok(())
    }

    fn check_test_device(&self) -> anyhow::Result<()> {
        let Some(test) = &self.config.scan_devices.test else {
            return Ok(());
        };
        if !test.exists() {
            bail!("ScanDevices.Test does not exist: {}", test.display());
        }

        let respawn = self.config.scan_devices.respawn;
        if respawn.is_zero() {
            return Ok(());
        }
        if let Some(delay) = respawn_delay(test, respawn)? {
            log::info!("Scheduled respawn in {:?}", delay);
            std::thread::Builder::new()
                .name("respawn".to_string())
                .spawn(move || {
                    std::thread::sleep(delay);
                    match spawn_replacement() {
                        Ok(pid) => {
                            log::info!("Respawned as pid {}", pid);
                            std::process::exit(0);
                        }
                        Err(e) => log::error!("Respawn failed: {}", e),
                    }
                })?;
        }
        Ok(())
    }

    fn focus_provider() -> Box<dyn FocusedWindowProvider> {
        match WaylandFocusProvider::connect() {
            Ok(provider) => {
                log::info!("Tracking focus over Wayland");
                return Box::new(provider);
            }
            Err(e) => log::debug!("{}", e),
        }

        #[cfg(feature = "x11-backend")]
        match relayout_core::X11FocusProvider::connect() {
            Ok(provider) => {
                log::info!("Tracking focus over X11");
                return Box::new(provider);
            }
            Err(e) => log::debug!("{}", e),
        }

        log::warn!("No window focus backend, using a single context");
        Box::new(ScriptedProvider::new(""))
    }

    fn layout_controller(&self) -> Box<dyn LayoutController> {
        #[cfg(feature = "x11-backend")]
        match relayout_core::XkbLayout::connect() {
            Ok(layout) => {
                log::info!("Switching layouts over XKB");
                return Box::new(layout);
            }
            Err(e) => log::debug!("{}", e),
        }

        let initial = self.config.layouts.first().copied().unwrap_or(0);
        match &self.config.keyboard.layout_command {
            Some(command) => {
                log::info!("Switching layouts with \"{}\"", command);
                Box::new(CommandLayout::new(command.clone(), initial))
            }
            None => {
                log::warn!("No layout backend, layout switches are not applied");
                Box::new(MemoryLayout::new(initial))
            }
        }
    }

    fn key_sink(&self, recording: &RecordingSink) -> anyhow::Result<Box<dyn KeySink>> {
        if self.args.dry_run {
            return Ok(Box::new(recording.clone()));
        }
        let device = VirtualDevice::new(self.config.keyboard.delay)
            .context("creating the virtual keyboard")?;
        Ok(Box::new(device))
    }

    fn install_signal_handler(&self) {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let running = self.running.clone();
        std::thread::spawn(move || {
            if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM]) {
                if signals.forever().next().is_some() {
                    log::info!("Received signal, shutting down");
                    running.store(false, Ordering::SeqCst);
                }
            }
        });
    }

    fn run(self) -> anyhow::Result<()> {
        self.check_test_device()?;
        let events = spawn_readers(&self.config.scan_devices.filter)?;
        self.install_signal_handler();

        if self.args.test {
            eprintln!("Test mode: press keys to see their names, Ctrl+C to quit");
            return self.echo_loop(events);
        }

        let recording = RecordingSink::new();
        let sink = self.key_sink(&recording)?;
        let layout = self.layout_controller();
        let focus = Self::focus_provider();

        let mut engine = Engine::new(self.config.clone(), sink, layout, focus);
        register_builtin_hooks(&mut engine);
        log::info!("relayout is running");

        while self.running.load(Ordering::SeqCst) {
            match events.recv_timeout(POLL_INTERVAL) {
                Ok(event) => {
                    engine.process_event(event);
                    if self.args.dry_run {
                        let typed = recording.take();
                        if !typed.is_empty() {
                            let tail: Vec<String> = typed.iter().map(ToString::to_string).collect();
                            log::info!("Would type: {}", tail.join(","));
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => bail!("all input devices closed"),
            }
        }
        Ok(())
    }

    /// `--test`: print every key event in rule-grammar form
    fn echo_loop(&self, events: std::sync::mpsc::Receiver<InputEvent>) -> anyhow::Result<()> {
        while self.running.load(Ordering::SeqCst) {
            match events.recv_timeout(POLL_INTERVAL) {
                Ok(InputEvent::Key(event)) => eprint!(",{}", event),
                Ok(InputEvent::MouseClick) => {}
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => bail!("all input devices closed"),
            }
        }
        eprintln!();
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let (config, source) = Config::load(args.config.as_deref())?;

    let app = Application::new(config, args);
    if app.args.check_config {
        println!("Configuration is valid ({})", source);
        return Ok(());
    }
    if app.args.list_devices {
        return app.list_devices();
    }
    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["relayout", "--config", "/tmp/test.toml"]);

        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
        assert!(!args.check_config);
        assert!(!args.list_devices);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_args_short_flags() {
        let args = Args::parse_from(["relayout", "-c", "/tmp/test.toml", "-d", "-t"]);

        assert!(args.debug);
        assert!(args.test);
        assert!(!args.verbose);
    }

    #[test]
    fn test_args_check_config() {
        let args = Args::parse_from(["relayout", "--check-config", "--dry-run"]);

        assert!(args.check_config);
        assert!(args.dry_run);
        assert_eq!(args.config, None);
    }
}
