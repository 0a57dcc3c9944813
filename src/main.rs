//! keytrace binary. Monitors a serial port, a MIDI input, or a scripted demo feed.

use keytrace::config::USAGE;
use keytrace::display::UiStyle;
use keytrace::io::LoopbackTransport;
use keytrace::{demo, Error, Monitor, MonitorBuilder, MonitorConfig, Result};
use std::env;
use std::time::Duration;
use tracing::info;

const DEMO_INTERVAL: Duration = Duration::from_millis(400);

fn main() -> Result<()> {
    // Frames go to stdout; keep log lines out of them
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("-h" | "--help") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some("--demo") => run_demo(&args[1..]),
        _ => {
            let config = MonitorConfig::from_args(&args)?;
            let mut monitor = MonitorBuilder::from_config(&config)?.build()?;
            install_ctrlc(&monitor)?;
            monitor.run()
        }
    }
}

fn run_demo(args: &[String]) -> Result<()> {
    let style: UiStyle = match args {
        [] => Default::default(),
        [style] => style.parse()?,
        _ => return Err(Error::InvalidArgs(USAGE.into())),
    };

    let transport = LoopbackTransport::new("demo");
    let feed = transport.writer();

    let mut monitor = Monitor::builder()
        .transport(transport)
        .style(style)
        .keymap("c3-c6".parse()?)
        .settle(Duration::ZERO)
        .build()?;
    install_ctrlc(&monitor)?;

    let player = demo::spawn_feed(feed, monitor.shutdown_handle(), DEMO_INTERVAL)?;
    let result = monitor.run();
    let _ = player.join();
    result
}

fn install_ctrlc(monitor: &Monitor) -> Result<()> {
    let shutdown = monitor.shutdown_handle();
    ctrlc::set_handler(move || {
        info!("Interrupted, closing down");
        shutdown.shutdown();
    })?;
    Ok(())
}
