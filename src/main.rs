mod app;
mod dimensions;
mod discovery;
mod input;
mod render;
mod touchmouse;

use app::TouchviewApp;
use clap::Parser;
use discovery::udev_discovery::UdevDiscovery;
use discovery::{pick_device, DeviceDiscovery};
use input::hidraw_backend::HidrawSource;
use input::StopSignal;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use touchmouse::backend::{spawn_decoder_thread, DecoderHandle};
use touchmouse::touchmode::enable_touch_mode;

#[derive(Parser)]
#[command(name = "touchview", about = "Microsoft Touch Mouse raw touch visualizer")]
struct Cli {
    /// hidraw node to read instead of searching for the mouse
    #[arg(short, long)]
    device: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,

    /// Show a hex dump of the last touch report
    #[arg(long)]
    raw: bool,

    /// Print the grid to stdout instead of opening a window
    #[arg(long)]
    headless: bool,

    /// Headless print interval in milliseconds
    #[arg(long, default_value_t = 200)]
    interval_ms: u64,

    /// Do not switch the mouse into touch mode before reading
    #[arg(long, conflicts_with = "touchmode_only")]
    skip_touchmode: bool,

    /// Switch the mouse into touch mode and exit
    #[arg(long)]
    touchmode_only: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let device_path = match cli.device {
        Some(path) => path,
        None => match UdevDiscovery::find_touch_mice().and_then(pick_device) {
            Ok(path) => path,
            Err(e) => {
                log::error!("Unable to find Touch Mouse: {}", e);
                std::process::exit(1);
            }
        },
    };
    log::info!("Using hidraw device: {}", device_path.display());

    let stop = StopSignal::new();
    let source = match HidrawSource::open(&device_path, stop.clone()) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to open {}: {}", device_path.display(), e);
            std::process::exit(1);
        }
    };

    if !cli.skip_touchmode {
        match enable_touch_mode(&source) {
            Ok(outcome) => log::info!("{}", outcome),
            Err(e) => {
                log::error!("Failed to switch to touch mode: {}", e);
                std::process::exit(1);
            }
        }
    }
    if cli.touchmode_only {
        return;
    }

    let decoder = spawn_decoder_thread(source, stop);

    if cli.headless {
        let code = run_headless(decoder, Duration::from_millis(cli.interval_ms));
        std::process::exit(code);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 560.0])
            .with_min_inner_size([320.0, 240.0])
            .with_title("Touchview - Touch Mouse Visualizer"),
        ..Default::default()
    };

    let show_raw = cli.raw;
    eframe::run_native(
        "Touchview",
        options,
        Box::new(move |_cc| Ok(Box::new(TouchviewApp::new(decoder, show_raw)))),
    )
    .expect("Failed to run eframe");
}

/// Print contact changes and the latest grid until the decoder exits.
/// Returns the process exit code.
fn run_headless(mut decoder: DecoderHandle, interval: Duration) -> i32 {
    let mut last_printed = None;
    loop {
        for contact in decoder.events.try_iter() {
            println!("finger {}", if contact.pressed { "down" } else { "up" });
        }

        let grid = decoder.published.grid.snapshot();
        if last_printed.as_ref() != Some(&grid) {
            if grid.is_blank() {
                println!("(no touch)");
            } else {
                println!("{}peak {}", grid, grid.max());
            }
            last_printed = Some(grid);
        }

        if decoder.is_finished() {
            break;
        }
        thread::sleep(interval);
    }

    match decoder.stop_and_join() {
        Ok(()) => 0,
        Err(e) => {
            log::error!("Decoder failed: {}", e);
            1
        }
    }
}
