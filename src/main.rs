//! nds-emu - headless front end
//!
//! Usage: `nds-emu [ROM] [--frames N]`
//!
//! Runs the emulator thread over the null engine, prints load events and
//! the frame rate, and shuts down after N frames.

use anyhow::{bail, Context};
use clap::Parser;
use nds_core::{logging, Config, NullEngine};
use nds_runner::{event_channel, EmulatorThread, LoadEvent};
use std::path::PathBuf;
use std::time::{Duration, Instant};

const DEFAULT_FRAMES: u64 = 300;

#[derive(Parser, Debug)]
#[command(name = "nds-emu", about = "Headless runner for the nds-emu execution thread")]
struct Args {
    /// ROM image to load. Without one the thread starts and stops immediately.
    rom: Option<PathBuf>,

    /// Number of frames to emulate before exiting.
    #[arg(long, default_value_t = DEFAULT_FRAMES)]
    frames: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load().unwrap_or_else(|err| {
        eprintln!("Failed to load config ({}), using defaults", err);
        Config::default()
    });

    logging::init(config.debug.log_level);
    tracing::info!("Starting nds-emu");

    let (events_tx, events_rx) = event_channel();
    let thread = EmulatorThread::new(NullEngine::new(), &config, events_tx);
    let handle = thread.handle();
    let join = thread.spawn().context("failed to spawn emulator thread")?;

    let Some(rom) = args.rom else {
        tracing::info!("No ROM given, nothing to run");
        handle.request_shutdown();
        join.join()?;
        return Ok(());
    };
    handle.request_load(rom);

    let mut last_report = Instant::now();
    loop {
        for event in events_rx.try_iter() {
            let path = event.path().display();
            match &event {
                LoadEvent::Started(_) => tracing::info!("Loading {}", path),
                LoadEvent::Ended(_) => tracing::info!("Load finished: {}", path),
                LoadEvent::Error(_) => {
                    tracing::error!("Could not load {}", path);
                    handle.request_shutdown();
                    join.join()?;
                    bail!("failed to load {}", path);
                }
            }
        }

        if handle.take_frame_ready() {
            if let Some(frame) = handle.frame_lock().try_lock() {
                tracing::trace!("Presenting frame, first pixel {:08x}", frame.pixels[0]);
            }
        }

        if handle.frame_count() >= args.frames || join.is_finished() {
            break;
        }

        if last_report.elapsed() >= Duration::from_secs(1) {
            tracing::info!("{} frames, {} fps", handle.frame_count(), handle.fps());
            last_report = Instant::now();
        }
        std::thread::sleep(Duration::from_millis(1));
    }

    handle.request_shutdown();
    join.join()?;
    tracing::info!("Ran {} frames", handle.frame_count());
    Ok(())
}
