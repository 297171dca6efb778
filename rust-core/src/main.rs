use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use soundwave::audio::GestureProcessor;
use soundwave::{load_config, DetectorConfig, GestureState, IndicatorStyle};

#[derive(Parser)]
#[command(name = "soundwave")]
#[command(about = "Detect push/pull hand gestures from an ultrasonic tone")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not play the reference tone (use an external emitter)
    #[arg(long)]
    no_tone: bool,

    /// Stop after this many seconds
    #[arg(short, long)]
    duration: Option<f64>,

    /// List input devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if args.list_devices {
        for name in GestureProcessor::list_devices().context("Failed to list devices")? {
            println!("{}", name);
        }
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("Invalid config {}", path.display()))?,
        None => DetectorConfig::default(),
    };
    if args.no_tone {
        config.tone.enabled = false;
    }

    log::info!(
        "Carrier {:.0} Hz (bin {}), {} Hz, {} samples per frame",
        config.carrier_hz,
        config.carrier_bin(),
        config.sample_rate,
        config.frame_size
    );

    let mut processor = GestureProcessor::new(config)?;
    let device = processor.start().context("Failed to start gesture detection")?;
    log::info!("Listening on '{}' (Ctrl+C to quit)", device);

    let deadline = args
        .duration
        .map(|secs| Instant::now() + Duration::from_secs_f64(secs));
    let mut shown = GestureState::None;

    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        if !processor.is_running() {
            break;
        }

        if let Some(frame) = processor.latest() {
            if frame.state != shown {
                shown = frame.state;
                let style = IndicatorStyle::for_state(shown);
                println!(
                    "[{:>6}] {:<4}  push: {}/{}  pull: {}/{}",
                    frame.sequence,
                    shown.as_str().to_uppercase(),
                    style.push.text.as_str(),
                    style.push.background.as_str(),
                    style.pull.text.as_str(),
                    style.pull.background.as_str()
                );
            }
        }

        std::thread::sleep(Duration::from_millis(20));
    }

    let summary = processor.stop().context("Gesture detection failed")?;
    println!(
        "{} frames, {} pushes, {} pulls",
        summary.frames, summary.pushes, summary.pulls
    );

    Ok(())
}
