//! oggplay - Ogg/Vorbis file player
//!
//! Thin controller over the library: parse arguments, show the device
//! table, probe the file, open a decode session and an output device, and
//! play to completion. All diagnostics go to stderr; stdout stays silent.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oggplay::audio::decoder::{probe_file, VorbisSession};
use oggplay::audio::output::{self, CpalSink};
use oggplay::audio::PcmDecoder;
use oggplay::playback::engine;

/// Command-line arguments for oggplay
///
/// Device indices come as a pair: giving an input index without an output
/// index is rejected.
#[derive(Parser, Debug)]
#[command(name = "oggplay")]
#[command(about = "Play an Ogg/Vorbis audio file")]
#[command(version)]
struct Args {
    /// Path to the Ogg/Vorbis file to play
    file: PathBuf,

    /// Input device index (accepted for interface compatibility; no
    /// capture stream is opened)
    #[arg(requires = "output_device")]
    input_device: Option<usize>,

    /// Output device index (default output device if omitted)
    output_device: Option<usize>,
}

fn main() -> Result<()> {
    // Initialize tracing; everything goes to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oggplay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let devices = output::list_devices().context("Failed to enumerate audio devices")?;
    for device in &devices {
        info!(
            "Device {}: {} (in: {}, out: {})",
            device.index, device.name, device.max_input_channels, device.max_output_channels
        );
    }

    info!("Probing {}", args.file.display());
    probe_file(&args.file)
        .with_context(|| format!("{} is not an Ogg/Vorbis file", args.file.display()))?;
    info!("{} is an Ogg/Vorbis stream", args.file.display());

    let session = VorbisSession::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    info!(
        "Opened {}: {} Hz, {} channel(s)",
        args.file.display(),
        session.sample_rate(),
        session.channels()
    );

    if let Some(index) = args.input_device {
        info!("Input device {} accepted (playback only, not opened)", index);
    }

    let mut sink =
        CpalSink::from_device_index(args.output_device).context("Failed to open output device")?;
    info!("Output device: {}", sink.device_name());

    engine::play(session, &mut sink).context("Playback failed")?;

    info!("Done");
    Ok(())
}
