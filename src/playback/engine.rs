//! Playback orchestration
//!
//! Wires a decode source through the read-ahead stage, the frame adapter,
//! and the driver into an output stream, then blocks until the driver
//! reports end of stream. One call plays one file start to finish.

use crate::audio::decoder::PcmDecoder;
use crate::audio::output::{AudioSink, SinkStream, StreamParams};
use crate::error::Result;
use crate::playback::adapter::FrameAdapter;
use crate::playback::driver::PlaybackDriver;
use crate::playback::prefetch::PrefetchedDecoder;
use std::sync::mpsc;
use tracing::info;

/// Frames per output period requested from the sink.
///
/// Comfortably above the largest Vorbis decode block, so a healthy pull
/// never needs more than a handful of blocks and the remainder never
/// dominates a period.
pub const FRAMES_PER_PERIOD: u32 = 8192;

/// Play `decoder` to completion through `sink`.
///
/// Returns once the stream has drained and been stopped. The decode source
/// moves to a worker thread; the calling thread blocks on the driver's
/// completion signal instead of polling.
pub fn play<D, S>(decoder: D, sink: &mut S) -> Result<()>
where
    D: PcmDecoder + Send + 'static,
    S: AudioSink,
{
    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();

    let params = StreamParams {
        channels: channels as u16,
        sample_rate,
        frames_per_period: FRAMES_PER_PERIOD,
    };

    let prefetched = PrefetchedDecoder::new(decoder);
    let adapter = FrameAdapter::new(prefetched);
    let (done_tx, done_rx) = mpsc::channel();
    let mut driver = PlaybackDriver::new(adapter, done_tx);

    let mut stream = sink.open_stream(&params, Box::new(move |out: &mut [i16]| driver.pull(out)))?;

    info!("Playing ({} Hz, {} channel(s))", sample_rate, channels);
    stream.play()?;

    // Block until the driver reports end of stream. An Err means the stream
    // dropped the callback without signaling; either way playback is over.
    let _ = done_rx.recv();

    info!("Playback finished, stopping stream");
    stream.stop()?;

    Ok(())
}
