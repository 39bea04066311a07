//! Ogg/Vorbis decode session using symphonia
//!
//! The session owns the container reader and codec state and exposes the
//! decode loop as a pull of planar f32 blocks. Block sizes vary per call up
//! to [`PcmDecoder::max_block_frames`]; the frame adapter downstream owns
//! the job of reshaping them into fixed-size requests.
//!
//! End of stream is a latch: once `decode_next` returns `None`, it returns
//! `None` for the remaining life of the session. Individual packets that
//! fail to decode are skipped with a warning; only container-level failures
//! stop the stream early.

use crate::error::{Error, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_VORBIS};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Upper bound on frames per decode call when the header does not say.
///
/// The Vorbis long block caps at 8192 samples per channel, so no conforming
/// stream can exceed this in a single packet.
const VORBIS_MAX_BLOCK_FRAMES: usize = 8192;

/// Borrowed view of one decoded block: planar f32 samples, one plane per
/// channel, each `frames` samples long.
///
/// The view borrows storage owned by the decoder and is invalidated by the
/// next `decode_next` call.
#[derive(Debug)]
pub struct PcmBlock<'a> {
    planes: &'a [Vec<f32>],
    frames: usize,
}

impl<'a> PcmBlock<'a> {
    /// Wrap planar storage as a block of `frames` frames.
    ///
    /// Every plane must hold at least `frames` samples.
    pub fn new(planes: &'a [Vec<f32>], frames: usize) -> Self {
        debug_assert!(!planes.is_empty());
        debug_assert!(planes.iter().all(|p| p.len() >= frames));
        Self { planes, frames }
    }

    /// Number of frames in this block.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.planes.len()
    }

    /// Samples for one channel, exactly `frames` long.
    pub fn plane(&self, channel: usize) -> &'a [f32] {
        &self.planes[channel][..self.frames]
    }
}

/// Source of decoded PCM blocks.
///
/// The decode seam between the playback pipeline and the codec engine.
/// Implemented by [`VorbisSession`] for real files and by scripted sources
/// in tests.
pub trait PcmDecoder {
    /// Decode and return the next non-empty block, or `None` at end of
    /// stream. `None` is a latch; it repeats forever for this source.
    fn decode_next(&mut self) -> Option<PcmBlock<'_>>;

    /// Channel count, fixed for the life of the source.
    fn channels(&self) -> usize;

    /// Sample rate in Hz, fixed for the life of the source.
    fn sample_rate(&self) -> u32;

    /// Whether the end-of-stream latch has been set.
    fn is_eos(&self) -> bool;

    /// Upper bound on frames a single `decode_next` call can produce.
    fn max_block_frames(&self) -> usize;
}

/// Open the container for `path` and probe its format.
fn open_format(path: &Path) -> Result<Box<dyn FormatReader>> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Hint from the file extension, if any
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| Error::UnsupportedStream(format!("{}: {}", path.display(), e)))?;

    Ok(probed.format)
}

/// Check whether `path` is an Ogg/Vorbis stream without building decoder
/// state.
///
/// Runs the container probe and inspects the default track's codec. A
/// negative answer is an error so the caller refuses the file before any
/// session or device setup.
pub fn probe_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let format = open_format(path)?;

    let track = format.default_track().ok_or_else(|| {
        Error::UnsupportedStream(format!("{}: no audio track found", path.display()))
    })?;

    if track.codec_params.codec != CODEC_TYPE_VORBIS {
        return Err(Error::UnsupportedStream(format!(
            "{}: default track is not Vorbis",
            path.display()
        )));
    }

    debug!("{} probed as Ogg/Vorbis", path.display());
    Ok(())
}

/// Decode session for one Ogg/Vorbis file.
///
/// Owns the format reader, the codec state, and the planar storage that
/// [`PcmBlock`] views borrow. Dropping the session releases the codec and
/// the file handle.
pub struct VorbisSession {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,

    /// Track being decoded; packets from other tracks are skipped
    track_id: u32,

    channels: usize,
    sample_rate: u32,
    max_block_frames: usize,

    /// Reused per-channel storage for the most recent decoded block
    planes: Vec<Vec<f32>>,

    /// End-of-stream latch; never resets while the session is open
    eos: bool,
}

impl std::fmt::Debug for VorbisSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VorbisSession")
            .field("track_id", &self.track_id)
            .field("channels", &self.channels)
            .field("sample_rate", &self.sample_rate)
            .field("max_block_frames", &self.max_block_frames)
            .field("eos", &self.eos)
            .finish_non_exhaustive()
    }
}

impl VorbisSession {
    /// Open `path` and parse headers until codec parameters are known.
    ///
    /// # Errors
    /// - File cannot be opened
    /// - Container probe fails or no track is present
    /// - The default track is not Vorbis
    /// - The header omits channel count or sample rate
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = open_format(path)?;

        let track = format.default_track().ok_or_else(|| {
            Error::UnsupportedStream(format!("{}: no audio track found", path.display()))
        })?;

        if track.codec_params.codec != CODEC_TYPE_VORBIS {
            return Err(Error::UnsupportedStream(format!(
                "{}: default track is not Vorbis",
                path.display()
            )));
        }

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let channels = codec_params
            .channels
            .map(|c| c.count())
            .ok_or_else(|| Error::Header("stream header omits channel count".to_string()))?;
        if channels == 0 {
            return Err(Error::Header("stream header reports zero channels".to_string()));
        }

        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| Error::Header("stream header omits sample rate".to_string()))?;

        let max_block_frames = codec_params
            .max_frames_per_packet
            .map(|n| n as usize)
            .unwrap_or(VORBIS_MAX_BLOCK_FRAMES);

        let decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| Error::Header(format!("failed to build Vorbis decoder: {}", e)))?;

        debug!(
            "Opened {}: {} Hz, {} channel(s), max decode block {} frames",
            path.display(),
            sample_rate,
            channels,
            max_block_frames
        );

        Ok(Self {
            format,
            decoder,
            track_id,
            channels,
            sample_rate,
            max_block_frames,
            planes: vec![Vec::new(); channels],
            eos: false,
        })
    }
}

impl PcmDecoder for VorbisSession {
    fn decode_next(&mut self) -> Option<PcmBlock<'_>> {
        if self.eos {
            return None;
        }

        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    debug!("end of stream reached");
                    self.eos = true;
                    return None;
                }
                Err(e) => {
                    warn!("stopping decode after container error: {}", e);
                    self.eos = true;
                    return None;
                }
            };

            // Skip packets from other tracks
            if packet.track_id() != self.track_id {
                continue;
            }

            let frames = match self.decoder.decode(&packet) {
                Ok(AudioBufferRef::F32(buf)) => {
                    let frames = buf.frames();
                    if frames > 0 {
                        for (ch, plane) in self.planes.iter_mut().enumerate() {
                            plane.clear();
                            plane.extend_from_slice(buf.chan(ch));
                        }
                    }
                    frames
                }
                Ok(_) => {
                    warn!("Vorbis decoder produced a non-f32 buffer, stopping");
                    self.eos = true;
                    return None;
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    // Recoverable per the symphonia contract; move on
                    warn!("skipping undecodable packet: {}", e);
                    continue;
                }
                Err(e) => {
                    warn!("stopping decode after codec error: {}", e);
                    self.eos = true;
                    return None;
                }
            };

            // Header and priming packets decode to empty buffers
            if frames == 0 {
                continue;
            }

            return Some(PcmBlock::new(&self.planes, frames));
        }
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn is_eos(&self) -> bool {
        self.eos
    }

    fn max_block_frames(&self) -> usize {
        self.max_block_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_nonexistent_file() {
        let result = VorbisSession::open("/nonexistent/file.ogg");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_probe_nonexistent_file() {
        let result = probe_file("/nonexistent/file.ogg");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_pcm_block_plane_view() {
        let planes = vec![vec![0.1f32, 0.2, 0.3, 0.4], vec![0.5, 0.6, 0.7, 0.8]];
        let block = PcmBlock::new(&planes, 3);
        assert_eq!(block.frames(), 3);
        assert_eq!(block.channels(), 2);
        assert_eq!(block.plane(0), &[0.1, 0.2, 0.3]);
        assert_eq!(block.plane(1), &[0.5, 0.6, 0.7]);
    }
}
