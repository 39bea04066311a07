//! Scripted PCM sources
//!
//! [`ScriptedDecoder`] replays a prebuilt list of planar blocks through the
//! `PcmDecoder` seam, with the same lending-view and end-of-stream latch
//! semantics as the real session. The standard sample pattern is chosen so
//! quantization is exact, letting tests compare pipeline output against
//! [`quantized_reference`] sample for sample.

use oggplay::audio::{PcmBlock, PcmDecoder};

/// The i16 value [`sample_value`] quantizes to for an absolute frame and
/// channel. Values stay well inside the i16 range so no clamping applies.
pub fn expected_i16(frame: usize, channel: usize) -> i16 {
    (((frame * 31 + channel * 17) % 4001) as i16) - 2000
}

/// Deterministic float sample for an absolute frame and channel.
///
/// Integer over 32768, so quantization reproduces [`expected_i16`] exactly.
pub fn sample_value(frame: usize, channel: usize) -> f32 {
    expected_i16(frame, channel) as f32 / 32768.0
}

/// Interleaved quantized output expected for the first `frames` frames of
/// the standard pattern.
pub fn quantized_reference(channels: usize, frames: usize) -> Vec<i16> {
    let mut out = Vec::with_capacity(frames * channels);
    for frame in 0..frames {
        for ch in 0..channels {
            out.push(expected_i16(frame, ch));
        }
    }
    out
}

/// Replays a fixed list of planar blocks as a [`PcmDecoder`].
///
/// Cloning before use gives an identical twin, which is how tests compare
/// two pipeline arrangements over the same input.
#[derive(Clone)]
pub struct ScriptedDecoder {
    /// Owned blocks: `blocks[i][channel][frame]`
    blocks: Vec<Vec<Vec<f32>>>,
    next: usize,
    channels: usize,
    sample_rate: u32,
    max_block_frames: usize,

    /// Storage the lent view points into
    current: Vec<Vec<f32>>,
    eos: bool,
}

impl ScriptedDecoder {
    pub fn new(channels: usize, sample_rate: u32, blocks: Vec<Vec<Vec<f32>>>) -> Self {
        let max_block_frames = blocks.iter().map(|b| b[0].len()).max().unwrap_or(1);
        Self {
            blocks,
            next: 0,
            channels,
            sample_rate,
            max_block_frames,
            current: Vec::new(),
            eos: false,
        }
    }

    /// Standard-pattern source cut into blocks of the given sizes.
    pub fn with_block_sizes(channels: usize, sample_rate: u32, sizes: &[usize]) -> Self {
        let mut blocks = Vec::with_capacity(sizes.len());
        let mut frame = 0usize;
        for &size in sizes {
            let mut block = Vec::with_capacity(channels);
            for ch in 0..channels {
                block.push((0..size).map(|f| sample_value(frame + f, ch)).collect());
            }
            frame += size;
            blocks.push(block);
        }
        Self::new(channels, sample_rate, blocks)
    }

    /// Total frames across all blocks.
    pub fn total_frames(&self) -> usize {
        self.blocks.iter().map(|b| b[0].len()).sum()
    }
}

impl PcmDecoder for ScriptedDecoder {
    fn decode_next(&mut self) -> Option<PcmBlock<'_>> {
        if self.next >= self.blocks.len() {
            self.eos = true;
            return None;
        }
        self.current = self.blocks[self.next].clone();
        self.next += 1;

        let frames = self.current[0].len();
        Some(PcmBlock::new(&self.current, frames))
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
