//! Frame-rate adaptation between decode blocks and fixed-size requests
//!
//! The codec produces variable-length blocks of planar f32 samples; the
//! audio host pulls exact-size interleaved i16 buffers on a real-time
//! deadline. [`FrameAdapter`] bridges the two: it drains carried-over
//! samples first, then decodes and quantizes until the request is
//! satisfied, parking any surplus from the final block in the remainder
//! buffer for the next call. No sample is decoded twice and none is lost
//! at a request boundary.
//!
//! The remainder buffer is allocated once, sized to the decoder's maximum
//! block, so steady-state `fill` calls do not allocate. After any call the
//! stored remainder is strictly smaller than one maximum decode block.
//!
//! End of stream is reported once the source latch is set and the
//! remainder is empty; from then on every call zero-fills the whole
//! request and returns [`FillStatus::EndOfStream`].

use crate::audio::decoder::PcmDecoder;
use crate::audio::quantize::quantize_i16;
use tracing::warn;

/// Outcome of one [`FrameAdapter::fill`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStatus {
    /// The request was satisfied with decoded audio.
    Ok,
    /// The source is exhausted; any unfilled tail was zero-padded.
    EndOfStream,
}

/// Serves exact-size frame requests from a variable-block PCM source.
pub struct FrameAdapter<D> {
    decoder: D,
    channels: usize,
    max_block_frames: usize,

    /// Quantized, interleaved samples decoded beyond the previous request
    remainder: Vec<i16>,
    /// Frames currently stored in `remainder`
    remainder_frames: usize,

    short_request_warned: bool,
}

impl<D: PcmDecoder> FrameAdapter<D> {
    /// Wrap a PCM source.
    ///
    /// Sizes the remainder buffer to the source's maximum decode block so
    /// later calls reuse it without reallocating.
    pub fn new(decoder: D) -> Self {
        let channels = decoder.channels();
        debug_assert!(channels > 0);
        let max_block_frames = decoder.max_block_frames().max(1);

        Self {
            decoder,
            channels,
            max_block_frames,
            remainder: vec![0; max_block_frames * channels],
            remainder_frames: 0,
            short_request_warned: false,
        }
    }

    /// Fill `out` with exactly `frames` interleaved frames.
    ///
    /// Carried-over samples from the previous call are delivered first,
    /// then freshly decoded blocks, quantized to i16 as they are copied.
    /// If a block produces more than the request still needs, the surplus
    /// is quantized into the remainder buffer at block granularity. When
    /// the source runs out, the unfilled tail is zeroed and the call
    /// returns [`FillStatus::EndOfStream`]; so does every call after it.
    ///
    /// Requests smaller than one maximum decode block are answered
    /// correctly but logged once, since they force the remainder to span
    /// multiple calls.
    ///
    /// # Panics
    /// If `out` holds fewer than `frames * channels` samples.
    pub fn fill(&mut self, out: &mut [i16], frames: usize) -> FillStatus {
        let ch = self.channels;
        let out = &mut out[..frames * ch];

        if frames < self.max_block_frames && !self.short_request_warned {
            warn!(
                "fill request of {} frames is below the {}-frame maximum decode block",
                frames, self.max_block_frames
            );
            self.short_request_warned = true;
        }

        // Deliver carried-over samples first
        let mut written = 0;
        if self.remainder_frames > 0 {
            let take = self.remainder_frames.min(frames);
            out[..take * ch].copy_from_slice(&self.remainder[..take * ch]);

            let leftover = self.remainder_frames - take;
            if leftover > 0 {
                self.remainder
                    .copy_within(take * ch..(take + leftover) * ch, 0);
            }
            self.remainder_frames = leftover;
            written = take;
        }

        // Decode until the request is satisfied or the source runs out
        while written < frames {
            let block = match self.decoder.decode_next() {
                Some(block) => block,
                None => break,
            };

            let block_frames = block.frames();
            let taken = block_frames.min(frames - written);

            for ch_idx in 0..ch {
                let plane = block.plane(ch_idx);
                let mut at = written * ch + ch_idx;
                for &sample in &plane[..taken] {
                    out[at] = quantize_i16(sample);
                    at += ch;
                }
            }

            // Park the surplus of a split block for the next call
            if block_frames > taken {
                let rest = block_frames - taken;
                if self.remainder.len() < rest * ch {
                    self.remainder.resize(rest * ch, 0);
                }
                for ch_idx in 0..ch {
                    let plane = block.plane(ch_idx);
                    let mut at = ch_idx;
                    for &sample in &plane[taken..] {
                        self.remainder[at] = quantize_i16(sample);
                        at += ch;
                    }
                }
                self.remainder_frames = rest;
            }

            written += taken;
        }

        // The stream is over once the latch is set and nothing is carried;
        // a request satisfied exactly as the last block drained stays Ok
        // and the next call reports the end
        if self.decoder.is_eos() && self.remainder_frames == 0 {
            out[written * ch..].fill(0);
            FillStatus::EndOfStream
        } else {
            FillStatus::Ok
        }
    }

    /// Channel count of the wrapped source.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Frames currently parked in the remainder buffer.
    pub fn remainder_frames(&self) -> usize {
        self.remainder_frames
    }

    /// Whether the source's end-of-stream latch is set.
    pub fn is_eos(&self) -> bool {
        self.decoder.is_eos()
    }

    /// Upper bound on frames one decode call can produce.
    pub fn max_block_frames(&self) -> usize {
        self.max_block_frames
    }
}
