//! Real-time pull callback
//!
//! The driver is the body of the audio host's data callback. Each
//! invocation sizes the request from the buffer the host hands over, fills
//! it through the adapter, and raises the one-shot completion signal the
//! first time the stream ends. The controller blocks on that signal
//! instead of polling.

use crate::audio::decoder::PcmDecoder;
use crate::playback::adapter::{FillStatus, FrameAdapter};
use std::sync::mpsc::Sender;

/// Feeds the output stream from a [`FrameAdapter`] and signals completion.
pub struct PlaybackDriver<D> {
    adapter: FrameAdapter<D>,
    channels: usize,

    /// One-shot completion signal; taken on the first end of stream
    done: Option<Sender<()>>,
}

impl<D: PcmDecoder> PlaybackDriver<D> {
    pub fn new(adapter: FrameAdapter<D>, done: Sender<()>) -> Self {
        let channels = adapter.channels();
        Self {
            adapter,
            channels,
            done: Some(done),
        }
    }

    /// Fill one host period.
    ///
    /// The frame count comes from the buffer length; the host always hands
    /// over whole frames for the stream's channel count. After the stream
    /// ends the buffer is all silence, so a host that keeps pulling until
    /// the controller stops it plays nothing audible.
    pub fn pull(&mut self, out: &mut [i16]) {
        let frames = out.len() / self.channels;
        let status = self.adapter.fill(out, frames);

        if status == FillStatus::EndOfStream {
            if let Some(done) = self.done.take() {
                // The receiver may already be gone during teardown
                let _ = done.send(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decoder::PcmBlock;
    use std::sync::mpsc;

    /// Mono source: `blocks` blocks of 4 frames, all samples 0.25.
    struct FourFrameBlocks {
        blocks: usize,
        storage: Vec<Vec<f32>>,
        eos: bool,
    }

    impl FourFrameBlocks {
        fn new(blocks: usize) -> Self {
            Self {
                blocks,
                storage: vec![vec![0.25; 4]],
                eos: false,
            }
        }
    }

    impl PcmDecoder for FourFrameBlocks {
        fn decode_next(&mut self) -> Option<PcmBlock<'_>> {
            if self.blocks == 0 {
                self.eos = true;
                return None;
            }
            self.blocks -= 1;
            Some(PcmBlock::new(&self.storage, 4))
        }

        fn channels(&self) -> usize {
            1
        }

        fn sample_rate(&self) -> u32 {
            44100
        }

        fn is_eos(&self) -> bool {
            self.eos
        }

        fn max_block_frames(&self) -> usize {
            4
        }
    }

    #[test]
    fn test_no_signal_while_audio_remains() {
        let (tx, rx) = mpsc::channel();
        let adapter = FrameAdapter::new(FourFrameBlocks::new(3));
        let mut driver = PlaybackDriver::new(adapter, tx);
        let mut buf = vec![0i16; 4];

        for _ in 0..3 {
            driver.pull(&mut buf);
            assert!(rx.try_recv().is_err());
            assert!(buf.iter().all(|&s| s == 8192)); // 0.25 * 32768
        }
    }

    #[test]
    fn test_signal_fires_exactly_once_at_end() {
        let (tx, rx) = mpsc::channel();
        let adapter = FrameAdapter::new(FourFrameBlocks::new(1));
        let mut driver = PlaybackDriver::new(adapter, tx);
        let mut buf = vec![0i16; 8];

        // One 4-frame block against an 8-frame period: first pull ends the
        // stream, pads with silence, and signals
        driver.pull(&mut buf);
        assert_eq!(&buf[..4], &[8192; 4]);
        assert_eq!(&buf[4..], &[0; 4]);
        assert_eq!(rx.try_recv(), Ok(()));

        // Later pulls stay silent and never signal again
        driver.pull(&mut buf);
        assert!(buf.iter().all(|&s| s == 0));
        assert!(rx.try_recv().is_err());
    }
}
