//! Read-ahead decode stage
//!
//! Decoding touches the file and runs codec math, neither of which belongs
//! on the audio host's real-time thread. [`PrefetchedDecoder`] moves the
//! wrapped source onto a worker thread that decodes ahead into a bounded
//! queue of owned blocks; the real-time side receives them in order
//! through the same [`PcmDecoder`] interface it would use for a direct
//! source. Block boundaries, content, and end-of-stream latching are
//! unchanged by the stage.
//!
//! If the worker falls behind, the consumer blocks on the queue rather
//! than inventing silence; sample continuity wins over deadline slack.
//! When the consumer is dropped mid-stream, the disconnected queue unblocks
//! the worker and it exits.

use crate::audio::decoder::{PcmBlock, PcmDecoder};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Depth of the read-ahead queue, in decode blocks.
const QUEUE_BLOCKS: usize = 32;

/// One decoded block with its own storage, safe to move across threads.
struct OwnedBlock {
    planes: Vec<Vec<f32>>,
    frames: usize,
}

/// Decodes the whole source into `tx`, stopping early if the consumer goes
/// away.
fn decode_into<D: PcmDecoder>(mut decoder: D, tx: SyncSender<OwnedBlock>) {
    loop {
        let owned = match decoder.decode_next() {
            Some(block) => OwnedBlock {
                planes: (0..block.channels())
                    .map(|ch| block.plane(ch).to_vec())
                    .collect(),
                frames: block.frames(),
            },
            None => break,
        };

        if tx.send(owned).is_err() {
            debug!("read-ahead consumer dropped, stopping decode worker");
            return;
        }
    }
    debug!("decode worker reached end of stream");
}

/// A [`PcmDecoder`] that runs the wrapped source on a worker thread.
///
/// `decode_next` blocks on the queue when the worker is behind and latches
/// end of stream once the queue is drained and disconnected. Dropping the
/// stage disconnects the queue and joins the worker.
pub struct PrefetchedDecoder {
    rx: Option<Receiver<OwnedBlock>>,
    worker: Option<JoinHandle<()>>,

    /// Storage for the most recently received block; the lent view points
    /// into it
    current: Option<OwnedBlock>,

    channels: usize,
    sample_rate: u32,
    max_block_frames: usize,
    eos: bool,
}

impl PrefetchedDecoder {
    /// Move `decoder` onto a worker thread and start decoding ahead.
    pub fn new<D>(decoder: D) -> Self
    where
        D: PcmDecoder + Send + 'static,
    {
        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let max_block_frames = decoder.max_block_frames();

        let (tx, rx) = mpsc::sync_channel(QUEUE_BLOCKS);
        let worker = thread::spawn(move || decode_into(decoder, tx));

        Self {
            rx: Some(rx),
            worker: Some(worker),
            current: None,
            channels,
            sample_rate,
            max_block_frames,
            eos: false,
        }
    }
}

impl PcmDecoder for PrefetchedDecoder {
    fn decode_next(&mut self) -> Option<PcmBlock<'_>> {
        // The previous lent view is gone; its storage can be replaced
        self.current = None;

        if self.eos {
            return None;
        }

        let rx = self.rx.as_ref()?;
        match rx.recv() {
            Ok(block) => {
                let block = self.current.insert(block);
                Some(PcmBlock::new(&block.planes, block.frames))
            }
            Err(_) => {
                debug!("read-ahead queue drained, end of stream");
                self.eos = true;
                self.rx = None;
                None
            }
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

impl Drop for PrefetchedDecoder {
    fn drop(&mut self) {
        // Disconnect the queue first so a worker blocked on send unblocks
        self.rx = None;
        self.current = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
