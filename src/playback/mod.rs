//! Playback pipeline: frame adaptation, read-ahead, and the realtime driver

pub mod adapter;
pub mod driver;
pub mod engine;
pub mod prefetch;

pub use adapter::{FillStatus, FrameAdapter};
pub use driver::PlaybackDriver;
pub use engine::play;
pub use prefetch::PrefetchedDecoder;
