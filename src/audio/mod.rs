//! Audio decode, quantization, and device output

pub mod decoder;
pub mod output;
pub mod quantize;

pub use decoder::{probe_file, PcmBlock, PcmDecoder, VorbisSession};
pub use output::{AudioSink, CpalSink, DeviceInfo, SinkStream, StreamParams};
pub use quantize::quantize_i16;
