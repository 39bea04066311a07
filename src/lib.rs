//! # oggplay
//!
//! Ogg/Vorbis file player built around a frame-rate adaptation core.
//!
//! **Purpose:** Decode an Ogg/Vorbis file incrementally and feed a
//! real-time audio output device exact-size blocks of interleaved i16
//! samples, carrying surplus decoded audio across callback periods in a
//! remainder buffer.
//!
//! **Architecture:** symphonia decode session → read-ahead worker →
//! frame adapter (remainder bookkeeping + quantization) → cpal output
//! callback. The decode and output seams are traits, so the pipeline runs
//! against scripted sources and manual sinks in tests.

pub mod audio;
pub mod error;
pub mod playback;

pub use error::{Error, Result};
