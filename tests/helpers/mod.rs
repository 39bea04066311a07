//! Test helper modules for oggplay integration tests
//!
//! Provides the scripted PCM source the adapter and playback suites run
//! against, plus the shared deterministic sample pattern so every suite
//! can compute expected quantized output independently of the pipeline
//! under test.

pub mod scripted;

pub use scripted::ScriptedDecoder;
