//! Transcription pipeline components.
//!
//! This module contains all the stages of a batch run:
//! - **discovery**: Find page scans in the input directory
//! - **validate**: Pre-upload size and format checks
//! - **decode**: Load and decode images, detect their format
//! - **sink**: Clear the output directory and write transcripts
//! - **runner**: Orchestrates the sequential batch

pub mod decode;
pub mod discovery;
pub mod runner;
pub mod sink;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::FileDiscovery;
pub use runner::{BatchRunner, RunConfig};
pub use sink::OutputSink;
pub use validate::Validator;
