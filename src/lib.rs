//! Mono WAV decoding and sample-accurate annotation of the decoded timeline.
//!
//! `audio` turns a RIFF/WAVE file into normalized samples; `annotations`
//! keeps the sorted markers and sections placed on top of it and persists
//! them as plain text next to the audio file.

pub mod annotations;
pub mod audio;
pub mod config;
pub mod console;

pub use annotations::{AnnotationEntry, AnnotationStore, FileAnnotationStore, Intensity};
pub use audio::{decode, AudioBuffer, DecodeError};
pub use config::ViewerConfig;
