pub mod buffer;
pub mod decoder;

pub use buffer::{AudioBuffer, SampleWindow};
pub use decoder::{decode, decode_reader, DecodeError};
