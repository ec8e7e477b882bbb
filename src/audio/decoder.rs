//! RIFF/WAVE decoder for mono PCM-16 and float32 files.
//!
//! The whole data chunk is read in one pass. Chunks between the format header
//! and the data chunk are skipped by their declared size.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::buffer::AudioBuffer;

pub const RIFF_ID: [u8; 4] = *b"RIFF";
pub const WAVE_ID: [u8; 4] = *b"WAVE";
pub const DATA_CHUNK_ID: [u8; 4] = *b"data";

pub const FORMAT_PCM: u16 = 1;
pub const FORMAT_IEEE_FLOAT: u16 = 3;
pub const FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// RIFF header plus a canonical 16-byte fmt chunk.
const HEADER_LEN: usize = 36;
const BASE_FMT_LEN: u32 = 16;

/// End of the SubFormat tag inside the fmt extension:
/// cbSize (2), valid bits (2), channel mask (4), then the GUID's first 2 bytes.
const SUB_FORMAT_END: usize = 10;

/// Upper bound on the payload reserved up front; the declared size is untrusted.
const MAX_PREALLOC: usize = 1 << 20;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("not a RIFF/WAVE container")]
    NotAContainer,
    #[error("unsupported channel layout: {0} channels (only mono is supported)")]
    UnsupportedChannelLayout(u16),
    #[error("unsupported sample format: format tag {format_tag}, {bits_per_sample} bits per sample")]
    UnsupportedSampleFormat {
        format_tag: u16,
        bits_per_sample: u16,
    },
    #[error("no data chunk found")]
    MissingDataChunk,
    #[error("container holds no samples")]
    EmptyAudio,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Fixed-layout header fields that the decoder cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub fmt_len: u32,
    /// Codec tag from the SubFormat GUID of an extensible fmt chunk.
    pub sub_format: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SampleEncoding {
    Int16,
    Float32,
}

impl SampleEncoding {
    fn from_header(header: &WavHeader) -> Result<Self, DecodeError> {
        let codec = match (header.format_tag, header.sub_format) {
            (FORMAT_EXTENSIBLE, Some(sub_format)) => sub_format,
            (format_tag, _) => format_tag,
        };
        match (codec, header.bits_per_sample) {
            (FORMAT_PCM, 16) => Ok(Self::Int16),
            (FORMAT_IEEE_FLOAT, 32) => Ok(Self::Float32),
            (_, bits_per_sample) => Err(DecodeError::UnsupportedSampleFormat {
                format_tag: header.format_tag,
                bits_per_sample,
            }),
        }
    }

    fn bytes_per_sample(self) -> usize {
        match self {
            Self::Int16 => 2,
            Self::Float32 => 4,
        }
    }

    fn decode(self, payload: &[u8]) -> Vec<f32> {
        match self {
            Self::Int16 => payload
                .chunks_exact(2)
                .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
                .collect(),
            Self::Float32 => payload
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
        }
    }
}

/// Decode a mono WAV file from disk.
pub fn decode(path: impl AsRef<Path>) -> Result<AudioBuffer, DecodeError> {
    let path = path.as_ref();
    debug!("Decoding {}", path.display());
    let file = File::open(path)?;
    let buffer = decode_reader(BufReader::new(file))?;
    info!(
        "Loaded {}: {} samples at {} Hz ({:.3}s)",
        path.display(),
        buffer.len(),
        buffer.sample_rate(),
        buffer.duration_secs()
    );
    Ok(buffer)
}

/// Decode a mono WAV byte stream.
pub fn decode_reader<R: Read>(mut reader: R) -> Result<AudioBuffer, DecodeError> {
    let mut header = read_header(&mut reader)?;

    if header.channels != 1 {
        return Err(DecodeError::UnsupportedChannelLayout(header.channels));
    }

    // Extended fmt chunks carry extra fields after the canonical 16 bytes.
    if header.fmt_len > BASE_FMT_LEN {
        header.sub_format = read_fmt_extension(&mut reader, header.fmt_len - BASE_FMT_LEN)?;
    }
    let encoding = SampleEncoding::from_header(&header)?;

    let data_len = find_data_chunk(&mut reader)?;

    let bytes_per_sample = encoding.bytes_per_sample();
    let expected = data_len as usize / bytes_per_sample;
    let declared_bytes = expected * bytes_per_sample;
    let mut payload = Vec::with_capacity(declared_bytes.min(MAX_PREALLOC));
    reader
        .by_ref()
        .take(declared_bytes as u64)
        .read_to_end(&mut payload)?;

    if payload.len() < declared_bytes {
        warn!(
            "data chunk truncated: declared {} samples, stream holds {}",
            expected,
            payload.len() / bytes_per_sample
        );
    }

    let samples = encoding.decode(&payload);
    if samples.is_empty() {
        return Err(DecodeError::EmptyAudio);
    }

    Ok(AudioBuffer::new(header.sample_rate, samples))
}

fn read_header<R: Read>(reader: &mut R) -> Result<WavHeader, DecodeError> {
    let mut raw = [0u8; HEADER_LEN];
    if let Err(e) = reader.read_exact(&mut raw) {
        return Err(match e.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::NotAContainer,
            _ => DecodeError::Io(e),
        });
    }

    if raw[0..4] != RIFF_ID || raw[8..12] != WAVE_ID {
        return Err(DecodeError::NotAContainer);
    }

    let u16_at = |i: usize| u16::from_le_bytes([raw[i], raw[i + 1]]);
    let u32_at = |i: usize| u32::from_le_bytes([raw[i], raw[i + 1], raw[i + 2], raw[i + 3]]);

    Ok(WavHeader {
        fmt_len: u32_at(16),
        format_tag: u16_at(20),
        channels: u16_at(22),
        sample_rate: u32_at(24),
        bits_per_sample: u16_at(34),
        sub_format: None,
    })
}

/// Reads the SubFormat tag from an fmt extension of `len` bytes and skips the rest.
fn read_fmt_extension<R: Read>(reader: &mut R, len: u32) -> Result<Option<u16>, DecodeError> {
    let head_len = (len as usize).min(SUB_FORMAT_END);
    let mut head = [0u8; SUB_FORMAT_END];
    if let Err(e) = reader.read_exact(&mut head[..head_len]) {
        return Err(match e.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::MissingDataChunk,
            _ => DecodeError::Io(e),
        });
    }
    skip_bytes(reader, u64::from(len) - head_len as u64)?;

    Ok((head_len == SUB_FORMAT_END).then(|| u16::from_le_bytes([head[8], head[9]])))
}

/// Scan chunk headers until the data chunk; returns its declared byte length.
fn find_data_chunk<R: Read>(reader: &mut R) -> Result<u32, DecodeError> {
    let mut chunk_header = [0u8; 8];
    loop {
        if let Err(e) = reader.read_exact(&mut chunk_header) {
            return Err(match e.kind() {
                io::ErrorKind::UnexpectedEof => DecodeError::MissingDataChunk,
                _ => DecodeError::Io(e),
            });
        }

        let id = [chunk_header[0], chunk_header[1], chunk_header[2], chunk_header[3]];
        let size = u32::from_le_bytes([
            chunk_header[4],
            chunk_header[5],
            chunk_header[6],
            chunk_header[7],
        ]);

        if id == DATA_CHUNK_ID {
            return Ok(size);
        }

        debug!(
            "Skipping chunk {:?} ({} bytes)",
            String::from_utf8_lossy(&id),
            size
        );
        skip_bytes(reader, u64::from(size))?;
    }
}

fn skip_bytes<R: Read>(reader: &mut R, count: u64) -> Result<(), DecodeError> {
    let skipped = io::copy(&mut reader.by_ref().take(count), &mut io::sink())?;
    if skipped < count {
        return Err(DecodeError::MissingDataChunk);
    }
    Ok(())
}
