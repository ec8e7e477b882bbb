//! Line-oriented text persistence for annotations.
//!
//! ```text
//! 4410,2        marker at sample 4410, intensity ordinal 2
//! 8000,-1,9600  section covering samples 8000..=9600
//! ```
//!
//! The `-1` in the second field is the only thing that distinguishes a
//! section line from a marker line.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::store::AnnotationStore;
use super::types::{AnnotationEntry, Intensity};

/// Extension used for the annotation file next to an audio file.
pub const ANNOTATION_EXTENSION: &str = "marks";

const SECTION_TAG: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("expected 2 or 3 comma-separated fields, found {0}")]
    FieldCount(usize),
    #[error("field {field} is not a number: {value:?}")]
    BadNumber { field: usize, value: String },
    #[error("unknown intensity ordinal {0}")]
    UnknownIntensity(i64),
    #[error("section line must carry tag -1, found {0}")]
    BadSectionTag(i64),
    #[error("position {position} is outside the timeline of {capacity} samples")]
    OutOfRange { position: usize, capacity: usize },
}

pub fn serialize(store: &AnnotationStore) -> String {
    let mut out = String::new();
    for entry in store.entries_snapshot() {
        let line = match entry {
            AnnotationEntry::Marker(m) => format!("{},{}\n", m.sample_index, m.intensity.ordinal()),
            AnnotationEntry::Section(s) => format!("{},{},{}\n", s.start(), SECTION_TAG, s.end()),
        };
        out.push_str(&line);
    }
    out
}

/// Parses annotation text into a sorted store.
///
/// Lines that fail to parse are skipped with a warning; the rest still load.
pub fn deserialize(text: &str, capacity: usize) -> AnnotationStore {
    let mut entries = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        match parse_line(line, capacity) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => {}
            Err(e) => warn!("Skipping annotation line {}: {} ({:?})", line_no + 1, e, line),
        }
    }
    AnnotationStore::from_entries(entries, capacity)
}

/// Parses one line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str, capacity: usize) -> Result<Option<AnnotationEntry>, LineError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    match fields.as_slice() {
        [position, ordinal] => {
            let position = parse_position(position, 0)?;
            let ordinal = parse_signed(ordinal, 1)?;
            let intensity =
                Intensity::from_ordinal(ordinal).ok_or(LineError::UnknownIntensity(ordinal))?;
            if position == 0 || position >= capacity {
                return Err(LineError::OutOfRange { position, capacity });
            }
            Ok(Some(AnnotationEntry::marker(position, intensity)))
        }
        [start, tag, end] => {
            let start = parse_position(start, 0)?;
            let tag = parse_signed(tag, 1)?;
            let end = parse_position(end, 2)?;
            if tag != SECTION_TAG {
                return Err(LineError::BadSectionTag(tag));
            }
            for position in [start, end] {
                if position > capacity {
                    return Err(LineError::OutOfRange { position, capacity });
                }
            }
            Ok(Some(AnnotationEntry::section(start, end)))
        }
        other => Err(LineError::FieldCount(other.len())),
    }
}

fn parse_position(value: &str, field: usize) -> Result<usize, LineError> {
    value.parse().map_err(|_| LineError::BadNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_signed(value: &str, field: usize) -> Result<i64, LineError> {
    value.parse().map_err(|_| LineError::BadNumber {
        field,
        value: value.to_string(),
    })
}

/// Annotation file path for an audio file: same stem, annotation extension.
pub fn annotation_path_for(audio_path: impl AsRef<Path>) -> PathBuf {
    audio_path.as_ref().with_extension(ANNOTATION_EXTENSION)
}

/// Rewrites `path` with the full contents of `store`.
///
/// The text goes to a sibling temp file first and is renamed over the target,
/// so readers see either the old snapshot or the new one.
pub fn save(store: &AnnotationStore, path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    let text = serialize(store);

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let written = fs::File::create(&tmp).and_then(|mut f| {
        f.write_all(text.as_bytes())?;
        f.sync_all()
    });
    if let Err(e) = written.and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    debug!("Saved {} annotations to {}", store.len(), path.display());
    Ok(())
}

/// Loads annotations from `path`. A missing file is an empty store.
pub fn load(path: impl AsRef<Path>, capacity: usize) -> io::Result<AnnotationStore> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No annotation file at {}", path.display());
            return Ok(AnnotationStore::new(capacity));
        }
        Err(e) => return Err(e),
    };

    let store = deserialize(&text, capacity);
    info!("Loaded {} annotations from {}", store.len(), path.display());
    Ok(store)
}
