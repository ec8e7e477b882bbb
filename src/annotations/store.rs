use thiserror::Error;
use tracing::debug;

use super::types::{AnnotationEntry, Intensity, Section};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("position {position} is outside the timeline (valid: 1..{capacity})")]
    OutOfRange { position: usize, capacity: usize },
    #[error("no annotation at index {index} (collection holds {len})")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("annotation at index {0} is not a section")]
    NotASection(usize),
}

/// Outcome of one step of the two-click section protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    /// First endpoint recorded; waiting for the second.
    Pending { start: usize },
    /// Section inserted at `index`.
    Completed { index: usize },
}

/// Ordered markers and sections over a timeline of `capacity` samples.
///
/// Entries are kept sorted by start position at all times. Entries with equal
/// starts keep their insertion order. A failed operation leaves the store
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationStore {
    entries: Vec<AnnotationEntry>,
    capacity: usize,
    pending_start: Option<usize>,
}

impl AnnotationStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
            pending_start: None,
        }
    }

    /// Builds a store from entries in arbitrary order.
    pub(crate) fn from_entries(mut entries: Vec<AnnotationEntry>, capacity: usize) -> Self {
        entries.sort_by_key(AnnotationEntry::start);
        Self {
            entries,
            capacity,
            pending_start: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries_snapshot(&self) -> &[AnnotationEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&AnnotationEntry> {
        self.entries.get(index)
    }

    pub fn pending_start(&self) -> Option<usize> {
        self.pending_start
    }

    /// Inserts a point marker and returns its index.
    ///
    /// Position 0 is rejected along with anything at or past `capacity`.
    pub fn insert_marker(
        &mut self,
        position: usize,
        intensity: Intensity,
    ) -> Result<usize, AnnotationError> {
        if position == 0 || position >= self.capacity {
            return Err(self.out_of_range(position));
        }
        let index = self.insert_sorted(AnnotationEntry::marker(position, intensity));
        debug!("Marker at sample {} ({}) -> index {}", position, intensity, index);
        Ok(index)
    }

    /// Advances the two-click section protocol: `Idle -> Pending -> Idle`.
    ///
    /// Sections carry no intensity; the file format has no field for one.
    pub fn begin_or_complete_section(
        &mut self,
        position: usize,
    ) -> Result<SectionState, AnnotationError> {
        if position >= self.capacity {
            return Err(self.out_of_range(position));
        }

        match self.pending_start.take() {
            None => {
                self.pending_start = Some(position);
                debug!("Section start pending at sample {}", position);
                Ok(SectionState::Pending { start: position })
            }
            Some(first) => {
                let section = Section::new(first, position);
                let index = self.insert_sorted(AnnotationEntry::Section(section));
                debug!(
                    "Section {}..={} completed -> index {}",
                    section.start(),
                    section.end(),
                    index
                );
                Ok(SectionState::Completed { index })
            }
        }
    }

    /// Drops a pending section start. Returns whether one was pending.
    pub fn cancel_pending_section(&mut self) -> bool {
        let had_pending = self.pending_start.take().is_some();
        if had_pending {
            debug!("Pending section cancelled");
        }
        had_pending
    }

    /// Replaces the bounds of the section at `index`.
    ///
    /// The endpoints may arrive in either order and are clamped to
    /// `[0, capacity]`. The collection is re-sorted afterwards; the returned
    /// value is the section's new index.
    pub fn update_section_bounds(
        &mut self,
        index: usize,
        new_start: usize,
        new_end: usize,
    ) -> Result<usize, AnnotationError> {
        match self.entries.get(index) {
            None => return Err(self.index_out_of_bounds(index)),
            Some(entry) if !entry.is_section() => return Err(AnnotationError::NotASection(index)),
            Some(_) => {}
        }

        let section = Section::new(new_start.min(self.capacity), new_end.min(self.capacity));
        self.entries.remove(index);
        let new_index = self.insert_sorted(AnnotationEntry::Section(section));
        debug!(
            "Section {} resized to {}..={} -> index {}",
            index,
            section.start(),
            section.end(),
            new_index
        );
        Ok(new_index)
    }

    pub fn delete(&mut self, index: usize) -> Result<AnnotationEntry, AnnotationError> {
        if index >= self.entries.len() {
            return Err(self.index_out_of_bounds(index));
        }
        let removed = self.entries.remove(index);
        debug!("Deleted annotation {} ({:?})", index, removed);
        Ok(removed)
    }

    /// Stable re-sort by start position.
    pub fn resort(&mut self) {
        self.entries.sort_by_key(AnnotationEntry::start);
    }

    /// Index of the entry closest to `position`; the first one wins ties.
    pub fn nearest(&self, position: usize) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .min_by_key(|(_, entry)| entry.distance_to(position))
            .map(|(index, _)| index)
    }

    /// Indices of sections intersecting the closed range between `a` and `b`.
    pub fn overlapping(&self, a: usize, b: usize) -> Vec<usize> {
        let (start, end) = (a.min(b), a.max(b));
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry {
                AnnotationEntry::Section(s) if s.intersects(start, end) => Some(index),
                _ => None,
            })
            .collect()
    }

    fn insert_sorted(&mut self, entry: AnnotationEntry) -> usize {
        let key = entry.start();
        let index = self.entries.partition_point(|e| e.start() <= key);
        self.entries.insert(index, entry);
        index
    }

    fn out_of_range(&self, position: usize) -> AnnotationError {
        AnnotationError::OutOfRange {
            position,
            capacity: self.capacity,
        }
    }

    fn index_out_of_bounds(&self, index: usize) -> AnnotationError {
        AnnotationError::IndexOutOfBounds {
            index,
            len: self.entries.len(),
        }
    }
}
