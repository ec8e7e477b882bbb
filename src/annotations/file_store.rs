use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::codec;
use super::store::{AnnotationError, AnnotationStore, SectionState};
use super::types::{AnnotationEntry, Intensity};

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error(transparent)]
    Annotation(#[from] AnnotationError),
    #[error("failed to write annotations: {0}")]
    Io(#[from] io::Error),
}

/// An [`AnnotationStore`] bound to its annotation file.
///
/// Every mutation that changes the entries rewrites the whole file before
/// returning. Rejected mutations never touch the disk.
#[derive(Debug)]
pub struct FileAnnotationStore {
    path: PathBuf,
    store: AnnotationStore,
}

impl FileAnnotationStore {
    /// Loads `path` if it exists, otherwise starts empty.
    pub fn open(path: impl Into<PathBuf>, capacity: usize) -> io::Result<Self> {
        let path = path.into();
        let store = codec::load(&path, capacity)?;
        Ok(Self { path, store })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn entries_snapshot(&self) -> &[AnnotationEntry] {
        self.store.entries_snapshot()
    }

    pub fn save(&self) -> io::Result<()> {
        codec::save(&self.store, &self.path)
    }

    pub fn insert_marker(
        &mut self,
        position: usize,
        intensity: Intensity,
    ) -> Result<usize, FileStoreError> {
        let index = self.store.insert_marker(position, intensity)?;
        self.save()?;
        Ok(index)
    }

    pub fn begin_or_complete_section(
        &mut self,
        position: usize,
    ) -> Result<SectionState, FileStoreError> {
        let state = self.store.begin_or_complete_section(position)?;
        if let SectionState::Completed { .. } = state {
            self.save()?;
        }
        Ok(state)
    }

    pub fn cancel_pending_section(&mut self) -> bool {
        self.store.cancel_pending_section()
    }

    pub fn update_section_bounds(
        &mut self,
        index: usize,
        new_start: usize,
        new_end: usize,
    ) -> Result<usize, FileStoreError> {
        let new_index = self.store.update_section_bounds(index, new_start, new_end)?;
        self.save()?;
        Ok(new_index)
    }

    pub fn delete(&mut self, index: usize) -> Result<AnnotationEntry, FileStoreError> {
        let removed = self.store.delete(index)?;
        self.save()?;
        info!("Removed annotation {} from {}", index, self.path.display());
        Ok(removed)
    }
}
