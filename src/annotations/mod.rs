pub mod codec;
pub mod file_store;
pub mod store;
pub mod types;

pub use codec::{annotation_path_for, deserialize, load, save, serialize, LineError};
pub use file_store::{FileAnnotationStore, FileStoreError};
pub use store::{AnnotationError, AnnotationStore, SectionState};
pub use types::*;
