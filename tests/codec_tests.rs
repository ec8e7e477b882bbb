use std::collections::HashSet;
use std::fs;

use wavemark::annotations::{
    deserialize, load, save, serialize, AnnotationEntry, AnnotationStore, Intensity,
};

fn sample_store() -> AnnotationStore {
    let mut store = AnnotationStore::new(48_000);
    store.insert_marker(4410, Intensity::High).unwrap();
    store.insert_marker(1, Intensity::Low).unwrap();
    store.begin_or_complete_section(9600).unwrap();
    store.begin_or_complete_section(8000).unwrap();
    store.insert_marker(47_999, Intensity::VeryHigh).unwrap();
    store.begin_or_complete_section(0).unwrap();
    store.begin_or_complete_section(0).unwrap();
    store.insert_marker(8000, Intensity::Medium).unwrap();
    store
}

#[test]
fn test_round_trip_preserves_entries() {
    let store = sample_store();
    let text = serialize(&store);
    let restored = deserialize(&text, store.capacity());

    let original: HashSet<AnnotationEntry> = store.entries_snapshot().iter().copied().collect();
    let loaded: HashSet<AnnotationEntry> = restored.entries_snapshot().iter().copied().collect();
    assert_eq!(original, loaded);
    assert_eq!(restored.len(), store.len());
}

#[test]
fn test_malformed_line_is_skipped() {
    let text = "not,a,valid,line\n2000,1\n";
    let store = deserialize(text, 10_000);

    assert_eq!(
        store.entries_snapshot(),
        &[AnnotationEntry::marker(2000, Intensity::Medium)]
    );
}

#[test]
fn test_loaded_entries_are_sorted() {
    let text = "\
9000,3
500,-1,100
\n
7000,0
garbage
100,2
";
    let store = deserialize(text, 10_000);

    assert_eq!(
        store.entries_snapshot(),
        &[
            AnnotationEntry::section(100, 500),
            AnnotationEntry::marker(100, Intensity::High),
            AnnotationEntry::marker(7000, Intensity::Low),
            AnnotationEntry::marker(9000, Intensity::VeryHigh),
        ]
    );
}

#[test]
fn test_entries_outside_timeline_are_dropped() {
    // Valid against a long file, not against a short one.
    let text = "50,1\n5000,2\n10,-1,20000\n";
    let store = deserialize(text, 1000);
    assert_eq!(
        store.entries_snapshot(),
        &[AnnotationEntry::marker(50, Intensity::Medium)]
    );
}

#[test]
fn test_missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = load(dir.path().join("absent.marks"), 500).unwrap();
    assert!(store.is_empty());
    assert_eq!(store.capacity(), 500);
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("take.marks");
    let store = sample_store();

    save(&store, &path).unwrap();
    let loaded = load(&path, store.capacity()).unwrap();

    assert_eq!(loaded.entries_snapshot(), store.entries_snapshot());
    assert_eq!(fs::read_to_string(&path).unwrap(), serialize(&store));
}

#[test]
fn test_save_replaces_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("take.marks");

    save(&sample_store(), &path).unwrap();

    let mut smaller = AnnotationStore::new(48_000);
    smaller.insert_marker(12, Intensity::Low).unwrap();
    save(&smaller, &path).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "12,0\n");

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 1, "unexpected files: {:?}", leftovers);
}

#[test]
fn test_empty_store_writes_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.marks");

    save(&AnnotationStore::new(10), &path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
    assert!(load(&path, 10).unwrap().is_empty());
}

#[test]
fn test_failed_save_removes_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    // A directory in the way makes the final rename fail.
    let path = dir.path().join("blocked.marks");
    fs::create_dir(&path).unwrap();

    assert!(save(&sample_store(), &path).is_err());

    assert!(!dir.path().join("blocked.marks.tmp").exists());
    assert!(path.is_dir());
}
