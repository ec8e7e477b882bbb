use wavemark::annotations::{
    AnnotationEntry, AnnotationError, AnnotationStore, Intensity, Section, SectionState,
};

fn starts(store: &AnnotationStore) -> Vec<usize> {
    store.entries_snapshot().iter().map(|e| e.start()).collect()
}

fn section_at(store: &AnnotationStore, index: usize) -> Section {
    match store.get(index) {
        Some(AnnotationEntry::Section(s)) => *s,
        other => panic!("expected a section at {}, found {:?}", index, other),
    }
}

fn assert_sorted(store: &AnnotationStore) {
    let starts = starts(store);
    assert!(
        starts.windows(2).all(|w| w[0] <= w[1]),
        "entries out of order: {:?}",
        starts
    );
}

#[test]
fn test_entries_stay_sorted_after_every_insert() {
    let mut store = AnnotationStore::new(100_000);

    let positions = [5000, 10, 99_999, 5000, 42, 70_000, 1];
    for (i, &pos) in positions.iter().enumerate() {
        let intensity = Intensity::ALL[i % Intensity::ALL.len()];
        let index = store.insert_marker(pos, intensity).unwrap();
        assert_eq!(store.get(index).map(AnnotationEntry::start), Some(pos));
        assert_sorted(&store);
    }

    store.begin_or_complete_section(60_000).unwrap();
    store.begin_or_complete_section(20).unwrap();
    assert_sorted(&store);
    assert_eq!(store.len(), positions.len() + 1);
}

#[test]
fn test_marker_bounds() {
    let mut store = AnnotationStore::new(1000);

    assert_eq!(
        store.insert_marker(0, Intensity::Low),
        Err(AnnotationError::OutOfRange {
            position: 0,
            capacity: 1000
        })
    );
    assert_eq!(
        store.insert_marker(1000, Intensity::Low),
        Err(AnnotationError::OutOfRange {
            position: 1000,
            capacity: 1000
        })
    );
    assert!(store.is_empty());

    assert_eq!(store.insert_marker(1, Intensity::Low), Ok(0));
    assert_eq!(store.insert_marker(999, Intensity::High), Ok(1));
}

#[test]
fn test_equal_starts_keep_insertion_order() {
    let mut store = AnnotationStore::new(1000);
    store.insert_marker(300, Intensity::Low).unwrap();
    store.insert_marker(300, Intensity::Medium).unwrap();
    store.begin_or_complete_section(300).unwrap();
    store.begin_or_complete_section(400).unwrap();
    store.insert_marker(300, Intensity::VeryHigh).unwrap();

    assert_eq!(
        store.entries_snapshot(),
        &[
            AnnotationEntry::marker(300, Intensity::Low),
            AnnotationEntry::marker(300, Intensity::Medium),
            AnnotationEntry::section(300, 400),
            AnnotationEntry::marker(300, Intensity::VeryHigh),
        ]
    );
}

#[test]
fn test_two_click_section_in_reverse_order() {
    let mut store = AnnotationStore::new(1000);

    assert_eq!(
        store.begin_or_complete_section(100),
        Ok(SectionState::Pending { start: 100 })
    );
    assert!(store.is_empty());
    assert_eq!(store.pending_start(), Some(100));

    assert_eq!(
        store.begin_or_complete_section(50),
        Ok(SectionState::Completed { index: 0 })
    );
    assert_eq!(store.pending_start(), None);

    let section = section_at(&store, 0);
    assert_eq!((section.start(), section.end()), (50, 100));
    assert!(section.contains(50));
    assert!(section.contains(100));
    assert!(!section.contains(101));
}

#[test]
fn test_section_may_start_at_zero_and_be_empty() {
    let mut store = AnnotationStore::new(10);
    store.begin_or_complete_section(0).unwrap();
    store.begin_or_complete_section(0).unwrap();

    let section = section_at(&store, 0);
    assert_eq!((section.start(), section.end()), (0, 0));
    assert!(section.is_empty());

    assert!(matches!(
        store.begin_or_complete_section(10),
        Err(AnnotationError::OutOfRange { position: 10, .. })
    ));
}

#[test]
fn test_rejected_second_click_keeps_pending_start() {
    let mut store = AnnotationStore::new(500);
    store.begin_or_complete_section(200).unwrap();

    assert!(store.begin_or_complete_section(9000).is_err());
    assert_eq!(store.pending_start(), Some(200));

    assert_eq!(
        store.begin_or_complete_section(300),
        Ok(SectionState::Completed { index: 0 })
    );
}

#[test]
fn test_cancel_pending_section() {
    let mut store = AnnotationStore::new(1000);
    store.insert_marker(10, Intensity::Low).unwrap();
    let before = store.clone();

    assert!(!store.cancel_pending_section());

    store.begin_or_complete_section(400).unwrap();
    assert!(store.cancel_pending_section());
    assert_eq!(store, before);

    // The next click starts over instead of completing the abandoned section.
    assert_eq!(
        store.begin_or_complete_section(600),
        Ok(SectionState::Pending { start: 600 })
    );
}

#[test]
fn test_failed_delete_leaves_collection_unchanged() {
    let mut store = AnnotationStore::new(1000);
    store.insert_marker(10, Intensity::Low).unwrap();
    store.insert_marker(20, Intensity::High).unwrap();
    let before = store.clone();

    assert_eq!(
        store.delete(2),
        Err(AnnotationError::IndexOutOfBounds { index: 2, len: 2 })
    );
    assert_eq!(store, before);

    assert_eq!(
        store.delete(0),
        Ok(AnnotationEntry::marker(10, Intensity::Low))
    );
    assert_eq!(starts(&store), vec![20]);
}

#[test]
fn test_update_section_bounds_normalizes_clamps_and_resorts() {
    let mut store = AnnotationStore::new(1000);
    store.begin_or_complete_section(100).unwrap();
    store.begin_or_complete_section(200).unwrap();
    store.insert_marker(500, Intensity::Medium).unwrap();
    store.insert_marker(800, Intensity::Medium).unwrap();

    // Reversed and past the end: becomes 700..=1000 and moves after the 500 marker.
    let new_index = store.update_section_bounds(0, 5000, 700).unwrap();
    assert_eq!(new_index, 1);
    assert_eq!(
        store.get(new_index),
        Some(&AnnotationEntry::section(700, 1000))
    );
    assert_sorted(&store);
    assert_eq!(starts(&store), vec![500, 700, 800]);
}

#[test]
fn test_update_section_bounds_errors() {
    let mut store = AnnotationStore::new(1000);
    store.insert_marker(10, Intensity::Low).unwrap();
    let before = store.clone();

    assert_eq!(
        store.update_section_bounds(0, 1, 2),
        Err(AnnotationError::NotASection(0))
    );
    assert_eq!(
        store.update_section_bounds(3, 1, 2),
        Err(AnnotationError::IndexOutOfBounds { index: 3, len: 1 })
    );
    assert_eq!(store, before);
}

#[test]
fn test_nearest_entry() {
    let mut store = AnnotationStore::new(10_000);
    assert_eq!(store.nearest(50), None);

    store.insert_marker(100, Intensity::Low).unwrap();
    store.begin_or_complete_section(1000).unwrap();
    store.begin_or_complete_section(2000).unwrap();
    store.insert_marker(5000, Intensity::Low).unwrap();

    assert_eq!(store.nearest(0), Some(0));
    assert_eq!(store.nearest(1500), Some(1));
    assert_eq!(store.nearest(2600), Some(1));
    assert_eq!(store.nearest(4000), Some(2));
    // Equidistant from marker 100 and section start 1000: first entry wins.
    assert_eq!(store.nearest(550), Some(0));
}

#[test]
fn test_overlapping_sections() {
    let mut store = AnnotationStore::new(10_000);
    for (a, b) in [(100, 200), (150, 400), (1000, 1100)] {
        store.begin_or_complete_section(a).unwrap();
        store.begin_or_complete_section(b).unwrap();
    }
    store.insert_marker(180, Intensity::High).unwrap();

    let hits = store.overlapping(170, 190);
    assert_eq!(hits, vec![0, 1]);
    assert!(hits
        .iter()
        .all(|&i| store.get(i).is_some_and(AnnotationEntry::is_section)));

    assert_eq!(store.overlapping(1100, 5000), vec![store.len() - 1]);
    assert!(store.overlapping(500, 900).is_empty());
}

#[test]
fn test_resort_is_stable() {
    let mut store = AnnotationStore::new(1000);
    store.insert_marker(7, Intensity::Low).unwrap();
    store.insert_marker(7, Intensity::High).unwrap();
    let before = store.clone();

    store.resort();
    assert_eq!(store, before);
}
