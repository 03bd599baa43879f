use super::*;
use crate::downloader::test_helpers::{
    StubBehavior, StubFetcher, StubTrackLister, create_test_downloader, test_config,
};
use crate::types::{BatchResult, Event, TrackLimit};
use std::path::Path;
use std::time::Duration;


/// Entry names of a zip archive, sorted
fn archive_entries(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    let mut names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn items(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn assert_single_file(batch: &BatchResult, expected: &Path) {
    assert!(batch.success, "batch failed: {}", batch.message);
    assert_eq!(batch.output_path.as_deref(), Some(expected));
    assert!(expected.is_file());
}
