// tests/change_detector.rs

use std::fs;
use std::thread::sleep;
use std::time::Duration;

use tempfile::TempDir;

use watchrun::watch::ChangeDetector;

#[test]
fn first_observation_reports_changed() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "one").unwrap();

    let mut detector = ChangeDetector::new();
    assert!(detector.is_changed(&file));
}

#[test]
fn repeat_within_window_is_quiet() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "one").unwrap();

    let mut detector = ChangeDetector::new();
    assert!(detector.is_changed(&file));

    // Same mtime: nothing changed.
    assert!(!detector.is_changed(&file));

    // A rewrite bumps the mtime, but by far less than the coalescing window.
    fs::write(&file, "two").unwrap();
    assert!(!detector.is_changed(&file));
}

#[test]
fn change_after_window_reports_changed_again() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "one").unwrap();

    let mut detector = ChangeDetector::new();
    assert!(detector.is_changed(&file));

    sleep(Duration::from_millis(150));
    fs::write(&file, "two").unwrap();
    assert!(detector.is_changed(&file));
}

#[test]
fn deleted_path_reports_changed_without_updating_state() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "one").unwrap();

    let mut detector = ChangeDetector::new();
    assert!(detector.is_changed(&file));

    fs::remove_file(&file).unwrap();
    assert!(detector.is_changed(&file));
    // No state update for missing paths: still reported as changed.
    assert!(detector.is_changed(&file));
}

#[test]
fn unseen_missing_path_reports_changed() {
    let dir = TempDir::new().unwrap();
    let mut detector = ChangeDetector::new();
    assert!(detector.is_changed(&dir.path().join("never-existed.txt")));
}
