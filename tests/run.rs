//! End-to-end integration tests for [`propedit::run`].
//!
//! The file name must point at an existing file for the probe to succeed,
//! so these tests create temporary files with `tempfile`.

mod common;

use std::io::ErrorKind;

use common::{RecordingAnalyzer, registry_with_temp_file, sample_file, string_child, track_by_uid, unsigned_child};
use propedit::schema::{AUDIO, CHANNELS, INFO, LANGUAGE, TITLE, TRACKS};
use propedit::{ChangeKind, OpenMode, ParseMode, PropEditError, TargetRegistry};

fn add_change(registry: &mut TargetRegistry, spec: &str, kind: ChangeKind, change: &str) {
    registry
        .add_track_or_segmentinfo_target(spec)
        .expect("Failed to add target")
        .add_change(kind, change)
        .expect("Failed to add change");
}

#[test]
fn missing_file_name_is_reported_before_missing_changes() {
    let mut registry = TargetRegistry::new();
    let mut analyzer = RecordingAnalyzer::new(sample_file());

    let error = propedit::run(&mut registry, &mut analyzer).expect_err("Run without file name succeeded");
    assert_eq!(error.to_string(), "No file name given.");
    assert!(analyzer.probed.is_none(), "the file must not be probed");
}

#[test]
fn missing_changes_are_reported() {
    let (mut registry, _file) = registry_with_temp_file();
    registry
        .add_track_or_segmentinfo_target("track:1")
        .expect("Failed to add target");
    registry.options_parsed(0);
    let mut analyzer = RecordingAnalyzer::new(sample_file());

    let error = propedit::run(&mut registry, &mut analyzer).expect_err("Run without changes succeeded");
    assert!(matches!(error, PropEditError::NoChanges));
    assert_eq!(error.to_string(), "Nothing to do.");
}

#[test]
fn rejected_probe_is_reported() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = temporary_directory.path().join("missing.mkv");
    let mut registry = TargetRegistry::new();
    registry
        .set_file_name(missing.to_string_lossy().into_owned())
        .expect("Failed to set file name");
    add_change(&mut registry, "info", ChangeKind::Set, "title=x");
    let mut analyzer = RecordingAnalyzer::new(sample_file());

    let error = propedit::run(&mut registry, &mut analyzer).expect_err("Missing file accepted");
    let error_message = error.to_string();
    assert!(
        error_message.contains("missing.mkv") && error_message.contains("is not a Matroska file"),
        "Error message should name the file: {error_message}",
    );
    assert_eq!(analyzer.probed.as_deref(), Some(missing.as_path()));
}

#[test]
fn scan_failures_are_reported() {
    let (mut registry, _file) = registry_with_temp_file();
    add_change(&mut registry, "info", ChangeKind::Set, "title=x");

    let mut analyzer = RecordingAnalyzer::new(sample_file());
    analyzer.process_result = Ok(false);
    let error = propedit::run(&mut registry, &mut analyzer).expect_err("Unparsable file accepted");
    assert_eq!(error.to_string(), "This file could not be opened or parsed.");

    let mut analyzer = RecordingAnalyzer::new(sample_file());
    analyzer.process_result = Err(ErrorKind::PermissionDenied);
    let error = propedit::run(&mut registry, &mut analyzer).expect_err("Scan failure ignored");
    assert!(matches!(error, PropEditError::FileAccess { .. }));
    assert!(
        error.to_string().contains("simulated scan failure"),
        "Error message should carry the I/O reason: {error}",
    );
    assert!(analyzer.commits.is_empty());
}

#[test]
fn analyzer_is_configured_from_options() {
    let (mut registry, _file) = registry_with_temp_file();
    add_change(&mut registry, "info", ChangeKind::Set, "title=x");
    registry.set_parse_mode("full").expect("Failed to set parse mode");
    registry.options_parsed(2);
    let mut analyzer = RecordingAnalyzer::new(sample_file());

    propedit::run(&mut registry, &mut analyzer).expect("Run failed");

    assert_eq!(analyzer.parse_mode, Some(ParseMode::Full));
    assert_eq!(analyzer.open_mode, Some(OpenMode::Write));
    assert!(analyzer.throw_on_error);
    assert!(analyzer.show_progress);
}

#[test]
fn edits_are_written() {
    let (mut registry, _file) = registry_with_temp_file();
    add_change(&mut registry, "info", ChangeKind::Set, "title=My Movie");
    add_change(&mut registry, "track:a1", ChangeKind::Set, "language=ger");
    add_change(&mut registry, "track:a1", ChangeKind::Set, "channels=6");
    registry.options_parsed(0);
    let mut analyzer = RecordingAnalyzer::new(sample_file());

    let outcome = propedit::run(&mut registry, &mut analyzer).expect("Run failed");

    assert!(outcome.modified());
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.to_string(), "The changes are written to the file.");
    assert_eq!(analyzer.commit_ids(), [INFO, TRACKS]);

    assert_eq!(string_child(analyzer.element(INFO).expect("Info missing"), TITLE), Some("My Movie"));
    let entry = track_by_uid(analyzer.element(TRACKS).expect("Tracks missing"), 1002).expect("Audio track missing");
    assert_eq!(string_child(entry, LANGUAGE), Some("ger"));
    let audio = entry.child(AUDIO).expect("Audio master missing");
    assert_eq!(unsigned_child(audio, CHANNELS), Some(6));
}

#[test]
fn merge_warnings_are_returned() {
    let (mut registry, _file) = registry_with_temp_file();
    add_change(&mut registry, "track:v1", ChangeKind::Set, "name=Video");
    add_change(&mut registry, "track:1", ChangeKind::Set, "flag-default=0");
    let mut analyzer = RecordingAnalyzer::new(sample_file());

    let outcome = propedit::run(&mut registry, &mut analyzer).expect("Run failed");
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("UID 1001"));
}

#[test]
fn video_property_on_audio_track_is_rejected() {
    let (mut registry, _file) = registry_with_temp_file();
    add_change(&mut registry, "track:a1", ChangeKind::Set, "pixel-width=640");
    let mut analyzer = RecordingAnalyzer::new(sample_file());

    let error = propedit::run(&mut registry, &mut analyzer).expect_err("Video property accepted");
    let error_message = error.to_string();
    assert!(
        error_message.contains("'pixel-width' can only be used with video tracks")
            && error_message.contains("'track:a1'"),
        "Unexpected message: {error_message}",
    );
    assert!(analyzer.commits.is_empty());
}

#[test]
fn unresolved_track_leaves_file_untouched() {
    let (mut registry, _file) = registry_with_temp_file();
    add_change(&mut registry, "info", ChangeKind::Set, "title=x");
    add_change(&mut registry, "track:9", ChangeKind::Set, "name=x");
    let mut analyzer = RecordingAnalyzer::new(sample_file());

    let error = propedit::run(&mut registry, &mut analyzer).expect_err("Unresolved track accepted");
    assert!(matches!(error, PropEditError::UnresolvedTrackSelector { .. }));
    assert!(analyzer.commits.is_empty());
}
