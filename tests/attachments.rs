//! Attachment integration tests.

mod common;

use common::{RecordingAnalyzer, attached_file, sample_file, sample_file_with_attachments, string_child, unsigned_child};
use propedit::schema::{ATTACHMENTS, FILE_DATA, FILE_DESCRIPTION, FILE_MIME_TYPE, FILE_NAME, FILE_UID, INFO, TITLE};
use propedit::{
    AttachmentCommand, AttachmentSelector, AttachmentUpdate, ChangeKind, Element, NewAttachment, PropEditError,
    ScalarValue, TargetRegistry,
};

fn run_commands(commands: Vec<AttachmentCommand>, analyzer: &mut RecordingAnalyzer) -> Result<(), PropEditError> {
    let mut registry = TargetRegistry::new();
    registry.set_file_name("movie.mkv")?;
    for command in commands {
        registry.add_attachment_target(command);
    }
    registry.options_parsed(0);
    registry.find_elements(analyzer)?;
    registry.validate()?;
    registry.execute(analyzer)?;
    Ok(())
}

fn selector(spec: &str) -> AttachmentSelector {
    AttachmentSelector::parse(spec).expect("Failed to parse selector")
}

fn files(analyzer: &RecordingAnalyzer) -> Vec<Element> {
    analyzer
        .element(ATTACHMENTS)
        .map(|attachments| attachments.children().to_vec())
        .unwrap_or_default()
}

fn new_attachment(name: &str, uid: Option<u64>) -> NewAttachment {
    NewAttachment {
        name: name.to_string(),
        mime_type: "font/ttf".to_string(),
        description: Some("Subtitle font".to_string()),
        data: vec![1, 2, 3],
        uid,
    }
}

#[test]
fn add_creates_attachments_element() {
    let mut analyzer = RecordingAnalyzer::new(sample_file());
    run_commands(vec![AttachmentCommand::Add(new_attachment("a.ttf", None))], &mut analyzer)
        .expect("Adding an attachment failed");

    let files = files(&analyzer);
    assert_eq!(files.len(), 1);
    assert_eq!(string_child(&files[0], FILE_NAME), Some("a.ttf"));
    assert_eq!(string_child(&files[0], FILE_MIME_TYPE), Some("font/ttf"));
    assert_eq!(string_child(&files[0], FILE_DESCRIPTION), Some("Subtitle font"));
    assert_eq!(
        files[0].child(FILE_DATA).and_then(Element::value),
        Some(&ScalarValue::Binary(vec![1, 2, 3]))
    );
    assert_eq!(unsigned_child(&files[0], FILE_UID), Some(1));
}

#[test]
fn added_uids_follow_the_largest_existing_one() {
    let mut analyzer = RecordingAnalyzer::new(sample_file_with_attachments(vec![
        attached_file("cover.jpg", "image/jpeg", 9),
        attached_file("logo.png", "image/png", 5),
    ]));
    run_commands(
        vec![
            AttachmentCommand::Add(new_attachment("a.ttf", None)),
            AttachmentCommand::Add(new_attachment("b.ttf", Some(77))),
            AttachmentCommand::Add(new_attachment("c.ttf", None)),
        ],
        &mut analyzer,
    )
    .expect("Adding attachments failed");

    let uids: Vec<Option<u64>> = files(&analyzer).iter().map(|file| unsigned_child(file, FILE_UID)).collect();
    assert_eq!(uids, [Some(9), Some(5), Some(10), Some(77), Some(78)]);
}

#[test]
fn delete_applies_to_every_match() {
    let mut analyzer = RecordingAnalyzer::new(sample_file_with_attachments(vec![
        attached_file("a.ttf", "font/ttf", 1),
        attached_file("cover.jpg", "image/jpeg", 2),
        attached_file("b.ttf", "font/ttf", 3),
    ]));
    run_commands(vec![AttachmentCommand::Delete(selector("mime-type:font/ttf"))], &mut analyzer)
        .expect("Deleting attachments failed");

    let files = files(&analyzer);
    assert_eq!(files.len(), 1);
    assert_eq!(string_child(&files[0], FILE_NAME), Some("cover.jpg"));
}

#[test]
fn update_overwrites_selected_fields_only() {
    let mut analyzer = RecordingAnalyzer::new(sample_file_with_attachments(vec![
        attached_file("cover.jpg", "image/jpeg", 1),
        attached_file("font.ttf", "font/ttf", 2),
    ]));
    let update = AttachmentUpdate {
        name: Some("cover.png".to_string()),
        mime_type: Some("image/png".to_string()),
        ..AttachmentUpdate::default()
    };
    run_commands(vec![AttachmentCommand::Update(selector("=1"), update)], &mut analyzer)
        .expect("Updating attachment failed");

    let files = files(&analyzer);
    assert_eq!(string_child(&files[0], FILE_NAME), Some("cover.png"));
    assert_eq!(string_child(&files[0], FILE_MIME_TYPE), Some("image/png"));
    assert_eq!(unsigned_child(&files[0], FILE_UID), Some(1));
    assert_eq!(string_child(&files[1], FILE_NAME), Some("font.ttf"));
}

#[test]
fn unmatched_selector_leaves_file_untouched() {
    let mut registry = TargetRegistry::new();
    registry.set_file_name("movie.mkv").expect("Failed to set file name");
    registry
        .add_track_or_segmentinfo_target("info")
        .expect("Failed to add info target")
        .add_change(ChangeKind::Set, "title=Changed")
        .expect("Failed to add change");
    registry.add_attachment_target(AttachmentCommand::Delete(selector("name:missing.ttf")));

    let mut analyzer = RecordingAnalyzer::new(sample_file_with_attachments(vec![attached_file(
        "font.ttf", "font/ttf", 1,
    )]));
    registry.find_elements(&mut analyzer).expect("Failed to find elements");
    registry.validate().expect("Validation failed");

    let error = registry.execute(&mut analyzer).expect_err("Unmatched selector accepted");
    assert!(matches!(error, PropEditError::NoMatchingAttachment { .. }));
    assert!(
        error.to_string().contains("'name:missing.ttf'"),
        "Error message should name the selector: {error}",
    );
    assert!(analyzer.commits.is_empty());
    assert_eq!(
        string_child(analyzer.element(INFO).expect("Info missing"), TITLE),
        Some("Original")
    );
}

#[test]
fn empty_update_is_dropped() {
    let mut registry = TargetRegistry::new();
    registry.add_attachment_target(AttachmentCommand::Update(selector("1"), AttachmentUpdate::default()));
    registry.options_parsed(0);

    assert!(registry.targets().is_empty());
    assert!(!registry.has_changes());
}

#[test]
fn attachments_take_no_property_changes() {
    let mut registry = TargetRegistry::new();
    let target = registry.add_attachment_target(AttachmentCommand::Delete(selector("1")));

    assert_eq!(target.spec(), "delete-attachment:1");
    let error = target
        .add_change(ChangeKind::Set, "name=x")
        .expect_err("Property change accepted for attachment");
    assert!(matches!(error, PropEditError::InvalidChange { .. }));
}

#[test]
fn invalid_selectors_are_rejected() {
    for spec in ["", "0", "=0", "name:", "mime-type:", "cover.jpg"] {
        assert!(
            matches!(AttachmentSelector::parse(spec), Err(PropEditError::InvalidAttachmentSpec { .. })),
            "Expected InvalidAttachmentSpec for '{spec}'",
        );
    }
}
