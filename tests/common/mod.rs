//! Shared helpers for the integration tests: an in-memory analyzer that
//! records every commit request, and builders for sample files.

#![allow(dead_code)]

use std::io::{Error as IoError, ErrorKind, Result as IoResult};
use std::path::{Path, PathBuf};

use propedit::schema::*;
use propedit::{Analyzer, Element, OpenMode, ParseMode, ScalarValue, TargetRegistry, UpdateFailure, UpdateResult};

/// One commit request received by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    Update { id: u32, write_defaults: bool, add_mandatory: bool },
    Remove(u32),
}

impl Commit {
    pub fn id(&self) -> u32 {
        match self {
            Commit::Update { id, .. } | Commit::Remove(id) => *id,
        }
    }
}

/// Analyzer double holding the top-level elements of a fake file.
pub struct RecordingAnalyzer {
    pub elements: Vec<Element>,
    pub commits: Vec<Commit>,
    /// Result of [`Analyzer::process`]; `Err` simulates an I/O failure.
    pub process_result: Result<bool, ErrorKind>,
    pub accept_probe: bool,
    /// Fail the commit of this element ID with the given failure.
    pub fail_on: Option<(u32, UpdateFailure)>,
    pub probed: Option<PathBuf>,
    pub parse_mode: Option<ParseMode>,
    pub open_mode: Option<OpenMode>,
    pub throw_on_error: bool,
    pub show_progress: bool,
}

impl RecordingAnalyzer {
    pub fn new(elements: Vec<Element>) -> Self {
        Self {
            elements,
            commits: Vec::new(),
            process_result: Ok(true),
            accept_probe: true,
            fail_on: None,
            probed: None,
            parse_mode: None,
            open_mode: None,
            throw_on_error: false,
            show_progress: false,
        }
    }

    /// The current state of a top-level element.
    pub fn element(&self, id: u32) -> Option<&Element> {
        self.elements.iter().find(|element| element.id == id)
    }

    pub fn commit_ids(&self) -> Vec<u32> {
        self.commits.iter().map(Commit::id).collect()
    }

    fn check_failure(&self, id: u32) -> UpdateResult {
        match self.fail_on {
            Some((failing, failure)) if failing == id => Err(failure),
            _ => Ok(()),
        }
    }
}

impl Analyzer for RecordingAnalyzer {
    fn probe(&mut self, path: &Path) -> bool {
        self.probed = Some(path.to_path_buf());
        self.accept_probe && path.is_file()
    }

    fn set_parse_mode(&mut self, mode: ParseMode) {
        self.parse_mode = Some(mode);
    }

    fn set_open_mode(&mut self, mode: OpenMode) {
        self.open_mode = Some(mode);
    }

    fn set_throw_on_error(&mut self, throw_on_error: bool) {
        self.throw_on_error = throw_on_error;
    }

    fn set_show_progress(&mut self, show_progress: bool) {
        self.show_progress = show_progress;
    }

    fn process(&mut self) -> IoResult<bool> {
        self.process_result
            .map_err(|kind| IoError::new(kind, "simulated scan failure"))
    }

    fn find(&self, id: u32) -> Option<usize> {
        self.elements.iter().position(|element| element.id == id)
    }

    fn read_element(&mut self, index: usize) -> IoResult<Element> {
        self.elements
            .get(index)
            .cloned()
            .ok_or_else(|| IoError::new(ErrorKind::UnexpectedEof, "no element at this index"))
    }

    fn update_element(&mut self, element: &Element, write_defaults: bool, add_mandatory: bool) -> UpdateResult {
        self.commits.push(Commit::Update { id: element.id, write_defaults, add_mandatory });
        self.check_failure(element.id)?;

        match self.elements.iter_mut().find(|existing| existing.id == element.id) {
            Some(existing) => *existing = element.clone(),
            None => self.elements.push(element.clone()),
        }
        Ok(())
    }

    fn remove_elements(&mut self, id: u32) -> UpdateResult {
        self.commits.push(Commit::Remove(id));
        self.check_failure(id)?;

        self.elements.retain(|element| element.id != id);
        Ok(())
    }
}

pub fn track_entry(number: u64, uid: u64, track_type: u64, extra: Vec<Element>) -> Element {
    let mut children = vec![
        Element::unsigned(TRACK_NUMBER, number),
        Element::unsigned(TRACK_UID, uid),
        Element::unsigned(TRACK_TYPE, track_type),
    ];
    children.extend(extra);
    Element::master(TRACK_ENTRY, children)
}

pub fn attached_file(name: &str, mime_type: &str, uid: u64) -> Element {
    Element::master(
        ATTACHED_FILE,
        vec![
            Element::string(FILE_NAME, name),
            Element::string(FILE_MIME_TYPE, mime_type),
            Element::scalar(FILE_DATA, ScalarValue::Binary(vec![0xDE, 0xAD])),
            Element::unsigned(FILE_UID, uid),
        ],
    )
}

/// Segment info plus a video (UID 1001), an audio (1002) and a subtitle
/// (1003) track.
pub fn sample_file() -> Vec<Element> {
    vec![
        Element::master(
            INFO,
            vec![
                Element::string(TITLE, "Original"),
                Element::unsigned(TIMESTAMP_SCALE, 1_000_000),
                Element::string(MUXING_APP, "libebml"),
            ],
        ),
        Element::master(
            TRACKS,
            vec![
                track_entry(
                    1,
                    1001,
                    TRACK_TYPE_VIDEO,
                    vec![Element::master(
                        VIDEO,
                        vec![Element::unsigned(PIXEL_WIDTH, 1920), Element::unsigned(PIXEL_HEIGHT, 1080)],
                    )],
                ),
                track_entry(
                    2,
                    1002,
                    TRACK_TYPE_AUDIO,
                    vec![
                        Element::string(LANGUAGE, "eng"),
                        Element::master(
                            AUDIO,
                            vec![
                                Element::scalar(SAMPLING_FREQUENCY, ScalarValue::Float(48_000.0)),
                                Element::unsigned(CHANNELS, 2),
                            ],
                        ),
                    ],
                ),
                track_entry(3, 1003, TRACK_TYPE_SUBTITLE, vec![Element::string(NAME, "Signs")]),
            ],
        ),
    ]
}

/// [`sample_file`] with an `Attachments` element holding `files`.
pub fn sample_file_with_attachments(files: Vec<Element>) -> Vec<Element> {
    let mut elements = sample_file();
    elements.push(Element::master(ATTACHMENTS, files));
    elements
}

/// The track entry with the given UID inside a `Tracks` element.
pub fn track_by_uid(tracks: &Element, uid: u64) -> Option<&Element> {
    tracks.children().iter().find(|entry| {
        entry
            .child(TRACK_UID)
            .and_then(Element::value)
            .and_then(ScalarValue::as_unsigned)
            == Some(uid)
    })
}

pub fn string_child(element: &Element, id: u32) -> Option<&str> {
    element.child(id).and_then(Element::value).and_then(ScalarValue::as_str)
}

pub fn unsigned_child(element: &Element, id: u32) -> Option<u64> {
    element.child(id).and_then(Element::value).and_then(ScalarValue::as_unsigned)
}

/// A registry whose file name points at an existing temporary file.
pub fn registry_with_temp_file() -> (TargetRegistry, tempfile::NamedTempFile) {
    let file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let mut registry = TargetRegistry::new();
    registry
        .set_file_name(file.path().to_string_lossy().into_owned())
        .expect("Failed to set file name");
    (registry, file)
}
