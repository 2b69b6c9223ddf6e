//! Edit targets.
//!
//! A [`Target`] is one addressable unit of change: the segment information
//! block, one track's header, or one attachment command. Targets are created
//! while the edit specification is parsed, bound once to a top-level element
//! in the [`ElementTree`], and then executed in memory.
//!
//! # Selectors
//!
//! | Spec | Target |
//! |------|--------|
//! | `info`, `segment_info`, `segmentinfo` | segment information |
//! | `track:N` | the N-th track (1-based) |
//! | `track:@N` | the track with track number N |
//! | `track:=UID` | the track with the given UID |
//! | `track:vN`, `aN`, `sN`, `bN` | the N-th video, audio, subtitle or button track |

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde_json::{Value, json};

use crate::change::{Change, ChangeKind};
use crate::element::{Element, ScalarValue};
use crate::error::PropEditError;
use crate::property::{Section, SubMaster};
use crate::schema::{self, *};
use crate::tree::{ElementTree, NodeId};

/// Parse a strictly positive decimal number.
fn positive(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|value| *value > 0)
}

/// How a track target picks its track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackSelector {
    /// The N-th track entry (1-based).
    Position(u64),
    /// The entry with this track number.
    Number(u64),
    /// The entry with this track UID.
    Uid(u64),
    /// The N-th entry (1-based) of the given track type.
    TypePosition { track_type: u64, position: u64 },
}

impl TrackSelector {
    /// Parse the part after `track:`. Returns `None` for unknown grammar.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        let mut chars = spec.chars();
        let first = chars.next()?;
        let rest = chars.as_str();

        let track_type = match first {
            '@' => return positive(rest).map(TrackSelector::Number),
            '=' => return positive(rest).map(TrackSelector::Uid),
            'v' => TRACK_TYPE_VIDEO,
            'a' => TRACK_TYPE_AUDIO,
            's' => TRACK_TYPE_SUBTITLE,
            'b' => TRACK_TYPE_BUTTONS,
            _ => return positive(spec).map(TrackSelector::Position),
        };

        positive(rest).map(|position| TrackSelector::TypePosition { track_type, position })
    }

    /// Find the matching track entry below `tracks`.
    pub fn resolve(&self, tree: &ElementTree, tracks: NodeId) -> Option<NodeId> {
        let entries = tree.children_with_id(tracks, TRACK_ENTRY);
        let has_value = |entry: &NodeId, id: u32, wanted: u64| {
            tree.child_value(*entry, id).and_then(ScalarValue::as_unsigned) == Some(wanted)
        };

        match *self {
            TrackSelector::Position(position) => entries.get(position as usize - 1).copied(),
            TrackSelector::Number(number) => entries
                .into_iter()
                .find(|entry| has_value(entry, TRACK_NUMBER, number)),
            TrackSelector::Uid(uid) => entries.into_iter().find(|entry| has_value(entry, TRACK_UID, uid)),
            TrackSelector::TypePosition { track_type, position } => entries
                .into_iter()
                .filter(|entry| has_value(entry, TRACK_TYPE, track_type))
                .nth(position as usize - 1),
        }
    }
}

/// How an attachment command picks its attached files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSelector {
    /// The N-th attached file (1-based).
    Position(u64),
    /// The attached file with this `FileUID`.
    Uid(u64),
    /// Every attached file with this exact file name.
    Name(String),
    /// Every attached file with this exact MIME type.
    MimeType(String),
}

impl AttachmentSelector {
    /// Parse `N`, `=UID`, `name:<file name>` or `mime-type:<type>`.
    ///
    /// # Errors
    ///
    /// [`PropEditError::InvalidAttachmentSpec`] for anything else.
    pub fn parse(spec: &str) -> Result<Self, PropEditError> {
        let selector = if let Some(name) = spec.strip_prefix("name:") {
            Some(AttachmentSelector::Name(name.to_string())).filter(|_| !name.is_empty())
        } else if let Some(mime_type) = spec.strip_prefix("mime-type:") {
            Some(AttachmentSelector::MimeType(mime_type.to_string())).filter(|_| !mime_type.is_empty())
        } else if let Some(uid) = spec.strip_prefix('=') {
            positive(uid).map(AttachmentSelector::Uid)
        } else {
            positive(spec).map(AttachmentSelector::Position)
        };

        selector.ok_or_else(|| PropEditError::InvalidAttachmentSpec { spec: spec.to_string() })
    }

    /// All attached files below `attachments` matching this selector.
    pub fn matches(&self, tree: &ElementTree, attachments: NodeId) -> Vec<NodeId> {
        let files = tree.children_with_id(attachments, ATTACHED_FILE);
        let string_child = |file: &NodeId, id: u32| tree.child_value(*file, id).and_then(ScalarValue::as_str);

        match self {
            AttachmentSelector::Position(position) => {
                files.get(*position as usize - 1).copied().into_iter().collect()
            }
            AttachmentSelector::Uid(uid) => files
                .into_iter()
                .filter(|file| tree.child_value(*file, FILE_UID).and_then(ScalarValue::as_unsigned) == Some(*uid))
                .collect(),
            AttachmentSelector::Name(name) => files
                .into_iter()
                .filter(|file| string_child(file, FILE_NAME) == Some(name.as_str()))
                .collect(),
            AttachmentSelector::MimeType(mime_type) => files
                .into_iter()
                .filter(|file| string_child(file, FILE_MIME_TYPE) == Some(mime_type.as_str()))
                .collect(),
        }
    }
}

impl Display for AttachmentSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AttachmentSelector::Position(position) => write!(f, "{position}"),
            AttachmentSelector::Uid(uid) => write!(f, "={uid}"),
            AttachmentSelector::Name(name) => write!(f, "name:{name}"),
            AttachmentSelector::MimeType(mime_type) => write!(f, "mime-type:{mime_type}"),
        }
    }
}

/// A file to attach.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttachment {
    /// Stored as `FileName`.
    pub name: String,
    /// Stored as `FileMimeType`.
    pub mime_type: String,
    /// Stored as `FileDescription`; omitted when `None`.
    pub description: Option<String>,
    /// The file content, stored as `FileData`.
    pub data: Vec<u8>,
    /// Explicit UID; one more than the largest existing UID when `None`.
    pub uid: Option<u64>,
}

/// Fields to overwrite on matching attached files. `data` replaces the content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentUpdate {
    /// New `FileName`.
    pub name: Option<String>,
    /// New `FileMimeType`.
    pub mime_type: Option<String>,
    /// New `FileDescription`.
    pub description: Option<String>,
    /// New `FileData`.
    pub data: Option<Vec<u8>>,
}

impl AttachmentUpdate {
    /// True when no field would be overwritten.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.mime_type.is_none() && self.description.is_none() && self.data.is_none()
    }
}

/// One attachment operation.
#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentCommand {
    /// Append a new attached file.
    Add(NewAttachment),
    /// Remove every attached file the selector matches.
    Delete(AttachmentSelector),
    /// Overwrite the given fields on every attached file the selector matches.
    Update(AttachmentSelector, AttachmentUpdate),
}

/// Variant data of a [`Target`].
#[derive(Debug, Clone)]
pub enum TargetKind {
    SegmentInfo {
        changes: Vec<Change>,
    },
    Track {
        selector: TrackSelector,
        changes: Vec<Change>,
        /// The resolved track entry.
        master: Option<NodeId>,
        /// `Video` or `Audio` below the track entry, created on execution.
        sub_master: Option<NodeId>,
        track_uid: Option<u64>,
        track_type: Option<u64>,
    },
    Attachment(AttachmentCommand),
}

/// One addressable unit of change.
#[derive(Debug, Clone)]
pub struct Target {
    spec: String,
    kind: TargetKind,
    level1_element: Option<NodeId>,
    content_modified: bool,
    validated: bool,
}

impl Target {
    fn new(spec: String, kind: TargetKind) -> Self {
        Self { spec, kind, level1_element: None, content_modified: false, validated: false }
    }

    /// Parse a segment info or track selector.
    ///
    /// # Errors
    ///
    /// [`PropEditError::InvalidSpec`] if the selector matches no known form.
    pub fn parse_spec(spec: &str) -> Result<Self, PropEditError> {
        const TRACK_PREFIX: &str = "track:";

        let spec = spec.trim();
        let lowered = spec.to_ascii_lowercase();
        let invalid = || PropEditError::InvalidSpec { spec: spec.to_string() };

        let kind = match lowered.as_str() {
            "info" | "segment_info" | "segmentinfo" => TargetKind::SegmentInfo { changes: Vec::new() },
            other => {
                let selector = other
                    .strip_prefix(TRACK_PREFIX)
                    .and_then(TrackSelector::parse)
                    .ok_or_else(invalid)?;
                TargetKind::Track {
                    selector,
                    changes: Vec::new(),
                    master: None,
                    sub_master: None,
                    track_uid: None,
                    track_type: None,
                }
            }
        };

        Ok(Self::new(spec.to_string(), kind))
    }

    /// Create a target for an attachment command.
    pub fn attachment(command: AttachmentCommand) -> Self {
        let spec = match &command {
            AttachmentCommand::Add(new) => format!("add-attachment:{}", new.name),
            AttachmentCommand::Delete(selector) => format!("delete-attachment:{selector}"),
            AttachmentCommand::Update(selector, _) => format!("update-attachment:{selector}"),
        };
        Self::new(spec, TargetKind::Attachment(command))
    }

    /// The selector this target was created from, as given by the user.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    pub fn kind(&self) -> &TargetKind {
        &self.kind
    }

    pub fn is_track(&self) -> bool {
        matches!(self.kind, TargetKind::Track { .. })
    }

    /// ID of the top-level element this target binds to.
    pub fn level1_id(&self) -> u32 {
        match self.kind {
            TargetKind::SegmentInfo { .. } => INFO,
            TargetKind::Track { .. } => TRACKS,
            TargetKind::Attachment(_) => ATTACHMENTS,
        }
    }

    /// Identity comparison used for deduplication, not content comparison.
    ///
    /// Attachment commands never share an identity.
    pub fn same_identity(&self, other: &Target) -> bool {
        match (&self.kind, &other.kind) {
            (TargetKind::SegmentInfo { .. }, TargetKind::SegmentInfo { .. }) => true,
            (TargetKind::Track { selector: a, .. }, TargetKind::Track { selector: b, .. }) => a == b,
            _ => false,
        }
    }

    /// Queued property changes; empty for attachment targets.
    pub fn changes(&self) -> &[Change] {
        match &self.kind {
            TargetKind::SegmentInfo { changes } | TargetKind::Track { changes, .. } => changes,
            TargetKind::Attachment(_) => &[],
        }
    }

    /// Parse and queue a property change.
    ///
    /// # Errors
    ///
    /// Parse errors from [`Change::parse`]; [`PropEditError::InvalidChange`]
    /// for attachment targets, which take no property changes.
    pub fn add_change(&mut self, kind: ChangeKind, spec: &str) -> Result<&mut Self, PropEditError> {
        let (section, changes) = match &mut self.kind {
            TargetKind::SegmentInfo { changes } => (Section::SegmentInfo, changes),
            TargetKind::Track { changes, .. } => (Section::Track, changes),
            TargetKind::Attachment(_) => {
                return Err(PropEditError::InvalidChange {
                    spec: spec.to_string(),
                    reason: "attachments do not take property changes".to_string(),
                });
            }
        };
        changes.push(Change::parse(kind, spec, section)?);
        Ok(self)
    }

    pub fn has_changes(&self) -> bool {
        match &self.kind {
            TargetKind::Attachment(AttachmentCommand::Update(_, update)) => !update.is_empty(),
            TargetKind::Attachment(_) => true,
            _ => !self.changes().is_empty(),
        }
    }

    /// Append `other`'s changes after this target's own, preserving order.
    pub fn merge_changes(&mut self, other: Target) {
        match (&mut self.kind, other.kind) {
            (TargetKind::SegmentInfo { changes }, TargetKind::SegmentInfo { changes: more })
            | (TargetKind::Track { changes, .. }, TargetKind::Track { changes: more, .. }) => {
                changes.extend(more);
            }
            _ => debug_assert!(false, "merging targets of different kinds"),
        }
    }

    pub fn level1_element(&self) -> Option<NodeId> {
        self.level1_element
    }

    /// Bind the target to a top-level element. A second call overwrites the
    /// binding; binding after validation is a logic error.
    pub fn set_level1_element(&mut self, element: NodeId) {
        debug_assert!(!self.validated, "target '{}' rebound after validation", self.spec);
        self.level1_element = Some(element);
    }

    /// Resolve a track selector against the bound `Tracks` element. No-op
    /// for other targets.
    pub fn resolve(&mut self, tree: &ElementTree) {
        let Some(tracks) = self.level1_element else {
            return;
        };
        if let TargetKind::Track { selector, master, track_uid, track_type, .. } = &mut self.kind {
            *master = selector.resolve(tree, tracks);
            *track_uid = master.and_then(|entry| tree.child_value(entry, TRACK_UID)?.as_unsigned());
            *track_type = master.and_then(|entry| tree.child_value(entry, TRACK_TYPE)?.as_unsigned());
        }
    }

    /// UID of the resolved track.
    pub fn track_uid(&self) -> Option<u64> {
        match self.kind {
            TargetKind::Track { track_uid, .. } => track_uid,
            _ => None,
        }
    }

    /// The track entry and its type-specific sub-master.
    pub fn masters(&self) -> (Option<NodeId>, Option<NodeId>) {
        match self.kind {
            TargetKind::Track { master, sub_master, .. } => (master, sub_master),
            TargetKind::SegmentInfo { .. } => (self.level1_element, None),
            TargetKind::Attachment(_) => (None, None),
        }
    }

    /// Target-specific checks run after binding.
    ///
    /// # Errors
    ///
    /// [`PropEditError::UnresolvedTrackSelector`] and
    /// [`PropEditError::PropertyNotApplicable`] for track targets,
    /// [`PropEditError::TargetNotBound`] for unbound targets.
    pub fn validate(&mut self) -> Result<(), PropEditError> {
        if self.level1_element.is_none() {
            return Err(PropEditError::TargetNotBound { spec: self.spec.clone() });
        }

        if let TargetKind::Track { changes, master, track_type, .. } = &self.kind {
            if master.is_none() {
                return Err(PropEditError::UnresolvedTrackSelector { spec: self.spec.clone() });
            }
            for change in changes {
                check_applicable(&self.spec, change, *track_type)?;
            }
        }

        self.validated = true;
        Ok(())
    }

    /// Apply every queued change to the bound element, in queue order.
    ///
    /// Only the in-memory tree is mutated. Sets
    /// [`content_modified`](Target::content_modified) if anything changed.
    ///
    /// # Errors
    ///
    /// [`PropEditError::TargetNotBound`] if the target was never bound,
    /// [`PropEditError::NoMatchingAttachment`] for attachment selectors that
    /// match nothing.
    pub fn execute_change(&mut self, tree: &mut ElementTree) -> Result<(), PropEditError> {
        let level1 = self
            .level1_element
            .ok_or_else(|| PropEditError::TargetNotBound { spec: self.spec.clone() })?;

        let modified = match &mut self.kind {
            TargetKind::SegmentInfo { changes } => changes
                .iter_mut()
                .fold(false, |modified, change| change.execute(tree, level1, None) || modified),
            TargetKind::Track { changes, master, sub_master, track_type, .. } => {
                let entry = master.ok_or_else(|| PropEditError::UnresolvedTrackSelector { spec: self.spec.clone() })?;
                for change in changes.iter() {
                    check_applicable(&self.spec, change, *track_type)?;
                }
                if sub_master.is_none() {
                    *sub_master = track_type
                        .and_then(SubMaster::for_track_type)
                        .map(|kind| tree.find_or_create_master(entry, kind.element_id()));
                }
                let sub_master = *sub_master;
                changes
                    .iter_mut()
                    .fold(false, |modified, change| change.execute(tree, entry, sub_master) || modified)
            }
            TargetKind::Attachment(command) => execute_attachment(command, tree, level1)?,
        };

        if modified {
            log::debug!("Target '{}' modified its element", self.spec);
        }
        self.content_modified |= modified;
        Ok(())
    }

    /// `true` once a change actually altered the bound element.
    pub fn content_modified(&self) -> bool {
        self.content_modified
    }

    /// Whether children equal to their default value must still be written.
    pub fn write_elements_set_to_default_value(&self) -> bool {
        !matches!(self.kind, TargetKind::Attachment(_))
    }

    /// Whether mandatory children missing from the file are synthesized on commit.
    pub fn add_mandatory_elements_if_missing(&self) -> bool {
        true
    }

    /// Deterministic text snapshot for diagnostics.
    pub fn dump_info(&self) -> String {
        let mut out = format!(
            "  target:\n    spec:         {}\n    level1:       {}\n    bound:        {}\n",
            self.spec,
            schema::element_name(self.level1_id()),
            self.level1_element.is_some(),
        );
        if let Some(uid) = self.track_uid() {
            out.push_str(&format!("    track_uid:    {uid}\n"));
        }
        match &self.kind {
            TargetKind::Attachment(command) => out.push_str(&format!("    command:      {command:?}\n")),
            _ => {
                out.push_str("    changes:\n");
                for change in self.changes() {
                    out.push_str(&format!("      {change}\n"));
                }
            }
        }
        out
    }

    /// The same snapshot as [`dump_info`](Target::dump_info) as JSON.
    pub fn dump_json(&self) -> Value {
        let changes: Vec<String> = self.changes().iter().map(ToString::to_string).collect();
        json!({
            "spec": self.spec,
            "level1": schema::element_name(self.level1_id()),
            "bound": self.level1_element.is_some(),
            "track_uid": self.track_uid(),
            "changes": changes,
        })
    }
}

fn check_applicable(spec: &str, change: &Change, track_type: Option<u64>) -> Result<(), PropEditError> {
    let Some(required) = change.property.sub_master else {
        return Ok(());
    };
    let actual = track_type.unwrap_or_default();
    if required.track_type() == actual {
        return Ok(());
    }
    Err(PropEditError::PropertyNotApplicable {
        property: change.property.name,
        spec: spec.to_string(),
        required: schema::track_type_name(required.track_type()),
        actual: schema::track_type_name(actual),
    })
}

fn execute_attachment(
    command: &AttachmentCommand,
    tree: &mut ElementTree,
    attachments: NodeId,
) -> Result<bool, PropEditError> {
    let no_match = |selector: &AttachmentSelector| PropEditError::NoMatchingAttachment { spec: selector.to_string() };

    match command {
        AttachmentCommand::Add(new) => {
            let uid = new.uid.unwrap_or_else(|| next_attachment_uid(tree, attachments));
            let mut children = vec![Element::string(FILE_NAME, new.name.as_str())];
            if let Some(description) = &new.description {
                children.push(Element::string(FILE_DESCRIPTION, description.as_str()));
            }
            children.push(Element::string(FILE_MIME_TYPE, new.mime_type.as_str()));
            children.push(Element::scalar(FILE_DATA, ScalarValue::Binary(new.data.clone())));
            children.push(Element::unsigned(FILE_UID, uid));
            tree.append_child(attachments, Element::master(ATTACHED_FILE, children));
            Ok(true)
        }
        AttachmentCommand::Delete(selector) => {
            let files = selector.matches(tree, attachments);
            if files.is_empty() {
                return Err(no_match(selector));
            }
            for file in files {
                tree.remove_child(attachments, file);
            }
            Ok(true)
        }
        AttachmentCommand::Update(selector, update) => {
            let files = selector.matches(tree, attachments);
            if files.is_empty() {
                return Err(no_match(selector));
            }
            let mut modified = false;
            for file in files {
                let fields = [
                    (FILE_NAME, update.name.clone().map(ScalarValue::String)),
                    (FILE_MIME_TYPE, update.mime_type.clone().map(ScalarValue::String)),
                    (FILE_DESCRIPTION, update.description.clone().map(ScalarValue::String)),
                    (FILE_DATA, update.data.clone().map(ScalarValue::Binary)),
                ];
                for (id, value) in fields {
                    if let Some(value) = value {
                        modified |= tree.set_child_value(file, id, value);
                    }
                }
            }
            Ok(modified)
        }
    }
}

fn next_attachment_uid(tree: &ElementTree, attachments: NodeId) -> u64 {
    tree.children_with_id(attachments, ATTACHED_FILE)
        .into_iter()
        .filter_map(|file| tree.child_value(file, FILE_UID)?.as_unsigned())
        .max()
        .map_or(1, |largest| largest.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_selector_grammar() {
        assert_eq!(TrackSelector::parse("3"), Some(TrackSelector::Position(3)));
        assert_eq!(TrackSelector::parse("@2"), Some(TrackSelector::Number(2)));
        assert_eq!(TrackSelector::parse("=12345"), Some(TrackSelector::Uid(12345)));
        assert_eq!(
            TrackSelector::parse("a1"),
            Some(TrackSelector::TypePosition { track_type: TRACK_TYPE_AUDIO, position: 1 })
        );
        assert_eq!(TrackSelector::parse("0"), None);
        assert_eq!(TrackSelector::parse("x1"), None);
        assert_eq!(TrackSelector::parse("=+5"), None);
        assert_eq!(TrackSelector::parse(""), None);
    }

    #[test]
    fn parse_spec_forms() {
        assert!(matches!(
            Target::parse_spec("Segment_Info").unwrap().kind(),
            TargetKind::SegmentInfo { .. }
        ));
        assert!(Target::parse_spec("info").is_ok());
        assert!(Target::parse_spec("TRACK:v1").unwrap().is_track());
        assert!(matches!(
            Target::parse_spec("chapters"),
            Err(PropEditError::InvalidSpec { .. })
        ));
        assert!(Target::parse_spec("track:").is_err());
    }

    #[test]
    fn identity_ignores_changes() {
        let mut first = Target::parse_spec("track:7").unwrap();
        first.add_change(ChangeKind::Set, "name=A").unwrap();
        let second = Target::parse_spec("track:7").unwrap();
        assert!(first.same_identity(&second));
        assert!(!first.same_identity(&Target::parse_spec("track:@7").unwrap()));
        assert!(!first.same_identity(&Target::parse_spec("info").unwrap()));
    }

    #[test]
    fn attachment_selector_grammar() {
        assert_eq!(AttachmentSelector::parse("2").unwrap(), AttachmentSelector::Position(2));
        assert_eq!(AttachmentSelector::parse("=9").unwrap(), AttachmentSelector::Uid(9));
        assert_eq!(
            AttachmentSelector::parse("name:cover.jpg").unwrap(),
            AttachmentSelector::Name("cover.jpg".into())
        );
        assert!(AttachmentSelector::parse("name:").is_err());
        assert!(AttachmentSelector::parse("cover").is_err());
        assert_eq!(AttachmentSelector::parse("mime-type:font/ttf").unwrap().to_string(), "mime-type:font/ttf");
    }

    #[test]
    fn executing_unbound_target_fails() {
        let mut tree = ElementTree::new();
        let mut target = Target::parse_spec("info").unwrap();
        target.add_change(ChangeKind::Set, "title=x").unwrap();
        assert!(matches!(
            target.execute_change(&mut tree),
            Err(PropEditError::TargetNotBound { .. })
        ));
    }
}
