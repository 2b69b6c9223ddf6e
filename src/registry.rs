//! The target registry.
//!
//! [`TargetRegistry`] owns everything one invocation edits: the file name,
//! the parse mode, the edit targets and the [`ElementTree`] their top-level
//! elements are bound into. It drives the lifecycle
//! parse → bind → validate → execute → prune → commit.
//!
//! # Example
//!
//! ```no_run
//! use propedit::{ChangeKind, TargetRegistry};
//!
//! let mut registry = TargetRegistry::new();
//! registry.set_file_name("movie.mkv")?;
//! registry
//!     .add_track_or_segmentinfo_target("track:a1")?
//!     .add_change(ChangeKind::Set, "language=ger")?;
//! registry
//!     .add_track_or_segmentinfo_target("info")?
//!     .add_change(ChangeKind::Set, "title=My Movie")?;
//! registry.options_parsed(0);
//! # Ok::<(), propedit::PropEditError>(())
//! ```

use std::collections::HashMap;

use serde_json::{Value, json};

use crate::analyzer::{Analyzer, ParseMode};
use crate::commit::{self, CommitSummary};
use crate::element::Element;
use crate::error::PropEditError;
use crate::property::Section;
use crate::prune::{self, PruneReport};
use crate::schema::{ATTACHMENTS, INFO, TRACKS};
use crate::target::{AttachmentCommand, Target};
use crate::tree::{ElementTree, NodeId};

/// All edit targets of one invocation plus the file they apply to.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    file_name: Option<String>,
    targets: Vec<Target>,
    show_progress: bool,
    parse_mode: ParseMode,
    tree: ElementTree,
    warnings: Vec<String>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `spec` and return its target. If a target with the same
    /// identity already exists, that target is returned instead of a new one.
    ///
    /// # Errors
    ///
    /// [`PropEditError::InvalidSpec`] for unrecognised selectors.
    pub fn add_track_or_segmentinfo_target(&mut self, spec: &str) -> Result<&mut Target, PropEditError> {
        let target = Target::parse_spec(spec)?;

        let index = match self.targets.iter().position(|existing| existing.same_identity(&target)) {
            Some(index) => index,
            None => {
                self.targets.push(target);
                self.targets.len() - 1
            }
        };

        Ok(&mut self.targets[index])
    }

    /// Add an attachment command. Attachment targets are never deduplicated.
    pub fn add_attachment_target(&mut self, command: AttachmentCommand) -> &mut Target {
        self.targets.push(Target::attachment(command));
        let index = self.targets.len() - 1;
        &mut self.targets[index]
    }

    /// Set the file to edit.
    ///
    /// # Errors
    ///
    /// [`PropEditError::DuplicateFileName`] if a different name was set before.
    pub fn set_file_name(&mut self, file_name: impl Into<String>) -> Result<(), PropEditError> {
        let file_name = file_name.into();
        match &self.file_name {
            Some(existing) if *existing != file_name => Err(PropEditError::DuplicateFileName {
                existing: existing.clone(),
                new: file_name,
            }),
            _ => {
                self.file_name = Some(file_name);
                Ok(())
            }
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Set the analyzer's parse mode from `"fast"` or `"full"`.
    ///
    /// # Errors
    ///
    /// [`PropEditError::InvalidParseMode`] for any other string.
    pub fn set_parse_mode(&mut self, parse_mode: &str) -> Result<(), PropEditError> {
        self.parse_mode = parse_mode.parse()?;
        Ok(())
    }

    pub fn parse_mode(&self) -> ParseMode {
        self.parse_mode
    }

    pub fn show_progress(&self) -> bool {
        self.show_progress
    }

    /// Finish option parsing: drop targets without changes and derive the
    /// progress flag from the verbosity level.
    pub fn options_parsed(&mut self, verbosity: u8) {
        self.remove_empty_targets();
        self.show_progress = verbosity > 1;
    }

    /// Drop every target without pending changes.
    pub fn remove_empty_targets(&mut self) {
        self.targets.retain(Target::has_changes);
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// The arena holding the bound top-level elements.
    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    /// Non-fatal diagnostics, e.g. merged duplicate targets.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// `true` if at least one target has pending changes.
    pub fn has_changes(&self) -> bool {
        self.targets.iter().any(Target::has_changes)
    }

    /// `true` once any target altered its element.
    pub fn content_modified(&self) -> bool {
        self.targets.iter().any(Target::content_modified)
    }

    /// Pre-flight checks.
    ///
    /// # Errors
    ///
    /// In this order: [`PropEditError::NoFileName`],
    /// [`PropEditError::NoChanges`], then the first failing target's own
    /// validation error.
    pub fn validate(&mut self) -> Result<(), PropEditError> {
        self.validate_options()?;
        for target in &mut self.targets {
            target.validate()?;
        }
        Ok(())
    }

    /// The checks of [`validate`](TargetRegistry::validate) that need no file.
    pub(crate) fn validate_options(&self) -> Result<(), PropEditError> {
        if self.file_name.as_deref().is_none_or(str::is_empty) {
            return Err(PropEditError::NoFileName);
        }
        if !self.has_changes() {
            return Err(PropEditError::NoChanges);
        }
        Ok(())
    }

    fn read_level1_element(
        &mut self,
        analyzer: &mut dyn Analyzer,
        id: u32,
        section: &'static str,
        required: bool,
    ) -> Result<Option<NodeId>, PropEditError> {
        let element = match analyzer.find(id) {
            Some(index) => Some(analyzer.read_element(index)?),
            None => None,
        };

        match element {
            Some(element) if element.id == id => Ok(Some(self.tree.insert(element))),
            _ if required => Err(PropEditError::MissingRequiredElement { section }),
            _ => Ok(None),
        }
    }

    /// Read the top-level elements the targets refer to, bind every target,
    /// resolve track selectors and merge duplicate track targets.
    ///
    /// # Errors
    ///
    /// [`PropEditError::MissingRequiredElement`] if segment info or track
    /// headers are edited but absent from the file; I/O errors from the
    /// analyzer.
    pub fn find_elements(&mut self, analyzer: &mut dyn Analyzer) -> Result<(), PropEditError> {
        let wants = |id: u32| self.targets.iter().any(|target| target.level1_id() == id);
        let (wants_info, wants_tracks, wants_attachments) = (wants(INFO), wants(TRACKS), wants(ATTACHMENTS));

        let info = if wants_info {
            self.read_level1_element(analyzer, INFO, Section::SegmentInfo.title(), true)?
        } else {
            None
        };
        let tracks = if wants_tracks {
            self.read_level1_element(analyzer, TRACKS, Section::Track.title(), true)?
        } else {
            None
        };
        let attachments = if wants_attachments {
            let existing = self.read_level1_element(analyzer, ATTACHMENTS, "Attachments", false)?;
            Some(existing.unwrap_or_else(|| self.tree.insert(Element::master(ATTACHMENTS, Vec::new()))))
        } else {
            None
        };

        for target in &mut self.targets {
            let element = match target.level1_id() {
                INFO => info,
                TRACKS => tracks,
                ATTACHMENTS => attachments,
                _ => None,
            };
            if let Some(element) = element {
                target.set_level1_element(element);
                target.resolve(&self.tree);
                log::debug!("Bound '{}' (track UID {:?})", target.spec(), target.track_uid());
            }
        }

        self.merge_targets();
        Ok(())
    }

    /// Merge track targets resolving to the same track UID into the first
    /// one seen. Later targets contribute their changes in order; a warning
    /// is recorded for each merged duplicate.
    pub fn merge_targets(&mut self) {
        let mut kept: Vec<Target> = Vec::with_capacity(self.targets.len());
        let mut by_track_uid: HashMap<u64, usize> = HashMap::new();

        for target in std::mem::take(&mut self.targets) {
            let Some(track_uid) = target.track_uid() else {
                kept.push(target);
                continue;
            };

            match by_track_uid.get(&track_uid) {
                Some(&index) => {
                    let warning = format!(
                        "The edit specifications '{}' and '{}' resolve to the same track with the UID {}.",
                        kept[index].spec(),
                        target.spec(),
                        track_uid,
                    );
                    log::warn!("{warning}");
                    self.warnings.push(warning);
                    kept[index].merge_changes(target);
                }
                None => {
                    by_track_uid.insert(track_uid, kept.len());
                    kept.push(target);
                }
            }
        }

        self.targets = kept;
    }

    /// Execute every target's changes in registry order, then prune the
    /// masters left empty. Only the in-memory tree is touched.
    ///
    /// # Errors
    ///
    /// The first target execution error.
    pub fn apply_changes(&mut self) -> Result<PruneReport, PropEditError> {
        for target in &mut self.targets {
            target.execute_change(&mut self.tree)?;
        }
        Ok(prune::prune_empty_masters(&mut self.tree, &self.targets))
    }

    /// Apply all changes and commit the modified top-level elements through
    /// the analyzer.
    ///
    /// # Errors
    ///
    /// Execution errors from [`apply_changes`](TargetRegistry::apply_changes)
    /// (file untouched) and commit failures from the analyzer.
    pub fn execute(&mut self, analyzer: &mut dyn Analyzer) -> Result<CommitSummary, PropEditError> {
        self.apply_changes()?;
        commit::write_changes(&self.tree, &self.targets, analyzer)
    }

    /// Deterministic snapshot of the options and targets for diagnostics.
    pub fn dump_info(&self) -> String {
        let mut out = format!(
            "options:\n  file_name:     {}\n  show_progress: {}\n  parse_mode:    {}\n",
            self.file_name.as_deref().unwrap_or_default(),
            self.show_progress,
            self.parse_mode,
        );
        for target in &self.targets {
            out.push_str(&target.dump_info());
        }
        out
    }

    /// [`dump_info`](TargetRegistry::dump_info) as machine-readable JSON.
    pub fn dump_json(&self) -> Value {
        let targets: Vec<Value> = self.targets.iter().map(Target::dump_json).collect();
        json!({
            "file_name": self.file_name,
            "show_progress": self.show_progress,
            "parse_mode": self.parse_mode.to_string(),
            "targets": targets,
        })
    }
}
