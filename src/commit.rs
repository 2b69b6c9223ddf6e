//! Writing modified top-level elements back through the analyzer.
//!
//! Categories are committed in a fixed order (segment info, tracks, tags,
//! chapters, attachments) because the analyzer's structural fix-ups for a
//! later element rely on the earlier ones already being in place. A master
//! left without children is removed from the file instead of being written
//! as an empty shell. Any analyzer failure aborts the commit immediately.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::analyzer::Analyzer;
use crate::error::PropEditError;
use crate::schema::{self, ATTACHMENTS, CHAPTERS, INFO, TAGS, TRACKS};
use crate::target::Target;
use crate::tree::ElementTree;

/// Top-level element IDs in commit order.
pub const COMMIT_ORDER: [u32; 5] = [INFO, TRACKS, TAGS, CHAPTERS, ATTACHMENTS];

/// What happened to one top-level element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing bound to it was modified; it was skipped.
    Unchanged,
    /// Rewritten in place, possibly with a new size.
    Updated,
    /// Removed from the container entirely.
    Removed,
}

/// Per-element outcomes of a commit pass, in commit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub outcomes: Vec<(u32, CommitOutcome)>,
}

impl CommitSummary {
    /// `true` if at least one element was written or removed.
    pub fn any_written(&self) -> bool {
        self.outcomes
            .iter()
            .any(|(_, outcome)| *outcome != CommitOutcome::Unchanged)
    }

    /// Outcome for a top-level element ID, if a target was bound to it.
    pub fn outcome(&self, id: u32) -> Option<CommitOutcome> {
        self.outcomes
            .iter()
            .find(|(element, _)| *element == id)
            .map(|(_, outcome)| *outcome)
    }
}

impl Display for CommitSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.any_written() {
            f.write_str("The changes are written to the file.")
        } else {
            f.write_str("No changes were made.")
        }
    }
}

/// Commit every modified top-level element in [`COMMIT_ORDER`].
///
/// For each category the first target bound to it decides the write
/// policy; the category is skipped unless one of its targets modified the
/// element.
///
/// # Errors
///
/// [`PropEditError::UpdateFailed`] on the first analyzer failure. Check
/// [`UpdateFailure::file_modified`](crate::UpdateFailure::file_modified) to
/// learn whether the file was already changed.
pub fn write_changes(
    tree: &ElementTree,
    targets: &[Target],
    analyzer: &mut dyn Analyzer,
) -> Result<CommitSummary, PropEditError> {
    let mut summary = CommitSummary::default();

    for id in COMMIT_ORDER {
        let bound: Vec<&Target> = targets
            .iter()
            .filter(|target| {
                target
                    .level1_element()
                    .is_some_and(|element| tree.element_id(element) == id)
            })
            .collect();

        let Some(first) = bound.first() else {
            continue;
        };
        let Some(element) = first.level1_element() else {
            continue;
        };

        if !bound.iter().any(|target| target.content_modified()) {
            summary.outcomes.push((id, CommitOutcome::Unchanged));
            continue;
        }

        let name = schema::element_name(id);
        let (result, outcome) = if tree.child_count(element) > 0 {
            log::debug!("Element {name} is written.");
            let result = analyzer.update_element(
                &tree.to_element(element),
                first.write_elements_set_to_default_value(),
                first.add_mandatory_elements_if_missing(),
            );
            (result, CommitOutcome::Updated)
        } else {
            log::debug!("Element {name} is empty and removed.");
            (analyzer.remove_elements(id), CommitOutcome::Removed)
        };

        result.map_err(|failure| PropEditError::UpdateFailed { element: name, failure })?;
        summary.outcomes.push((id, outcome));
    }

    Ok(summary)
}
