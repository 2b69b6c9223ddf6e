//! Error types for the `propedit` crate.
//!
//! This module defines [`PropEditError`], the unified error type returned by
//! all fallible operations in the crate, and [`UpdateFailure`], the kinds of
//! failure an [`Analyzer`](crate::Analyzer) can report while committing a
//! top-level element back to the file.
//!
//! Every message is the literal diagnostic shown to the user. Errors raised
//! before the commit phase never leave the file modified; commit failures
//! state whether bytes may already have been written.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Error as IoError;

use thiserror::Error;

/// The unified error type for all `propedit` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PropEditError {
    /// A track or segment info selector did not match any known form.
    #[error("Invalid track or segment info target spec: '{spec}'")]
    InvalidSpec {
        /// The selector as given by the user.
        spec: String,
    },

    /// An attachment command or selector could not be parsed.
    #[error("Invalid attachment spec: '{spec}'")]
    InvalidAttachmentSpec {
        /// The selector as given by the user.
        spec: String,
    },

    /// A `name=value` change could not be parsed.
    #[error("Invalid change spec '{spec}': {reason}")]
    InvalidChange {
        /// The change as given by the user.
        spec: String,
        /// Why the change was rejected.
        reason: String,
    },

    /// The property name is not editable in the addressed section.
    #[error("The property '{name}' is not known in the section '{section}'.")]
    UnknownProperty {
        /// Property name as given by the user.
        name: String,
        /// Human readable section name.
        section: &'static str,
    },

    /// The value could not be converted to the property's element type.
    #[error("The property value '{value}' for '{property}' is invalid: {reason}")]
    InvalidPropertyValue {
        /// Property name.
        property: &'static str,
        /// Value as given by the user.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A video or audio property was addressed to a track of another type.
    #[error(
        "The property '{property}' can only be used with {required} tracks, but the edit specification '{spec}' refers to a {actual} track."
    )]
    PropertyNotApplicable {
        /// Property name.
        property: &'static str,
        /// Selector of the offending target.
        spec: String,
        /// Track type the property requires.
        required: &'static str,
        /// Track type the selector resolved to.
        actual: &'static str,
    },

    /// The parse mode string was neither `fast` nor `full`.
    #[error("Unknown parse mode '{0}'. Valid modes are 'fast' and 'full'.")]
    InvalidParseMode(String),

    /// Two different file names were given.
    #[error("More than one file name has been given ('{existing}' and '{new}').")]
    DuplicateFileName {
        /// The file name set first.
        existing: String,
        /// The rejected second file name.
        new: String,
    },

    /// No file name was given.
    #[error("No file name given.")]
    NoFileName,

    /// No target carries any change.
    #[error("Nothing to do.")]
    NoChanges,

    /// A track selector did not resolve to a track in the file.
    #[error("No track corresponding to the edit specification '{spec}' was found. The file has not been modified.")]
    UnresolvedTrackSelector {
        /// Selector of the unresolved target.
        spec: String,
    },

    /// A target addresses a top-level section the file does not contain.
    #[error(
        "Modification of properties in the section '{section}' was requested, but no corresponding level 1 element was found in the file. The file has not been modified."
    )]
    MissingRequiredElement {
        /// Human readable section name.
        section: &'static str,
    },

    /// An attachment selector matched no attached file.
    #[error("No attachment matched the selector '{spec}'. The file has not been modified.")]
    NoMatchingAttachment {
        /// The attachment selector.
        spec: String,
    },

    /// A target was executed before it was bound to a top-level element.
    #[error("The edit specification '{spec}' was not bound to any element before execution.")]
    TargetNotBound {
        /// Selector of the unbound target.
        spec: String,
    },

    /// The analyzer's probe rejected the file.
    #[error("The file '{path}' is not a Matroska file or it could not be found.")]
    NotAContainer {
        /// Path of the rejected file.
        path: String,
    },

    /// The analyzer failed while opening or scanning the file.
    #[error(
        "The file '{path}' could not be opened for reading and writing, or a read/write operation on it failed: {reason}."
    )]
    FileAccess {
        /// Path of the file under edit.
        path: String,
        /// Underlying reason.
        reason: String,
    },

    /// The analyzer's structural scan completed without success.
    #[error("This file could not be opened or parsed.")]
    Unparsable,

    /// Writing a top-level element back to the file failed.
    #[error("Updating the '{element}' element failed. Reason: {failure}")]
    UpdateFailed {
        /// Name of the top-level element being written.
        element: &'static str,
        /// What went wrong.
        failure: UpdateFailure,
    },

    /// An I/O error reported by the analyzer while reading an element.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),
}

const ACCESS_HINT: &str = "Possible reasons are: the file is not a Matroska file; the file is write-protected; the file is locked by another process; you do not have permission to access the file.";

/// Failure kinds reported by [`Analyzer::update_element`](crate::Analyzer::update_element)
/// and [`Analyzer::remove_elements`](crate::Analyzer::remove_elements).
///
/// None of these are retried. Use [`file_modified`](UpdateFailure::file_modified)
/// to tell whether the file on disk may already have changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateFailure {
    /// The element was appended, but the segment size could not be fixed.
    SegmentSizeForElement,
    /// The meta seek element was appended, but the segment size could not be fixed.
    SegmentSizeForMetaSeek,
    /// The meta seek entry for the element could not be updated.
    MetaSeek,
    /// The file could not be reopened for reading.
    OpeningForReading,
    /// The file could not be reopened for writing.
    OpeningForWriting,
    /// The last element has an unknown size that cannot be repaired.
    FixingLastElementUnknownSizeFailed,
    /// Any other failure.
    Unknown,
}

impl UpdateFailure {
    /// Whether bytes may already have been written when this failure occurred.
    pub fn file_modified(self) -> bool {
        match self {
            UpdateFailure::SegmentSizeForElement
            | UpdateFailure::SegmentSizeForMetaSeek
            | UpdateFailure::MetaSeek
            | UpdateFailure::Unknown => true,
            UpdateFailure::OpeningForReading
            | UpdateFailure::OpeningForWriting
            | UpdateFailure::FixingLastElementUnknownSizeFailed => false,
        }
    }
}

impl Display for UpdateFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UpdateFailure::SegmentSizeForElement => f.write_str(
                "The element was written at the end of the file, but the segment size could not be updated. Therefore the element will not be visible. The process will be aborted. The file has been changed!",
            ),
            UpdateFailure::SegmentSizeForMetaSeek => f.write_str(
                "The meta seek element was written at the end of the file, but the segment size could not be updated. Therefore the element will not be visible. The process will be aborted. The file has been changed!",
            ),
            UpdateFailure::MetaSeek => f.write_str(
                "The Matroska file was modified, but the meta seek entry could not be updated. This means that players might have a hard time finding this element. Please use your favorite player to check this file.",
            ),
            UpdateFailure::OpeningForReading => {
                write!(f, "The file could not be opened for reading. {ACCESS_HINT}")
            }
            UpdateFailure::OpeningForWriting => {
                write!(f, "The file could not be opened for writing. {ACCESS_HINT}")
            }
            UpdateFailure::FixingLastElementUnknownSizeFailed => f.write_str(
                "The Matroska file's last element is set to an unknown size. Due to the particular structure of the file this situation cannot be fixed automatically. The file can be fixed by multiplexing it with mkvmerge again. The process will be aborted. The file has not been modified.",
            ),
            UpdateFailure::Unknown => {
                f.write_str("An unknown error occured. The file has been modified.")
            }
        }
    }
}
