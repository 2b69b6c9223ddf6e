//! The container analyzer interface.
//!
//! The analyzer scans a Matroska file's structure and performs the byte-level
//! reading, rewriting and removal of top-level elements. This crate only
//! drives it: every operation that needs the file receives an analyzer
//! explicitly as `&mut dyn Analyzer`, so tests can substitute a double that
//! records the requested commits.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Result as IoResult;
use std::path::Path;
use std::str::FromStr;

use crate::element::Element;
use crate::error::{PropEditError, UpdateFailure};

/// Outcome of a commit request.
pub type UpdateResult = Result<(), UpdateFailure>;

/// How thoroughly the analyzer scans the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Trust the existing meta seek index.
    #[default]
    Fast,
    /// Scan every top-level element.
    Full,
}

impl FromStr for ParseMode {
    type Err = PropEditError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "fast" => Ok(ParseMode::Fast),
            "full" => Ok(ParseMode::Full),
            other => Err(PropEditError::InvalidParseMode(other.to_string())),
        }
    }
}

impl Display for ParseMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            ParseMode::Fast => "fast",
            ParseMode::Full => "full",
        })
    }
}

/// How the analyzer opens the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    #[default]
    Read,
    Write,
}

/// Scanner and rewriter of a single container file.
pub trait Analyzer {
    /// Cheap structural check that `path` is a Matroska file.
    fn probe(&mut self, path: &Path) -> bool;

    fn set_parse_mode(&mut self, mode: ParseMode);

    fn set_open_mode(&mut self, mode: OpenMode);

    /// Report scan errors as `Err` from [`process`](Analyzer::process)
    /// instead of swallowing them.
    fn set_throw_on_error(&mut self, throw_on_error: bool);

    fn set_show_progress(&mut self, show_progress: bool);

    /// Run the structural scan. `Ok(false)` means the file could not be parsed.
    fn process(&mut self) -> IoResult<bool>;

    /// Index of the first top-level element with the given ID.
    fn find(&self, id: u32) -> Option<usize>;

    /// Read the top-level element at `index` with all its children.
    fn read_element(&mut self, index: usize) -> IoResult<Element>;

    /// Rewrite a top-level element in place, relocating it if it no longer fits.
    ///
    /// `write_defaults` forces serialization of children equal to their
    /// default value; `add_mandatory` synthesizes mandatory children missing
    /// from `element`.
    fn update_element(&mut self, element: &Element, write_defaults: bool, add_mandatory: bool) -> UpdateResult;

    /// Remove every top-level element with the given ID.
    fn remove_elements(&mut self, id: u32) -> UpdateResult;
}
