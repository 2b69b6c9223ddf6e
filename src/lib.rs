//! # propedit
//!
//! Edit the header properties of Matroska files in place: segment
//! information, track headers and attachments, without remuxing.
//!
//! `propedit` is the orchestration layer. It parses edit specifications into
//! targets, binds them to the file's top-level elements, applies the queued
//! changes to an in-memory element tree, prunes masters left empty and hands
//! every modified element back to an [`Analyzer`] for the byte-level rewrite.
//!
//! ## Quick Start
//!
//! ### Edit track and segment properties
//!
//! ```no_run
//! use propedit::{Analyzer, ChangeKind, TargetRegistry};
//!
//! fn edit(analyzer: &mut dyn Analyzer) -> Result<(), propedit::PropEditError> {
//!     let mut registry = TargetRegistry::new();
//!     registry.set_file_name("movie.mkv")?;
//!     registry
//!         .add_track_or_segmentinfo_target("info")?
//!         .add_change(ChangeKind::Set, "title=My Movie")?;
//!     registry
//!         .add_track_or_segmentinfo_target("track:a1")?
//!         .add_change(ChangeKind::Set, "language=ger")?
//!         .add_change(ChangeKind::Delete, "name")?;
//!     registry.options_parsed(0);
//!
//!     let outcome = propedit::run(&mut registry, analyzer)?;
//!     println!("{outcome}");
//!     Ok(())
//! }
//! ```
//!
//! ### Manage attachments
//!
//! ```no_run
//! use propedit::{AttachmentCommand, AttachmentSelector, TargetRegistry};
//!
//! let mut registry = TargetRegistry::new();
//! registry.set_file_name("movie.mkv")?;
//! registry.add_attachment_target(AttachmentCommand::Delete(
//!     AttachmentSelector::parse("mime-type:font/ttf")?,
//! ));
//! # Ok::<(), propedit::PropEditError>(())
//! ```
//!
//! ## Features
//!
//! - **Target selectors**: `info`, `track:N`, `track:@N`, `track:=UID`,
//!   `track:vN`/`aN`/`sN`/`bN`
//! - **Set, add and delete** of segment info, track, video, colour,
//!   mastering metadata and audio properties
//! - **Attachments**: add, delete and update by position, UID, name or
//!   MIME type
//! - **Duplicate merging** of selectors that resolve to the same track
//! - **No-op detection**: unchanged elements are never rewritten
//! - **Empty master pruning** and removal of emptied top-level elements
//! - **Fixed commit order** (segment info, tracks, tags, chapters,
//!   attachments) with literal failure diagnostics
//!
//! ## Logging
//!
//! Progress and diagnostics go through the [`log`](https://crates.io/crates/log)
//! facade. Install any logger to see them.

pub mod analyzer;
pub mod change;
pub mod commit;
pub mod element;
pub mod error;
pub mod lifecycle;
pub mod property;
pub mod prune;
pub mod registry;
pub mod schema;
pub mod target;
pub mod tree;

pub use analyzer::{Analyzer, OpenMode, ParseMode, UpdateResult};
pub use change::{Change, ChangeKind};
pub use commit::{COMMIT_ORDER, CommitOutcome, CommitSummary};
pub use element::{Element, ElementBody, ScalarValue};
pub use error::{PropEditError, UpdateFailure};
pub use lifecycle::{RunOutcome, run};
pub use property::{PropertyDefinition, PropertyKind, Section, SubMaster};
pub use prune::PruneReport;
pub use registry::TargetRegistry;
pub use target::{
    AttachmentCommand, AttachmentSelector, AttachmentUpdate, NewAttachment, Target, TargetKind,
    TrackSelector,
};
pub use tree::{ElementTree, NodeId};
