//! The edit lifecycle of one invocation.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

use crate::analyzer::{Analyzer, OpenMode};
use crate::commit::CommitSummary;
use crate::error::PropEditError;
use crate::registry::TargetRegistry;

/// Result of a successful [`run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Per-element commit outcomes.
    pub summary: CommitSummary,
    /// Warnings collected while binding, e.g. merged duplicate targets.
    pub warnings: Vec<String>,
}

impl RunOutcome {
    /// `true` if the file was written to.
    pub fn modified(&self) -> bool {
        self.summary.any_written()
    }
}

impl Display for RunOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.summary, f)
    }
}

/// Edit the registry's file: probe and scan it, bind and validate the
/// targets, apply their changes and commit the modified top-level elements.
///
/// Every error raised before the commit phase leaves the file untouched.
///
/// # Errors
///
/// - [`PropEditError::NoFileName`] / [`PropEditError::NoChanges`] before
///   the file is touched
/// - [`PropEditError::NotAContainer`] if the probe rejects the file
/// - [`PropEditError::FileAccess`] / [`PropEditError::Unparsable`] if the
///   scan fails
/// - binding, validation and execution errors from the registry
/// - [`PropEditError::UpdateFailed`] from the commit
pub fn run(registry: &mut TargetRegistry, analyzer: &mut dyn Analyzer) -> Result<RunOutcome, PropEditError> {
    registry.validate_options()?;
    let file_name = registry.file_name().unwrap_or_default().to_string();

    if !analyzer.probe(Path::new(&file_name)) {
        return Err(PropEditError::NotAContainer { path: file_name });
    }

    log::info!("The file is being analyzed.");

    analyzer.set_show_progress(registry.show_progress());
    analyzer.set_parse_mode(registry.parse_mode());
    analyzer.set_open_mode(OpenMode::Write);
    analyzer.set_throw_on_error(true);

    match analyzer.process() {
        Ok(true) => {}
        Ok(false) => return Err(PropEditError::Unparsable),
        Err(err) => {
            return Err(PropEditError::FileAccess { path: file_name, reason: err.to_string() });
        }
    }

    registry.find_elements(analyzer)?;
    registry.validate()?;
    log::debug!("{}", registry.dump_info());

    let summary = registry.execute(analyzer)?;
    log::info!("{summary}");

    Ok(RunOutcome { summary, warnings: registry.warnings().to_vec() })
}
