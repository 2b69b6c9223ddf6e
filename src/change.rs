//! Queued property changes.
//!
//! A [`Change`] is parsed from a `name=value` (set/add) or `name` (delete)
//! string against a [`Section`]'s property table. Executing it mutates the
//! in-memory [`ElementTree`] only and records the nested masters it walked
//! through so the pruner can later remove the ones left empty.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::element::{Element, ScalarValue};
use crate::error::PropEditError;
use crate::property::{PropertyDefinition, Section};
use crate::tree::{ElementTree, NodeId};

/// What a [`Change`] does to its property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Overwrite every existing instance, or add one if there is none.
    Set,
    /// Append a new instance.
    Add,
    /// Remove every instance.
    Delete,
}

impl Display for ChangeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            ChangeKind::Set => "set",
            ChangeKind::Add => "add",
            ChangeKind::Delete => "delete",
        })
    }
}

/// One queued change of a property.
#[derive(Debug, Clone)]
pub struct Change {
    pub kind: ChangeKind,
    /// The change as given by the user.
    pub spec: String,
    pub property: &'static PropertyDefinition,
    /// Parsed value; `None` for deletions.
    pub value: Option<ScalarValue>,
    /// Sub-sub-master touched during execution, e.g. `Colour`.
    pub sub_sub_master: Option<NodeId>,
    /// Sub-sub-sub-master touched during execution, e.g. `MasteringMetadata`.
    pub sub_sub_sub_master: Option<NodeId>,
}

impl Change {
    /// Parse a change for the given section.
    ///
    /// # Errors
    ///
    /// [`PropEditError::InvalidChange`] for malformed specs,
    /// [`PropEditError::UnknownProperty`] and
    /// [`PropEditError::InvalidPropertyValue`] from the property lookup.
    pub fn parse(kind: ChangeKind, spec: &str, section: Section) -> Result<Self, PropEditError> {
        let invalid = |reason: &str| PropEditError::InvalidChange {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let (name, raw_value) = match (kind, spec.split_once('=')) {
            (ChangeKind::Delete, None) => (spec, None),
            (ChangeKind::Delete, Some(_)) => return Err(invalid("a deletion takes no value")),
            (_, Some((name, value))) => (name, Some(value)),
            (_, None) => return Err(invalid("the format is 'name=value'")),
        };

        if name.trim().is_empty() {
            return Err(invalid("the property name is missing"));
        }

        let property = section.lookup(name)?;
        let value = raw_value
            .map(|raw| property.parse_value(raw))
            .transpose()?;

        Ok(Self {
            kind,
            spec: spec.to_string(),
            property,
            value,
            sub_sub_master: None,
            sub_sub_sub_master: None,
        })
    }

    /// Apply the change below `master` (the target's own master) and
    /// `sub_master` (its type-specific master, if any).
    ///
    /// Returns `true` if the tree was altered. Setting a property to the
    /// value it already has is not an alteration.
    pub fn execute(&mut self, tree: &mut ElementTree, master: NodeId, sub_master: Option<NodeId>) -> bool {
        let mut container = match (self.property.sub_master, sub_master) {
            (None, _) => master,
            (Some(_), Some(sub_master)) => sub_master,
            (Some(_), None) => {
                debug_assert!(false, "property '{}' needs a sub-master", self.property.name);
                return false;
            }
        };

        if let Some(id) = self.property.sub_sub_master {
            container = tree.find_or_create_master(container, id);
            self.sub_sub_master = Some(container);
        }

        if let Some(id) = self.property.sub_sub_sub_master {
            container = tree.find_or_create_master(container, id);
            self.sub_sub_sub_master = Some(container);
        }

        let id = self.property.id;
        match (self.kind, &self.value) {
            (ChangeKind::Delete, _) => tree.remove_children_with_id(container, id) > 0,
            (ChangeKind::Add, Some(value)) => {
                tree.append_child(container, Element::scalar(id, value.clone()));
                true
            }
            (ChangeKind::Set, Some(value)) => tree.set_child_value(container, id, value.clone()),
            (_, None) => false,
        }
    }
}

impl Display for Change {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.value {
            Some(value) => write!(f, "{} {} = {}", self.kind, self.property.name, value),
            None => write!(f, "{} {}", self.kind, self.property.name),
        }
    }
}
