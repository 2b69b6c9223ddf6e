//! Removal of masters left empty by executed changes.
//!
//! Executing a track target may create masters it never fills (the
//! type-specific `Video`/`Audio` master, `Colour`, `MasteringMetadata`) or
//! delete the last meaningful child of an existing one. Such masters are
//! detached from their parent before commit so the file carries no empty
//! shells. Each master is examined at most once, however many changes or
//! targets share it.

use std::collections::HashSet;

use crate::target::Target;
use crate::tree::{ElementTree, NodeId};

/// What a pruning pass looked at and removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Masters examined, in examination order.
    pub examined: Vec<NodeId>,
    /// Masters detached from their parent.
    pub removed: Vec<NodeId>,
}

impl PruneReport {
    /// How often `node` was examined; never more than once.
    pub fn examination_count(&self, node: NodeId) -> usize {
        self.examined.iter().filter(|examined| **examined == node).count()
    }
}

struct Pruner<'a> {
    tree: &'a mut ElementTree,
    handled: HashSet<NodeId>,
    report: PruneReport,
}

impl Pruner<'_> {
    fn remove_if_empty_or_only_defaults(&mut self, parent: Option<NodeId>, child: Option<NodeId>) {
        let (Some(parent), Some(child)) = (parent, child) else {
            return;
        };
        if !self.handled.insert(child) {
            return;
        }

        self.report.examined.push(child);
        if self.tree.is_empty_or_only_defaults(child) && self.tree.remove_child(parent, child) {
            log::debug!("Removing empty master {child:?}");
            self.report.removed.push(child);
        }
    }
}

/// Prune empty or default-only masters touched by the track targets,
/// deepest level first.
pub fn prune_empty_masters(tree: &mut ElementTree, targets: &[Target]) -> PruneReport {
    let mut pruner = Pruner { tree, handled: HashSet::new(), report: PruneReport::default() };

    for target in targets.iter().filter(|target| target.is_track()) {
        let (master, sub_master) = target.masters();

        // Level by level: a master is examined only after every master below it.
        for change in target.changes() {
            pruner.remove_if_empty_or_only_defaults(change.sub_sub_master, change.sub_sub_sub_master);
        }
        for change in target.changes() {
            pruner.remove_if_empty_or_only_defaults(sub_master, change.sub_sub_master);
        }

        pruner.remove_if_empty_or_only_defaults(master, sub_master);
        pruner.remove_if_empty_or_only_defaults(target.level1_element(), master);
    }

    pruner.report
}
