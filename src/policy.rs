//! The "final two top-level groups are summarized, not itemized" policy.
//!
//! The two top-level groups with the numerically largest codes keep their
//! rolled-up amounts but have their subcontract detail rows suppressed at
//! emission. The flag is keyed on code order alone, never on group size.

use tracing::debug;

use crate::codes;
use crate::model::{CostTree, NodeId};

/// Marks the two numerically-largest top-level groups and every descendant,
/// synthetic subcontract nodes included. Marks nothing when fewer than two
/// top-level groups exist. One-time mutation, applied before aggregation.
pub fn mark_final_two_groups(tree: &mut CostTree) {
    let mut top_level: Vec<NodeId> = tree.node(tree.root()).children.clone();
    top_level.sort_by(|&lhs, &rhs| {
        codes::compare_codes(&tree.node(lhs).code, &tree.node(rhs).code)
    });

    if top_level.len() < 2 {
        return;
    }

    for &group in &top_level[top_level.len() - 2..] {
        debug!(code = %tree.node(group).code, "summarized top-level group");
        let mut stack = vec![group];
        while let Some(id) = stack.pop() {
            tree.node_mut(id).in_final_two_groups = true;
            stack.extend(tree.node(id).children.iter().copied());
        }
    }
}
