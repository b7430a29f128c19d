//! Tree construction: canonical codes to arena nodes, parent inference from
//! code structure alone, and injection of synthetic subcontract children.

use tracing::{debug, warn};

use crate::codes;
use crate::error::RowWarning;
use crate::model::{CostRow, CostTree, NodeId, NodeKind, ROOT_CODE, SubcontractKind, TreeNode};
use crate::numerals::NumeralDecoder;
use crate::rows::SheetRows;

/// Builds the cost tree from the normalized rows.
///
/// Rows are processed in sheet order. A row whose label fails normalization,
/// repeats an already-registered code, or names a parent that was never
/// registered is dropped with a [`RowWarning`]; nothing row-level is fatal.
/// After all rows are attached, every child list is sorted by the numeric
/// code comparator.
pub fn build(
    sheet: &SheetRows,
    decoder: &dyn NumeralDecoder,
    warnings: &mut Vec<RowWarning>,
) -> CostTree {
    let mut tree = CostTree::new(sheet.project_name.clone());

    for row in &sheet.rows {
        let label = row.sequence_label.as_str();

        // The title row and the column-header marker pair never become nodes.
        if label == "一" {
            continue;
        }
        if label == "1" && row.item_name == "2" {
            continue;
        }

        let Some(code) = codes::normalize(label, decoder) else {
            warn!(label, "sequence label failed normalization");
            warnings.push(RowWarning::InvalidCode {
                label: label.to_string(),
            });
            continue;
        };

        if tree.lookup(&code).is_some() {
            warn!(code = %code, "duplicate sequence code");
            warnings.push(RowWarning::DuplicateCode { code });
            continue;
        }

        let parent_code = parent_code(&code);
        let Some(parent) = tree.lookup(&parent_code) else {
            warn!(code = %code, parent = %parent_code, "parent not registered");
            warnings.push(RowWarning::OrphanedParent {
                code,
                parent: parent_code,
            });
            continue;
        };

        attach_row(&mut tree, parent, code, row);
    }

    tree.sort_children_by(|lhs, rhs| codes::compare_codes(&lhs.code, &rhs.code));
    debug!(node_count = tree.len(), "cost tree built");
    tree
}

/// Parent of a canonical code: the code with its last dotted segment
/// dropped, or the root for single-segment codes.
fn parent_code(code: &str) -> String {
    match code.rfind('.') {
        Some(split) => code[..split].to_string(),
        None => ROOT_CODE.to_string(),
    }
}

fn attach_row(tree: &mut CostTree, parent: NodeId, code: String, row: &CostRow) {
    let has_labor = is_nonzero(row.labor_sub_price);
    let has_professional = is_nonzero(row.professional_sub_price);
    let level = code.split('.').count();

    let node = tree.attach(
        parent,
        TreeNode {
            code,
            name: row.item_name.clone(),
            level,
            parent: None,
            children: Vec::new(),
            kind: NodeKind::CostItem { row: row.clone() },
            has_subcontract: has_labor || has_professional,
            in_final_two_groups: false,
        },
    );

    if has_labor {
        attach_subcontract(tree, node, SubcontractKind::Labor, row.labor_sub_price);
    }
    if has_professional {
        attach_subcontract(
            tree,
            node,
            SubcontractKind::Professional,
            row.professional_sub_price,
        );
    }
}

/// Synthesizes the leaf itemizing one subcontracted cost. Quantity and unit
/// come from the parent row, the unit price is the declared subcontract
/// price.
fn attach_subcontract(
    tree: &mut CostTree,
    parent: NodeId,
    kind: SubcontractKind,
    unit_price: Option<f64>,
) {
    let (code, name, level, quantity, unit) = {
        let parent_node = tree.node(parent);
        let NodeKind::CostItem { row } = &parent_node.kind else {
            return;
        };
        (
            format!("{}.{}", parent_node.code, kind.suffix()),
            format!("{}：{}", parent_node.name, kind.label()),
            parent_node.level + 1,
            row.quantity,
            row.unit.clone(),
        )
    };

    tree.attach(
        parent,
        TreeNode {
            code,
            name,
            level,
            parent: None,
            children: Vec::new(),
            kind: NodeKind::SubcontractDetail {
                kind,
                quantity,
                unit_price,
                unit,
            },
            has_subcontract: false,
            in_final_two_groups: false,
        },
    );
}

fn is_nonzero(value: Option<f64>) -> bool {
    matches!(value, Some(price) if price != 0.0)
}
