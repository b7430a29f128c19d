//! Pre-order flattening of the aggregated tree back into output rows,
//! honoring the final-two-groups suppression policy, plus the decimal
//! rendering shared by every numeric output field.

use tracing::debug;

use crate::aggregate::AmountSheet;
use crate::codes;
use crate::model::{CostRow, CostTree, NodeKind, OutputRow, SubcontractKind, TreeNode};

/// Flattens the tree into the final output rows.
///
/// Every cost item becomes one placeholder row. Every subcontract detail
/// becomes one detail row unless its subtree is flagged as part of the final
/// two groups; the suppressed money is already folded into the parent's
/// rolled estimate, so nothing is double-reported. The project-summary row
/// leads, and the whole list is re-sorted by the numeric code comparator.
pub fn emit(tree: &CostTree, amounts: &AmountSheet) -> Vec<OutputRow> {
    let mut rows = vec![summary_row(tree, amounts)];

    for id in tree.pre_order() {
        let node = tree.node(id);
        match &node.kind {
            NodeKind::ProjectRoot => {}
            NodeKind::CostItem { row } => {
                rows.push(placeholder_row(node, row, amounts.contract(id), amounts.estimate(id)));
            }
            NodeKind::SubcontractDetail {
                kind,
                quantity,
                unit_price,
                unit,
            } => {
                if !node.in_final_two_groups {
                    rows.push(detail_row(
                        node,
                        *kind,
                        *quantity,
                        *unit_price,
                        unit,
                        amounts.estimate(id),
                    ));
                }
            }
        }
    }

    rows.sort_by(|lhs, rhs| codes::compare_codes(&lhs.item_code, &rhs.item_code));
    debug!(row_count = rows.len(), "output rows emitted");
    rows
}

/// Project-summary row for the root: name and rolled amounts only.
fn summary_row(tree: &CostTree, amounts: &AmountSheet) -> OutputRow {
    let root = tree.root();
    let node = tree.node(root);
    let mut row = identity_row(node);
    let estimate = amounts.estimate(root);
    if estimate > 0.0 {
        row.estimate_amount = format_decimal(Some(estimate));
    }
    let contract = amounts.contract(root);
    if contract > 0.0 {
        row.contract_amount = format_decimal(Some(contract));
    }
    row
}

/// Placeholder row of a row-backed node.
///
/// When subcontract detail rows will follow (not suppressed), the category
/// and unit move onto those detail rows and stay blank here. Contract
/// quantity/price only render when the source row supplied both; the amount
/// shown next to them is the rolled contract amount.
fn placeholder_row(node: &TreeNode, source: &CostRow, contract: f64, estimate: f64) -> OutputRow {
    let itemized_subcontract = node.has_subcontract && !node.in_final_two_groups;

    let mut row = identity_row(node);
    if !itemized_subcontract {
        row.cost_category = source.cost_category.clone();
        row.unit = source.unit.clone();
    }

    if source.quantity.is_some() && source.contract_unit_price.is_some() {
        row.contract_quantity = format_decimal(source.quantity);
        row.contract_unit_price = format_decimal(source.contract_unit_price);
        row.contract_amount = format_decimal(Some(contract));
    }

    if !node.has_subcontract {
        if estimate > 0.0 {
            row.estimate_amount = format_decimal(Some(estimate));
        }
        if contract > 0.0 {
            row.contract_amount = format_decimal(Some(contract));
        }
    }

    row
}

/// Detail row of a synthetic subcontract leaf: estimate quantity, unit
/// price, and amount; contract columns stay empty.
fn detail_row(
    node: &TreeNode,
    kind: SubcontractKind,
    quantity: Option<f64>,
    unit_price: Option<f64>,
    unit: &str,
    estimate: f64,
) -> OutputRow {
    let mut row = identity_row(node);
    row.cost_category = kind.category().to_string();
    row.estimate_quantity = format_decimal(quantity);
    row.estimate_unit_price = format_decimal(unit_price);
    row.estimate_amount = format_decimal(Some(estimate));
    row.unit = unit.to_string();
    row
}

fn identity_row(node: &TreeNode) -> OutputRow {
    OutputRow {
        item_code: node.code.clone(),
        hierarchy_code: node.code.clone(),
        item_name: node.name.clone(),
        ..OutputRow::default()
    }
}

/// Renders a number as a decimal string rounded to 3 places with trailing
/// zeros (and a dangling dot) trimmed. Absent values render as the empty
/// string; a true zero renders `0`.
pub fn format_decimal(value: Option<f64>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    if value.is_nan() {
        return String::new();
    }

    let rounded = (value * 1000.0).round() / 1000.0;
    let mut text = format!("{rounded:.3}");
    while text.contains('.') && (text.ends_with('0') || text.ends_with('.')) {
        text.pop();
    }
    if text.is_empty() || text == "-0" {
        "0".to_string()
    } else {
        text
    }
}
