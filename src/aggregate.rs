//! Bottom-up monetary roll-up.
//!
//! Implemented as a pure post-order fold over the immutable tree shape: the
//! result is an [`AmountSheet`] keyed by node id, so the arithmetic is
//! testable without touching the tree. The final-two-groups flag never
//! changes the arithmetic, it only alters emission.

use tracing::debug;

use crate::model::{CostTree, NodeId, NodeKind};

/// Rolled-up contract and estimate amounts for every node of one tree.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountSheet {
    contract: Vec<f64>,
    estimate: Vec<f64>,
}

impl AmountSheet {
    /// Rolled contract amount of the node.
    pub fn contract(&self, id: NodeId) -> f64 {
        self.contract[id]
    }

    /// Rolled estimate amount of the node.
    pub fn estimate(&self, id: NodeId) -> f64 {
        self.estimate[id]
    }
}

/// Computes the roll-up, children before parents.
///
/// - Subcontract detail: estimate = quantity × unit price when both are
///   present, else 0; never a contract amount.
/// - Cost item: own contract amount (quantity × contract price when the row
///   supplies both, else 0) plus the children's contract amounts; estimate is
///   the plain sum over children.
/// - Root: sums its direct top-level children, whose amounts are already
///   rolled.
pub fn aggregate(tree: &CostTree) -> AmountSheet {
    let mut contract = vec![0.0; tree.len()];
    let mut estimate = vec![0.0; tree.len()];

    for id in tree.post_order() {
        let node = tree.node(id);
        match &node.kind {
            NodeKind::SubcontractDetail {
                quantity,
                unit_price,
                ..
            } => {
                estimate[id] = amount_of(*quantity, *unit_price);
            }
            NodeKind::CostItem { row } => {
                let own = amount_of(row.quantity, row.contract_unit_price);
                let (child_contract, child_estimate) = child_sums(node.children.as_slice(), &contract, &estimate);
                contract[id] = own + child_contract;
                estimate[id] = child_estimate;
            }
            NodeKind::ProjectRoot => {
                let (child_contract, child_estimate) = child_sums(node.children.as_slice(), &contract, &estimate);
                contract[id] = child_contract;
                estimate[id] = child_estimate;
            }
        }
    }

    debug!(
        contract_total = contract[tree.root()],
        estimate_total = estimate[tree.root()],
        "amounts rolled up"
    );
    AmountSheet { contract, estimate }
}

/// A missing quantity or price contributes 0 to sums; whether the blank is
/// rendered as empty instead of `0` is the emitter's concern.
fn amount_of(quantity: Option<f64>, price: Option<f64>) -> f64 {
    match (quantity, price) {
        (Some(quantity), Some(price)) => quantity * price,
        _ => 0.0,
    }
}

fn child_sums(children: &[NodeId], contract: &[f64], estimate: &[f64]) -> (f64, f64) {
    let contract_sum = children.iter().map(|&child| contract[child]).sum();
    let estimate_sum = children.iter().map(|&child| estimate[child]).sum();
    (contract_sum, estimate_sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RowWarning;
    use crate::model::CostRow;
    use crate::numerals::ChineseNumerals;
    use crate::policy;
    use crate::rows::SheetRows;
    use crate::tree;

    fn row(
        label: &str,
        quantity: Option<f64>,
        contract: Option<f64>,
        professional: Option<f64>,
        labor: Option<f64>,
    ) -> CostRow {
        CostRow {
            sequence_label: label.to_string(),
            item_name: format!("节点{label}"),
            cost_category: String::new(),
            unit: "m3".to_string(),
            quantity,
            contract_unit_price: contract,
            professional_sub_price: professional,
            labor_sub_price: labor,
        }
    }

    fn tree_of(rows: Vec<CostRow>) -> CostTree {
        let sheet = SheetRows {
            project_name: "示例项目".to_string(),
            rows,
        };
        let mut warnings: Vec<RowWarning> = Vec::new();
        tree::build(&sheet, &ChineseNumerals, &mut warnings)
    }

    fn three_level_rows() -> Vec<CostRow> {
        vec![
            row("1", None, None, None, None),
            row("1.1", None, None, None, None),
            row("1.1.1", Some(10.0), Some(100.0), Some(80.0), None),
            row("1.1.2", Some(20.0), Some(200.0), None, Some(150.0)),
            row("1.2", Some(30.0), Some(300.0), None, Some(250.0)),
            row("2", None, None, None, None),
            row("2.1", Some(40.0), Some(400.0), Some(350.0), None),
        ]
    }

    #[test]
    fn rolls_contract_amounts_through_three_levels() {
        let tree = tree_of(three_level_rows());
        let amounts = aggregate(&tree);
        let at = |code: &str| tree.lookup(code).unwrap();

        assert_eq!(amounts.contract(at("1.001.001")), 1000.0);
        assert_eq!(amounts.contract(at("1.001.002")), 4000.0);
        assert_eq!(amounts.contract(at("1.001")), 5000.0);
        assert_eq!(amounts.contract(at("1.002")), 9000.0);
        assert_eq!(amounts.contract(at("1")), 14000.0);
        assert_eq!(amounts.contract(at("2")), 16000.0);
        assert_eq!(amounts.contract(tree.root()), 30000.0);
    }

    #[test]
    fn estimates_come_from_subcontract_leaves() {
        let tree = tree_of(three_level_rows());
        let amounts = aggregate(&tree);
        let at = |code: &str| tree.lookup(code).unwrap();

        // Professional sub of 1.1.1 and labor subs of 1.1.2 / 1.2.
        assert_eq!(amounts.estimate(at("1.001.001.002")), 800.0);
        assert_eq!(amounts.estimate(at("1.001.002.001")), 3000.0);
        assert_eq!(amounts.estimate(at("1.002.001")), 7500.0);
        assert_eq!(amounts.estimate(at("1.001")), 3800.0);
        assert_eq!(amounts.estimate(at("1")), 11300.0);
        assert_eq!(amounts.estimate(at("2")), 14000.0);
        assert_eq!(amounts.estimate(tree.root()), 25300.0);
        // Subcontract leaves never carry contract amounts.
        assert_eq!(amounts.contract(at("1.002.001")), 0.0);
    }

    #[test]
    fn missing_quantity_or_price_contributes_zero() {
        let tree = tree_of(vec![
            row("1", None, None, None, None),
            row("1.1", None, Some(100.0), None, None),
            row("1.2", Some(5.0), None, None, None),
            row("1.3", Some(2.0), Some(50.0), None, None),
        ]);
        let amounts = aggregate(&tree);
        let at = |code: &str| tree.lookup(code).unwrap();

        assert_eq!(amounts.contract(at("1.001")), 0.0);
        assert_eq!(amounts.contract(at("1.002")), 0.0);
        assert_eq!(amounts.contract(at("1")), 100.0);
    }

    #[test]
    fn final_two_flag_does_not_change_arithmetic() {
        let unmarked = tree_of(three_level_rows());
        let baseline = aggregate(&unmarked);

        let mut marked = tree_of(three_level_rows());
        policy::mark_final_two_groups(&mut marked);
        let flagged = aggregate(&marked);

        assert_eq!(baseline, flagged);
    }
}
