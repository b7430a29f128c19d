use std::collections::HashMap;

/// A single spreadsheet cell after the reader has erased the calamine types.
/// Only the distinction between text, numbers, and blanks matters to the
/// pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    /// Returns the textual rendering of the cell, empty for blanks.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(value) => value.clone(),
            CellValue::Number(value) => value.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

/// One normalized source row. Numeric fields stay `None` when the cell was
/// blank or unparsable; a missing value must not collapse to zero before
/// aggregation decides how to treat it.
#[derive(Debug, Clone, PartialEq)]
pub struct CostRow {
    pub sequence_label: String,
    pub item_name: String,
    pub cost_category: String,
    pub unit: String,
    pub quantity: Option<f64>,
    pub contract_unit_price: Option<f64>,
    pub professional_sub_price: Option<f64>,
    pub labor_sub_price: Option<f64>,
}

/// The two synthetic subcontract breakdowns a cost item can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubcontractKind {
    Labor,
    Professional,
}

impl SubcontractKind {
    /// Fixed code suffix: labor always takes `001`, professional `002`,
    /// even when only one of the two exists.
    pub fn suffix(self) -> &'static str {
        match self {
            SubcontractKind::Labor => "001",
            SubcontractKind::Professional => "002",
        }
    }

    /// Cost-subject category code carried by the detail row.
    pub fn category(self) -> &'static str {
        match self {
            SubcontractKind::Labor => "0001",
            SubcontractKind::Professional => "0002",
        }
    }

    /// Display label appended to the parent item name.
    pub fn label(self) -> &'static str {
        match self {
            SubcontractKind::Labor => "劳务分包",
            SubcontractKind::Professional => "专业分包",
        }
    }
}

/// Payload of a tree node. Row-backed items, synthetic subcontract details,
/// and the project root carry different data, so they are separate variants
/// instead of one struct full of nullable fields.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// The whole project; code `0`, named by the discovered title row.
    ProjectRoot,
    /// A node backed by a source spreadsheet row.
    CostItem { row: CostRow },
    /// Synthetic leaf itemizing a subcontracted cost. Inherits quantity and
    /// unit from its parent item.
    SubcontractDetail {
        kind: SubcontractKind,
        quantity: Option<f64>,
        unit_price: Option<f64>,
        unit: String,
    },
}

/// Index of a node inside the arena.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub code: String,
    pub name: String,
    pub level: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
    /// True when a nonzero professional or labor price was declared on the
    /// backing row.
    pub has_subcontract: bool,
    /// True when this node sits under one of the two numerically-largest
    /// top-level groups. Set once by the policy pass, never revised.
    pub in_final_two_groups: bool,
}

/// Arena-backed cost tree. Nodes live in a flat vector and reference each
/// other by index, so traversals run on an explicit stack instead of
/// recursing through pathological depths. The code index is scoped to the
/// tree instance, one per conversion call.
#[derive(Debug)]
pub struct CostTree {
    nodes: Vec<TreeNode>,
    index: HashMap<String, NodeId>,
}

/// Code assigned to the project root node.
pub const ROOT_CODE: &str = "0";

impl CostTree {
    /// Creates a tree holding only the project root.
    pub fn new(project_name: impl Into<String>) -> Self {
        let root = TreeNode {
            code: ROOT_CODE.to_string(),
            name: project_name.into(),
            level: 0,
            parent: None,
            children: Vec::new(),
            kind: NodeKind::ProjectRoot,
            has_subcontract: false,
            in_final_two_groups: false,
        };
        let mut index = HashMap::new();
        index.insert(ROOT_CODE.to_string(), 0);
        Self {
            nodes: vec![root],
            index,
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id]
    }

    /// Resolves a canonical code to its node, if registered.
    pub fn lookup(&self, code: &str) -> Option<NodeId> {
        self.index.get(code).copied()
    }

    /// Registers a node under the given parent and returns its id.
    pub fn attach(&mut self, parent: NodeId, mut node: TreeNode) -> NodeId {
        let id = self.nodes.len();
        node.parent = Some(parent);
        self.index.insert(node.code.clone(), id);
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        id
    }

    /// Sorts every node's child list with the provided comparator.
    pub fn sort_children_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&TreeNode, &TreeNode) -> std::cmp::Ordering,
    {
        for id in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[id].children);
            children.sort_by(|&lhs, &rhs| compare(&self.nodes[lhs], &self.nodes[rhs]));
            self.nodes[id].children = children;
        }
    }

    /// Pre-order traversal (parents before children), root first.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            for &child in self.nodes[id].children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// Post-order traversal (children before parents), root last.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut order = self.pre_order();
        order.reverse();
        order
    }
}

/// One emitted output row. Every field is already rendered: numbers as
/// trimmed decimal strings, absent values as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRow {
    pub item_code: String,
    pub hierarchy_code: String,
    pub item_name: String,
    pub cost_category: String,
    pub estimate_quantity: String,
    pub estimate_unit_price: String,
    pub estimate_amount: String,
    pub unit: String,
    pub contract_quantity: String,
    pub contract_unit_price: String,
    pub contract_amount: String,
}

impl OutputRow {
    /// Cells in workbook column order.
    pub fn cells(&self) -> [&str; 11] {
        [
            &self.item_code,
            &self.hierarchy_code,
            &self.item_name,
            &self.cost_category,
            &self.estimate_quantity,
            &self.estimate_unit_price,
            &self.estimate_amount,
            &self.unit,
            &self.contract_quantity,
            &self.contract_unit_price,
            &self.contract_amount,
        ]
    }
}

/// Header labels of the output worksheet, in column order.
pub const OUTPUT_HEADERS: [&str; 11] = [
    "清单项编码",
    "层级编码",
    "清单项名称",
    "成本科目编码",
    "测算数量",
    "测算单价",
    "测算金额无税",
    "单位",
    "合同造价数量",
    "合同造价单价",
    "合同造价无税金额",
];

/// Column widths carried through to the writer as opaque style hints.
pub const OUTPUT_COLUMN_WIDTHS: [f64; 11] = [
    15.0, 15.0, 40.0, 12.0, 12.0, 12.0, 15.0, 8.0, 12.0, 12.0, 15.0,
];

/// Name of the worksheet the converted rows are written to.
pub const OUTPUT_SHEET_NAME: &str = "转换结果";
