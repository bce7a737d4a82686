use std::collections::BTreeMap;

/// Zero-based index of a sheet within its workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SheetId(pub u32);

impl From<u32> for SheetId {
    fn from(value: u32) -> Self {
        SheetId(value)
    }
}

/// Grid position of a cell within a workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub sheet: SheetId,
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(sheet: SheetId, row: u32, col: u32) -> CellRef {
        CellRef { sheet, row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    ColumnHeader,
    RowHeader,
    RowProperty,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::ColumnHeader => "column_header",
            NodeKind::RowHeader => "row_header",
            NodeKind::RowProperty => "row_property",
        }
    }
}

/// Identity of a header node: the cell it was minted from plus its kind.
/// Spanned positions reference the same id; replication never clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub cell: CellRef,
    pub kind: NodeKind,
}

impl NodeId {
    pub fn new(cell: CellRef, kind: NodeKind) -> NodeId {
        NodeId { cell, kind }
    }
}

/// Entity minted for a header-role cell. `parent` is populated only for
/// column headers (nesting tree); `bound_property` only for row headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderNode {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub bound_property: Option<NodeId>,
}

/// Per-sheet registry of minted header nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRegistry {
    nodes: BTreeMap<NodeId, HeaderNode>,
}

impl NodeRegistry {
    pub fn insert(&mut self, node: HeaderNode) {
        self.nodes.insert(node.id, node);
    }

    pub fn get(&self, id: NodeId) -> Option<&HeaderNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderNode> {
        self.nodes.values()
    }

    /// Labels from the given node up to its root, root first. Vertically
    /// merged header rows can record a node as its own parent; such a link is
    /// skipped so the walk always terminates.
    pub fn label_path(&self, id: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.nodes.get(&node_id) else {
                break;
            };
            path.push(node.label.clone());
            current = node.parent.filter(|parent| *parent != node_id);
        }
        path.reverse();
        path
    }
}
