use std::collections::BTreeMap;

use crate::domain::entities::header::NodeId;

/// Per-column stacks of active column-header nodes, most specific last.
/// Mutated only by ColumnHeader cells in that column; horizontally spanned
/// headers push the same node id onto every covered column.
#[derive(Debug, Default)]
pub struct ColumnStacks {
    stacks: BTreeMap<u32, Vec<NodeId>>,
}

impl ColumnStacks {
    /// Pushes `node` onto every column in `[col, col + col_span)`, clamped to
    /// the sheet width. The same id lands on each covered column; span
    /// replication never clones. Columns already topped by `node` are left
    /// alone so a re-push from a merge-covered cell cannot stack duplicates.
    pub fn push(&mut self, col: u32, col_span: u32, col_count: u32, node: NodeId) {
        let end = col.saturating_add(col_span).min(col_count.max(col + 1));
        for covered in col..end {
            let stack = self.stacks.entry(covered).or_default();
            if stack.last() != Some(&node) {
                stack.push(node);
            }
        }
    }

    pub fn top(&self, col: u32) -> Option<NodeId> {
        self.stacks.get(&col).and_then(|stack| stack.last().copied())
    }

    pub fn stack(&self, col: u32) -> &[NodeId] {
        self.stacks.get(&col).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// The single currently active RowProperty node per column. A later property
/// cell in the same column replaces the earlier one.
#[derive(Debug, Default)]
pub struct RowProperties {
    active: BTreeMap<u32, NodeId>,
}

impl RowProperties {
    pub fn activate(&mut self, col: u32, col_span: u32, col_count: u32, node: NodeId) {
        let end = col.saturating_add(col_span).min(col_count.max(col + 1));
        for covered in col..end {
            self.active.insert(covered, node);
        }
    }

    pub fn active(&self, col: u32) -> Option<NodeId> {
        self.active.get(&col).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::header::{CellRef, NodeKind, SheetId};

    fn id(row: u32, col: u32, kind: NodeKind) -> NodeId {
        NodeId::new(CellRef::new(SheetId(0), row, col), kind)
    }

    #[test]
    fn spanned_push_replicates_the_same_id() {
        let mut stacks = ColumnStacks::default();
        let node = id(0, 1, NodeKind::ColumnHeader);
        stacks.push(1, 3, 10, node);
        assert_eq!(stacks.top(1), Some(node));
        assert_eq!(stacks.top(2), Some(node));
        assert_eq!(stacks.top(3), Some(node));
        assert_eq!(stacks.top(4), None);
    }

    #[test]
    fn re_pushing_the_topmost_id_leaves_the_stack_unchanged() {
        let mut stacks = ColumnStacks::default();
        let year = id(0, 1, NodeKind::ColumnHeader);
        stacks.push(1, 3, 10, year);
        // A merge-covered cell in column 2 re-pushes the anchor's node.
        stacks.push(2, 1, 10, year);
        assert_eq!(stacks.stack(2), &[year]);
        // A genuinely nested header still stacks on top.
        let quarter = id(1, 2, NodeKind::ColumnHeader);
        stacks.push(2, 1, 10, quarter);
        assert_eq!(stacks.stack(2), &[year, quarter]);
    }

    #[test]
    fn span_past_sheet_width_is_clamped() {
        let mut stacks = ColumnStacks::default();
        let node = id(0, 8, NodeKind::ColumnHeader);
        stacks.push(8, 5, 10, node);
        assert_eq!(stacks.top(8), Some(node));
        assert_eq!(stacks.top(9), Some(node));
        assert_eq!(stacks.top(10), None);
    }

    #[test]
    fn later_property_replaces_earlier_one() {
        let mut props = RowProperties::default();
        let city = id(0, 0, NodeKind::RowProperty);
        let province = id(5, 0, NodeKind::RowProperty);
        props.activate(0, 1, 4, city);
        assert_eq!(props.active(0), Some(city));
        props.activate(0, 2, 4, province);
        assert_eq!(props.active(0), Some(province));
        assert_eq!(props.active(1), Some(province));
    }
}
