use std::collections::BTreeMap;

use tracing::warn;

use crate::domain::entities::header::NodeId;

/// Per-row map from active RowProperty to the row-header values bound in that
/// row. Values are a list: overlapping merges can legitimately bind more than
/// one value to the same property in one row. Entries are append-only while
/// the row (and its vertical extensions) are scanned, then treated as final.
#[derive(Debug, Default)]
pub struct RowDimensions {
    rows: BTreeMap<u32, BTreeMap<NodeId, Vec<NodeId>>>,
}

impl RowDimensions {
    /// Appends `value` under `property` for every row in
    /// `[row, row + row_span)`, clamped to the sheet height.
    pub fn bind(&mut self, row: u32, row_span: u32, row_count: u32, property: NodeId, value: NodeId) {
        let end = row.saturating_add(row_span).min(row_count.max(row + 1));
        for covered in row..end {
            let values = self
                .rows
                .entry(covered)
                .or_default()
                .entry(property)
                .or_default();
            if !values.is_empty() && !values.contains(&value) {
                // Kept multi-valued on purpose; flag it so curators can decide
                // whether the overlap is intended.
                warn!(row = covered, "row property bound to more than one distinct value");
            }
            values.push(value);
        }
    }

    /// Copy-down ("id.") support: copies the previous row's value list for
    /// `property` into `[row, row + row_span)`. Returns false when there is
    /// nothing above to copy, in which case nothing is recorded.
    pub fn copy_down(&mut self, row: u32, row_span: u32, row_count: u32, property: NodeId) -> bool {
        let Some(above) = row.checked_sub(1) else {
            return false;
        };
        let inherited = match self.rows.get(&above).and_then(|props| props.get(&property)) {
            Some(values) if !values.is_empty() => values.clone(),
            _ => return false,
        };
        // Replaying an inherited list is not a new overlap; only `bind` flags
        // multi-valued properties.
        let end = row.saturating_add(row_span).min(row_count.max(row + 1));
        for covered in row..end {
            self.rows
                .entry(covered)
                .or_default()
                .entry(property)
                .or_default()
                .extend(inherited.iter().copied());
        }
        true
    }

    /// All row-header values active in `row`, across every property, in
    /// deterministic property order.
    pub fn values_in_row(&self, row: u32) -> impl Iterator<Item = NodeId> + '_ {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|props| props.values())
            .flatten()
            .copied()
    }
}
