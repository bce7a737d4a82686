use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::entities::header::{CellRef, NodeId, NodeRegistry, SheetId};

/// Curator note attached to a cell, with cleaned text. Orthogonal to the
/// cell's structural role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub cell: CellRef,
    pub text: String,
    pub author: Option<String>,
    pub date: Option<NaiveDate>,
}

/// One multidimensional data point. The dimension set is fixed at emission
/// time and never revisited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub cell: CellRef,
    pub value: String,
    pub dimensions: BTreeSet<NodeId>,
    pub annotation: Option<Annotation>,
}

/// Sheet-level bookkeeping emitted after the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetDescriptor {
    pub id: SheetId,
    pub name: String,
    pub row_count: u32,
    pub col_count: u32,
    pub marked_cells: u32,
    pub titles: Vec<String>,
}

/// Everything one sheet's forward scan produced.
#[derive(Debug, Clone)]
pub struct SheetExtract {
    pub descriptor: SheetDescriptor,
    pub nodes: NodeRegistry,
    pub observations: Vec<Observation>,
    pub annotations: Vec<Annotation>,
}

impl SheetExtract {
    pub fn has_marked_cells(&self) -> bool {
        self.descriptor.marked_cells > 0
    }
}

/// Dataset-level wrapper metadata over the per-sheet outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetDescriptor {
    pub name: String,
    pub source_path: String,
    /// Number of sheets in the source workbook, including unmarked ones.
    pub sheet_count: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

/// A whole workbook's extraction output. Sheets without any marked cell are
/// dropped before the dataset is assembled.
#[derive(Debug, Clone)]
pub struct DatasetExtract {
    pub descriptor: DatasetDescriptor,
    pub sheets: Vec<SheetExtract>,
}

impl DatasetExtract {
    pub fn observation_count(&self) -> usize {
        self.sheets.iter().map(|s| s.observations.len()).sum()
    }
}
