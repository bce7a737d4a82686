//! Turns spreadsheets whose cells carry hand-assigned semantic roles into a
//! normalized multidimensional observation dataset.
//!
//! One forward scan per sheet reconstructs the column-header nesting, the
//! row-property→row-header bindings (including the "id." copy-down
//! convention), and emits one observation per non-empty data cell carrying
//! every header binding active at its grid position. Sheets are independent;
//! callers may extract many workbooks in parallel.

pub mod domain;
pub mod extract;
pub mod infra;
pub mod usecase;

pub use domain::entities::cell::{Cell, CellNote, MergeBox, Role, SheetGrid};
pub use domain::entities::header::{CellRef, HeaderNode, NodeId, NodeKind, NodeRegistry, SheetId};
pub use domain::entities::observation::{
    Annotation, DatasetDescriptor, DatasetExtract, Observation, SheetDescriptor, SheetExtract,
};
pub use extract::{extract_dataset, extract_sheet};

#[cfg(test)]
mod tests;
