use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::entities::cell::{clean_text, Cell, Role, SheetGrid};
use crate::domain::entities::header::{CellRef, HeaderNode, NodeId, NodeKind, NodeRegistry, SheetId};
use crate::domain::entities::observation::{
    Annotation, Observation, SheetDescriptor, SheetExtract,
};
use crate::extract::columns::{ColumnStacks, RowProperties};
use crate::extract::rows::RowDimensions;

/// Runs the single forward scan over one sheet: rows increasing, columns
/// increasing within a row. Each cell dispatches by role into the column/row
/// accumulators; data cells read whatever state the headers above and to the
/// left have already established. The scan never fails; malformed layouts
/// degrade locally.
pub fn extract_sheet(sheet_id: SheetId, grid: &SheetGrid) -> SheetExtract {
    let mut scanner = Scanner::new(sheet_id, grid);
    for row in 0..grid.row_count() {
        for col in 0..grid.col_count() {
            if let Some(cell) = grid.cell_at(row, col) {
                scanner.visit(cell);
            }
        }
    }
    scanner.finish()
}

struct Scanner<'a> {
    sheet: SheetId,
    grid: &'a SheetGrid,
    columns: ColumnStacks,
    properties: RowProperties,
    row_dims: RowDimensions,
    nodes: NodeRegistry,
    observations: Vec<Observation>,
    annotations: Vec<Annotation>,
    titles: Vec<String>,
    marked_cells: u32,
}

impl<'a> Scanner<'a> {
    fn new(sheet: SheetId, grid: &'a SheetGrid) -> Scanner<'a> {
        Scanner {
            sheet,
            grid,
            columns: ColumnStacks::default(),
            properties: RowProperties::default(),
            row_dims: RowDimensions::default(),
            nodes: NodeRegistry::default(),
            observations: Vec::new(),
            annotations: Vec::new(),
            titles: Vec::new(),
            marked_cells: 0,
        }
    }

    fn visit(&mut self, cell: &Cell) {
        if cell.role.is_marked() {
            self.marked_cells += 1;
        }

        // Curator notes are extracted regardless of the structural role.
        let annotation = self.extract_annotation(cell);
        if let Some(annotation) = &annotation {
            self.annotations.push(annotation.clone());
        }

        match cell.role {
            Role::Data => self.on_data(cell, annotation),
            Role::ColumnHeader => self.on_column_header(cell),
            Role::RowHeader => self.on_row_header(cell),
            Role::HierarchicalRowHeader => self.on_hierarchical_row_header(cell),
            Role::RowProperty => self.on_row_property(cell),
            Role::Title => self.on_title(cell),
            Role::Unmarked => {}
        }
    }

    fn cell_ref(&self, cell: &Cell) -> CellRef {
        CellRef::new(self.sheet, cell.row, cell.col)
    }

    fn on_column_header(&mut self, cell: &Cell) {
        if cell.is_empty() {
            if let Some(merge) = self.grid.merge_box_at(cell.row, cell.col) {
                // Covered by a merge box: reuse the anchor column's top node
                // instead of minting a duplicate.
                let (_, anchor_col) = merge.anchor();
                match self.columns.top(anchor_col) {
                    Some(node) => {
                        self.columns
                            .push(cell.col, cell.col_span, self.grid.col_count(), node);
                    }
                    None => {
                        debug!(
                            row = cell.row,
                            col = cell.col,
                            "covered header has no resolvable anchor, column left without dimension"
                        );
                    }
                }
                return;
            }
        }

        let id = NodeId::new(self.cell_ref(cell), NodeKind::ColumnHeader);
        let parent = self.columns.top(cell.col);
        debug!(row = cell.row, col = cell.col, label = %cell.raw_value, "add column header");
        self.nodes.insert(HeaderNode {
            id,
            label: clean_text(&cell.raw_value),
            kind: NodeKind::ColumnHeader,
            parent,
            bound_property: None,
        });
        self.columns
            .push(cell.col, cell.col_span, self.grid.col_count(), id);
    }

    fn on_row_property(&mut self, cell: &Cell) {
        if cell.is_empty() {
            debug!(row = cell.row, col = cell.col, "empty row property, nothing recorded");
            return;
        }
        let id = NodeId::new(self.cell_ref(cell), NodeKind::RowProperty);
        debug!(row = cell.row, col = cell.col, label = %cell.raw_value, "add row property");
        self.nodes.insert(HeaderNode {
            id,
            label: clean_text(&cell.raw_value),
            kind: NodeKind::RowProperty,
            parent: None,
            bound_property: None,
        });
        self.properties
            .activate(cell.col, cell.col_span, self.grid.col_count(), id);
    }

    fn on_row_header(&mut self, cell: &Cell) {
        if cell.is_empty() {
            return;
        }
        let Some(property) = self.properties.active(cell.col) else {
            debug!(
                row = cell.row,
                col = cell.col,
                "row header without an active property, entry dropped"
            );
            return;
        };
        self.mint_row_header(cell, property);
    }

    fn on_hierarchical_row_header(&mut self, cell: &Cell) {
        let Some(property) = self.properties.active(cell.col) else {
            debug!(
                row = cell.row,
                col = cell.col,
                "hierarchical row header without an active property, entry dropped"
            );
            return;
        };
        if cell.is_empty() || is_copy_down_marker(&cell.raw_value) {
            // Curators elide repeated labels with "id." (idem); inherit the
            // value list from the row above. Rows are finalized in order, so
            // chained copies resolve to the originally minted node.
            let copied = self.row_dims.copy_down(
                cell.row,
                cell.row_span,
                self.grid.row_count(),
                property,
            );
            if !copied {
                debug!(
                    row = cell.row,
                    col = cell.col,
                    "copy-down with nothing above, nothing recorded"
                );
            }
            return;
        }
        self.mint_row_header(cell, property);
    }

    fn mint_row_header(&mut self, cell: &Cell, property: NodeId) {
        let id = NodeId::new(self.cell_ref(cell), NodeKind::RowHeader);
        debug!(row = cell.row, col = cell.col, label = %cell.raw_value, "add row header");
        self.nodes.insert(HeaderNode {
            id,
            label: clean_text(&cell.raw_value),
            kind: NodeKind::RowHeader,
            parent: None,
            bound_property: Some(property),
        });
        self.row_dims
            .bind(cell.row, cell.row_span, self.grid.row_count(), property, id);
    }

    fn on_data(&mut self, cell: &Cell, annotation: Option<Annotation>) {
        if cell.is_empty() {
            return;
        }

        let mut dimensions: BTreeSet<NodeId> = BTreeSet::new();
        dimensions.extend(self.columns.stack(cell.col).iter().copied());
        dimensions.extend(self.row_dims.values_in_row(cell.row));
        if dimensions.is_empty() {
            debug!(
                row = cell.row,
                col = cell.col,
                "data cell without any dimension, emitting with empty set"
            );
        }

        self.observations.push(Observation {
            cell: self.cell_ref(cell),
            value: cell.raw_value.clone(),
            dimensions,
            annotation,
        });
    }

    fn on_title(&mut self, cell: &Cell) {
        let title = clean_text(&cell.raw_value);
        if !title.is_empty() {
            self.titles.push(title);
        }
    }

    fn extract_annotation(&self, cell: &Cell) -> Option<Annotation> {
        let note = cell.note.as_ref()?;
        Some(Annotation {
            cell: self.cell_ref(cell),
            text: clean_text(&note.text),
            author: note
                .author
                .as_deref()
                .map(str::trim)
                .filter(|author| !author.is_empty())
                .map(str::to_string),
            date: note
                .date
                .as_deref()
                .and_then(|date| chrono::NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()),
        })
    }

    fn finish(self) -> SheetExtract {
        SheetExtract {
            descriptor: SheetDescriptor {
                id: self.sheet,
                name: self.grid.name().to_string(),
                row_count: self.grid.row_count(),
                col_count: self.grid.col_count(),
                marked_cells: self.marked_cells,
                titles: self.titles,
            },
            nodes: self.nodes,
            observations: self.observations,
            annotations: self.annotations,
        }
    }
}

/// The "id." / "id " convention: repeat the row header from the row above.
fn is_copy_down_marker(raw_value: &str) -> bool {
    let lowered = raw_value.to_lowercase();
    lowered == "id." || lowered == "id "
}
