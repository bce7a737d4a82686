use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use tracing::debug;

use crate::domain::entities::cell::{Cell, MergeBox, Role, SheetGrid};
use crate::infra::import::marking::Marking;

pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::DateTimeIso(v) => v.to_string(),
        Data::DurationIso(v) => v.to_string(),
        Data::Error(v) => format!("{v:?}"),
        Data::Empty => String::new(),
    }
}

/// Loads every sheet of an XLSX workbook into a `SheetGrid`, keeping only the
/// cells the marking assigns a role to. Merged regions become merge boxes,
/// and their anchor cells carry the matching spans.
pub fn load_workbook(xlsx_path: &Path, marking: &Marking) -> Result<Vec<SheetGrid>> {
    let mut workbook: Xlsx<_> = open_workbook(xlsx_path)
        .with_context(|| format!("failed to open xlsx: {}", xlsx_path.display()))?;
    workbook
        .load_merged_regions()
        .context("failed to load merged regions")?;

    let sheet_names = workbook.sheet_names().to_owned();
    let mut grids = Vec::with_capacity(sheet_names.len());

    for (sheet_index, name) in sheet_names.iter().enumerate() {
        let merges: Vec<MergeBox> = workbook
            .merged_regions_by_sheet(name)
            .iter()
            .map(|region| {
                let dims = &region.2;
                MergeBox {
                    first_row: dims.start.0,
                    last_row: dims.end.0,
                    first_col: dims.start.1,
                    last_col: dims.end.1,
                }
            })
            .collect();

        let range = workbook
            .worksheet_range(name)
            .with_context(|| format!("failed to read sheet: {name}"))?;
        let (row_count, col_count) = match range.end() {
            Some((last_row, last_col)) => (last_row + 1, last_col + 1),
            None => (0, 0),
        };

        let mut grid = SheetGrid::new(name.clone(), row_count, col_count);
        for merge in &merges {
            grid.add_merge(*merge);
        }

        let start = range.start().unwrap_or((0, 0));
        for (row_offset, row) in range.rows().enumerate() {
            for (col_offset, data) in row.iter().enumerate() {
                let abs_row = start.0 + row_offset as u32;
                let abs_col = start.1 + col_offset as u32;
                let role = marking.role_at(sheet_index as u32, abs_row, abs_col);
                if role == Role::Unmarked {
                    continue;
                }
                let mut cell = Cell::new(abs_row, abs_col, role, cell_to_string(data));
                if let Some(merge) = merges
                    .iter()
                    .find(|m| m.anchor() == (abs_row, abs_col))
                {
                    cell = cell.with_span(
                        merge.last_row - merge.first_row + 1,
                        merge.last_col - merge.first_col + 1,
                    );
                }
                grid.insert(cell);
            }
        }

        debug!(
            sheet = name.as_str(),
            rows = grid.row_count(),
            cols = grid.col_count(),
            "loaded sheet grid"
        );
        grids.push(grid);
    }

    Ok(grids)
}
