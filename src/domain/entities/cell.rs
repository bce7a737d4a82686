use std::collections::BTreeMap;

/// Semantic role assigned to a cell by the upstream marking convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Data,
    ColumnHeader,
    RowHeader,
    HierarchicalRowHeader,
    RowProperty,
    Title,
    Unmarked,
}

impl Role {
    /// Maps a marking style name ("TL Data", "TL ColHeader", ...) to a role.
    /// Unknown styles fall back to `Unmarked`.
    pub fn from_style_name(style: &str) -> Role {
        match style.trim() {
            "TL Data" => Role::Data,
            "TL ColHeader" => Role::ColumnHeader,
            "TL RowHeader" => Role::RowHeader,
            "TL HRowHeader" => Role::HierarchicalRowHeader,
            "TL RowProperty" => Role::RowProperty,
            "TL Title" => Role::Title,
            _ => Role::Unmarked,
        }
    }

    /// Roles that count towards a sheet's marked-cell total. Sheets with no
    /// marked cells are left out of the dataset descriptor.
    pub fn is_marked(self) -> bool {
        matches!(
            self,
            Role::Data
                | Role::ColumnHeader
                | Role::RowHeader
                | Role::HierarchicalRowHeader
                | Role::RowProperty
        )
    }
}

/// Free-text curator note as it arrives on an input cell, before cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellNote {
    pub text: String,
    pub author: Option<String>,
    /// ISO date string as authored; parsed during extraction.
    pub date: Option<String>,
}

/// One positioned input cell. Immutable once the grid is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub role: Role,
    pub raw_value: String,
    pub row_span: u32,
    pub col_span: u32,
    pub note: Option<CellNote>,
}

impl Cell {
    pub fn new(row: u32, col: u32, role: Role, raw_value: impl Into<String>) -> Cell {
        Cell {
            row,
            col,
            role,
            raw_value: raw_value.into(),
            row_span: 1,
            col_span: 1,
            note: None,
        }
    }

    pub fn with_span(mut self, row_span: u32, col_span: u32) -> Cell {
        self.row_span = row_span.max(1);
        self.col_span = col_span.max(1);
        self
    }

    pub fn with_note(mut self, note: CellNote) -> Cell {
        self.note = Some(note);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.raw_value.trim().is_empty()
    }
}

/// Rectangular merge region; `(first_row, first_col)` is the anchor cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeBox {
    pub first_row: u32,
    pub last_row: u32,
    pub first_col: u32,
    pub last_col: u32,
}

impl MergeBox {
    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.first_row && row <= self.last_row && col >= self.first_col && col <= self.last_col
    }

    pub fn anchor(&self) -> (u32, u32) {
        (self.first_row, self.first_col)
    }
}

/// Passive per-sheet holder of positioned cells. Sparse: positions without a
/// recognized cell return `None` from `cell_at`.
#[derive(Debug, Clone, Default)]
pub struct SheetGrid {
    name: String,
    row_count: u32,
    col_count: u32,
    cells: BTreeMap<(u32, u32), Cell>,
    merges: Vec<MergeBox>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>, row_count: u32, col_count: u32) -> SheetGrid {
        SheetGrid {
            name: name.into(),
            row_count,
            col_count,
            cells: BTreeMap::new(),
            merges: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn col_count(&self) -> u32 {
        self.col_count
    }

    /// Inserts a cell, growing the sheet extents when the cell lies outside
    /// the declared bounds.
    pub fn insert(&mut self, cell: Cell) {
        self.row_count = self.row_count.max(cell.row + 1);
        self.col_count = self.col_count.max(cell.col + 1);
        self.cells.insert((cell.row, cell.col), cell);
    }

    pub fn add_merge(&mut self, merge: MergeBox) {
        self.merges.push(merge);
    }

    pub fn cell_at(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// The merge box covering the given position, if any. The anchor position
    /// itself is considered covered, matching the source convention.
    pub fn merge_box_at(&self, row: u32, col: u32) -> Option<&MergeBox> {
        self.merges.iter().find(|m| m.contains(row, col))
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }
}

/// Normalizes free text from a cell: newlines become spaces, runs of
/// whitespace collapse to one space, leading/trailing whitespace is dropped.
pub fn clean_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for part in raw.split_whitespace() {
        if pending_space {
            out.push(' ');
        }
        out.push_str(part);
        pending_space = true;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Amsterdam \n  (city) \r\n"), "Amsterdam (city)");
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text(" \n "), "");
    }

    #[test]
    fn grid_grows_to_fit_inserted_cells() {
        let mut grid = SheetGrid::new("sheet", 1, 1);
        grid.insert(Cell::new(4, 2, Role::Data, "12"));
        assert_eq!(grid.row_count(), 5);
        assert_eq!(grid.col_count(), 3);
        assert!(grid.cell_at(4, 2).is_some());
        assert!(grid.cell_at(0, 0).is_none());
    }

    #[test]
    fn merge_box_covers_anchor_and_interior() {
        let mut grid = SheetGrid::new("sheet", 4, 4);
        grid.add_merge(MergeBox {
            first_row: 0,
            last_row: 1,
            first_col: 1,
            last_col: 2,
        });
        assert!(grid.merge_box_at(0, 1).is_some());
        assert!(grid.merge_box_at(1, 2).is_some());
        assert!(grid.merge_box_at(2, 1).is_none());
        assert_eq!(grid.merge_box_at(1, 1).unwrap().anchor(), (0, 1));
    }

    #[test]
    fn style_names_map_to_roles() {
        assert_eq!(Role::from_style_name("TL Data"), Role::Data);
        assert_eq!(Role::from_style_name("TL ColHeader"), Role::ColumnHeader);
        assert_eq!(Role::from_style_name("TL HRowHeader"), Role::HierarchicalRowHeader);
        assert_eq!(Role::from_style_name("Normal"), Role::Unmarked);
    }
}
