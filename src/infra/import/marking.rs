use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::entities::cell::Role;

/// Immutable style→role marking for one workbook, keyed by sheet index and
/// cell position. Loaded once and passed into the import call; there is no
/// process-wide lookup table.
#[derive(Debug, Clone, Default)]
pub struct Marking {
    roles: BTreeMap<u32, HashMap<(u32, u32), Role>>,
}

impl Marking {
    /// Reads a marking sidecar file: one `sheet_index;cell_name;style` record
    /// per line, e.g. `0;B3;TL Data`. Unknown styles map to `Unmarked`;
    /// unparseable cell names fail the load.
    pub fn from_file(path: &Path) -> Result<Marking> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("failed to open marking file: {}", path.display()))?;

        let mut marking = Marking::default();
        for (line, record) in reader.records().enumerate() {
            let record = record
                .with_context(|| format!("failed to parse marking record {}", line + 1))?;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            let sheet_index: u32 = record
                .get(0)
                .unwrap_or("")
                .parse()
                .with_context(|| format!("bad sheet index in marking record {}", line + 1))?;
            let cell_name = record.get(1).unwrap_or("");
            let (row, col) = parse_cell_name(cell_name).with_context(|| {
                format!("bad cell name {cell_name:?} in marking record {}", line + 1)
            })?;
            let role = Role::from_style_name(record.get(2).unwrap_or(""));
            marking.set(sheet_index, row, col, role);
        }
        Ok(marking)
    }

    pub fn set(&mut self, sheet_index: u32, row: u32, col: u32, role: Role) {
        self.roles
            .entry(sheet_index)
            .or_default()
            .insert((row, col), role);
    }

    /// Role of the cell, `Unmarked` when the marking does not mention it.
    pub fn role_at(&self, sheet_index: u32, row: u32, col: u32) -> Role {
        self.roles
            .get(&sheet_index)
            .and_then(|cells| cells.get(&(row, col)))
            .copied()
            .unwrap_or(Role::Unmarked)
    }
}

/// Parses an A1-style cell name into zero-based `(row, col)`.
pub fn parse_cell_name(name: &str) -> Result<(u32, u32)> {
    let name = name.trim();
    let split = name
        .find(|c: char| c.is_ascii_digit())
        .filter(|&idx| idx > 0)
        .with_context(|| format!("cell name {name:?} has no column/row split"))?;
    let (letters, digits) = name.split_at(split);

    let mut col: u32 = 0;
    for ch in letters.chars() {
        let ch = ch.to_ascii_uppercase();
        if !ch.is_ascii_uppercase() {
            anyhow::bail!("cell name {name:?} has a non-letter column part");
        }
        col = col * 26 + (ch as u32 - 'A' as u32 + 1);
    }
    let row: u32 = digits
        .parse()
        .with_context(|| format!("cell name {name:?} has a bad row part"))?;
    if row == 0 {
        anyhow::bail!("cell name {name:?} has row zero");
    }
    Ok((row - 1, col - 1))
}

/// Renders zero-based `(row, col)` as an A1-style cell name.
#[cfg(test)]
fn cell_name(row: u32, col: u32) -> String {
    let mut letters = String::new();
    let mut rest = col as i64;
    while rest >= 0 {
        letters.insert(0, (b'A' + (rest % 26) as u8) as char);
        rest = rest / 26 - 1;
    }
    format!("{}{}", letters, row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_names_round_trip() {
        for (name, pos) in [("A1", (0, 0)), ("B3", (2, 1)), ("Z10", (9, 25)), ("AA2", (1, 26))] {
            assert_eq!(parse_cell_name(name).unwrap(), pos);
            assert_eq!(cell_name(pos.0, pos.1), name);
        }
    }

    #[test]
    fn bad_cell_names_are_rejected() {
        assert!(parse_cell_name("12").is_err());
        assert!(parse_cell_name("AB").is_err());
        assert!(parse_cell_name("A0").is_err());
        assert!(parse_cell_name("").is_err());
    }

    #[test]
    fn unmentioned_cells_are_unmarked() {
        let mut marking = Marking::default();
        marking.set(0, 2, 1, Role::Data);
        assert_eq!(marking.role_at(0, 2, 1), Role::Data);
        assert_eq!(marking.role_at(0, 0, 0), Role::Unmarked);
        assert_eq!(marking.role_at(1, 2, 1), Role::Unmarked);
    }
}
