use chrono::Utc;
use tracing::info;

use crate::domain::entities::cell::SheetGrid;
use crate::domain::entities::header::SheetId;
use crate::domain::entities::observation::{DatasetDescriptor, DatasetExtract};
use crate::extract::scan::extract_sheet;

/// Extracts every sheet of a workbook and wraps the results in dataset-level
/// provenance metadata. Sheets whose scan marked no cell are dropped from the
/// dataset; `sheet_count` still reports the workbook total.
pub fn extract_dataset(
    name: impl Into<String>,
    source_path: impl Into<String>,
    grids: &[SheetGrid],
) -> DatasetExtract {
    let name = name.into();
    let started_at = Utc::now();

    let sheets: Vec<_> = grids
        .iter()
        .enumerate()
        .map(|(index, grid)| extract_sheet(SheetId(index as u32), grid))
        .filter(|extract| extract.has_marked_cells())
        .collect();

    let ended_at = Utc::now();
    info!(
        dataset = name.as_str(),
        sheets = sheets.len(),
        observations = sheets.iter().map(|s| s.observations.len()).sum::<usize>(),
        "extracted dataset"
    );

    DatasetExtract {
        descriptor: DatasetDescriptor {
            name,
            source_path: source_path.into(),
            sheet_count: grids.len() as u32,
            started_at,
            ended_at,
        },
        sheets,
    }
}
