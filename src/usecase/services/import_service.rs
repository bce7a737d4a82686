use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::extract::extract_dataset;
use crate::infra::import::marking::Marking;
use crate::infra::import::workbook::load_workbook;
use crate::usecase::ports::repo::{DatasetId, ExtractRepository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    pub dataset_id: DatasetId,
    pub sheet_count: usize,
    pub observation_count: usize,
}

/// End-to-end import: marking sidecar + workbook → per-sheet extraction →
/// persisted record set.
pub struct ImportService {
    repo: Arc<dyn ExtractRepository>,
}

impl ImportService {
    pub fn new(repo: Arc<dyn ExtractRepository>) -> Self {
        Self { repo }
    }

    pub fn import_workbook(&self, xlsx_path: &Path, marking_path: &Path) -> Result<ImportResult> {
        let marking = Marking::from_file(marking_path)?;
        let grids = load_workbook(xlsx_path, &marking)?;

        let dataset_name = xlsx_path
            .file_stem()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("dataset")
            .to_string();
        let source_path = xlsx_path.to_string_lossy().into_owned();

        let extract = extract_dataset(dataset_name, source_path, &grids);
        let observation_count = extract.observation_count();
        let sheet_count = extract.sheets.len();

        self.repo.init().context("failed to initialize store")?;
        let dataset_id = self
            .repo
            .save_dataset(&extract)
            .context("failed to persist dataset extract")?;

        info!(
            dataset_id = dataset_id.0,
            sheet_count, observation_count, "imported workbook"
        );
        Ok(ImportResult {
            dataset_id,
            sheet_count,
            observation_count,
        })
    }
}
