use std::sync::Arc;

use crate::usecase::ports::repo::{
    DatasetId, DatasetRecord, ExtractRepository, NodeRecord, RepoError, SheetRecord,
    StoredAnnotation, StoredObservation,
};

/// Read side over the persisted record set, for downstream collaborators
/// (rule inference, cube assembly) and tests.
pub struct QueryService {
    repo: Arc<dyn ExtractRepository>,
}

impl QueryService {
    pub fn new(repo: Arc<dyn ExtractRepository>) -> Self {
        Self { repo }
    }

    pub fn list_datasets(&self) -> Result<Vec<DatasetRecord>, RepoError> {
        self.repo.list_datasets()
    }

    pub fn list_sheets(&self, dataset: DatasetId) -> Result<Vec<SheetRecord>, RepoError> {
        self.repo.list_sheets(dataset)
    }

    pub fn list_nodes(&self, sheet_id: i64) -> Result<Vec<NodeRecord>, RepoError> {
        self.repo.list_nodes(sheet_id)
    }

    pub fn observations(&self, sheet_id: i64) -> Result<Vec<StoredObservation>, RepoError> {
        self.repo.load_observations(sheet_id)
    }

    pub fn annotations(&self, sheet_id: i64) -> Result<Vec<StoredAnnotation>, RepoError> {
        self.repo.load_annotations(sheet_id)
    }

    pub fn observation_count(&self, dataset: DatasetId) -> Result<i64, RepoError> {
        self.repo.observation_count(dataset)
    }
}
