use std::path::PathBuf;

use crate::domain::entities::observation::DatasetExtract;
use crate::infra::sqlite::queries::{
    insert_dataset_extract, list_datasets, list_nodes, list_sheets, load_annotations,
    load_observations, observation_count,
};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::repo::{
    DatasetId, DatasetRecord, ExtractRepository, NodeRecord, RepoError, SheetRecord,
    StoredAnnotation, StoredObservation,
};

pub struct SqliteRepo {
    pub db_path: PathBuf,
}

impl SqliteRepo {
    pub fn new(db_path: PathBuf) -> SqliteRepo {
        SqliteRepo { db_path }
    }
}

impl ExtractRepository for SqliteRepo {
    fn init(&self) -> Result<(), RepoError> {
        init_db(&self.db_path).map_err(|err| RepoError::Message(err.to_string()))
    }

    fn save_dataset(&self, extract: &DatasetExtract) -> Result<DatasetId, RepoError> {
        insert_dataset_extract(&self.db_path, extract)
            .map(DatasetId)
            .map_err(|err| RepoError::Message(err.to_string()))
    }

    fn list_datasets(&self) -> Result<Vec<DatasetRecord>, RepoError> {
        list_datasets(&self.db_path).map_err(|err| RepoError::Message(err.to_string()))
    }

    fn list_sheets(&self, dataset: DatasetId) -> Result<Vec<SheetRecord>, RepoError> {
        list_sheets(&self.db_path, dataset.0).map_err(|err| RepoError::Message(err.to_string()))
    }

    fn list_nodes(&self, sheet_id: i64) -> Result<Vec<NodeRecord>, RepoError> {
        list_nodes(&self.db_path, sheet_id).map_err(|err| RepoError::Message(err.to_string()))
    }

    fn load_observations(&self, sheet_id: i64) -> Result<Vec<StoredObservation>, RepoError> {
        load_observations(&self.db_path, sheet_id)
            .map_err(|err| RepoError::Message(err.to_string()))
    }

    fn load_annotations(&self, sheet_id: i64) -> Result<Vec<StoredAnnotation>, RepoError> {
        load_annotations(&self.db_path, sheet_id)
            .map_err(|err| RepoError::Message(err.to_string()))
    }

    fn observation_count(&self, dataset: DatasetId) -> Result<i64, RepoError> {
        observation_count(&self.db_path, dataset.0)
            .map_err(|err| RepoError::Message(err.to_string()))
    }
}
