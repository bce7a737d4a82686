use crate::domain::entities::observation::DatasetExtract;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatasetId(pub i64);

impl From<i64> for DatasetId {
    fn from(value: i64) -> Self {
        DatasetId(value)
    }
}

impl From<DatasetId> for i64 {
    fn from(value: DatasetId) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    Message(String),
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoError::Message(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for RepoError {}

/// The queryable persisted record set downstream collaborators read from.
pub trait ExtractRepository: Send + Sync {
    fn init(&self) -> Result<(), RepoError>;

    fn save_dataset(&self, extract: &DatasetExtract) -> Result<DatasetId, RepoError>;

    fn list_datasets(&self) -> Result<Vec<DatasetRecord>, RepoError>;
    fn list_sheets(&self, dataset: DatasetId) -> Result<Vec<SheetRecord>, RepoError>;
    fn list_nodes(&self, sheet_id: i64) -> Result<Vec<NodeRecord>, RepoError>;
    fn load_observations(&self, sheet_id: i64) -> Result<Vec<StoredObservation>, RepoError>;
    fn load_annotations(&self, sheet_id: i64) -> Result<Vec<StoredAnnotation>, RepoError>;
    fn observation_count(&self, dataset: DatasetId) -> Result<i64, RepoError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRecord {
    pub id: i64,
    pub name: String,
    pub source_path: String,
    pub sheet_count: i64,
    pub started_at: String,
    pub ended_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRecord {
    pub id: i64,
    pub sheet_idx: i64,
    pub name: String,
    pub row_count: i64,
    pub col_count: i64,
    pub marked_cells: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub id: i64,
    pub row: i64,
    pub col: i64,
    pub kind: String,
    pub label: String,
    pub parent_id: Option<i64>,
    pub bound_property_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObservation {
    pub row: i64,
    pub col: i64,
    pub value: String,
    /// Dimension labels in minting order (row, column, kind).
    pub dimensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAnnotation {
    pub row: i64,
    pub col: i64,
    pub text: String,
    pub author: Option<String>,
    pub noted_on: Option<String>,
}
