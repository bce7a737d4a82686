pub mod columns;
pub mod dataset;
pub mod rows;
pub mod scan;

pub use dataset::extract_dataset;
pub use scan::extract_sheet;
