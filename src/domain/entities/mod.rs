pub mod cell;
pub mod header;
pub mod observation;
