pub mod marking;
pub mod workbook;
