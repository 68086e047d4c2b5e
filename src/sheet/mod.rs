pub mod workbook;
pub mod loader;

pub use workbook::{CellValue, Workbook, Worksheet};
pub use loader::{records_from_sheet, ColumnMap, RecordSource, SheetView, WorkbookLoader};
