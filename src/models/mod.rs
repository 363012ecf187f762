pub mod range;
pub mod rows;
pub mod spreadsheet;

pub use range::SheetRange;
pub use rows::RowBatch;
pub use spreadsheet::{AppendOptions, InsertMode, SpreadsheetId, UpdateResult, ValueInputMode};
