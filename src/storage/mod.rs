pub mod db;
pub mod models;
pub mod store;

pub use db::SqliteTableStore;
pub use models::{CellMarker, CellValue, Record, Table};
pub use store::TableStore;
