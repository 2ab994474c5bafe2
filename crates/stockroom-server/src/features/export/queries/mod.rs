pub mod csv;

pub use self::csv::{ExportCsvError, ExportCsvQuery, CSV_HEADER};
