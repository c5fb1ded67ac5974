//! hisab-core: shared types for message parsing and the transaction record handed to storage

pub mod fields;
pub mod record;

pub use fields::{Direction, ExtractedFields, ParseResult, ParseStatus};
pub use record::{CsvRecordStore, RecordError, RecordStore, TransactionRecord, CURRENCY};
