//! Persistent record and file storage

pub mod record_store;
pub mod uploads;

pub use record_store::{JsonRecordStore, RecordStore};
pub use uploads::UploadStore;
