pub mod direction;
pub mod entry;
pub mod operation;
pub mod report;
pub mod settings;
pub mod sync_status;
