pub mod check_record;
pub mod snapshot;

// Re-exports for convenience
pub use check_record::CheckRecord;
pub use snapshot::*;
