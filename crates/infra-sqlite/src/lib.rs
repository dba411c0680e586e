// Mediaforge Infrastructure - SQLite Adapter
// Implements: RecordStore (brief units in, unit results out)

mod connection;
mod migration;
mod record_store;

pub use connection::create_pool;
pub use migration::run_migrations;
pub use record_store::SqliteRecordStore;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for
// EngineError here)
