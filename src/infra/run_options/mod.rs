pub mod in_memory;
pub mod sqlite_run_option_store;

pub use in_memory::InMemoryRunOptionStore;
pub use sqlite_run_option_store::SqliteRunOptionStore;
