// ==========================================
// Deportation Registry - Repository layer
// ==========================================
// Historized record store behind the PersonStore trait.
// Red line: repositories hold no business rules.
// ==========================================

pub mod error;
pub mod memory_person_store;
pub mod person_store;
pub mod sqlite_person_store;

pub use error::{StoreError, StoreResult};
pub use memory_person_store::MemoryPersonStore;
pub use person_store::PersonStore;
pub use sqlite_person_store::SqlitePersonStore;
