//! Storage contract for records and an in-memory implementation of it.

mod memory;

pub use memory::InMemoryRepository;

use crate::records::{Record, RecordId, Stored};

/// Which records a search considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Archived (inactive) records are hidden.
    #[default]
    ActiveOnly,
    IncludeArchived,
}

impl SearchScope {
    pub fn admits<T: Record>(self, record: &T) -> bool {
        match self {
            SearchScope::ActiveOnly => record.is_active(),
            SearchScope::IncludeArchived => true,
        }
    }
}

/// Storage abstraction so services can be exercised without a database.
///
/// Search results are ordered by ascending id.
pub trait Repository<T: Record>: Send + Sync {
    fn insert(&self, record: T) -> Result<Stored<T>, RepositoryError>;
    fn update(&self, stored: Stored<T>) -> Result<(), RepositoryError>;
    fn fetch(&self, id: RecordId) -> Result<Option<Stored<T>>, RepositoryError>;
    fn search(
        &self,
        scope: SearchScope,
        filter: &dyn Fn(&T) -> bool,
    ) -> Result<Vec<Stored<T>>, RepositoryError>;
    fn remove(&self, id: RecordId) -> Result<Stored<T>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{model} record {id} not found")]
    NotFound { model: &'static str, id: RecordId },
    #[error("{model} records cannot be archived")]
    NotArchivable { model: &'static str },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
