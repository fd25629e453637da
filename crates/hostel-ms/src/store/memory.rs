use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Repository, RepositoryError, SearchScope};
use crate::records::{Record, RecordId, Stored};

#[derive(Debug)]
struct Table<T> {
    next_id: u64,
    rows: BTreeMap<RecordId, T>,
}

/// Mutex-guarded table; ids start at 1 and are never reused.
#[derive(Debug, Clone)]
pub struct InMemoryRepository<T> {
    table: Arc<Mutex<Table<T>>>,
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self {
            table: Arc::new(Mutex::new(Table {
                next_id: 1,
                rows: BTreeMap::new(),
            })),
        }
    }
}

impl<T: Record> InMemoryRepository<T> {
    fn lock(&self) -> Result<MutexGuard<'_, Table<T>>, RepositoryError> {
        self.table
            .lock()
            .map_err(|_| RepositoryError::Unavailable(format!("{} table lock poisoned", T::MODEL)))
    }

    /// Number of stored rows, archived ones included.
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.rows.is_empty())
    }
}

impl<T: Record> Repository<T> for InMemoryRepository<T> {
    fn insert(&self, record: T) -> Result<Stored<T>, RepositoryError> {
        let mut table = self.lock()?;
        let id = RecordId(table.next_id);
        table.next_id += 1;
        table.rows.insert(id, record.clone());
        Ok(Stored { id, record })
    }

    fn update(&self, stored: Stored<T>) -> Result<(), RepositoryError> {
        let mut table = self.lock()?;
        match table.rows.get_mut(&stored.id) {
            Some(row) => {
                *row = stored.record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound {
                model: T::MODEL,
                id: stored.id,
            }),
        }
    }

    fn fetch(&self, id: RecordId) -> Result<Option<Stored<T>>, RepositoryError> {
        let table = self.lock()?;
        Ok(table.rows.get(&id).map(|record| Stored {
            id,
            record: record.clone(),
        }))
    }

    fn search(
        &self,
        scope: SearchScope,
        filter: &dyn Fn(&T) -> bool,
    ) -> Result<Vec<Stored<T>>, RepositoryError> {
        let table = self.lock()?;
        Ok(table
            .rows
            .iter()
            .filter(|(_, record)| scope.admits(*record) && filter(*record))
            .map(|(id, record)| Stored {
                id: *id,
                record: record.clone(),
            })
            .collect())
    }

    fn remove(&self, id: RecordId) -> Result<Stored<T>, RepositoryError> {
        let mut table = self.lock()?;
        table
            .rows
            .remove(&id)
            .map(|record| Stored { id, record })
            .ok_or(RepositoryError::NotFound { model: T::MODEL, id })
    }
}
