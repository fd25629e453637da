//! Many-to-one integrity across record collections.
//!
//! Every collection that can be pointed at, or that points elsewhere, is registered once.
//! Writes check that referenced ids exist; deletes either clear the references left behind
//! or are refused, depending on the [`OnDelete`] rule of each relation.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::info;

use crate::records::{OnDelete, Record, RecordId, Relation};
use crate::store::{Repository, RepositoryError, SearchScope};

/// Type-erased view of one registered collection.
trait Collection: Send + Sync {
    fn model(&self) -> &'static str;

    fn contains(&self, id: RecordId) -> Result<bool, RepositoryError>;

    /// First record blocking the deletion of `target` #`id`, with the field holding the link.
    fn restricting(
        &self,
        target: &'static str,
        id: RecordId,
    ) -> Result<Option<(&'static str, RecordId)>, RepositoryError>;

    /// Clear every nullable link to `target` #`id`; returns how many records changed.
    fn detach(&self, target: &'static str, id: RecordId) -> Result<usize, RepositoryError>;
}

struct RepositoryCollection<T, R> {
    repository: Arc<R>,
    _record: PhantomData<fn() -> T>,
}

impl<T, R> RepositoryCollection<T, R>
where
    T: Record,
    R: Repository<T> + 'static,
{
    fn relations_to(
        target: &'static str,
        rule: OnDelete,
    ) -> impl Iterator<Item = &'static Relation> {
        T::RELATIONS
            .iter()
            .filter(move |relation| relation.target == target && relation.on_delete == rule)
    }
}

impl<T, R> Collection for RepositoryCollection<T, R>
where
    T: Record,
    R: Repository<T> + 'static,
{
    fn model(&self) -> &'static str {
        T::MODEL
    }

    fn contains(&self, id: RecordId) -> Result<bool, RepositoryError> {
        Ok(self.repository.fetch(id)?.is_some())
    }

    fn restricting(
        &self,
        target: &'static str,
        id: RecordId,
    ) -> Result<Option<(&'static str, RecordId)>, RepositoryError> {
        for relation in Self::relations_to(target, OnDelete::Restrict) {
            let found = self.repository.search(SearchScope::IncludeArchived, &|record| {
                record.reference(relation.field) == Some(id)
            })?;
            if let Some(stored) = found.first() {
                return Ok(Some((relation.field, stored.id)));
            }
        }
        Ok(None)
    }

    fn detach(&self, target: &'static str, id: RecordId) -> Result<usize, RepositoryError> {
        let mut cleared = 0;
        for relation in Self::relations_to(target, OnDelete::SetNull) {
            let found = self.repository.search(SearchScope::IncludeArchived, &|record| {
                record.reference(relation.field) == Some(id)
            })?;
            for mut stored in found {
                stored.record.clear_reference(relation.field);
                self.repository.update(stored)?;
                cleared += 1;
            }
        }
        Ok(cleared)
    }
}

/// Registry of collections keyed by model name.
#[derive(Default, Clone)]
pub struct Relations {
    collections: BTreeMap<&'static str, Arc<dyn Collection>>,
}

impl Relations {
    pub fn register<T, R>(&mut self, repository: Arc<R>)
    where
        T: Record,
        R: Repository<T> + 'static,
    {
        let collection = RepositoryCollection::<T, R> {
            repository,
            _record: PhantomData,
        };
        self.collections.insert(T::MODEL, Arc::new(collection));
    }

    /// Every id `record` points at must name a stored record.
    pub fn ensure_targets_exist<T: Record>(&self, record: &T) -> Result<(), RelationError> {
        for relation in T::RELATIONS {
            let Some(id) = record.reference(relation.field) else {
                continue;
            };
            let collection = self
                .collections
                .get(relation.target)
                .ok_or(RelationError::UnregisteredModel(relation.target))?;
            if !collection.contains(id)? {
                return Err(RelationError::MissingTarget {
                    model: T::MODEL,
                    field: relation.field,
                    target: relation.target,
                    id,
                });
            }
        }
        Ok(())
    }

    /// Prepare `model` #`id` for deletion.
    ///
    /// Nothing changes when a restricting reference exists. Otherwise nullable references
    /// are cleared and their count returned.
    pub fn release(&self, model: &'static str, id: RecordId) -> Result<usize, RelationError> {
        for collection in self.collections.values() {
            if let Some((field, referrer_id)) = collection.restricting(model, id)? {
                return Err(RelationError::InUse {
                    model,
                    id,
                    referrer: collection.model(),
                    field,
                    referrer_id,
                });
            }
        }

        let mut cleared = 0;
        for collection in self.collections.values() {
            cleared += collection.detach(model, id)?;
        }
        if cleared > 0 {
            info!(model, %id, cleared, "references cleared before delete");
        }
        Ok(cleared)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    #[error("{model}: field '{field}' points to missing {target} record {id}")]
    MissingTarget {
        model: &'static str,
        field: &'static str,
        target: &'static str,
        id: RecordId,
    },
    #[error("{model} record {id} is still referenced by {referrer} record {referrer_id} ({field})")]
    InUse {
        model: &'static str,
        id: RecordId,
        referrer: &'static str,
        field: &'static str,
        referrer_id: RecordId,
    },
    #[error("no collection registered for model '{0}'")]
    UnregisteredModel(&'static str),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
