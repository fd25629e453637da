use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{info, warn};

use crate::clock::Clock;
use crate::records::{
    Record, RecordId, Stateful, Stored, TransitionContext, TransitionError, ValidationError,
};
use crate::relations::{RelationError, Relations};
use crate::sequence::SequenceService;
use crate::store::{Repository, RepositoryError, SearchScope};

/// Create/read/update/archive operations and status transitions for one record type.
pub struct RecordService<T, R, S> {
    repository: Arc<R>,
    sequences: Arc<S>,
    clock: Arc<dyn Clock>,
    relations: Option<Arc<Relations>>,
    _record: PhantomData<fn() -> T>,
}

impl<T, R, S> RecordService<T, R, S>
where
    T: Record,
    R: Repository<T> + 'static,
    S: SequenceService + 'static,
{
    pub fn new(repository: Arc<R>, sequences: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            sequences,
            clock,
            relations: None,
            _record: PhantomData,
        }
    }

    /// Check references on every write and release them before deletes.
    pub fn with_relations(mut self, relations: Arc<Relations>) -> Self {
        self.relations = Some(relations);
        self
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn create(&self, mut record: T) -> Result<Stored<T>, ServiceError> {
        let today = self.clock.today();
        record.reset_readonly();
        record.apply_defaults(today);
        record.refresh_computed(today);
        record.validate()?;
        self.check_references(&record)?;

        let stored = self.repository.insert(record)?;
        info!(model = T::MODEL, id = %stored.id, "record created");
        Ok(stored)
    }

    pub fn get(&self, id: RecordId) -> Result<Stored<T>, ServiceError> {
        let mut stored = self.fetch(id)?;
        stored.record.refresh_computed(self.clock.today());
        Ok(stored)
    }

    pub fn list(&self, scope: SearchScope) -> Result<Vec<Stored<T>>, ServiceError> {
        self.search(scope, &|_| true)
    }

    pub fn search(
        &self,
        scope: SearchScope,
        filter: &dyn Fn(&T) -> bool,
    ) -> Result<Vec<Stored<T>>, ServiceError> {
        let today = self.clock.today();
        let mut found = self.repository.search(scope, filter)?;
        for stored in &mut found {
            stored.record.refresh_computed(today);
        }
        Ok(found)
    }

    /// Replace the editable fields of an existing record.
    ///
    /// Status, assigned numbers and the active flag keep their stored values; they change
    /// through transitions and archive/restore only.
    pub fn update(&self, id: RecordId, mut record: T) -> Result<Stored<T>, ServiceError> {
        let mut current = self.fetch(id)?;
        record.keep_readonly(&current.record);
        if let (Some(active), Some(flag)) = (current.record.active_flag(), record.active_flag()) {
            *flag = *active;
        }
        record.refresh_computed(self.clock.today());
        record.validate()?;
        self.check_references(&record)?;

        let stored = Stored { id, record };
        self.repository.update(stored.clone())?;
        info!(model = T::MODEL, %id, "record updated");
        Ok(stored)
    }

    /// Soft delete: the record stays stored but leaves default listings.
    pub fn archive(&self, id: RecordId) -> Result<Stored<T>, ServiceError> {
        self.set_active(id, false)
    }

    pub fn restore(&self, id: RecordId) -> Result<Stored<T>, ServiceError> {
        self.set_active(id, true)
    }

    /// Remove a record for good. Nullable references to it are cleared first; a required
    /// reference blocks the delete.
    pub fn delete(&self, id: RecordId) -> Result<Stored<T>, ServiceError> {
        self.fetch(id)?;
        if let Some(relations) = &self.relations {
            relations.release(T::MODEL, id)?;
        }
        let removed = self.repository.remove(id)?;
        info!(model = T::MODEL, %id, "record deleted");
        Ok(removed)
    }

    fn set_active(&self, id: RecordId, active: bool) -> Result<Stored<T>, ServiceError> {
        let mut stored = self.fetch(id)?;
        match stored.record.active_flag() {
            Some(flag) => *flag = active,
            None => return Err(RepositoryError::NotArchivable { model: T::MODEL }.into()),
        }
        stored.record.refresh_computed(self.clock.today());

        self.repository.update(stored.clone())?;
        info!(model = T::MODEL, %id, active, "record active flag changed");
        Ok(stored)
    }

    fn check_references(&self, record: &T) -> Result<(), ServiceError> {
        match &self.relations {
            Some(relations) => relations.ensure_targets_exist(record).map_err(ServiceError::from),
            None => Ok(()),
        }
    }

    fn fetch(&self, id: RecordId) -> Result<Stored<T>, ServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound { model: T::MODEL, id })
            .map_err(ServiceError::from)
    }
}

impl<T, R, S> RecordService<T, R, S>
where
    T: Stateful,
    R: Repository<T> + 'static,
    S: SequenceService + 'static,
{
    /// Run a status helper. The stored record only changes when the helper succeeds.
    pub fn transition(&self, id: RecordId, action: T::Action) -> Result<Stored<T>, ServiceError> {
        let mut stored = self.fetch(id)?;
        let ctx = TransitionContext {
            sequences: self.sequences.as_ref(),
        };

        if let Err(err) = stored.record.apply(action, &ctx) {
            warn!(model = T::MODEL, %id, ?action, error = %err, "transition rejected");
            return Err(err.into());
        }
        stored.record.refresh_computed(self.clock.today());

        self.repository.update(stored.clone())?;
        info!(
            model = T::MODEL,
            %id,
            ?action,
            status = ?stored.record.status(),
            "record transitioned"
        );
        Ok(stored)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Relation(#[from] RelationError),
}

impl ServiceError {
    /// User-facing validation failure, whether raised by the schema, a status helper, or a
    /// reference to a record that does not exist.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ServiceError::Validation(_)
                | ServiceError::Transition(TransitionError::Validation(_))
                | ServiceError::Relation(RelationError::MissingTarget { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::records::{
        Department, Gender, HousekeepingAction, HousekeepingRecord, HousekeepingStatus, Student,
        StudentAction, StudentStatus,
    };
    use crate::sequence::{InMemorySequence, STUDENT_SEQUENCE_CODE};
    use crate::store::InMemoryRepository;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 8, 6).expect("valid date")
    }

    fn service<T: Record>() -> (
        RecordService<T, InMemoryRepository<T>, InMemorySequence>,
        Arc<InMemoryRepository<T>>,
        Arc<InMemorySequence>,
    ) {
        let repository = Arc::new(InMemoryRepository::default());
        let sequences = Arc::new(InMemorySequence::standard());
        let service = RecordService::new(
            repository.clone(),
            sequences.clone(),
            Arc::new(FixedClock(today())),
        );
        (service, repository, sequences)
    }

    fn student() -> Student {
        let mut student = Student::new("Hamza Ali", "Ali Raza", "REG-1", Gender::Male, today());
        student.admission_date = None;
        student.date_of_birth = NaiveDate::from_ymd_opt(2001, 1, 1);
        student
    }

    #[test]
    fn create_applies_defaults_and_computes_age() {
        let (service, _, _) = service::<Student>();
        let stored = service.create(student()).expect("created");
        assert_eq!(stored.record.admission_date, Some(today()));
        assert_eq!(stored.record.age, 20);
    }

    #[test]
    fn create_rejects_missing_required_fields() {
        let (service, repository, _) = service::<Department>();
        let err = service
            .create(Department {
                name: String::new(),
            })
            .expect_err("blank name rejected");
        assert!(err.is_validation());
        assert!(repository.is_empty().expect("readable"));
    }

    #[test]
    fn failed_approval_keeps_stored_record() {
        let (service, repository, sequences) = service::<Student>();
        let created = service.create(student()).expect("created");
        let mut cleared = created.record.clone();
        cleared.admission_date = None;
        service.update(created.id, cleared).expect("updated");

        let err = service
            .transition(created.id, StudentAction::SetToApproved)
            .expect_err("approval rejected");
        assert!(err.is_validation());

        let stored = repository
            .fetch(created.id)
            .expect("fetch")
            .expect("present");
        assert_eq!(stored.record.state, StudentStatus::Draft);
        assert!(stored.record.admission_no.is_none());
        assert_eq!(sequences.peek(STUDENT_SEQUENCE_CODE), Some(1));
    }

    #[test]
    fn archive_requires_active_flag() {
        let (service, _, _) = service::<Department>();
        let created = service
            .create(Department {
                name: "Law".to_string(),
            })
            .expect("created");
        match service.archive(created.id) {
            Err(ServiceError::Repository(RepositoryError::NotArchivable { model })) => {
                assert_eq!(model, "hms.department")
            }
            other => panic!("expected not archivable, got {other:?}"),
        }
    }

    #[test]
    fn transition_persists_new_status() {
        let (service, _, _) = service::<HousekeepingRecord>();
        let record: HousekeepingRecord = serde_json::from_str(
            r#"{"date":"2021-08-06T09:00:00","room_id":4,"inspect_date":"2021-08-06T11:30:00"}"#,
        )
        .expect("deserializes");
        let created = service.create(record).expect("created");

        service
            .transition(created.id, HousekeepingAction::SetToVerified)
            .expect("verified");
        let stored = service.get(created.id).expect("fetched");
        assert_eq!(stored.record.state, HousekeepingStatus::Verified);
    }

    #[test]
    fn get_reports_missing_records() {
        let (service, _, _) = service::<Student>();
        match service.get(RecordId(42)) {
            Err(ServiceError::Repository(RepositoryError::NotFound { id, .. })) => {
                assert_eq!(id, RecordId(42))
            }
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn update_cannot_forge_status_or_admission_number() {
        let (service, repository, sequences) = service::<Student>();
        let created = service.create(student()).expect("created");

        let mut forged = created.record.clone();
        forged.admission_date = None;
        forged.state = StudentStatus::Approved;
        forged.admission_no = Some("forged-999".to_string());
        forged.active = false;
        forged.remark = Some("edited".to_string());
        let updated = service.update(created.id, forged).expect("updated");

        let stored = repository
            .fetch(created.id)
            .expect("fetch")
            .expect("present");
        for record in [&updated.record, &stored.record] {
            assert_eq!(record.state, StudentStatus::Draft);
            assert!(record.admission_no.is_none());
            assert!(record.active);
            assert_eq!(record.remark.as_deref(), Some("edited"));
            assert!(record.admission_date.is_none());
        }

        let err = service
            .transition(created.id, StudentAction::SetToApproved)
            .expect_err("approval still needs an admission date");
        assert!(err.is_validation());
        assert_eq!(sequences.peek(STUDENT_SEQUENCE_CODE), Some(1));
    }

    #[test]
    fn create_starts_from_default_status() {
        let (service, _, _) = service::<Student>();
        let mut forged = student();
        forged.state = StudentStatus::Approved;
        forged.admission_no = Some("2021-77".to_string());

        let created = service.create(forged).expect("created");
        assert_eq!(created.record.state, StudentStatus::Draft);
        assert!(created.record.admission_no.is_none());
    }

    fn linked_services() -> (
        RecordService<Department, InMemoryRepository<Department>, InMemorySequence>,
        RecordService<Student, InMemoryRepository<Student>, InMemorySequence>,
        Arc<InMemoryRepository<Student>>,
    ) {
        let departments = Arc::new(InMemoryRepository::<Department>::default());
        let students = Arc::new(InMemoryRepository::<Student>::default());
        let mut relations = Relations::default();
        relations.register::<Department, _>(departments.clone());
        relations.register::<Student, _>(students.clone());
        let relations = Arc::new(relations);

        let sequences = Arc::new(InMemorySequence::standard());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(today()));
        let department_service =
            RecordService::new(departments, sequences.clone(), clock.clone())
                .with_relations(relations.clone());
        let student_service =
            RecordService::new(students.clone(), sequences, clock).with_relations(relations);
        (department_service, student_service, students)
    }

    #[test]
    fn references_must_point_at_stored_records() {
        let (departments, students, repository) = linked_services();
        let mut orphan = student();
        orphan.department_id = Some(RecordId(999));

        let err = students.create(orphan).expect_err("dangling reference rejected");
        assert!(err.is_validation());
        assert!(repository.is_empty().expect("readable"));

        let department = departments
            .create(Department {
                name: "Law".to_string(),
            })
            .expect("created");
        let mut linked = student();
        linked.department_id = Some(department.id);
        let created = students.create(linked).expect("created");

        let mut moved = created.record.clone();
        moved.department_id = Some(RecordId(999));
        let err = students
            .update(created.id, moved)
            .expect_err("dangling reference rejected");
        assert!(matches!(
            err,
            ServiceError::Relation(RelationError::MissingTarget { field: "department_id", .. })
        ));
    }

    #[test]
    fn deleting_a_target_clears_references_to_it() {
        let (departments, students, _) = linked_services();
        let department = departments
            .create(Department {
                name: "Law".to_string(),
            })
            .expect("created");
        let mut linked = student();
        linked.department_id = Some(department.id);
        let created = students.create(linked).expect("created");

        departments.delete(department.id).expect("deleted");

        let stored = students.get(created.id).expect("still stored");
        assert!(stored.record.department_id.is_none());
    }
}
