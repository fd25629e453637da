//! Record schemas for the hostel domain and the status helpers attached to them.

pub mod admission;
pub mod amenity;
pub mod department;
pub mod deposit_policy;
pub mod employee;
pub mod hostel;
pub mod housekeeping;
pub mod room;
pub mod student;

use std::fmt;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::sequence::{SequenceError, SequenceService};

pub use admission::{
    AdmissionAction, AdmissionStatus, HostelAdmission, PaymentFrequency, PriceListPolicy,
    NEW_ADMISSION_REFERENCE,
};
pub use amenity::{Amenity, AmenityCategory};
pub use department::Department;
pub use deposit_policy::{CalculationCategory, DepositPolicy};
pub use employee::Employee;
pub use hostel::{Hostel, HostelAction, HostelStatus};
pub use housekeeping::{
    CleanType, HousekeepingAction, HousekeepingRecord, HousekeepingStatus, InspectorRole,
    RoomCondition,
};
pub use room::HostelRoom;
pub use student::{age_in_years, Gender, Student, StudentAction, StudentStatus};

/// Identifier assigned by the repository on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted record: the repository id alongside the record fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
    pub id: RecordId,
    #[serde(flatten)]
    pub record: T,
}

/// What happens to a referring record when its target is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    /// The reference is cleared.
    SetNull,
    /// The delete is refused while the reference exists.
    Restrict,
}

/// Many-to-one link from a field of one model to records of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub field: &'static str,
    pub target: &'static str,
    pub on_delete: OnDelete,
}

impl Relation {
    pub const fn set_null(field: &'static str, target: &'static str) -> Self {
        Self {
            field,
            target,
            on_delete: OnDelete::SetNull,
        }
    }

    pub const fn restrict(field: &'static str, target: &'static str) -> Self {
        Self {
            field,
            target,
            on_delete: OnDelete::Restrict,
        }
    }
}

/// Schema-level behavior shared by every entity.
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Technical model name, e.g. `hms.student`.
    const MODEL: &'static str;

    /// Reference fields and the models they point to.
    const RELATIONS: &'static [Relation] = &[];

    /// Current value of the reference field named `field`.
    fn reference(&self, _field: &str) -> Option<RecordId> {
        None
    }

    fn clear_reference(&mut self, _field: &str) {}

    /// Reset fields a caller may not choose when creating the record.
    fn reset_readonly(&mut self) {}

    /// Carry over fields that only the record's own helpers may change.
    fn keep_readonly(&mut self, _stored: &Self) {}

    /// Enforce required-field constraints.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Fill per-record defaults that depend on the creation date.
    fn apply_defaults(&mut self, _today: NaiveDate) {}

    /// Recompute derived fields before the record is handed back to a caller.
    fn refresh_computed(&mut self, _today: NaiveDate) {}

    fn is_active(&self) -> bool {
        true
    }

    /// Soft-delete flag, for records that carry one.
    fn active_flag(&mut self) -> Option<&mut bool> {
        None
    }
}

/// Records with a status field driven by unconditional setters.
pub trait Stateful: Record {
    type Status: Copy + fmt::Debug + PartialEq + Serialize + Send;
    type Action: Copy + fmt::Debug + DeserializeOwned + Send;

    fn status(&self) -> Self::Status;

    fn apply(
        &mut self,
        action: Self::Action,
        ctx: &TransitionContext<'_>,
    ) -> Result<(), TransitionError>;
}

/// Collaborators a transition may need.
pub struct TransitionContext<'a> {
    pub sequences: &'a dyn SequenceService,
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{model}: field '{field}' is required")]
    MissingField {
        model: &'static str,
        field: &'static str,
    },
    #[error("{0}")]
    Rule(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

pub(crate) fn require_text(
    model: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { model, field });
    }
    Ok(())
}

pub(crate) fn require<T>(
    model: &'static str,
    field: &'static str,
    value: &Option<T>,
) -> Result<(), ValidationError> {
    match value {
        Some(_) => Ok(()),
        None => Err(ValidationError::MissingField { model, field }),
    }
}

pub(crate) fn default_true() -> bool {
    true
}
