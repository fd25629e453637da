use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{
    default_true, require_text, Department, Record, RecordId, Relation, Stateful,
    TransitionContext, TransitionError, ValidationError,
};
use crate::sequence::STUDENT_SEQUENCE_CODE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    #[default]
    Draft,
    Verified,
    Approved,
    Cancelled,
}

impl StudentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            StudentStatus::Draft => "Draft",
            StudentStatus::Verified => "Verified",
            StudentStatus::Approved => "Approved",
            StudentStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentAction {
    SetToDraft,
    SetToVerified,
    SetToApproved,
    SetToCancelled,
}

/// Student boarding (or applying to board) at a hostel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
    pub father_name: String,
    pub registration_no: String,
    #[serde(default)]
    pub cnic: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_mobile: Option<String>,
    #[serde(default)]
    pub department_id: Option<RecordId>,
    /// Defaults to the creation date when left empty.
    #[serde(default)]
    pub admission_date: Option<NaiveDate>,
    pub gender: Gender,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// Derived from `date_of_birth`; recomputed on every read.
    #[serde(default)]
    pub age: u32,
    /// Assigned on approval as `<admission year>-<sequence value>`.
    #[serde(default)]
    pub admission_no: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub state: StudentStatus,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Student {
    /// Draft student admitted on `today`.
    pub fn new(
        name: &str,
        father_name: &str,
        registration_no: &str,
        gender: Gender,
        today: NaiveDate,
    ) -> Self {
        Self {
            name: name.to_string(),
            father_name: father_name.to_string(),
            registration_no: registration_no.to_string(),
            cnic: None,
            contact_phone: None,
            contact_mobile: None,
            department_id: None,
            admission_date: Some(today),
            gender,
            date_of_birth: None,
            age: 0,
            admission_no: None,
            remark: None,
            state: StudentStatus::Draft,
            active: true,
        }
    }

    pub fn age_on(&self, today: NaiveDate) -> u32 {
        age_in_years(self.date_of_birth, today)
    }

    pub fn set_to_draft(&mut self) {
        self.state = StudentStatus::Draft;
    }

    pub fn set_to_verified(&mut self) {
        self.state = StudentStatus::Verified;
    }

    /// Assign the admission number and mark the student approved.
    ///
    /// Nothing is modified when the admission date is missing or the counter cannot be read.
    pub fn set_to_approved(&mut self, ctx: &TransitionContext<'_>) -> Result<(), TransitionError> {
        let admission_date = self.admission_date.ok_or_else(|| {
            ValidationError::Rule(format!(
                "Please enter admission date for student {}",
                self.name
            ))
        })?;

        let value = ctx.sequences.next_value(STUDENT_SEQUENCE_CODE)?;
        self.admission_no = Some(format!("{}-{}", admission_date.year(), value));
        self.state = StudentStatus::Approved;
        Ok(())
    }

    /// Cancelling keeps any admission number already assigned.
    pub fn set_to_cancelled(&mut self) {
        self.state = StudentStatus::Cancelled;
    }
}

/// Whole years between `date_of_birth` and `today`, counting 365 days per year.
///
/// Missing or future birth dates yield 0.
pub fn age_in_years(date_of_birth: Option<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(born) = date_of_birth else {
        return 0;
    };
    let days = (today - born).num_days();
    if days <= 0 {
        return 0;
    }
    u32::try_from(days / 365).unwrap_or(u32::MAX)
}

impl Record for Student {
    const MODEL: &'static str = "hms.student";
    const RELATIONS: &'static [Relation] =
        &[Relation::set_null("department_id", Department::MODEL)];

    fn reference(&self, field: &str) -> Option<RecordId> {
        match field {
            "department_id" => self.department_id,
            _ => None,
        }
    }

    fn clear_reference(&mut self, field: &str) {
        if field == "department_id" {
            self.department_id = None;
        }
    }

    fn reset_readonly(&mut self) {
        self.state = StudentStatus::default();
        self.admission_no = None;
    }

    fn keep_readonly(&mut self, stored: &Self) {
        self.state = stored.state;
        self.admission_no.clone_from(&stored.admission_no);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::MODEL, "name", &self.name)?;
        require_text(Self::MODEL, "father_name", &self.father_name)?;
        require_text(Self::MODEL, "registration_no", &self.registration_no)
    }

    fn apply_defaults(&mut self, today: NaiveDate) {
        if self.admission_date.is_none() {
            self.admission_date = Some(today);
        }
    }

    fn refresh_computed(&mut self, today: NaiveDate) {
        self.age = self.age_on(today);
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn active_flag(&mut self) -> Option<&mut bool> {
        Some(&mut self.active)
    }
}

impl Stateful for Student {
    type Status = StudentStatus;
    type Action = StudentAction;

    fn status(&self) -> StudentStatus {
        self.state
    }

    fn apply(
        &mut self,
        action: StudentAction,
        ctx: &TransitionContext<'_>,
    ) -> Result<(), TransitionError> {
        match action {
            StudentAction::SetToDraft => self.set_to_draft(),
            StudentAction::SetToVerified => self.set_to_verified(),
            StudentAction::SetToApproved => return self.set_to_approved(ctx),
            StudentAction::SetToCancelled => self.set_to_cancelled(),
        }
        Ok(())
    }
}
