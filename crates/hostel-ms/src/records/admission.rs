use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{
    default_true, require, require_text, DepositPolicy, Hostel, HostelRoom, Record, RecordId,
    Relation, Stateful, Student, TransitionContext, TransitionError, ValidationError,
};

/// Placeholder reference carried until a real one is assigned.
pub const NEW_ADMISSION_REFERENCE: &str = "New";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceListPolicy {
    Public,
    Private,
    Vip,
    Foreign,
}

impl PriceListPolicy {
    pub const fn label(self) -> &'static str {
        match self {
            PriceListPolicy::Public => "Public Pricelist PKR",
            PriceListPolicy::Private => "Private Pricelist PKR",
            PriceListPolicy::Vip => "VIP Pricelist PKR",
            PriceListPolicy::Foreign => "Foreign Pricelist $$$",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionStatus {
    #[default]
    Draft,
    Verified,
    Done,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionAction {
    SetToDraft,
    SetToVerified,
    SetDone,
    SetToCancelled,
}

fn new_reference() -> String {
    NEW_ADMISSION_REFERENCE.to_string()
}

/// A student's stay in a hostel room under a deposit policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostelAdmission {
    #[serde(default = "new_reference")]
    pub name_seq: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub admission_no: Option<i64>,
    #[serde(default)]
    pub student_id: Option<RecordId>,
    #[serde(default)]
    pub hostel_id: Option<RecordId>,
    #[serde(default)]
    pub room_id: Option<RecordId>,
    #[serde(default)]
    pub deposit_policy_id: Option<RecordId>,
    #[serde(default)]
    pub price_list_policy: Option<PriceListPolicy>,
    /// Defaults to the creation date when left empty.
    #[serde(default)]
    pub admission_date: Option<NaiveDate>,
    #[serde(default)]
    pub number_of_days: Option<i64>,
    #[serde(default)]
    pub billing_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub payment_frequency: Option<PaymentFrequency>,
    #[serde(default)]
    pub leaving_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub state: AdmissionStatus,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl HostelAdmission {
    pub fn new(
        student_id: RecordId,
        hostel_id: RecordId,
        room_id: RecordId,
        billing_date: NaiveDateTime,
        leaving_date: NaiveDateTime,
    ) -> Self {
        Self {
            name_seq: new_reference(),
            name: None,
            admission_no: None,
            student_id: Some(student_id),
            hostel_id: Some(hostel_id),
            room_id: Some(room_id),
            deposit_policy_id: None,
            price_list_policy: None,
            admission_date: None,
            number_of_days: None,
            billing_date: Some(billing_date),
            payment_frequency: None,
            leaving_date: Some(leaving_date),
            state: AdmissionStatus::Draft,
            active: true,
        }
    }

    pub fn set_to_draft(&mut self) {
        self.state = AdmissionStatus::Draft;
    }

    pub fn set_to_verified(&mut self) {
        self.state = AdmissionStatus::Verified;
    }

    pub fn set_done(&mut self) {
        self.state = AdmissionStatus::Done;
    }

    pub fn set_to_cancelled(&mut self) {
        self.state = AdmissionStatus::Cancelled;
    }
}

impl Record for HostelAdmission {
    const MODEL: &'static str = "hms.hostel_admission";
    const RELATIONS: &'static [Relation] = &[
        Relation::set_null("student_id", Student::MODEL),
        Relation::set_null("hostel_id", Hostel::MODEL),
        Relation::set_null("room_id", HostelRoom::MODEL),
        Relation::set_null("deposit_policy_id", DepositPolicy::MODEL),
    ];

    fn reference(&self, field: &str) -> Option<RecordId> {
        match field {
            "student_id" => self.student_id,
            "hostel_id" => self.hostel_id,
            "room_id" => self.room_id,
            "deposit_policy_id" => self.deposit_policy_id,
            _ => None,
        }
    }

    fn clear_reference(&mut self, field: &str) {
        match field {
            "student_id" => self.student_id = None,
            "hostel_id" => self.hostel_id = None,
            "room_id" => self.room_id = None,
            "deposit_policy_id" => self.deposit_policy_id = None,
            _ => {}
        }
    }

    fn reset_readonly(&mut self) {
        self.state = AdmissionStatus::default();
        self.name_seq = new_reference();
    }

    fn keep_readonly(&mut self, stored: &Self) {
        self.state = stored.state;
        self.name_seq.clone_from(&stored.name_seq);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::MODEL, "name_seq", &self.name_seq)?;
        require(Self::MODEL, "billing_date", &self.billing_date)?;
        require(Self::MODEL, "leaving_date", &self.leaving_date)
    }

    fn apply_defaults(&mut self, today: NaiveDate) {
        if self.admission_date.is_none() {
            self.admission_date = Some(today);
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn active_flag(&mut self) -> Option<&mut bool> {
        Some(&mut self.active)
    }
}

impl Stateful for HostelAdmission {
    type Status = AdmissionStatus;
    type Action = AdmissionAction;

    fn status(&self) -> AdmissionStatus {
        self.state
    }

    fn apply(
        &mut self,
        action: AdmissionAction,
        _ctx: &TransitionContext<'_>,
    ) -> Result<(), TransitionError> {
        match action {
            AdmissionAction::SetToDraft => self.set_to_draft(),
            AdmissionAction::SetToVerified => self.set_to_verified(),
            AdmissionAction::SetDone => self.set_done(),
            AdmissionAction::SetToCancelled => self.set_to_cancelled(),
        }
        Ok(())
    }
}
