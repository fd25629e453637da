use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    default_true, require, require_text, Record, Stateful, TransitionContext, TransitionError,
    ValidationError,
};

/// Availability of a hostel. Draft reads as "Not Available" to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostelStatus {
    #[default]
    Draft,
    Approved,
}

impl HostelStatus {
    pub const fn label(self) -> &'static str {
        match self {
            HostelStatus::Draft => "Not Available",
            HostelStatus::Approved => "Approved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostelAction {
    SetToDraft,
    SetToApproved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hostel {
    pub name: String,
    pub hostel_address: String,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_mobile: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    /// Free-form capacity as entered by staff, e.g. "120 beds".
    pub maximum_capacity: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date_started: Option<NaiveDate>,
    #[serde(default)]
    pub state: HostelStatus,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Hostel {
    pub fn new(name: &str, address: &str, maximum_capacity: &str, date_started: NaiveDate) -> Self {
        Self {
            name: name.to_string(),
            hostel_address: address.to_string(),
            contact_phone: None,
            contact_mobile: None,
            remark: None,
            maximum_capacity: maximum_capacity.to_string(),
            short_name: None,
            notes: None,
            description: None,
            date_started: Some(date_started),
            state: HostelStatus::Draft,
            active: true,
        }
    }

    pub fn set_to_draft(&mut self) {
        self.state = HostelStatus::Draft;
    }

    pub fn set_to_approved(&mut self) {
        self.state = HostelStatus::Approved;
    }
}

impl Record for Hostel {
    const MODEL: &'static str = "hms.hostel";

    fn reset_readonly(&mut self) {
        self.state = HostelStatus::default();
    }

    fn keep_readonly(&mut self, stored: &Self) {
        self.state = stored.state;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::MODEL, "name", &self.name)?;
        require_text(Self::MODEL, "hostel_address", &self.hostel_address)?;
        require_text(Self::MODEL, "maximum_capacity", &self.maximum_capacity)?;
        require(Self::MODEL, "date_started", &self.date_started)
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn active_flag(&mut self) -> Option<&mut bool> {
        Some(&mut self.active)
    }
}

impl Stateful for Hostel {
    type Status = HostelStatus;
    type Action = HostelAction;

    fn status(&self) -> HostelStatus {
        self.state
    }

    fn apply(
        &mut self,
        action: HostelAction,
        _ctx: &TransitionContext<'_>,
    ) -> Result<(), TransitionError> {
        match action {
            HostelAction::SetToDraft => self.set_to_draft(),
            HostelAction::SetToApproved => self.set_to_approved(),
        }
        Ok(())
    }
}
