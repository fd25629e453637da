use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{require, require_text, Hostel, Record, RecordId, Relation, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationCategory {
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

/// Deposit terms a hostel offers over a date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositPolicy {
    pub name: String,
    pub short_description: String,
    #[serde(default)]
    pub from_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub minimum_deposit_amount: Option<f64>,
    #[serde(default)]
    pub calculation_category_type: Option<CalculationCategory>,
    /// Whole-number tax rate.
    #[serde(default)]
    pub taxes: i64,
    #[serde(default)]
    pub fixed_charges: bool,
    #[serde(default)]
    pub bookable_packages: bool,
    /// Informational flag; it does not hide the policy from listings.
    #[serde(default)]
    pub inactive: bool,
    #[serde(default)]
    pub hostel_id: Option<RecordId>,
}

impl Record for DepositPolicy {
    const MODEL: &'static str = "hms.deposit_policy";
    const RELATIONS: &'static [Relation] = &[Relation::set_null("hostel_id", Hostel::MODEL)];

    fn reference(&self, field: &str) -> Option<RecordId> {
        match field {
            "hostel_id" => self.hostel_id,
            _ => None,
        }
    }

    fn clear_reference(&mut self, field: &str) {
        if field == "hostel_id" {
            self.hostel_id = None;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::MODEL, "name", &self.name)?;
        require_text(Self::MODEL, "short_description", &self.short_description)?;
        require(Self::MODEL, "from_date", &self.from_date)?;
        require(Self::MODEL, "end_date", &self.end_date)?;
        require(Self::MODEL, "minimum_deposit_amount", &self.minimum_deposit_amount)
    }
}
