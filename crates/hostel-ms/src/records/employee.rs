use serde::{Deserialize, Serialize};

use super::{default_true, require_text, Record, ValidationError};

/// Hostel staff member; teachers are flagged separately from support staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub father_name: String,
    pub employee_no: String,
    #[serde(default)]
    pub cnic: Option<String>,
    #[serde(default = "default_true")]
    pub is_teacher: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Employee {
    pub fn new(name: &str, father_name: &str, employee_no: &str) -> Self {
        Self {
            name: name.to_string(),
            father_name: father_name.to_string(),
            employee_no: employee_no.to_string(),
            cnic: None,
            is_teacher: true,
            active: true,
        }
    }
}

impl Record for Employee {
    const MODEL: &'static str = "hms.employee";

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::MODEL, "name", &self.name)?;
        require_text(Self::MODEL, "father_name", &self.father_name)?;
        require_text(Self::MODEL, "employee_no", &self.employee_no)
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn active_flag(&mut self) -> Option<&mut bool> {
        Some(&mut self.active)
    }
}
