use serde::{Deserialize, Serialize};

use super::{require_text, Record, ValidationError};

/// Academic department students are enrolled under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub name: String,
}

impl Record for Department {
    const MODEL: &'static str = "hms.department";

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::MODEL, "name", &self.name)
    }
}
