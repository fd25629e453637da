use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{require, require_text, HostelRoom, Record, RecordId, Relation, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmenityCategory {
    Normal,
    Cheap,
    Expensive,
}

/// Furniture or equipment placed in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amenity {
    pub name: String,
    #[serde(default)]
    pub category_type: Option<AmenityCategory>,
    pub price: String,
    #[serde(default)]
    pub date_of_purchase: Option<NaiveDate>,
    #[serde(default)]
    pub room_id: Option<RecordId>,
}

impl Record for Amenity {
    const MODEL: &'static str = "hms.amenities";
    const RELATIONS: &'static [Relation] = &[Relation::set_null("room_id", HostelRoom::MODEL)];

    fn reference(&self, field: &str) -> Option<RecordId> {
        match field {
            "room_id" => self.room_id,
            _ => None,
        }
    }

    fn clear_reference(&mut self, field: &str) {
        if field == "room_id" {
            self.room_id = None;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::MODEL, "name", &self.name)?;
        require_text(Self::MODEL, "price", &self.price)?;
        require(Self::MODEL, "date_of_purchase", &self.date_of_purchase)
    }
}
